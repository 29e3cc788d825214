/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : LSTM 单步（cell）
 *
 * 三种 cell 计算同一个递推，区别只在于输入投影是否已提前算好：
 *   gates = x_t @ w_ih^T + b_ih + h @ w_hh^T + b_hh
 *   i, f, g, o = chunk(gates, 4, 1)
 *   c' = σ(f) ⊙ c + σ(i) ⊙ tanh(g)
 *   h' = σ(o) ⊙ tanh(c')
 */

use crate::nn::{GraphError, Var};

/// 由门的预激活`[B, 4H]`完成记忆单元更新
fn lstm_update(gates: &Var, cx: &Var) -> Result<(Var, Var), GraphError> {
    let chunks = gates.chunk(4, 1)?;
    let [in_gate, forget_gate, cell_gate, out_gate] = chunks.as_slice() else {
        return Err(GraphError::ComputationError(format!(
            "门预激活应拆成4块，实际为{}块",
            chunks.len()
        )));
    };
    let in_gate = in_gate.sigmoid()?;
    let forget_gate = forget_gate.sigmoid()?;
    let cell_gate = cell_gate.tanh()?;
    let out_gate = out_gate.sigmoid()?;

    let cy = (&forget_gate * cx)?.try_add(&(&in_gate * &cell_gate)?)?;
    let hy = (&out_gate * &cy.tanh()?)?;
    Ok((hy, cy))
}

/// 标准 LSTM 单步：`x_t [B, I]`、`(hx, cx) [B, H]`，返回`(hy, cy)`
pub fn lstm_cell(
    input: &Var,
    (hx, cx): (&Var, &Var),
    w_ih: &Var,
    w_hh: &Var,
    b_ih: &Var,
    b_hh: &Var,
) -> Result<(Var, Var), GraphError> {
    let gates = (&input.matmul(&w_ih.t()?)? + b_ih)?;
    let gates = (&gates + &(&hx.matmul(&w_hh.t()?)? + b_hh)?)?;
    lstm_update(&gates, cx)
}

/// 输入投影已提前算好的单步：`igates = x_t @ w_ih^T`
pub fn premul_lstm_cell(
    igates: &Var,
    (hx, cx): (&Var, &Var),
    w_hh: &Var,
    b_ih: &Var,
    b_hh: &Var,
) -> Result<(Var, Var), GraphError> {
    let gates = (&(igates + &hx.matmul(&w_hh.t()?)?)? + b_ih)?;
    let gates = (&gates + b_hh)?;
    lstm_update(&gates, cx)
}

/// 扁平签名的单步（状态不打包成二元组）
pub fn flat_lstm_cell(
    input: &Var,
    hx: &Var,
    cx: &Var,
    w_ih: &Var,
    w_hh: &Var,
    b_ih: &Var,
    b_hh: &Var,
) -> Result<(Var, Var), GraphError> {
    lstm_cell(input, (hx, cx), w_ih, w_hh, b_ih, b_hh)
}
