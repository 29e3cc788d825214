/*
 * @Author       : 老董
 * @Description  : 反向传播测试
 *
 * 测试策略：
 * 1. 手算小例子（y = xw + b）
 * 2. 梯度累积与清零
 * 3. 上游梯度形状校验
 * 4. 用有限差分验证由全部算子组成的 LSTM 单步的梯度
 */

use crate::assert_err;
use crate::nn::{Graph, GraphError, Var};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn test_linear_grad() -> Result<(), GraphError> {
    let graph = Graph::new();
    let x = graph.input(&Tensor::new(&[1.0, 2.0, 3.0], &[1, 3]));
    let w = graph.parameter_from(&Tensor::new(&[0.1, 0.2, 0.3], &[3, 1]), "w");
    let b = graph.parameter_from(&Tensor::new(&[0.4], &[1]), "b");
    let y = (&x.matmul(&w)? + &b)?;
    assert_abs_diff_eq!(y.value()?.to_vec()[0], 1.8, epsilon = 1e-6);

    y.backward_with_grad(&Tensor::ones(&[1, 1]))?;
    // dy/dw = x^T，dy/db = 1
    assert_eq!(
        w.grad()?.unwrap(),
        Tensor::new(&[1.0, 2.0, 3.0], &[3, 1])
    );
    assert_eq!(b.grad()?.unwrap(), Tensor::new(&[1.0], &[1]));
    Ok(())
}

#[test]
fn test_grad_accumulates_until_zero_grad() -> Result<(), GraphError> {
    let graph = Graph::new();
    let x = graph.input(&Tensor::new(&[1.0, -1.0], &[1, 2]));
    let w = graph.parameter_from(&Tensor::new(&[2.0, 3.0], &[1, 2]), "w");
    let unused = graph.parameter_from(&Tensor::zeros(&[2]), "unused");
    let y = (&x * &w)?;
    let seed = Tensor::new(&[1.0, 1.0], &[1, 2]);

    y.backward_with_grad(&seed)?;
    y.backward_with_grad(&seed)?;
    assert_eq!(w.grad()?.unwrap(), Tensor::new(&[2.0, -2.0], &[1, 2]));
    // 不可达的参数没有梯度
    assert_eq!(unused.grad()?, None);

    graph.zero_grad()?;
    assert_eq!(w.grad()?, None);
    Ok(())
}

#[test]
fn test_shared_operand_grad() -> Result<(), GraphError> {
    // y = w ⊙ w，dy/dw = 2w
    let graph = Graph::new();
    let w = graph.parameter_from(&Tensor::new(&[1.5, -2.0], &[2]), "w");
    let y = (&w * &w)?;
    y.backward_with_grad(&Tensor::ones(&[2]))?;
    assert_eq!(w.grad()?.unwrap(), Tensor::new(&[3.0, -4.0], &[2]));
    Ok(())
}

#[test]
fn test_upstream_grad_shape_mismatch() {
    let graph = Graph::new();
    let w = graph.parameter_from(&Tensor::ones(&[2, 3]), "w");
    let y = w.tanh().unwrap();
    assert_err!(
        y.backward_with_grad(&Tensor::ones(&[3, 2])),
        GraphError::ShapeMismatch(
            [2, 3],
            [3, 2],
            "上游梯度的形状必须与反向传播起点节点的值一致"
        )
    );
}

#[test]
fn test_backward_without_parameters_is_noop() -> Result<(), GraphError> {
    let graph = Graph::new();
    let x = graph.input(&Tensor::ones(&[2, 2]));
    let y = x.sigmoid()?;
    y.backward_with_grad(&Tensor::ones(&[2, 2]))?;
    assert!(graph.parameters().is_empty());
    Ok(())
}

/// 由 select/mat_mul/transpose/add/narrow/sigmoid/tanh/multiply/stack/reshape 组成的 LSTM 单步
fn lstm_step(graph: &Graph, params: &[Tensor]) -> Result<(Vec<Var>, Var), GraphError> {
    let x_seq = graph.input(&Tensor::new(
        &[0.5, -0.3, 0.8, 0.1, 0.2, -0.7, -0.4, 0.9, 0.3, 0.6, -0.2, 0.05],
        &[2, 2, 3],
    ));
    let c = graph.input(&Tensor::new(&[0.1, -0.2, 0.3, 0.4], &[2, 2]));
    let w = graph.parameter_from(&params[0], "w");
    let b = graph.parameter_from(&params[1], "b");

    let x = x_seq.select(1)?;
    let gates = (&x.matmul(&w.t()?)? + &b)?;
    let chunks = gates.chunk(4, 1)?;
    let i = chunks[0].sigmoid()?;
    let f = chunks[1].sigmoid()?;
    let g = chunks[2].tanh()?;
    let o = chunks[3].sigmoid()?;
    let c_next = (&f * &c)?.try_add(&(&i * &g)?)?;
    let h_next = (&o * &c_next.tanh()?)?;
    let out = Var::stack(&[h_next, c_next])?.reshape(&[2, 4])?;
    Ok((vec![w, b], out))
}

#[test]
fn test_lstm_step_grad_matches_finite_difference() -> Result<(), GraphError> {
    let mut rng = StdRng::seed_from_u64(42);
    let params = vec![
        Tensor::uniform_with_rng(-0.5, 0.5, &[8, 3], &mut rng),
        Tensor::uniform_with_rng(-0.5, 0.5, &[8], &mut rng),
    ];
    let seed = Tensor::normal_with_rng(0.0, 1.0, &[2, 4], &mut rng);

    // 解析梯度
    let graph = Graph::new();
    let (param_vars, out) = lstm_step(&graph, &params)?;
    out.backward_with_grad(&seed)?;

    // 有限差分：L = sum(seed ⊙ out)
    let loss = |params: &[Tensor]| -> Result<f32, GraphError> {
        let graph = Graph::new();
        let (_, out) = lstm_step(&graph, params)?;
        Ok((&out.value()? * &seed).sum())
    };
    let eps = 1e-2;
    for (p, param_var) in param_vars.iter().enumerate() {
        let analytic = param_var.grad()?.unwrap().to_vec();
        let shape = params[p].shape().to_vec();
        for k in 0..params[p].size() {
            let mut plus = params.clone();
            let mut minus = params.clone();
            let mut data = params[p].to_vec();
            data[k] += eps;
            plus[p] = Tensor::new(&data, &shape);
            data[k] -= 2.0 * eps;
            minus[p] = Tensor::new(&data, &shape);
            let numeric = (loss(&plus)? - loss(&minus)?) / (2.0 * eps);
            assert_abs_diff_eq!(analytic[k], numeric, epsilon = 2e-3);
        }
    }
    Ok(())
}
