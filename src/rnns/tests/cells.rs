use crate::nn::{Graph, GraphError};
use crate::rnns::{flat_lstm_cell, lstm_cell, premul_lstm_cell};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

#[test]
fn test_lstm_cell_with_zero_weights() -> Result<(), GraphError> {
    // 权重与偏置全零时 i = f = o = 0.5，g = 0：c' = 0.5c，h' = 0.5·tanh(0.5c)
    let graph = Graph::new();
    let x = graph.input(&Tensor::new(&[1.0, -2.0, 3.0], &[1, 3]));
    let hx = graph.input(&Tensor::new(&[0.3, 0.7], &[1, 2]));
    let cx = graph.input(&Tensor::new(&[1.0, -4.0], &[1, 2]));
    let w_ih = graph.parameter_from(&Tensor::zeros(&[8, 3]), "w_ih");
    let w_hh = graph.parameter_from(&Tensor::zeros(&[8, 2]), "w_hh");
    let b_ih = graph.parameter_from(&Tensor::zeros(&[8]), "b_ih");
    let b_hh = graph.parameter_from(&Tensor::zeros(&[8]), "b_hh");

    let (hy, cy) = lstm_cell(&x, (&hx, &cx), &w_ih, &w_hh, &b_ih, &b_hh)?;
    assert_eq!(cy.value()?, Tensor::new(&[0.5, -2.0], &[1, 2]));
    let hy = hy.value()?.to_vec();
    assert_abs_diff_eq!(hy[0], 0.5 * 0.5_f32.tanh(), epsilon = 1e-6);
    assert_abs_diff_eq!(hy[1], 0.5 * (-2.0_f32).tanh(), epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_gate_order_is_input_forget_cell_output() -> Result<(), GraphError> {
    // 只给 forget 门一个很大的偏置：f ≈ 1，其余门为 0.5 / 0，所以 c' ≈ c
    let graph = Graph::new();
    let x = graph.input(&Tensor::zeros(&[1, 1]));
    let hx = graph.input(&Tensor::zeros(&[1, 1]));
    let cx = graph.input(&Tensor::new(&[2.0], &[1, 1]));
    let w_ih = graph.parameter_from(&Tensor::zeros(&[4, 1]), "w_ih");
    let w_hh = graph.parameter_from(&Tensor::zeros(&[4, 1]), "w_hh");
    let b_ih = graph.parameter_from(&Tensor::new(&[0.0, 50.0, 0.0, 0.0], &[4]), "b_ih");
    let b_hh = graph.parameter_from(&Tensor::zeros(&[4]), "b_hh");

    let (hy, cy) = lstm_cell(&x, (&hx, &cx), &w_ih, &w_hh, &b_ih, &b_hh)?;
    assert_abs_diff_eq!(cy.value()?.to_vec()[0], 2.0, epsilon = 1e-5);
    assert_abs_diff_eq!(hy.value()?.to_vec()[0], 0.5 * 2.0_f32.tanh(), epsilon = 1e-5);
    Ok(())
}

#[test]
fn test_three_cells_agree() -> Result<(), GraphError> {
    let graph = Graph::new_with_seed(3);
    let x = graph.randn(&[2, 3], None);
    let hx = graph.randn(&[2, 4], None);
    let cx = graph.randn(&[2, 4], None);
    let w_ih = graph.randn(&[16, 3], None);
    let w_hh = graph.randn(&[16, 4], None);
    let b_ih = graph.randn(&[16], None);
    let b_hh = graph.randn(&[16], None);

    let (h1, c1) = lstm_cell(&x, (&hx, &cx), &w_ih, &w_hh, &b_ih, &b_hh)?;
    let (h2, c2) = flat_lstm_cell(&x, &hx, &cx, &w_ih, &w_hh, &b_ih, &b_hh)?;
    let igates = x.matmul(&w_ih.t()?)?;
    let (h3, c3) = premul_lstm_cell(&igates, (&hx, &cx), &w_hh, &b_ih, &b_hh)?;

    assert_eq!(h1.value()?, h2.value()?);
    assert_eq!(c1.value()?, c2.value()?);
    assert!(h1.value()?.max_abs_diff(&h3.value()?) < 1e-5);
    assert!(c1.value()?.max_abs_diff(&c3.value()?) < 1e-5);
    Ok(())
}

#[test]
fn test_cell_rejects_mismatched_hidden_size() {
    let graph = Graph::new();
    let x = graph.input(&Tensor::zeros(&[2, 3]));
    let hx = graph.input(&Tensor::zeros(&[2, 5]));
    let cx = graph.input(&Tensor::zeros(&[2, 4]));
    let w_ih = graph.input(&Tensor::zeros(&[16, 3]));
    let w_hh = graph.input(&Tensor::zeros(&[16, 4]));
    let b = graph.input(&Tensor::zeros(&[16]));
    assert!(lstm_cell(&x, (&hx, &cx), &w_ih, &w_hh, &b, &b).is_err());
}
