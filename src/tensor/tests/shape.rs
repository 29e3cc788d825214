use crate::assert_panic;
use crate::errors::TensorError;
use crate::tensor::Tensor;

#[test]
fn test_reshape_and_unsqueeze() {
    let tensor = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]);
    assert_eq!(tensor.reshape(&[3, 2]).to_vec(), tensor.to_vec());
    assert_eq!(tensor.unsqueeze(0).shape(), &[1, 2, 3]);
    assert_eq!(tensor.unsqueeze(2).shape(), &[2, 3, 1]);
    assert_panic!(tensor.reshape(&[4, 2]), TensorError::IncompatibleShape);
}

#[test]
fn test_transpose_keeps_logical_order() {
    let tensor = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]);
    let transposed = tensor.transpose();
    assert_eq!(transposed.shape(), &[3, 2]);
    assert_eq!(transposed.to_vec(), vec![1., 4., 2., 5., 3., 6.]);
    // 转置后再变形也应按逻辑顺序取数
    assert_eq!(transposed.reshape(&[6]).to_vec(), vec![1., 4., 2., 5., 3., 6.]);
}

#[test]
fn test_stack_adds_leading_dim() {
    let t1 = Tensor::new(&[1., 2.], &[1, 2]);
    let t2 = Tensor::new(&[3., 4.], &[1, 2]);
    let stacked = Tensor::stack(&[&t1, &t2]);
    assert_eq!(stacked.shape(), &[2, 1, 2]);
    assert_eq!(stacked.to_vec(), vec![1., 2., 3., 4.]);

    assert_panic!(Tensor::stack(&[]), TensorError::EmptyList);
    let t3 = Tensor::new(&[3., 4.], &[2, 1]);
    assert_panic!(Tensor::stack(&[&t1, &t3]), TensorError::InconsitentShape);
}

#[test]
fn test_select_and_unbind() {
    let tensor = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[3, 1, 2]);
    assert_eq!(tensor.select(1), Tensor::new(&[3., 4.], &[1, 2]));
    let parts = tensor.unbind();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[2], Tensor::new(&[5., 6.], &[1, 2]));
    let restacked = Tensor::stack(&parts.iter().collect::<Vec<_>>());
    assert_eq!(restacked, tensor);
    assert_panic!(
        tensor.select(3),
        TensorError::IndexOutOfRange { index: 3, len: 3 }
    );
}

#[test]
fn test_narrow_and_pad_narrowed() {
    let gates = Tensor::new(&[1., 2., 3., 4., 5., 6., 7., 8.], &[2, 4]);
    let chunk = gates.narrow(1, 2, 2);
    assert_eq!(chunk, Tensor::new(&[3., 4., 7., 8.], &[2, 2]));
    let padded = Tensor::pad_narrowed(&chunk, &[2, 4], 1, 2);
    assert_eq!(
        padded,
        Tensor::new(&[0., 0., 3., 4., 0., 0., 7., 8.], &[2, 4])
    );
}

#[test]
fn test_broadcast_and_sum_to_shape() {
    assert_eq!(Tensor::broadcast_shape(&[2, 3], &[3]), Some(vec![2, 3]));
    assert_eq!(Tensor::broadcast_shape(&[2, 1], &[1, 4]), Some(vec![2, 4]));
    assert_eq!(Tensor::broadcast_shape(&[2, 3], &[2]), None);

    let grad = Tensor::ones(&[2, 3]);
    assert_eq!(grad.sum_to_shape(&[3]), Tensor::new(&[2., 2., 2.], &[3]));
    assert_eq!(grad.sum_to_shape(&[2, 1]), Tensor::new(&[3., 3.], &[2, 1]));
    assert_eq!(grad.sum_to_shape(&[2, 3]), grad);
}
