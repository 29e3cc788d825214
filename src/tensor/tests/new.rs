use crate::assert_panic;
use crate::tensor::Tensor;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn test_new_and_to_vec() {
    let tensor = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]);
    assert_eq!(tensor.shape(), &[2, 3]);
    assert_eq!(tensor.dimension(), 2);
    assert_eq!(tensor.size(), 6);
    assert_eq!(tensor.to_vec(), vec![1., 2., 3., 4., 5., 6.]);
    assert_eq!(tensor.get(&[1, 0]), 4.);
}

#[test]
fn test_new_with_wrong_length() {
    assert_panic!(Tensor::new(&[1., 2., 3.], &[2, 2]));
}

#[test]
fn test_number() {
    assert_eq!(Tensor::new(&[5.], &[]).number(), Some(5.));
    assert_eq!(Tensor::new(&[5.], &[1, 1]).number(), Some(5.));
    assert_eq!(Tensor::new(&[5., 6.], &[2]).number(), None);
}

#[test]
fn test_normal_with_rng_is_reproducible() {
    let mut rng_1 = StdRng::seed_from_u64(42);
    let mut rng_2 = StdRng::seed_from_u64(42);
    let a = Tensor::normal_with_rng(0.0, 1.0, &[5, 2, 8], &mut rng_1);
    let b = Tensor::normal_with_rng(0.0, 1.0, &[5, 2, 8], &mut rng_2);
    assert_eq!(a, b);

    // 不同种子应得到不同的数据
    let mut rng_3 = StdRng::seed_from_u64(43);
    let c = Tensor::normal_with_rng(0.0, 1.0, &[5, 2, 8], &mut rng_3);
    assert_ne!(a, c);
}

#[test]
fn test_normal_with_rng_statistics() {
    let mut rng = StdRng::seed_from_u64(7);
    let tensor = Tensor::normal_with_rng(0.0, 1.0, &[100, 100], &mut rng);
    let data = tensor.to_vec();
    let mean = data.iter().sum::<f32>() / data.len() as f32;
    let var = data.iter().map(|x| (x - mean) * (x - mean)).sum::<f32>() / data.len() as f32;
    assert!(mean.abs() < 0.05);
    assert!((var.sqrt() - 1.0).abs() < 0.05);
}

#[test]
fn test_uniform_with_rng_range() {
    let mut rng = StdRng::seed_from_u64(1);
    let tensor = Tensor::uniform_with_rng(-0.25, 0.25, &[32, 8], &mut rng);
    assert!(tensor.to_vec().iter().all(|x| (-0.25..=0.25).contains(x)));
}

#[test]
fn test_randn_like_keeps_shape() {
    let mut rng = StdRng::seed_from_u64(3);
    let reference = Tensor::zeros(&[3, 2, 4]);
    assert_eq!(Tensor::randn_like(&reference, &mut rng).shape(), &[3, 2, 4]);
    assert_eq!(Tensor::ones_like(&reference), Tensor::ones(&[3, 2, 4]));
}
