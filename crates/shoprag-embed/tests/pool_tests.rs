use candle_core::{DType, Device, Tensor};
use shoprag_embed::masked_mean_l2;

fn pooled(hidden: &[f32], shape: (usize, usize, usize), mask: &[u32]) -> Vec<Vec<f32>> {
    let dev = Device::Cpu;
    let h = Tensor::from_slice(hidden, shape, &dev).expect("hidden");
    let m = Tensor::from_slice(mask, (shape.0, shape.1), &dev).expect("mask");
    masked_mean_l2(&h, &m).expect("pool").to_vec2().expect("vec2")
}

#[test]
fn masked_tokens_do_not_contribute() {
    let v = pooled(&[1.0, 2.0, 3.0, 4.0, 50.0, 60.0, 70.0, 80.0], (1, 2, 4), &[1, 0]);
    let norm = 30f32.sqrt();
    for (got, want) in v[0].iter().zip([1.0, 2.0, 3.0, 4.0]) {
        assert!((got - want / norm).abs() < 1e-5, "got={got} want={}", want / norm);
    }
}

#[test]
fn kept_tokens_are_averaged() {
    let v = pooled(&[1.0, 0.0, 3.0, 0.0], (1, 2, 2), &[1, 1]);
    assert!((v[0][0] - 1.0).abs() < 1e-5);
    assert!(v[0][1].abs() < 1e-5);
}

#[test]
fn each_row_is_unit_length() {
    let v = pooled(&[3.0, 4.0, 0.0, 0.0, 0.5, 0.5, 2.0, 1.0], (2, 2, 2), &[1, 0, 1, 1]);
    assert_eq!(v.len(), 2);
    for row in &v {
        let norm: f32 = row.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }
}

#[test]
fn wrong_shapes_are_rejected() {
    let dev = Device::Cpu;
    let flat = Tensor::zeros((2, 4), DType::F32, &dev).expect("zeros");
    let mask = Tensor::ones((2, 1), DType::F32, &dev).expect("ones");
    assert!(masked_mean_l2(&flat, &mask).is_err());

    let hidden = Tensor::zeros((1, 3, 4), DType::F32, &dev).expect("zeros");
    let short_mask = Tensor::ones((1, 2), DType::U32, &dev).expect("ones");
    assert!(masked_mean_l2(&hidden, &short_mask).is_err());
}
