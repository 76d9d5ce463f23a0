//! Small dense-vector helpers used on both sides of the index.

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scale `v` to unit length in place and return its original norm.
///
/// A zero vector has no direction and is left untouched.
pub fn l2_normalize(v: &mut [f32]) -> f32 {
    let norm = l2_norm(v);
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
    norm
}

pub fn is_unit(v: &[f32], tolerance: f32) -> bool {
    (l2_norm(v) - 1.0).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_yields_unit_length() {
        let mut v = vec![3.0f32, 4.0];
        let norm = l2_normalize(&mut v);
        assert!((norm - 5.0).abs() < 1e-6);
        assert!(is_unit(&v, 1e-5));
        assert!((v[0] - 0.6).abs() < 1e-6 && (v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_is_left_alone() {
        let mut v = vec![0.0f32; 4];
        assert_eq!(l2_normalize(&mut v), 0.0);
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn dot_of_unit_vector_with_itself_is_one() {
        let mut v = vec![1.0f32, -2.0, 0.5, 7.0];
        l2_normalize(&mut v);
        assert!((dot(&v, &v) - 1.0).abs() < 1e-5);
    }
}
