use crate::scalar::DeviceScalar;

/// Checks that two buffers hold approximately the same values.
///
/// Elements are widened to `Complex<f64>` and compared by the modulus of
/// their difference, scaled by `max(1, |expected|)`. Panics on the first
/// element outside `tolerance`, or if the lengths differ.
pub fn check_slice_near<T: DeviceScalar>(actual: &[T], expected: &[T], tolerance: f64) {
    assert_eq!(actual.len(), expected.len(), "Data length mismatch");

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        let (a, e) = (a.to_complex64(), e.to_complex64());
        let diff = (a - e).norm() / e.norm().max(1.0);
        if !(diff <= tolerance) {
            panic!(
                "Data mismatch at index {}: actual={}, expected={}, diff={:?}, tolerance={:?}",
                i, a, e, diff, tolerance
            );
        }
    }
}

/// Same as [`check_slice_near`] against real `f64` expectations.
pub fn check_slice_near_f64<T: DeviceScalar>(actual: &[T], expected: &[f64], tolerance: f64) {
    let expected: Vec<T> = expected.iter().map(|&v| T::from_real(v)).collect();
    check_slice_near(actual, &expected, tolerance);
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex;

    #[test]
    fn test_check_slice_near_accepts_close_values() {
        check_slice_near(&[1.0f32, 2.0], &[1.0 + 1e-7, 2.0], 1e-6);
        check_slice_near(&[Complex::new(1.0f64, 1.0)], &[Complex::new(1.0, 1.0 + 1e-12)], 1e-10);
        check_slice_near_f64(&[0.9f32, 1.9], &[0.9, 1.9], 1e-6);
    }

    #[test]
    #[should_panic(expected = "Data mismatch at index 1")]
    fn test_check_slice_near_rejects_far_values() {
        check_slice_near(&[1.0f64, 2.0], &[1.0, 2.5], 1e-6);
    }

    #[test]
    #[should_panic(expected = "Data mismatch at index 0")]
    fn test_check_slice_near_rejects_nan() {
        check_slice_near(&[f64::NAN], &[1.0], 1e-6);
    }
}
