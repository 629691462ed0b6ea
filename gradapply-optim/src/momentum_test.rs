#[cfg(test)]
mod tests {
    use crate::momentum::{KerasMomentum, Momentum};
    use crate::test_utils::test_device;
    use gradapply_core::num_complex::Complex;
    use gradapply_core::utils::testing::{check_slice_near, check_slice_near_f64};
    use gradapply_core::{Cuda, Rocm};

    #[test]
    fn test_momentum() {
        let device = test_device();
        for (use_nesterov, expected_var) in [(false, 1.0 - 0.1 * 1.45), (true, 1.0 - (0.1 + 1.45 * 0.9 * 0.1))] {
            let functor = Momentum { lr: 0.1f64, momentum: 0.9, use_nesterov };
            let (mut var, mut accum, grad) = (vec![1.0f64], vec![0.5f64], vec![1.0f64]);
            device.scope(|stream| functor.apply::<Rocm>(stream, &mut var, &mut accum, &grad));
            check_slice_near_f64(&accum, &[1.45], 1e-15);
            check_slice_near_f64(&var, &[expected_var], 1e-15);
        }
    }

    #[test]
    fn test_keras_momentum() {
        let device = test_device();
        for (use_nesterov, expected_var) in [(false, 1.35), (true, 1.0 + (0.35 * 0.9 - 0.1))] {
            let functor = KerasMomentum { lr: 0.1f32, momentum: 0.9, use_nesterov };
            let (mut var, mut accum, grad) = (vec![1.0f32], vec![0.5f32], vec![1.0f32]);
            device.scope(|stream| functor.apply::<Cuda>(stream, &mut var, &mut accum, &grad));
            check_slice_near_f64(&accum, &[0.35], 1e-6);
            check_slice_near_f64(&var, &[expected_var], 1e-6);
        }
    }

    #[test]
    fn test_complex_momentum() {
        let device = test_device();
        let c = |re: f64, im: f64| Complex::new(re, im);
        let functor = Momentum { lr: c(0.5, 0.0), momentum: c(0.5, 0.0), use_nesterov: false };
        let (mut var, mut accum, grad) = (vec![c(1.0, 1.0)], vec![c(2.0, 0.0)], vec![c(0.0, 1.0)]);
        device.scope(|stream| functor.apply::<Cuda>(stream, &mut var, &mut accum, &grad));
        // accum = 1 + i, var = (1 + i) - 0.5 (1 + i)
        check_slice_near(&accum, &[c(1.0, 1.0)], 1e-15);
        check_slice_near(&var, &[c(0.5, 0.5)], 1e-15);

        let functor = KerasMomentum { lr: c(0.5, 0.0), momentum: c(0.5, 0.0), use_nesterov: true };
        let (mut var, mut accum) = (vec![c(1.0, 1.0)], vec![c(2.0, 0.0)]);
        device.scope(|stream| functor.apply::<Cuda>(stream, &mut var, &mut accum, &grad));
        // accum = 1 - 0.5i, var += (0.5 - 0.25i) - 0.5i
        check_slice_near(&accum, &[c(1.0, -0.5)], 1e-15);
        check_slice_near(&var, &[c(1.5, 0.25)], 1e-15);
    }

    #[test]
    fn test_momentum_repeated_steps_accumulate() {
        let device = test_device();
        let functor = Momentum { lr: 1.0f64, momentum: 0.5, use_nesterov: false };
        let (mut var, mut accum, grad) = (vec![0.0f64; 40], vec![0.0f64; 40], vec![1.0f64; 40]);
        // accum: 1, 1.5, 1.75 ; var: -1, -2.5, -4.25
        for _ in 0..3 {
            device.scope(|stream| functor.apply::<Rocm>(stream, &mut var, &mut accum, &grad));
        }
        assert!(accum.iter().all(|a| *a == 1.75));
        assert!(var.iter().all(|v| *v == -4.25));
    }
}
