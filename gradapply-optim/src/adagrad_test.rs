#[cfg(test)]
mod tests {
    use crate::adagrad::{Adagrad, AdagradV2};
    use crate::test_utils::{random_vec, test_device};
    use gradapply_core::num_complex::Complex;
    use gradapply_core::utils::testing::{check_slice_near, check_slice_near_f64};
    use gradapply_core::{Backend, Cuda, DeviceScalar, Rocm};
    use gradapply_device::StreamStats;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn adagrad_step<B: crate::adagrad::ApplyAdagrad<f64>>(
        functor: Adagrad<f64>,
        var: &mut [f64],
        accum: &mut [f64],
        grad: &[f64],
    ) -> StreamStats {
        let device = test_device();
        device.scope(|stream| {
            functor.apply::<B>(stream, var, accum, grad);
            stream.stats()
        })
    }

    #[test]
    fn test_adagrad_basic() {
        let functor = Adagrad { lr: 1.0f64, update_slots: true };
        for stats_expected in [
            StreamStats { kernel_launches: 0, bulk_enqueues: 1 },
            StreamStats { kernel_launches: 1, bulk_enqueues: 0 },
        ] {
            let (mut var, mut accum, grad) = (vec![1.0f64], vec![0.0f64], vec![2.0f64]);
            let stats = if stats_expected.kernel_launches == 0 {
                adagrad_step::<Cuda>(functor, &mut var, &mut accum, &grad)
            } else {
                adagrad_step::<Rocm>(functor, &mut var, &mut accum, &grad)
            };
            assert_eq!(stats, stats_expected);
            // var = 1 - 1 * 2 * rsqrt(4) = 0
            assert_eq!(accum, [4.0]);
            assert_eq!(var, [0.0]);
        }
    }

    #[test]
    fn test_adagrad_without_slot_update() {
        let functor = Adagrad { lr: 0.5f64, update_slots: false };
        let (mut var, mut accum, grad) = (vec![1.0f64, 2.0], vec![4.0f64, 16.0], vec![2.0f64, -4.0]);
        adagrad_step::<Rocm>(functor, &mut var, &mut accum, &grad);
        assert_eq!(accum, [4.0, 16.0]);
        check_slice_near_f64(&var, &[0.5, 2.5], 1e-15);
    }

    #[test]
    fn test_adagrad_accumulator_is_monotone() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = 257;
        let functor = Adagrad { lr: 0.01f64, update_slots: true };
        let mut var: Vec<f64> = random_vec(&mut rng, n, -1.0, 1.0);
        let mut accum: Vec<f64> = random_vec(&mut rng, n, 0.1, 1.0);
        for step in 0..10 {
            let grad: Vec<f64> = random_vec(&mut rng, n, -5.0, 5.0);
            let before = accum.clone();
            if step % 2 == 0 {
                adagrad_step::<Cuda>(functor, &mut var, &mut accum, &grad);
            } else {
                adagrad_step::<Rocm>(functor, &mut var, &mut accum, &grad);
            }
            for (new, old) in accum.iter().zip(before.iter()) {
                assert!(new >= old, "accumulator decreased: {} -> {}", old, new);
            }
        }
    }

    fn cross_path<B: Backend, T: DeviceScalar>(
        var: &[T],
        accum: &[T],
        grad: &[T],
        update_slots: bool,
        tolerance: f64,
    ) {
        let lr = T::from_real(0.05);
        let (mut var_b, mut accum_b) = (var.to_vec(), accum.to_vec());
        let (mut var_k, mut accum_k) = (var.to_vec(), accum.to_vec());
        Adagrad { lr, update_slots }.bulk::<B>((&mut var_b, &mut accum_b, grad));
        Adagrad { lr, update_slots }.kernel::<B>((&mut var_k, &mut accum_k, grad));
        check_slice_near(&var_k, &var_b, tolerance);
        check_slice_near(&accum_k, &accum_b, tolerance);

        let epsilon = T::from_real(1e-3);
        let (mut var_b, mut accum_b) = (var.to_vec(), accum.to_vec());
        let (mut var_k, mut accum_k) = (var.to_vec(), accum.to_vec());
        AdagradV2 { lr, epsilon, update_slots }.bulk::<B>((&mut var_b, &mut accum_b, grad));
        AdagradV2 { lr, epsilon, update_slots }.kernel::<B>((&mut var_k, &mut accum_k, grad));
        check_slice_near(&var_k, &var_b, tolerance);
        check_slice_near(&accum_k, &accum_b, tolerance);
    }

    fn to_f32(v: &[f64]) -> Vec<f32> {
        v.iter().map(|x| *x as f32).collect()
    }

    fn to_c64(v: &[f64]) -> Vec<Complex<f64>> {
        v.iter().map(|x| Complex::new(*x, 0.5 * x)).collect()
    }

    #[test]
    fn test_bulk_and_kernel_agree() {
        let mut rng = StdRng::seed_from_u64(99);
        let n = 100;
        let var: Vec<f64> = random_vec(&mut rng, n, -1.0, 1.0);
        let accum: Vec<f64> = random_vec(&mut rng, n, 0.1, 2.0);
        let grad: Vec<f64> = random_vec(&mut rng, n, -1.0, 1.0);
        for update_slots in [true, false] {
            cross_path::<Cuda, f64>(&var, &accum, &grad, update_slots, 1e-15);
            cross_path::<Rocm, f64>(&var, &accum, &grad, update_slots, 1e-15);
        }

        cross_path::<Rocm, f32>(&to_f32(&var), &to_f32(&accum), &to_f32(&grad), true, 1e-6);

        cross_path::<Rocm, Complex<f64>>(&to_c64(&var), &to_c64(&accum), &to_c64(&grad), true, 1e-12);
        cross_path::<Cuda, Complex<f64>>(&to_c64(&var), &to_c64(&accum), &to_c64(&grad), true, 1e-12);
    }

    #[test]
    fn test_adagrad_v2_basic() {
        let device = test_device();
        let functor = AdagradV2 { lr: 1.0f64, epsilon: 1.0, update_slots: true };
        let (mut var, mut accum, grad) = (vec![1.0f64], vec![0.0f64], vec![2.0f64]);
        let stats = device.scope(|stream| {
            functor.apply::<Rocm>(stream, &mut var, &mut accum, &grad);
            stream.stats()
        });
        assert_eq!(stats.kernel_launches, 1);
        // var = 1 - 2 / (sqrt(4) + 1)
        assert_eq!(accum, [4.0]);
        check_slice_near_f64(&var, &[1.0 / 3.0], 1e-15);

        let (mut var, mut accum, grad) = (vec![1.0f32], vec![0.0f32], vec![2.0f32]);
        let functor = AdagradV2 { lr: 1.0f32, epsilon: 1.0, update_slots: true };
        device.scope(|stream| functor.apply::<Cuda>(stream, &mut var, &mut accum, &grad));
        check_slice_near_f64(&var, &[1.0 / 3.0], 1e-6);
    }

    #[test]
    fn test_complex_adagrad_backends_agree() {
        let device = test_device();
        let var = vec![Complex::new(1.0f32, -1.0), Complex::new(0.5, 2.0)];
        let accum = vec![Complex::new(2.0f32, 0.5), Complex::new(-1.0, 3.0)];
        let grad = vec![Complex::new(0.3f32, 0.1), Complex::new(-0.2, 0.7)];
        let functor = Adagrad { lr: Complex::new(0.1f32, 0.0), update_slots: true };

        let (mut var_c, mut accum_c) = (var.clone(), accum.clone());
        let (mut var_r, mut accum_r) = (var.clone(), accum.clone());
        device.scope(|stream| {
            functor.apply::<Cuda>(stream, &mut var_c, &mut accum_c, &grad);
            functor.apply::<Rocm>(stream, &mut var_r, &mut accum_r, &grad);
        });
        check_slice_near(&accum_r, &accum_c, 0.0);
        check_slice_near(&var_r, &var_c, 1e-6);
    }
}
