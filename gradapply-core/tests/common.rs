use gradapply_core::num_complex::Complex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Complex values spread over all four quadrants, away from the origin.
#[allow(dead_code)]
pub fn complex_samples(seed: u64, count: usize) -> Vec<Complex<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| Complex::new(rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0)))
        .filter(|z: &Complex<f64>| z.norm() > 1e-3)
        .collect()
}
