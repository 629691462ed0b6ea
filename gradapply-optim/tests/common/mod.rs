use std::sync::Once;

use gradapply_core::DeviceScalar;
use gradapply_device::{Device, DeviceConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

static LOGGER_INIT: Once = Once::new();

/// Value written around every array; an update must never touch it.
pub const SENTINEL: f64 = -12345.5;
const PAD: usize = 7;

#[allow(dead_code)]
pub fn device() -> Device {
    LOGGER_INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
    let config = DeviceConfig {
        name: "integration".to_string(),
        num_threads: Some(4),
        max_threads_per_block: 4,
        max_threads_per_multiprocessor: 8,
    };
    Device::new(2, &config).expect("Failed to create integration device")
}

/// A buffer embedded between runs of [`SENTINEL`].
#[allow(dead_code)]
pub struct Padded<T> {
    buf: Vec<T>,
    len: usize,
}

#[allow(dead_code)]
impl<T: DeviceScalar> Padded<T> {
    pub fn new(data: &[T]) -> Self {
        let sentinel = T::from_real(SENTINEL);
        let mut buf = vec![sentinel; PAD];
        buf.extend_from_slice(data);
        buf.extend(std::iter::repeat(sentinel).take(PAD));
        Padded { buf, len: data.len() }
    }

    pub fn inner(&mut self) -> &mut [T] {
        &mut self.buf[PAD..PAD + self.len]
    }

    pub fn view(&self) -> &[T] {
        &self.buf[PAD..PAD + self.len]
    }

    pub fn assert_guards(&self, what: &str) {
        let sentinel = T::from_real(SENTINEL);
        let (head, rest) = self.buf.split_at(PAD);
        let tail = &rest[self.len..];
        assert!(
            head.iter().chain(tail.iter()).all(|x| *x == sentinel),
            "{} wrote outside its arrays",
            what
        );
    }

    pub fn all_finite(&self) -> bool {
        self.view().iter().all(|x| {
            let z = x.to_complex64();
            z.re.is_finite() && z.im.is_finite()
        })
    }
}

/// `n` uniform values in `[lo, hi)` from a seeded generator.
#[allow(dead_code)]
pub fn uniform<T: DeviceScalar>(seed: u64, n: usize, lo: f64, hi: f64) -> Vec<T> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| T::from_real(rng.gen_range(lo..hi))).collect()
}
