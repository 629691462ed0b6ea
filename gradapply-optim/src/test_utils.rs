use std::sync::Once;

use gradapply_core::DeviceScalar;
use gradapply_device::{Device, DeviceConfig};
use rand::rngs::StdRng;
use rand::Rng;

static LOGGER_INIT: Once = Once::new();

pub(crate) fn setup_logger() {
    LOGGER_INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Three workers and tiny blocks, so kernel launches span several groups.
pub(crate) fn test_device() -> Device {
    setup_logger();
    let config = DeviceConfig {
        name: "optim-test".to_string(),
        num_threads: Some(3),
        max_threads_per_block: 8,
        max_threads_per_multiprocessor: 16,
    };
    Device::new(1, &config).expect("Failed to create test device")
}

pub(crate) fn random_vec<T: DeviceScalar>(rng: &mut StdRng, n: usize, lo: f64, hi: f64) -> Vec<T> {
    (0..n).map(|_| T::from_real(rng.gen_range(lo..hi))).collect()
}
