use std::sync::Once;

use crate::context::{Device, DeviceConfig};

mod context_test;

// Helper to initialize logger only once for all device tests
static LOGGER_INIT: Once = Once::new();

pub(crate) fn setup_logger() {
    LOGGER_INIT.call_once(|| {
        // If it fails (e.g., already initialized), that's okay.
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// A small device with a fixed shape, so launch shapes are deterministic.
pub(crate) fn test_device(workers: usize) -> Device {
    setup_logger();
    let config = DeviceConfig {
        name: "test".to_string(),
        num_threads: Some(workers),
        max_threads_per_block: 4,
        max_threads_per_multiprocessor: 8,
    };
    Device::new(7, &config).expect("Failed to create test device")
}
