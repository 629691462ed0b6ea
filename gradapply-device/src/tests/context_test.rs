use super::{setup_logger, test_device};
use crate::context::*;
use crate::error::DeviceError;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_initialize_device_idempotent() {
    setup_logger();
    let first = initialize_device_with_logging().expect("first init failed");
    let second = initialize_device_with_logging().expect("second init failed");
    assert!(std::ptr::eq(first, second));
    assert_eq!(first.id(), 0);
}

#[test]
fn test_default_config() {
    let config = DeviceConfig::default();
    assert_eq!(config.num_threads, None);
    assert_eq!(config.max_threads_per_block, 1024);
    assert_eq!(config.max_threads_per_multiprocessor, 2048);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_from_lookup_overrides() {
    let config = DeviceConfig::from_lookup(lookup_from(&[
        (ENV_NUM_THREADS, "3"),
        (ENV_MAX_THREADS_PER_BLOCK, " 256 "),
        (ENV_MAX_THREADS_PER_SM, "512"),
    ]))
    .expect("valid overrides rejected");
    assert_eq!(config.num_threads, Some(3));
    assert_eq!(config.max_threads_per_block, 256);
    assert_eq!(config.max_threads_per_multiprocessor, 512);
}

#[test]
fn test_config_from_lookup_without_overrides_is_default() {
    let config = DeviceConfig::from_lookup(|_| None).expect("defaults rejected");
    assert_eq!(config, DeviceConfig::default());
}

#[test]
fn test_config_rejects_malformed_values() {
    match DeviceConfig::from_lookup(lookup_from(&[(ENV_NUM_THREADS, "four")])) {
        Err(DeviceError::InvalidConfig { key, value, .. }) => {
            assert_eq!(key, ENV_NUM_THREADS);
            assert_eq!(value, "four");
        }
        other => panic!("Expected InvalidConfig, got {:?}", other),
    }
    assert!(matches!(
        DeviceConfig::from_lookup(lookup_from(&[(ENV_NUM_THREADS, "0")])),
        Err(DeviceError::InvalidConfig { .. })
    ));
    assert!(matches!(
        DeviceConfig::from_lookup(lookup_from(&[(ENV_MAX_THREADS_PER_SM, "16")])),
        Err(DeviceError::InvalidConfig { .. })
    ));
}

#[test]
fn test_device_properties() {
    let device = test_device(3);
    let props = device.properties();
    assert_eq!(props.id, 7);
    assert_eq!(props.name, "test");
    assert_eq!(props.multiprocessor_count, 3);
    assert_eq!(props.max_threads_per_block, 4);
    assert_eq!(props.max_threads_per_multiprocessor, 8);
}

#[test]
fn test_install_runs_on_device_worker() {
    let device = test_device(2);
    let name = device.install(|| std::thread::current().name().map(str::to_string));
    let name = name.expect("worker thread has no name");
    assert!(name.starts_with("test-7-worker-"), "unexpected worker name {}", name);
}
