use gradapply_device::{expr, initialize_device_with_logging, launch_config, Device, DeviceConfig, DeviceError};

#[test]
fn test_default_device_is_shared() {
    let first = initialize_device_with_logging().expect("default device");
    let second = initialize_device_with_logging().expect("default device");
    assert!(std::ptr::eq(first, second));
    assert_eq!(first.id(), 0);
    assert!(first.properties().multiprocessor_count >= 1);
}

#[test]
fn test_kernel_then_bulk_across_scopes() {
    let config = DeviceConfig {
        name: "scoped".to_string(),
        num_threads: Some(2),
        max_threads_per_block: 16,
        max_threads_per_multiprocessor: 32,
    };
    let device = Device::new(3, &config).expect("device");
    let n = 333;
    let mut a = vec![0u64; n];
    let mut b = vec![0u64; n];

    device.scope(|stream| {
        let cfg = launch_config(n, stream.device());
        assert_eq!(cfg.block_count, 2);
        stream.launch(cfg, &mut a[..], |group: &mut [u64]| {
            for x in group.iter_mut() {
                *x += 1;
            }
        });
    });
    device.scope(|stream| {
        let (a, b) = (&a[..], &mut b[..]);
        stream.enqueue(move || expr::fill_with(b, |i| a[i] + i as u64));
    });
    assert!(a.iter().all(|x| *x == 1));
    assert_eq!(b[0], 1);
    assert_eq!(b[n - 1], n as u64);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = DeviceConfig { num_threads: Some(0), ..DeviceConfig::default() };
    match Device::new(9, &config) {
        Err(DeviceError::InvalidConfig { key, .. }) => assert_eq!(key, "num_threads"),
        other => panic!("expected InvalidConfig, got {:?}", other.map(|d| d.id())),
    }
}
