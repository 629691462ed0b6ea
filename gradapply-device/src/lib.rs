//! Execution device for gradapply: a dedicated worker pool standing in for an
//! accelerator, the launch-shape computation, and scoped streams that run
//! explicit kernels and bulk expressions asynchronously.
//!
//! ```
//! use gradapply_device::{expr, Device, DeviceConfig};
//!
//! let device = Device::new(0, &DeviceConfig::default()).unwrap();
//! let mut data = vec![1.0f32, 2.0, 3.0];
//! device.scope(|stream| {
//!     let data = &mut data[..];
//!     stream.enqueue(move || expr::assign(data, |_, x| x * 2.0));
//! });
//! assert_eq!(data, [2.0, 4.0, 6.0]);
//! ```

pub mod context;
pub mod error;
pub mod expr;
pub mod lanes;
pub mod launch;
pub mod stream;

pub use context::{initialize_device_with_logging, Device, DeviceConfig, DeviceProperties};
pub use error::DeviceError;
pub use lanes::Lanes;
pub use launch::{launch_config, LaunchConfig};
pub use stream::{Stream, StreamStats};

#[cfg(test)]
mod tests;
