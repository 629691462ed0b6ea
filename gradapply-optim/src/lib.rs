//! In-place optimizer updates over flat device arrays.
//!
//! Each algorithm is a `Copy` struct of its scalar hyperparameters with a
//! `bulk` body (a sequence of whole-buffer expressions) and, for the
//! algorithms that need one, an explicit per-index `kernel` body. Every
//! element `i` reads and writes only index `i` of each array.
//!
//! Running an algorithm goes through its selection trait (`ApplyAdam<T>`, …),
//! implemented on the backend markers [`Cuda`] and [`Rocm`]. The
//! implementation fixes the execution path, and a missing (algorithm, type,
//! backend) combination does not compile:
//!
//! ```compile_fail
//! use gradapply_core::num_complex::Complex;
//! use gradapply_device::{Device, DeviceConfig};
//! use gradapply_optim::{Adam, Rocm};
//!
//! let device = Device::new(0, &DeviceConfig::default()).unwrap();
//! let mut var = vec![Complex::new(0.0f32, 0.0)];
//! let (mut m, mut v) = (var.clone(), var.clone());
//! let grad = vec![Complex::new(1.0f32, 0.0)];
//! let one = Complex::new(1.0f32, 0.0);
//! let adam = Adam { beta1_power: one, beta2_power: one, lr: one, beta1: one, beta2: one, epsilon: one, use_nesterov: false };
//! device.scope(|stream| adam.apply::<Rocm>(stream, &mut var, &mut m, &mut v, &grad));
//! ```
//!
//! Typical use, on the build's default backend:
//!
//! ```
//! use gradapply_device::initialize_device_with_logging;
//! use gradapply_optim::{DefaultBackend, GradientDescent};
//!
//! let device = initialize_device_with_logging().unwrap();
//! let mut var = vec![1.0f32, 2.0];
//! let grad = vec![1.0f32, 1.0];
//! device.scope(|stream| {
//!     GradientDescent { lr: 0.5f32 }.apply::<DefaultBackend>(stream, &mut var, &grad);
//! });
//! assert_eq!(var, [0.5, 1.5]);
//! ```

pub mod adadelta;
pub mod adagrad;
pub mod adam;
pub mod dispatch;
pub mod ftrl;
pub mod gradient_descent;
pub mod momentum;
pub mod rmsprop;
pub mod sign;

pub use adadelta::{Adadelta, ApplyAdadelta};
pub use adagrad::{Adagrad, AdagradV2, ApplyAdagrad, ApplyAdagradV2};
pub use adam::{AdaMax, Adam, AdamWithAmsgrad, ApplyAdaMax, ApplyAdam, ApplyAdamWithAmsgrad};
pub use dispatch::Path;
pub use ftrl::{ApplyFtrl, ApplyFtrlV2, Ftrl, FtrlV2};
pub use gradient_descent::{ApplyGradientDescent, GradientDescent};
pub use momentum::{ApplyKerasMomentum, ApplyMomentum, KerasMomentum, Momentum};
pub use rmsprop::{ApplyCenteredRmsProp, ApplyRmsProp, CenteredRmsProp, RmsProp};
pub use sign::{AddSign, ApplyAddSign, ApplyPowerSign, PowerSign};

pub use gradapply_core::{Backend, Cuda, DefaultBackend, Rocm};

#[cfg(test)]
mod test_utils;

#[cfg(test)]
mod adagrad_test;
#[cfg(test)]
mod momentum_test;
