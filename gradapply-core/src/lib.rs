//! Scalar types, backend selection and numerically robust primitives for
//! in-place optimizer updates.
//!
//! This crate is the leaf of the workspace: it knows nothing about arrays,
//! devices or launches. It defines what an element type must provide
//! ([`DeviceScalar`], [`RealScalar`]), how square roots are taken for each
//! type ([`math`]), and which flavour of those roots a backend uses
//! ([`Backend`]).

pub mod backend;
pub mod math;
pub mod scalar;
pub mod types;
pub mod utils;

pub use backend::{Backend, BackendKind, Cuda, DefaultBackend, Rocm};
pub use scalar::{DeviceScalar, RealScalar};
pub use types::DType;

// Re-export the scalar crates so downstream code names the same types.
pub use half;
pub use num_complex;
pub use num_traits;
