use std::fmt::Debug;

use crate::scalar::DeviceScalar;

/// Identifies a backend at run time (logging, diagnostics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackendKind {
    /// Vendor math library available for every scalar type.
    /// This is the default backend.
    #[default]
    Cuda,
    /// Toolchain whose complex and half-precision root intrinsics cannot be
    /// used; roots are computed by hand and several updates run as explicit
    /// per-index kernels.
    Rocm,
}

/// Compile-time selection of the math primitives an update is built with.
///
/// Every update functor is generic over a `Backend`; the square roots it
/// takes go through [`Backend::sqrt`] and [`Backend::rsqrt`], so the choice
/// between the native and the hand-written routine is made when the functor is
/// instantiated. There is no run-time switch.
pub trait Backend: Copy + Debug + Default + Send + Sync + 'static {
    const KIND: BackendKind;

    fn sqrt<T: DeviceScalar>(x: T) -> T;

    /// `1 / sqrt(x)`.
    fn rsqrt<T: DeviceScalar>(x: T) -> T;
}

/// Backend using the native square root of every scalar type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cuda;

/// Backend using the hand-written square roots (see [`crate::math::sqrt`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rocm;

impl Backend for Cuda {
    const KIND: BackendKind = BackendKind::Cuda;

    #[inline]
    fn sqrt<T: DeviceScalar>(x: T) -> T {
        x.native_sqrt()
    }

    #[inline]
    fn rsqrt<T: DeviceScalar>(x: T) -> T {
        x.native_rsqrt()
    }
}

impl Backend for Rocm {
    const KIND: BackendKind = BackendKind::Rocm;

    #[inline]
    fn sqrt<T: DeviceScalar>(x: T) -> T {
        x.portable_sqrt()
    }

    #[inline]
    fn rsqrt<T: DeviceScalar>(x: T) -> T {
        x.portable_rsqrt()
    }
}

/// Backend picked by the build configuration (`rocm` feature).
#[cfg(not(feature = "rocm"))]
pub type DefaultBackend = Cuda;

#[cfg(feature = "rocm")]
pub type DefaultBackend = Rocm;
