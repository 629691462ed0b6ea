use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use half::f16;
use num_complex::Complex;
use num_traits::{Float, One, Zero};

use crate::math::sqrt::{complex_rsqrt, complex_sqrt, ComplexPart};
use crate::types::DType;

/// A trait representing the element types an update functor can run with.
///
/// It is implemented for `f16`, `f32`, `f64`, `Complex<f32>` and
/// `Complex<f64>`. Besides the arithmetic every functor needs, it carries
/// two flavours of square root:
///
/// * `native_*`: the math library's own routine for the type.
/// * `portable_*`: a hand-written equivalent that never relies on a complex
///   or reduced-precision intrinsic. Real single/double precision simply
///   reuse the native call; `f16` widens to `f32` around it; complex types
///   use the algebraic forms in [`crate::math::sqrt`].
///
/// Which flavour a functor sees is decided by the [`crate::backend::Backend`]
/// it is instantiated with, never at run time.
pub trait DeviceScalar:
    Copy
    + Debug
    + PartialEq
    + Send
    + Sync
    + 'static
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
{
    const DTYPE: DType;

    /// Converts a real literal into the type (imaginary part zero).
    fn from_real(value: f64) -> Self;

    /// Widens the value to a double precision complex number.
    fn to_complex64(self) -> Complex<f64>;

    fn native_sqrt(self) -> Self;
    fn native_rsqrt(self) -> Self;
    fn portable_sqrt(self) -> Self;
    fn portable_rsqrt(self) -> Self;

    #[inline]
    fn square(self) -> Self {
        self * self
    }
}

/// Real element types: everything that has an ordering, `abs`, `exp` and `powf`.
///
/// The algorithms that need `max`, `|x|` or `sign` (AdaMax, AMSGrad, the
/// sign-based updates, FTRL) are bounded on this trait, so asking for them
/// with a complex type is a compile error.
pub trait RealScalar: DeviceScalar + Float {
    /// `+1` for positive, `-1` for negative, `0` for zero and NaN.
    #[inline]
    fn sign(self) -> Self {
        if self > <Self as Zero>::zero() {
            <Self as One>::one()
        } else if self < <Self as Zero>::zero() {
            -<Self as One>::one()
        } else {
            <Self as Zero>::zero()
        }
    }
}

impl DeviceScalar for f32 {
    const DTYPE: DType = DType::F32;

    #[inline]
    fn from_real(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn to_complex64(self) -> Complex<f64> {
        Complex::new(self as f64, 0.0)
    }

    #[inline]
    fn native_sqrt(self) -> Self {
        self.sqrt()
    }

    #[inline]
    fn native_rsqrt(self) -> Self {
        1.0 / self.sqrt()
    }

    #[inline]
    fn portable_sqrt(self) -> Self {
        self.sqrt()
    }

    #[inline]
    fn portable_rsqrt(self) -> Self {
        1.0 / self.sqrt()
    }
}

impl DeviceScalar for f64 {
    const DTYPE: DType = DType::F64;

    #[inline]
    fn from_real(value: f64) -> Self {
        value
    }

    #[inline]
    fn to_complex64(self) -> Complex<f64> {
        Complex::new(self, 0.0)
    }

    #[inline]
    fn native_sqrt(self) -> Self {
        self.sqrt()
    }

    #[inline]
    fn native_rsqrt(self) -> Self {
        1.0 / self.sqrt()
    }

    #[inline]
    fn portable_sqrt(self) -> Self {
        self.sqrt()
    }

    #[inline]
    fn portable_rsqrt(self) -> Self {
        1.0 / self.sqrt()
    }
}

impl DeviceScalar for f16 {
    const DTYPE: DType = DType::F16;

    #[inline]
    fn from_real(value: f64) -> Self {
        f16::from_f64(value)
    }

    #[inline]
    fn to_complex64(self) -> Complex<f64> {
        Complex::new(self.to_f64(), 0.0)
    }

    #[inline]
    fn native_sqrt(self) -> Self {
        Float::sqrt(self)
    }

    // Two roundings to f16: one after the root, one after the reciprocal.
    #[inline]
    fn native_rsqrt(self) -> Self {
        Float::recip(Float::sqrt(self))
    }

    #[inline]
    fn portable_sqrt(self) -> Self {
        f16::from_f32(self.to_f32().sqrt())
    }

    #[inline]
    fn portable_rsqrt(self) -> Self {
        f16::from_f32(1.0 / self.to_f32().sqrt())
    }
}

impl<F: ComplexPart> DeviceScalar for Complex<F> {
    const DTYPE: DType = F::COMPLEX_DTYPE;

    #[inline]
    fn from_real(value: f64) -> Self {
        Complex::new(F::from_real(value), <F as Zero>::zero())
    }

    #[inline]
    fn to_complex64(self) -> Complex<f64> {
        Complex::new(self.re.to_complex64().re, self.im.to_complex64().re)
    }

    #[inline]
    fn native_sqrt(self) -> Self {
        self.sqrt()
    }

    #[inline]
    fn native_rsqrt(self) -> Self {
        self.sqrt().inv()
    }

    #[inline]
    fn portable_sqrt(self) -> Self {
        complex_sqrt(self)
    }

    #[inline]
    fn portable_rsqrt(self) -> Self {
        complex_rsqrt(self)
    }
}

impl RealScalar for f16 {}
impl RealScalar for f32 {}
impl RealScalar for f64 {}
