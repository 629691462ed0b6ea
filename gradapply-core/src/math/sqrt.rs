// gradapply-core/src/math/sqrt.rs

use num_complex::Complex;
use num_traits::{Float, FloatConst, NumAssign, One, Zero};

use crate::scalar::DeviceScalar;
use crate::types::DType;

/// Component type of a complex element (`f32` or `f64`).
///
/// Carries the literals the hand-written complex routines need, and whether
/// the reciprocal square root must guard against cancellation in `1 ± re/|x|`.
pub trait ComplexPart: DeviceScalar + Float + FloatConst + NumAssign {
    const COMPLEX_DTYPE: DType;
    /// Only single precision loses enough digits in `1 ± re/|x|` to matter.
    const GUARD_CANCELLATION: bool;
    /// `|re/|x||` above which the series replaces the subtraction.
    const CANCELLATION_THRESHOLD: Self;
    const HALF: Self;
    const EIGHTH: Self;
    const SIXTEENTH: Self;
}

impl ComplexPart for f32 {
    const COMPLEX_DTYPE: DType = DType::Complex64;
    const GUARD_CANCELLATION: bool = true;
    const CANCELLATION_THRESHOLD: Self = 0.98;
    const HALF: Self = 0.5;
    const EIGHTH: Self = 0.125;
    const SIXTEENTH: Self = 0.0625;
}

impl ComplexPart for f64 {
    const COMPLEX_DTYPE: DType = DType::Complex128;
    const GUARD_CANCELLATION: bool = false;
    const CANCELLATION_THRESHOLD: Self = 0.98;
    const HALF: Self = 0.5;
    const EIGHTH: Self = 0.125;
    const SIXTEENTH: Self = 0.0625;
}

/// Principal square root of `x = re + i·im`.
///
/// `re(√x) = √(|x| + re)/√2` and `im(√x) = ±√(|x| - re)/√2`, the sign copied
/// from `im` with zero counted as non-negative. No range checks.
#[inline]
pub fn complex_sqrt<F: ComplexPart>(x: Complex<F>) -> Complex<F> {
    let (re, im) = (x.re, x.im);
    let modulus = (re * re + im * im).sqrt();
    let root2 = F::FRAC_1_SQRT_2();
    let real = (modulus + re).sqrt() * root2;
    let imag = (modulus - re).sqrt() * root2;
    if im >= <F as Zero>::zero() {
        Complex::new(real, imag)
    } else {
        Complex::new(real, -imag)
    }
}

/// `1 - √(1 - t)` expanded to third order: `t/2 + t²/8 + t³/16`.
#[inline]
fn one_minus_sqrt_one_minus<F: ComplexPart>(t: F) -> F {
    F::HALF * t + F::EIGHTH * t * t + F::SIXTEENTH * t * t * t
}

/// Reciprocal of the principal square root of `x`.
///
/// With `r = 1/|x|` the parts are `√(r·(1 + re·r))/√2` and
/// `∓√(r·(1 - re·r))/√2`, the second carrying the sign opposite to `im`.
/// When `re·r` is within 2% of `±1` in single precision, the vanishing term
/// `1 ∓ |re·r|` equals `1 - √(1 - im²r²)` and is taken from its series instead.
#[inline]
pub fn complex_rsqrt<F: ComplexPart>(x: Complex<F>) -> Complex<F> {
    let (re, im) = (x.re, x.im);
    let r = <F as One>::one() / (re * re + im * im).sqrt();
    let re_r = re * r;
    let root2 = F::FRAC_1_SQRT_2();

    let plus = if F::GUARD_CANCELLATION && re_r < -F::CANCELLATION_THRESHOLD {
        one_minus_sqrt_one_minus(im * im * r * r)
    } else {
        <F as One>::one() + re_r
    };
    let minus = if F::GUARD_CANCELLATION && re_r > F::CANCELLATION_THRESHOLD {
        one_minus_sqrt_one_minus(im * im * r * r)
    } else {
        <F as One>::one() - re_r
    };

    let real = (r * plus).sqrt() * root2;
    let imag = (r * minus).sqrt() * root2;
    if im >= <F as Zero>::zero() {
        Complex::new(real, -imag)
    } else {
        Complex::new(real, imag)
    }
}
