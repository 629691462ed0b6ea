use gradapply_core::{Backend, Cuda, DeviceScalar, Rocm};
use gradapply_device::{expr, Stream};

use crate::dispatch::{run_bulk, run_kernel};

/// RMSProp with momentum.
///
/// ```text
/// ms  += (1 - rho) * (grad² - ms)
/// mom  = mom * momentum + lr * grad / sqrt(epsilon + ms)
/// var -= mom
/// ```
///
/// Epsilon sits inside the root. The kernel body multiplies by
/// `rsqrt(epsilon + ms)` instead of dividing by the root, so the two bodies
/// agree up to rounding, not bit for bit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RmsProp<T> {
    pub lr: T,
    pub rho: T,
    pub momentum: T,
    pub epsilon: T,
}

impl<T: DeviceScalar> RmsProp<T> {
    pub fn bulk<B: Backend>(self, (var, ms, mom, grad): (&mut [T], &mut [T], &mut [T], &[T])) {
        let RmsProp { lr, rho, momentum, epsilon } = self;
        let one_minus_rho = T::one() - rho;
        expr::assign(ms, |i, s| s + one_minus_rho * (grad[i].square() - s));
        let ms = &*ms;
        expr::assign(mom, |i, p| p * momentum + lr * grad[i] / B::sqrt(epsilon + ms[i]));
        let mom = &*mom;
        expr::assign(var, |i, v| v - mom[i]);
    }

    pub fn kernel<B: Backend>(self, (var, ms, mom, grad): (&mut [T], &mut [T], &mut [T], &[T])) {
        let RmsProp { lr, rho, momentum, epsilon } = self;
        for i in 0..var.len() {
            ms[i] += (T::one() - rho) * (grad[i] * grad[i] - ms[i]);
            mom[i] = mom[i] * momentum + lr * grad[i] * B::rsqrt(epsilon + ms[i]);
            var[i] -= mom[i];
        }
    }

    pub fn apply<'scope, B: ApplyRmsProp<T>>(
        self,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        ms: &'scope mut [T],
        mom: &'scope mut [T],
        grad: &'scope [T],
    ) {
        B::apply_rms_prop(self, stream, var, ms, mom, grad)
    }
}

/// Centered RMSProp: normalizes by an estimate of the gradient variance
/// instead of its raw second moment.
///
/// ```text
/// ms    += (1 - rho) * (grad² - ms)
/// mg    += (1 - rho) * (grad - mg)
/// denom  = (ms - mg²) + epsilon
/// mom    = mom * momentum + lr * grad / sqrt(denom)
/// var   -= mom
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenteredRmsProp<T> {
    pub lr: T,
    pub rho: T,
    pub momentum: T,
    pub epsilon: T,
}

impl<T: DeviceScalar> CenteredRmsProp<T> {
    pub fn bulk<B: Backend>(
        self,
        (var, mg, ms, mom, grad): (&mut [T], &mut [T], &mut [T], &mut [T], &[T]),
    ) {
        let CenteredRmsProp { lr, rho, momentum, epsilon } = self;
        let one_minus_rho = T::one() - rho;
        expr::assign(ms, |i, s| s + one_minus_rho * (grad[i].square() - s));
        expr::assign(mg, |i, g| g + one_minus_rho * (grad[i] - g));
        let (mg, ms) = (&*mg, &*ms);
        expr::assign(mom, |i, p| {
            let denom = (ms[i] - mg[i].square()) + epsilon;
            p * momentum + lr * grad[i] / B::sqrt(denom)
        });
        let mom = &*mom;
        expr::assign(var, |i, v| v - mom[i]);
    }

    pub fn kernel<B: Backend>(
        self,
        (var, mg, ms, mom, grad): (&mut [T], &mut [T], &mut [T], &mut [T], &[T]),
    ) {
        let CenteredRmsProp { lr, rho, momentum, epsilon } = self;
        let one_minus_rho = T::one() - rho;
        for i in 0..var.len() {
            ms[i] += one_minus_rho * (grad[i] * grad[i] - ms[i]);
            mg[i] += one_minus_rho * (grad[i] - mg[i]);
            let denom = (ms[i] - mg[i] * mg[i]) + epsilon;
            mom[i] = mom[i] * momentum + lr * grad[i] * B::rsqrt(denom);
            var[i] -= mom[i];
        }
    }

    pub fn apply<'scope, B: ApplyCenteredRmsProp<T>>(
        self,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        mg: &'scope mut [T],
        ms: &'scope mut [T],
        mom: &'scope mut [T],
        grad: &'scope [T],
    ) {
        B::apply_centered_rms_prop(self, stream, var, mg, ms, mom, grad)
    }
}

pub trait ApplyRmsProp<T: DeviceScalar>: Backend {
    fn apply_rms_prop<'scope>(
        functor: RmsProp<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        ms: &'scope mut [T],
        mom: &'scope mut [T],
        grad: &'scope [T],
    );
}

pub trait ApplyCenteredRmsProp<T: DeviceScalar>: Backend {
    fn apply_centered_rms_prop<'scope>(
        functor: CenteredRmsProp<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        mg: &'scope mut [T],
        ms: &'scope mut [T],
        mom: &'scope mut [T],
        grad: &'scope [T],
    );
}

impl<T: DeviceScalar> ApplyRmsProp<T> for Cuda {
    fn apply_rms_prop<'scope>(
        functor: RmsProp<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        ms: &'scope mut [T],
        mom: &'scope mut [T],
        grad: &'scope [T],
    ) {
        run_bulk::<Self, T, _, _>("RMSProp", stream, (var, ms, mom, grad), move |lanes| {
            functor.bulk::<Self>(lanes)
        });
    }
}

impl<T: DeviceScalar> ApplyRmsProp<T> for Rocm {
    fn apply_rms_prop<'scope>(
        functor: RmsProp<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        ms: &'scope mut [T],
        mom: &'scope mut [T],
        grad: &'scope [T],
    ) {
        run_kernel::<Self, T, _, _>("RMSProp", stream, (var, ms, mom, grad), move |lanes| {
            functor.kernel::<Self>(lanes)
        });
    }
}

impl<T: DeviceScalar> ApplyCenteredRmsProp<T> for Cuda {
    fn apply_centered_rms_prop<'scope>(
        functor: CenteredRmsProp<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        mg: &'scope mut [T],
        ms: &'scope mut [T],
        mom: &'scope mut [T],
        grad: &'scope [T],
    ) {
        let lanes = (var, mg, ms, mom, grad);
        run_bulk::<Self, T, _, _>("CenteredRMSProp", stream, lanes, move |lanes| {
            functor.bulk::<Self>(lanes)
        });
    }
}

impl<T: DeviceScalar> ApplyCenteredRmsProp<T> for Rocm {
    fn apply_centered_rms_prop<'scope>(
        functor: CenteredRmsProp<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        mg: &'scope mut [T],
        ms: &'scope mut [T],
        mom: &'scope mut [T],
        grad: &'scope [T],
    ) {
        let lanes = (var, mg, ms, mom, grad);
        run_kernel::<Self, T, _, _>("CenteredRMSProp", stream, lanes, move |lanes| {
            functor.kernel::<Self>(lanes)
        });
    }
}
