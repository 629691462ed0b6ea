use gradapply_core::{Backend, Cuda, DeviceScalar, RealScalar, Rocm};
use gradapply_device::{expr, Stream};

use crate::dispatch::{impl_real_bulk, run_bulk};

/// Adam.
/// Reference: https://arxiv.org/abs/1412.6980
///
/// `beta1_power`/`beta2_power` are `beta1^t`/`beta2^t`, maintained by the
/// caller. The bias correction is folded into the step size
/// `lr * sqrt(1 - beta2_power) / (1 - beta1_power)`:
///
/// ```text
/// m   += (1 - beta1) * (grad - m)
/// v   += (1 - beta2) * (grad² - v)
/// var -= step * m / (epsilon + sqrt(v))
/// ```
///
/// With `use_nesterov` the numerator is `m * beta1 + (1 - beta1) * grad`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adam<T> {
    pub beta1_power: T,
    pub beta2_power: T,
    pub lr: T,
    pub beta1: T,
    pub beta2: T,
    pub epsilon: T,
    pub use_nesterov: bool,
}

/// `lr * sqrt(1 - beta2_power) / (1 - beta1_power)`.
fn bias_corrected_step<B: Backend, T: DeviceScalar>(lr: T, beta1_power: T, beta2_power: T) -> T {
    lr * B::sqrt(T::one() - beta2_power) / (T::one() - beta1_power)
}

/// The moment updates shared by Adam and AMSGrad.
fn update_moments<T: DeviceScalar>(m: &mut [T], v: &mut [T], grad: &[T], beta1: T, beta2: T) {
    let one_minus_beta1 = T::one() - beta1;
    let one_minus_beta2 = T::one() - beta2;
    expr::assign(m, |i, m| m + one_minus_beta1 * (grad[i] - m));
    expr::assign(v, |i, v| v + one_minus_beta2 * (grad[i].square() - v));
}

impl<T: DeviceScalar> Adam<T> {
    pub fn bulk<B: Backend>(self, (var, m, v, grad): (&mut [T], &mut [T], &mut [T], &[T])) {
        let Adam { beta1_power, beta2_power, lr, beta1, beta2, epsilon, use_nesterov } = self;
        update_moments(m, v, grad, beta1, beta2);

        let step = bias_corrected_step::<B, T>(lr, beta1_power, beta2_power);
        let (m, v) = (&*m, &*v);
        if use_nesterov {
            let one_minus_beta1 = T::one() - beta1;
            expr::assign(var, |i, x| {
                x - step * (m[i] * beta1 + one_minus_beta1 * grad[i]) / (epsilon + B::sqrt(v[i]))
            });
        } else {
            expr::assign(var, |i, x| x - step * m[i] / (epsilon + B::sqrt(v[i])));
        }
    }

    pub fn apply<'scope, B: ApplyAdam<T>>(
        self,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        m: &'scope mut [T],
        v: &'scope mut [T],
        grad: &'scope [T],
    ) {
        B::apply_adam(self, stream, var, m, v, grad)
    }
}

/// Adam with the AMSGrad correction: the denominator uses the running maximum
/// `vhat = max(vhat, v)` of the second moment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdamWithAmsgrad<T> {
    pub beta1_power: T,
    pub beta2_power: T,
    pub lr: T,
    pub beta1: T,
    pub beta2: T,
    pub epsilon: T,
}

impl<T: RealScalar> AdamWithAmsgrad<T> {
    pub fn bulk<B: Backend>(
        self,
        (var, m, v, vhat, grad): (&mut [T], &mut [T], &mut [T], &mut [T], &[T]),
    ) {
        let AdamWithAmsgrad { beta1_power, beta2_power, lr, beta1, beta2, epsilon } = self;
        update_moments(m, v, grad, beta1, beta2);
        let (m, v) = (&*m, &*v);
        expr::assign(vhat, |i, h| h.max(v[i]));

        let step = bias_corrected_step::<B, T>(lr, beta1_power, beta2_power);
        let vhat = &*vhat;
        expr::assign(var, |i, x| x - step * m[i] / (epsilon + B::sqrt(vhat[i])));
    }

    pub fn apply<'scope, B: ApplyAdamWithAmsgrad<T>>(
        self,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        m: &'scope mut [T],
        v: &'scope mut [T],
        vhat: &'scope mut [T],
        grad: &'scope [T],
    ) {
        B::apply_adam_with_amsgrad(self, stream, var, m, v, vhat, grad)
    }
}

/// AdaMax, the infinity-norm variant of Adam.
///
/// ```text
/// m   += (1 - beta1) * (grad - m)
/// v    = max(beta2 * v, |grad|)
/// var -= lr / (1 - beta1_power) * (m / (v + epsilon))
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaMax<T> {
    pub beta1_power: T,
    pub lr: T,
    pub beta1: T,
    pub beta2: T,
    pub epsilon: T,
}

impl<T: RealScalar> AdaMax<T> {
    pub fn bulk<B: Backend>(self, (var, m, v, grad): (&mut [T], &mut [T], &mut [T], &[T])) {
        let AdaMax { beta1_power, lr, beta1, beta2, epsilon } = self;
        let one_minus_beta1 = T::one() - beta1;
        expr::assign(m, |i, m| m + one_minus_beta1 * (grad[i] - m));
        expr::assign(v, |i, v| (beta2 * v).max(grad[i].abs()));

        let step = lr / (T::one() - beta1_power);
        let (m, v) = (&*m, &*v);
        expr::assign(var, |i, x| x - step * (m[i] / (v[i] + epsilon)));
    }

    pub fn apply<'scope, B: ApplyAdaMax<T>>(
        self,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        m: &'scope mut [T],
        v: &'scope mut [T],
        grad: &'scope [T],
    ) {
        B::apply_ada_max(self, stream, var, m, v, grad)
    }
}

pub trait ApplyAdam<T: DeviceScalar>: Backend {
    fn apply_adam<'scope>(
        functor: Adam<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        m: &'scope mut [T],
        v: &'scope mut [T],
        grad: &'scope [T],
    );
}

pub trait ApplyAdamWithAmsgrad<T: RealScalar>: Backend {
    fn apply_adam_with_amsgrad<'scope>(
        functor: AdamWithAmsgrad<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        m: &'scope mut [T],
        v: &'scope mut [T],
        vhat: &'scope mut [T],
        grad: &'scope [T],
    );
}

pub trait ApplyAdaMax<T: RealScalar>: Backend {
    fn apply_ada_max<'scope>(
        functor: AdaMax<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        m: &'scope mut [T],
        v: &'scope mut [T],
        grad: &'scope [T],
    );
}

impl<T: DeviceScalar> ApplyAdam<T> for Cuda {
    fn apply_adam<'scope>(
        functor: Adam<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        m: &'scope mut [T],
        v: &'scope mut [T],
        grad: &'scope [T],
    ) {
        run_bulk::<Self, T, _, _>("Adam", stream, (var, m, v, grad), move |lanes| {
            functor.bulk::<Self>(lanes)
        });
    }
}

// Complex Adam is not built for this backend.
impl<T: RealScalar> ApplyAdam<T> for Rocm {
    fn apply_adam<'scope>(
        functor: Adam<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        m: &'scope mut [T],
        v: &'scope mut [T],
        grad: &'scope [T],
    ) {
        run_bulk::<Self, T, _, _>("Adam", stream, (var, m, v, grad), move |lanes| {
            functor.bulk::<Self>(lanes)
        });
    }
}

impl_real_bulk!(
    ApplyAdamWithAmsgrad,
    apply_adam_with_amsgrad,
    AdamWithAmsgrad,
    "AdamWithAmsgrad",
    var: &'scope mut [T],
    m: &'scope mut [T],
    v: &'scope mut [T],
    vhat: &'scope mut [T],
    grad: &'scope [T]
);

impl_real_bulk!(
    ApplyAdaMax,
    apply_ada_max,
    AdaMax,
    "AdaMax",
    var: &'scope mut [T],
    m: &'scope mut [T],
    v: &'scope mut [T],
    grad: &'scope [T]
);
