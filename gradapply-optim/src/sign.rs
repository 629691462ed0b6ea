use gradapply_core::{Backend, RealScalar};
use gradapply_device::{expr, Stream};

use crate::dispatch::impl_real_bulk;

/// `m = m * beta + grad * (1 - beta)`, then `sign(grad) * sign(m)` of the new `m`.
fn update_moment_and_agreement<'a, T: RealScalar>(
    m: &'a mut [T],
    grad: &'a [T],
    beta: T,
) -> impl Fn(usize) -> T + Sync + 'a {
    let one_minus_beta = T::one() - beta;
    expr::assign(m, |i, m| m * beta + grad[i] * one_minus_beta);
    let m = &*m;
    move |i| grad[i].sign() * m[i].sign()
}

/// AddSign: scales the step up when gradient and momentum agree in sign and
/// down when they disagree.
///
/// ```text
/// m        = m * beta + grad * (1 - beta)
/// sign_gm  = sign(grad) * sign(m)
/// var     -= lr * (alpha + sign_decay * sign_gm) * grad
/// ```
///
/// `sign(0)` is 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AddSign<T> {
    pub lr: T,
    pub alpha: T,
    pub sign_decay: T,
    pub beta: T,
}

impl<T: RealScalar> AddSign<T> {
    pub fn bulk<B: Backend>(self, (var, m, grad): (&mut [T], &mut [T], &[T])) {
        let AddSign { lr, alpha, sign_decay, beta } = self;
        let sign_gm = update_moment_and_agreement(m, grad, beta);
        expr::assign(var, |i, v| v - lr * (alpha + sign_decay * sign_gm(i)) * grad[i]);
    }

    pub fn apply<'scope, B: ApplyAddSign<T>>(
        self,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        m: &'scope mut [T],
        grad: &'scope [T],
    ) {
        B::apply_add_sign(self, stream, var, m, grad)
    }
}

/// PowerSign: like [`AddSign`], with a multiplicative scale.
///
/// ```text
/// m        = m * beta + grad * (1 - beta)
/// sign_gm  = sign(grad) * sign(m)
/// var     -= lr * exp(logbase * sign_decay * sign_gm) * grad
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerSign<T> {
    pub lr: T,
    pub logbase: T,
    pub sign_decay: T,
    pub beta: T,
}

impl<T: RealScalar> PowerSign<T> {
    pub fn bulk<B: Backend>(self, (var, m, grad): (&mut [T], &mut [T], &[T])) {
        let PowerSign { lr, logbase, sign_decay, beta } = self;
        let sign_gm = update_moment_and_agreement(m, grad, beta);
        expr::assign(var, |i, v| {
            let grad_scale = (logbase * sign_decay * sign_gm(i)).exp();
            v - lr * grad_scale * grad[i]
        });
    }

    pub fn apply<'scope, B: ApplyPowerSign<T>>(
        self,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        m: &'scope mut [T],
        grad: &'scope [T],
    ) {
        B::apply_power_sign(self, stream, var, m, grad)
    }
}

pub trait ApplyAddSign<T: RealScalar>: Backend {
    fn apply_add_sign<'scope>(
        functor: AddSign<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        m: &'scope mut [T],
        grad: &'scope [T],
    );
}

pub trait ApplyPowerSign<T: RealScalar>: Backend {
    fn apply_power_sign<'scope>(
        functor: PowerSign<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        m: &'scope mut [T],
        grad: &'scope [T],
    );
}

impl_real_bulk!(
    ApplyAddSign,
    apply_add_sign,
    AddSign,
    "AddSign",
    var: &'scope mut [T],
    m: &'scope mut [T],
    grad: &'scope [T]
);

impl_real_bulk!(
    ApplyPowerSign,
    apply_power_sign,
    PowerSign,
    "PowerSign",
    var: &'scope mut [T],
    m: &'scope mut [T],
    grad: &'scope [T]
);
