use gradapply_core::{Backend, RealScalar};
use gradapply_device::{expr, Stream};

use crate::dispatch::impl_real_bulk;

/// Hyperparameters shared by [`Ftrl`] and [`FtrlV2`].
#[derive(Debug, Clone, Copy, PartialEq)]
struct Proximal<T> {
    lr: T,
    l1: T,
    l2: T,
    lr_power: T,
    multiply_linear_by_lr: bool,
}

impl<T: RealScalar> Proximal<T> {
    fn is_sqrt_power(&self) -> bool {
        self.lr_power == T::from_real(-0.5)
    }

    /// `accum^(-lr_power)`, taken as a square root for the common power.
    fn power<B: Backend>(&self, accum: T) -> T {
        if self.is_sqrt_power() {
            B::sqrt(accum)
        } else {
            accum.powf(-self.lr_power)
        }
    }

    /// `linear` after folding in `linear_grad`, given the previous `var` and
    /// `accum`.
    fn updated_linear<B: Backend>(&self, var: T, accum: T, linear: T, grad: T, linear_grad: T) -> T {
        let new_accum = accum + grad * grad;
        let sigma = self.power::<B>(new_accum) - self.power::<B>(accum);
        if self.multiply_linear_by_lr {
            linear + linear_grad * self.lr - sigma * var
        } else {
            linear + linear_grad - sigma / self.lr * var
        }
    }

    /// One step for a single element. Returns the new `(var, accum, linear)`.
    fn step<B: Backend>(&self, var: T, accum: T, linear: T, grad: T, linear_grad: T) -> (T, T, T) {
        let linear = self.updated_linear::<B>(var, accum, linear, grad, linear_grad);
        let new_accum = accum + grad * grad;
        (self.shrink::<B>(linear, new_accum), new_accum, linear)
    }

    fn bulk<B: Backend>(
        &self,
        var: &mut [T],
        accum: &mut [T],
        linear: &mut [T],
        grad: &[T],
        linear_grad: impl Fn(usize, T) -> T + Send + Sync,
    ) {
        // linear reads the previous var and accum; var reads the new linear
        // and accum; accum is overwritten last.
        {
            let (var, accum) = (&*var, &*accum);
            expr::assign(linear, |i, l| {
                self.updated_linear::<B>(var[i], accum[i], l, grad[i], linear_grad(i, var[i]))
            });
        }
        {
            let (accum, linear) = (&*accum, &*linear);
            expr::assign(var, |i, _| {
                let new_accum = accum[i] + grad[i] * grad[i];
                self.shrink::<B>(linear[i], new_accum)
            });
        }
        expr::assign(accum, |i, a| a + grad[i] * grad[i]);
    }

    /// The closed-form minimiser of the proximal objective for a given
    /// (already updated) `linear` and `new_accum`.
    fn shrink<B: Backend>(&self, linear: T, new_accum: T) -> T {
        let two = T::from_real(2.0);
        let (threshold, y) = if self.multiply_linear_by_lr {
            (self.l1 * self.lr, self.power::<B>(new_accum) + two * self.l2 * self.lr)
        } else {
            (self.l1, self.power::<B>(new_accum) / self.lr + two * self.l2)
        };
        if linear.abs() > threshold {
            (threshold * linear.sign() - linear) / y
        } else {
            T::zero()
        }
    }
}

/// FTRL-proximal.
///
/// ```text
/// new_accum = accum + grad²
/// linear   += grad - (new_accum^(-lr_power) - accum^(-lr_power)) / lr * var
/// x         = l1 * sign(linear) - linear
/// y         = new_accum^(-lr_power) / lr + 2 * l2
/// var       = |linear| > l1 ? x / y : 0
/// accum     = new_accum
/// ```
///
/// With `multiply_linear_by_lr` the learning rate multiplies the gradient
/// term instead of dividing the correction: `linear += grad * lr - (…) * var`,
/// `x = l1 * lr * sign(linear) - linear`, `y = new_accum^(-lr_power) + 2 * l2 * lr`
/// and the threshold is `l1 * lr`. `lr_power == -0.5` uses the square root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ftrl<T> {
    pub lr: T,
    pub l1: T,
    pub l2: T,
    pub lr_power: T,
    pub multiply_linear_by_lr: bool,
}

impl<T: RealScalar> Ftrl<T> {
    fn proximal(&self) -> Proximal<T> {
        Proximal {
            lr: self.lr,
            l1: self.l1,
            l2: self.l2,
            lr_power: self.lr_power,
            multiply_linear_by_lr: self.multiply_linear_by_lr,
        }
    }

    pub fn bulk<B: Backend>(self, (var, accum, linear, grad): (&mut [T], &mut [T], &mut [T], &[T])) {
        let proximal = self.proximal();
        proximal.bulk::<B>(var, accum, linear, grad, |i, _| grad[i]);
    }

    /// Single-element reference of [`Ftrl::bulk`].
    pub fn step<B: Backend>(self, var: T, accum: T, linear: T, grad: T) -> (T, T, T) {
        self.proximal().step::<B>(var, accum, linear, grad, grad)
    }

    pub fn apply<'scope, B: ApplyFtrl<T>>(
        self,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        accum: &'scope mut [T],
        linear: &'scope mut [T],
        grad: &'scope [T],
    ) {
        B::apply_ftrl(self, stream, var, accum, linear, grad)
    }
}

/// FTRL-proximal with an L2 shrinkage term folded into the gradient of the
/// linear term: `grad + 2 * l2_shrinkage * var` replaces `grad` there, while
/// the accumulator still grows by `grad²`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FtrlV2<T> {
    pub lr: T,
    pub l1: T,
    pub l2: T,
    pub l2_shrinkage: T,
    pub lr_power: T,
    pub multiply_linear_by_lr: bool,
}

impl<T: RealScalar> FtrlV2<T> {
    fn proximal(&self) -> Proximal<T> {
        Proximal {
            lr: self.lr,
            l1: self.l1,
            l2: self.l2,
            lr_power: self.lr_power,
            multiply_linear_by_lr: self.multiply_linear_by_lr,
        }
    }

    fn shrunk_grad(&self, grad: T, var: T) -> T {
        grad + T::from_real(2.0) * self.l2_shrinkage * var
    }

    pub fn bulk<B: Backend>(self, (var, accum, linear, grad): (&mut [T], &mut [T], &mut [T], &[T])) {
        let proximal = self.proximal();
        proximal.bulk::<B>(var, accum, linear, grad, |i, v| self.shrunk_grad(grad[i], v));
    }

    /// Single-element reference of [`FtrlV2::bulk`].
    pub fn step<B: Backend>(self, var: T, accum: T, linear: T, grad: T) -> (T, T, T) {
        let shrunk = self.shrunk_grad(grad, var);
        self.proximal().step::<B>(var, accum, linear, grad, shrunk)
    }

    pub fn apply<'scope, B: ApplyFtrlV2<T>>(
        self,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        accum: &'scope mut [T],
        linear: &'scope mut [T],
        grad: &'scope [T],
    ) {
        B::apply_ftrl_v2(self, stream, var, accum, linear, grad)
    }
}

pub trait ApplyFtrl<T: RealScalar>: Backend {
    fn apply_ftrl<'scope>(
        functor: Ftrl<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        accum: &'scope mut [T],
        linear: &'scope mut [T],
        grad: &'scope [T],
    );
}

pub trait ApplyFtrlV2<T: RealScalar>: Backend {
    fn apply_ftrl_v2<'scope>(
        functor: FtrlV2<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        accum: &'scope mut [T],
        linear: &'scope mut [T],
        grad: &'scope [T],
    );
}

impl_real_bulk!(
    ApplyFtrl,
    apply_ftrl,
    Ftrl,
    "Ftrl",
    var: &'scope mut [T],
    accum: &'scope mut [T],
    linear: &'scope mut [T],
    grad: &'scope [T]
);

impl_real_bulk!(
    ApplyFtrlV2,
    apply_ftrl_v2,
    FtrlV2,
    "FtrlV2",
    var: &'scope mut [T],
    accum: &'scope mut [T],
    linear: &'scope mut [T],
    grad: &'scope [T]
);
