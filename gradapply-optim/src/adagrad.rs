use gradapply_core::{Backend, Cuda, DeviceScalar, Rocm};
use gradapply_device::{expr, Stream};

use crate::dispatch::{run_bulk, run_kernel};

/// Adagrad.
///
/// If `update_slots`: `accum += grad²`; then `var -= lr * grad * rsqrt(accum)`.
///
/// There is no epsilon: an accumulator at exactly zero divides by zero. Use
/// [`AdagradV2`] when that matters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adagrad<T> {
    pub lr: T,
    pub update_slots: bool,
}

impl<T: DeviceScalar> Adagrad<T> {
    pub fn bulk<B: Backend>(self, (var, accum, grad): (&mut [T], &mut [T], &[T])) {
        let lr = self.lr;
        if self.update_slots {
            expr::assign(accum, |i, a| a + grad[i].square());
        }
        let accum = &*accum;
        expr::assign(var, |i, v| v - lr * grad[i] * B::rsqrt(accum[i]));
    }

    pub fn kernel<B: Backend>(self, (var, accum, grad): (&mut [T], &mut [T], &[T])) {
        for i in 0..var.len() {
            if self.update_slots {
                accum[i] += grad[i] * grad[i];
            }
            var[i] -= self.lr * grad[i] * B::rsqrt(accum[i]);
        }
    }

    pub fn apply<'scope, B: ApplyAdagrad<T>>(
        self,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        accum: &'scope mut [T],
        grad: &'scope [T],
    ) {
        B::apply_adagrad(self, stream, var, accum, grad)
    }
}

/// Adagrad with an epsilon outside the root.
///
/// If `update_slots`: `accum += grad²`; then `var -= lr * grad / (sqrt(accum) + epsilon)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdagradV2<T> {
    pub lr: T,
    pub epsilon: T,
    pub update_slots: bool,
}

impl<T: DeviceScalar> AdagradV2<T> {
    pub fn bulk<B: Backend>(self, (var, accum, grad): (&mut [T], &mut [T], &[T])) {
        let (lr, epsilon) = (self.lr, self.epsilon);
        if self.update_slots {
            expr::assign(accum, |i, a| a + grad[i].square());
        }
        let accum = &*accum;
        expr::assign(var, |i, v| v - lr * (grad[i] / (B::sqrt(accum[i]) + epsilon)));
    }

    pub fn kernel<B: Backend>(self, (var, accum, grad): (&mut [T], &mut [T], &[T])) {
        for i in 0..var.len() {
            if self.update_slots {
                accum[i] += grad[i] * grad[i];
            }
            let update = grad[i] / (B::sqrt(accum[i]) + self.epsilon);
            var[i] -= self.lr * update;
        }
    }

    pub fn apply<'scope, B: ApplyAdagradV2<T>>(
        self,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        accum: &'scope mut [T],
        grad: &'scope [T],
    ) {
        B::apply_adagrad_v2(self, stream, var, accum, grad)
    }
}

pub trait ApplyAdagrad<T: DeviceScalar>: Backend {
    fn apply_adagrad<'scope>(
        functor: Adagrad<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        accum: &'scope mut [T],
        grad: &'scope [T],
    );
}

pub trait ApplyAdagradV2<T: DeviceScalar>: Backend {
    fn apply_adagrad_v2<'scope>(
        functor: AdagradV2<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        accum: &'scope mut [T],
        grad: &'scope [T],
    );
}

impl<T: DeviceScalar> ApplyAdagrad<T> for Cuda {
    fn apply_adagrad<'scope>(
        functor: Adagrad<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        accum: &'scope mut [T],
        grad: &'scope [T],
    ) {
        run_bulk::<Self, T, _, _>("Adagrad", stream, (var, accum, grad), move |lanes| {
            functor.bulk::<Self>(lanes)
        });
    }
}

impl<T: DeviceScalar> ApplyAdagrad<T> for Rocm {
    fn apply_adagrad<'scope>(
        functor: Adagrad<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        accum: &'scope mut [T],
        grad: &'scope [T],
    ) {
        run_kernel::<Self, T, _, _>("Adagrad", stream, (var, accum, grad), move |lanes| {
            functor.kernel::<Self>(lanes)
        });
    }
}

impl<T: DeviceScalar> ApplyAdagradV2<T> for Cuda {
    fn apply_adagrad_v2<'scope>(
        functor: AdagradV2<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        accum: &'scope mut [T],
        grad: &'scope [T],
    ) {
        run_bulk::<Self, T, _, _>("AdagradV2", stream, (var, accum, grad), move |lanes| {
            functor.bulk::<Self>(lanes)
        });
    }
}

impl<T: DeviceScalar> ApplyAdagradV2<T> for Rocm {
    fn apply_adagrad_v2<'scope>(
        functor: AdagradV2<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        accum: &'scope mut [T],
        grad: &'scope [T],
    ) {
        run_kernel::<Self, T, _, _>("AdagradV2", stream, (var, accum, grad), move |lanes| {
            functor.kernel::<Self>(lanes)
        });
    }
}
