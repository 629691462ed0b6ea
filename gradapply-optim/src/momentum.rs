use gradapply_core::{Backend, Cuda, DeviceScalar, RealScalar, Rocm};
use gradapply_device::{expr, Stream};

use crate::dispatch::run_bulk;

/// Heavy-ball momentum.
///
/// `accum = accum * momentum + grad`; then `var -= lr * accum`, or with
/// Nesterov `var -= grad * lr + accum * momentum * lr`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Momentum<T> {
    pub lr: T,
    pub momentum: T,
    pub use_nesterov: bool,
}

impl<T: DeviceScalar> Momentum<T> {
    pub fn bulk<B: Backend>(self, (var, accum, grad): (&mut [T], &mut [T], &[T])) {
        let Momentum { lr, momentum, use_nesterov } = self;
        expr::assign(accum, |i, a| a * momentum + grad[i]);
        let accum = &*accum;
        if use_nesterov {
            expr::assign(var, |i, v| v - (grad[i] * lr + accum[i] * momentum * lr));
        } else {
            expr::assign(var, |i, v| v - lr * accum[i]);
        }
    }

    pub fn apply<'scope, B: ApplyMomentum<T>>(
        self,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        accum: &'scope mut [T],
        grad: &'scope [T],
    ) {
        B::apply_momentum(self, stream, var, accum, grad)
    }
}

/// Momentum in the Keras formulation, where the learning rate is folded into
/// the accumulator.
///
/// `accum = accum * momentum - grad * lr`; then `var += accum`, or with
/// Nesterov `var += accum * momentum - grad * lr`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KerasMomentum<T> {
    pub lr: T,
    pub momentum: T,
    pub use_nesterov: bool,
}

impl<T: DeviceScalar> KerasMomentum<T> {
    pub fn bulk<B: Backend>(self, (var, accum, grad): (&mut [T], &mut [T], &[T])) {
        let KerasMomentum { lr, momentum, use_nesterov } = self;
        expr::assign(accum, |i, a| a * momentum - grad[i] * lr);
        let accum = &*accum;
        if use_nesterov {
            expr::assign(var, |i, v| v + (accum[i] * momentum - grad[i] * lr));
        } else {
            expr::assign(var, |i, v| v + accum[i]);
        }
    }

    pub fn apply<'scope, B: ApplyKerasMomentum<T>>(
        self,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        accum: &'scope mut [T],
        grad: &'scope [T],
    ) {
        B::apply_keras_momentum(self, stream, var, accum, grad)
    }
}

pub trait ApplyMomentum<T: DeviceScalar>: Backend {
    fn apply_momentum<'scope>(
        functor: Momentum<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        accum: &'scope mut [T],
        grad: &'scope [T],
    );
}

pub trait ApplyKerasMomentum<T: DeviceScalar>: Backend {
    fn apply_keras_momentum<'scope>(
        functor: KerasMomentum<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        accum: &'scope mut [T],
        grad: &'scope [T],
    );
}

impl<T: DeviceScalar> ApplyMomentum<T> for Cuda {
    fn apply_momentum<'scope>(
        functor: Momentum<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        accum: &'scope mut [T],
        grad: &'scope [T],
    ) {
        run_bulk::<Self, T, _, _>("Momentum", stream, (var, accum, grad), move |lanes| {
            functor.bulk::<Self>(lanes)
        });
    }
}

// Complex momentum is not built for this backend.
impl<T: RealScalar> ApplyMomentum<T> for Rocm {
    fn apply_momentum<'scope>(
        functor: Momentum<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        accum: &'scope mut [T],
        grad: &'scope [T],
    ) {
        run_bulk::<Self, T, _, _>("Momentum", stream, (var, accum, grad), move |lanes| {
            functor.bulk::<Self>(lanes)
        });
    }
}

impl<T: DeviceScalar> ApplyKerasMomentum<T> for Cuda {
    fn apply_keras_momentum<'scope>(
        functor: KerasMomentum<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        accum: &'scope mut [T],
        grad: &'scope [T],
    ) {
        run_bulk::<Self, T, _, _>("KerasMomentum", stream, (var, accum, grad), move |lanes| {
            functor.bulk::<Self>(lanes)
        });
    }
}

impl<T: RealScalar> ApplyKerasMomentum<T> for Rocm {
    fn apply_keras_momentum<'scope>(
        functor: KerasMomentum<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        accum: &'scope mut [T],
        grad: &'scope [T],
    ) {
        run_bulk::<Self, T, _, _>("KerasMomentum", stream, (var, accum, grad), move |lanes| {
            functor.bulk::<Self>(lanes)
        });
    }
}
