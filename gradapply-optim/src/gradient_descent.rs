use gradapply_core::{Backend, Cuda, DeviceScalar, Rocm};
use gradapply_device::{expr, Stream};

use crate::dispatch::run_bulk;

/// Plain gradient descent: `var -= lr * grad`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientDescent<T> {
    pub lr: T,
}

impl<T: DeviceScalar> GradientDescent<T> {
    pub fn bulk<B: Backend>(self, (var, grad): (&mut [T], &[T])) {
        let lr = self.lr;
        expr::assign(var, |i, v| v - lr * grad[i]);
    }

    /// Submits the update to `stream` on backend `B`.
    pub fn apply<'scope, B: ApplyGradientDescent<T>>(
        self,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        grad: &'scope [T],
    ) {
        B::apply_gradient_descent(self, stream, var, grad)
    }
}

/// Backends providing [`GradientDescent`] for `T`.
pub trait ApplyGradientDescent<T: DeviceScalar>: Backend {
    fn apply_gradient_descent<'scope>(
        functor: GradientDescent<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        grad: &'scope [T],
    );
}

impl<T: DeviceScalar> ApplyGradientDescent<T> for Cuda {
    fn apply_gradient_descent<'scope>(
        functor: GradientDescent<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        grad: &'scope [T],
    ) {
        run_bulk::<Self, T, _, _>("GradientDescent", stream, (var, grad), move |lanes| {
            functor.bulk::<Self>(lanes)
        });
    }
}

impl<T: DeviceScalar> ApplyGradientDescent<T> for Rocm {
    fn apply_gradient_descent<'scope>(
        functor: GradientDescent<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        grad: &'scope [T],
    ) {
        run_bulk::<Self, T, _, _>("GradientDescent", stream, (var, grad), move |lanes| {
            functor.bulk::<Self>(lanes)
        });
    }
}
