use gradapply_core::{Backend, Cuda, DeviceScalar, Rocm};
use gradapply_device::{expr, Stream};

use crate::dispatch::{run_bulk, run_kernel};

/// Adadelta.
///
/// ```text
/// accum        = accum * rho + grad² * (1 - rho)
/// update       = sqrt(accum_update + epsilon) * grad * rsqrt(accum + epsilon)
/// var         -= update * lr
/// accum_update = accum_update * rho + update² * (1 - rho)
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adadelta<T> {
    pub lr: T,
    pub rho: T,
    pub epsilon: T,
}

impl<T: DeviceScalar> Adadelta<T> {
    pub fn bulk<B: Backend>(
        self,
        (var, accum, accum_update, grad): (&mut [T], &mut [T], &mut [T], &[T]),
    ) {
        let Adadelta { lr, rho, epsilon } = self;
        let one_minus_rho = T::one() - rho;
        expr::assign(accum, |i, a| a * rho + grad[i].square() * one_minus_rho);

        let accum = &*accum;
        // `update` reads the previous accum_update, so var goes first.
        let update = |i: usize, au: T| B::sqrt(au + epsilon) * B::rsqrt(accum[i] + epsilon) * grad[i];
        {
            let accum_update = &*accum_update;
            expr::assign(var, |i, v| v - update(i, accum_update[i]) * lr);
        }
        expr::assign(accum_update, |i, au| au * rho + update(i, au).square() * one_minus_rho);
    }

    pub fn kernel<B: Backend>(
        self,
        (var, accum, accum_update, grad): (&mut [T], &mut [T], &mut [T], &[T]),
    ) {
        let Adadelta { lr, rho, epsilon } = self;
        for i in 0..var.len() {
            accum[i] = accum[i] * rho + grad[i] * grad[i] * (T::one() - rho);
            let update = B::sqrt(accum_update[i] + epsilon) * grad[i] * B::rsqrt(accum[i] + epsilon);
            var[i] -= update * lr;
            accum_update[i] = accum_update[i] * rho + update * update * (T::one() - rho);
        }
    }

    pub fn apply<'scope, B: ApplyAdadelta<T>>(
        self,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        accum: &'scope mut [T],
        accum_update: &'scope mut [T],
        grad: &'scope [T],
    ) {
        B::apply_adadelta(self, stream, var, accum, accum_update, grad)
    }
}

pub trait ApplyAdadelta<T: DeviceScalar>: Backend {
    fn apply_adadelta<'scope>(
        functor: Adadelta<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        accum: &'scope mut [T],
        accum_update: &'scope mut [T],
        grad: &'scope [T],
    );
}

impl<T: DeviceScalar> ApplyAdadelta<T> for Cuda {
    fn apply_adadelta<'scope>(
        functor: Adadelta<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        accum: &'scope mut [T],
        accum_update: &'scope mut [T],
        grad: &'scope [T],
    ) {
        let lanes = (var, accum, accum_update, grad);
        run_bulk::<Self, T, _, _>("Adadelta", stream, lanes, move |lanes| functor.bulk::<Self>(lanes));
    }
}

impl<T: DeviceScalar> ApplyAdadelta<T> for Rocm {
    fn apply_adadelta<'scope>(
        functor: Adadelta<T>,
        stream: &Stream<'_, 'scope>,
        var: &'scope mut [T],
        accum: &'scope mut [T],
        accum_update: &'scope mut [T],
        grad: &'scope [T],
    ) {
        let lanes = (var, accum, accum_update, grad);
        run_kernel::<Self, T, _, _>("Adadelta", stream, lanes, move |lanes| functor.kernel::<Self>(lanes));
    }
}
