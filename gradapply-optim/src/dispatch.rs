//! Submission of an update onto a stream, along one of two paths.
//!
//! * **bulk**: the functor body is a sequence of whole-buffer expressions,
//!   enqueued as a single task.
//! * **kernel**: the functor's per-index loop is launched over the groups of
//!   [`launch_config`], one group per device worker.
//!
//! Which path an algorithm takes on a backend is fixed by its `Apply*` trait
//! implementation, never decided here.

use std::fmt;

use gradapply_core::{Backend, DeviceScalar};
use gradapply_device::{launch_config, Lanes, Stream};
use log::debug;

/// Execution path of an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Path {
    Bulk,
    Kernel,
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::Bulk => write!(f, "bulk"),
            Path::Kernel => write!(f, "kernel"),
        }
    }
}

/// Enqueues `body` over `lanes` as one bulk task. Empty arrays are a no-op.
///
/// Panics if the arrays of `lanes` differ in length.
pub fn run_bulk<'scope, B, T, L, F>(name: &'static str, stream: &Stream<'_, 'scope>, lanes: L, body: F)
where
    B: Backend,
    T: DeviceScalar,
    L: Lanes + 'scope,
    F: FnOnce(L) + Send + 'scope,
{
    let n = lanes.len();
    debug!(
        "{}: device={} backend={:?} dtype={:?} n={} bytes/array={} path={}",
        name,
        stream.device().id(),
        B::KIND,
        T::DTYPE,
        n,
        n.saturating_mul(T::DTYPE.size_of()),
        Path::Bulk
    );
    if n == 0 {
        return;
    }
    stream.enqueue(move || body(lanes));
}

/// Launches `kernel` over the groups of the launch shape for `lanes`.
///
/// Panics if the arrays of `lanes` differ in length.
pub fn run_kernel<'scope, B, T, L, K>(name: &'static str, stream: &Stream<'_, 'scope>, lanes: L, kernel: K)
where
    B: Backend,
    T: DeviceScalar,
    L: Lanes + 'scope,
    K: Fn(L) + Send + Sync + 'scope,
{
    let n = lanes.len();
    let config = launch_config(n, stream.device());
    debug!(
        "{}: device={} backend={:?} dtype={:?} n={} bytes/array={} path={} blocks={} threads/block={}",
        name,
        stream.device().id(),
        B::KIND,
        T::DTYPE,
        n,
        n.saturating_mul(T::DTYPE.size_of()),
        Path::Kernel,
        config.block_count,
        config.thread_per_block
    );
    stream.launch(config, lanes, kernel);
}

/// Implements a real-only, bulk-path selection trait for both backends.
macro_rules! impl_real_bulk {
    ($trait_:ident, $method:ident, $functor:ident, $name:literal, $($arr:ident: $ty:ty),+) => {
        impl<T: gradapply_core::RealScalar> $trait_<T> for gradapply_core::Cuda {
            fn $method<'scope>(functor: $functor<T>, stream: &gradapply_device::Stream<'_, 'scope>, $($arr: $ty),+) {
                $crate::dispatch::run_bulk::<Self, T, _, _>($name, stream, ($($arr,)+), move |lanes| functor.bulk::<Self>(lanes));
            }
        }

        impl<T: gradapply_core::RealScalar> $trait_<T> for gradapply_core::Rocm {
            fn $method<'scope>(functor: $functor<T>, stream: &gradapply_device::Stream<'_, 'scope>, $($arr: $ty),+) {
                $crate::dispatch::run_bulk::<Self, T, _, _>($name, stream, ($($arr,)+), move |lanes| functor.bulk::<Self>(lanes));
            }
        }
    };
}

pub(crate) use impl_real_bulk;

