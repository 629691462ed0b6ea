//! Asynchronous submission of work to a device.
//!
//! Work submitted to one stream may run concurrently; only
//! [`Stream::synchronize`] and the end of the scope order it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::trace;
use rayon::prelude::*;

use crate::context::Device;
use crate::lanes::{partition, Lanes};
use crate::launch::LaunchConfig;

/// Counters of the work submitted to a stream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamStats {
    /// Explicit kernels launched (non-empty configurations only).
    pub kernel_launches: usize,
    /// Bulk element-wise expressions enqueued.
    pub bulk_enqueues: usize,
}

#[derive(Debug, Default)]
struct Counters {
    kernel_launches: AtomicUsize,
    bulk_enqueues: AtomicUsize,
}

/// Decrements the pending counter when a task ends, panicking or not.
struct PendingGuard(Arc<AtomicUsize>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// A handle for submitting work to a device inside [`Device::scope`].
///
/// Submission returns immediately. Buffers passed to `launch`/`enqueue` are
/// borrowed until the enclosing scope ends, which is also when all work is
/// guaranteed complete. Work that needs the result of an earlier submission
/// must be submitted after [`Stream::synchronize`] or in a later scope.
pub struct Stream<'a, 'scope> {
    scope: &'a rayon::Scope<'scope>,
    device: &'a Device,
    pending: Arc<AtomicUsize>,
    counters: Counters,
}

impl<'a, 'scope> Stream<'a, 'scope> {
    pub(crate) fn new(scope: &'a rayon::Scope<'scope>, device: &'a Device, pending: Arc<AtomicUsize>) -> Self {
        Stream {
            scope,
            device,
            pending,
            counters: Counters::default(),
        }
    }

    pub fn device(&self) -> &Device {
        self.device
    }

    /// Launches `kernel` once per group of `config`, each group running on a
    /// device worker with its own disjoint part of `lanes`.
    ///
    /// An empty configuration is a no-op.
    pub fn launch<L, K>(&self, config: LaunchConfig, lanes: L, kernel: K)
    where
        L: Lanes + 'scope,
        K: Fn(L) + Send + Sync + 'scope,
    {
        let groups = partition(lanes, &config);
        if groups.is_empty() {
            return;
        }
        self.counters.kernel_launches.fetch_add(1, Ordering::Relaxed);
        let guard = self.begin();
        self.scope.spawn(move |_| {
            let _guard = guard;
            groups.into_par_iter().enumerate().for_each(|(block, group)| {
                trace!("block {} processing {} elements", block, group.len());
                kernel(group);
            });
        });
    }

    /// Enqueues a bulk operation (see [`crate::expr`]).
    pub fn enqueue<F>(&self, op: F)
    where
        F: FnOnce() + Send + 'scope,
    {
        self.counters.bulk_enqueues.fetch_add(1, Ordering::Relaxed);
        let guard = self.begin();
        self.scope.spawn(move |_| {
            let _guard = guard;
            op();
        });
    }

    /// `true` once every submitted task has finished.
    pub fn query(&self) -> bool {
        self.pending.load(Ordering::Acquire) == 0
    }

    /// Blocks until every submitted task has finished, helping with queued
    /// work while waiting.
    pub fn synchronize(&self) {
        while !self.query() {
            if rayon::yield_now().is_none() {
                std::thread::yield_now();
            }
        }
    }

    pub fn stats(&self) -> StreamStats {
        StreamStats {
            kernel_launches: self.counters.kernel_launches.load(Ordering::Relaxed),
            bulk_enqueues: self.counters.bulk_enqueues.load(Ordering::Relaxed),
        }
    }

    fn begin(&self) -> PendingGuard {
        self.pending.fetch_add(1, Ordering::AcqRel);
        PendingGuard(Arc::clone(&self.pending))
    }
}
