//! Launch-shape computation for explicit kernels.

use crate::context::{Device, DeviceProperties};

/// Hard cap on threads per block, whatever the device reports.
pub const MAX_THREADS_PER_BLOCK: usize = 1024;

/// Shape of a 1-D kernel launch over `virtual_thread_count` elements.
///
/// Blocks cover the elements in contiguous groups; each virtual thread of a
/// block strides through its group, so every index in `0..n` is visited
/// exactly once whatever the shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LaunchConfig {
    pub virtual_thread_count: usize,
    pub thread_per_block: usize,
    pub block_count: usize,
}

#[inline]
pub(crate) fn div_up(a: usize, b: usize) -> usize {
    a.div_ceil(b)
}

impl LaunchConfig {
    /// Computes the launch shape for `n` elements on a device with the given
    /// properties.
    ///
    /// `thread_per_block = min(1024, max_threads_per_block)`, the physical
    /// thread count is `min(multiprocessors * max_threads_per_multiprocessor, n)`
    /// and `block_count = min(ceil(physical / thread_per_block), multiprocessors)`.
    /// `n == 0` yields the empty configuration.
    pub fn for_properties(n: usize, properties: &DeviceProperties) -> Self {
        if n == 0 {
            return LaunchConfig::default();
        }
        let thread_per_block = MAX_THREADS_PER_BLOCK.min(properties.max_threads_per_block).max(1);
        let multiprocessors = properties.multiprocessor_count.max(1);
        let physical_thread_count = multiprocessors
            .saturating_mul(properties.max_threads_per_multiprocessor)
            .min(n);
        let block_count = div_up(physical_thread_count, thread_per_block).min(multiprocessors);
        LaunchConfig {
            virtual_thread_count: n,
            thread_per_block,
            block_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.virtual_thread_count == 0 || self.block_count == 0
    }

    /// Size of the contiguous group of elements each block processes; the
    /// last group may be shorter.
    pub fn elements_per_block(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            div_up(self.virtual_thread_count, self.block_count)
        }
    }
}

/// Launch shape for `n` elements on `device`.
pub fn launch_config(n: usize, device: &Device) -> LaunchConfig {
    LaunchConfig::for_properties(n, device.properties())
}
