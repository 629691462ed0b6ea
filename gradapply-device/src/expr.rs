//! Whole-buffer element-wise expressions.
//!
//! The bulk path of an update is a short sequence of `assign` passes, each
//! evaluated in full over its destination before the next starts. Passes read
//! the state left by the previous ones, never a mix of old and new values.

use rayon::prelude::*;

/// Below this many elements a pass is not split further across workers.
pub const MIN_ELEMENTS_PER_TASK: usize = 4096;

/// `dst[i] = f(i, dst[i])` for every `i`, in parallel on the current pool.
pub fn assign<T, F>(dst: &mut [T], f: F)
where
    T: Copy + Send + Sync,
    F: Fn(usize, T) -> T + Send + Sync,
{
    dst.par_iter_mut()
        .enumerate()
        .with_min_len(MIN_ELEMENTS_PER_TASK)
        .for_each(|(i, x)| *x = f(i, *x));
}

/// `dst[i] = f(i)` for every `i`, in parallel on the current pool.
pub fn fill_with<T, F>(dst: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize) -> T + Send + Sync,
{
    dst.par_iter_mut()
        .enumerate()
        .with_min_len(MIN_ELEMENTS_PER_TASK)
        .for_each(|(i, x)| *x = f(i));
}
