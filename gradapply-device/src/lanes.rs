//! Element-aligned views handed to a kernel.
//!
//! A kernel receives one group of each array it touches. `Lanes` is what lets
//! a launch split several arrays at the same offsets without aliasing: each
//! group owns disjoint sub-slices of every array.

use crate::launch::LaunchConfig;

/// A bundle of equally long slices that can be split at a common index.
pub trait Lanes: Send + Sized {
    /// Number of elements; all members must agree.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Splits every member at `mid`.
    fn split_at(self, mid: usize) -> (Self, Self);
}

impl<'a, T: Send> Lanes for &'a mut [T] {
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn split_at(self, mid: usize) -> (Self, Self) {
        self.split_at_mut(mid)
    }
}

impl<'a, T: Sync> Lanes for &'a [T] {
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn split_at(self, mid: usize) -> (Self, Self) {
        <[T]>::split_at(self, mid)
    }
}

macro_rules! impl_lanes_tuple {
    ($A:ident $a:ident $(, $B:ident $b:ident)*) => {
        impl<$A: Lanes $(, $B: Lanes)*> Lanes for ($A, $($B,)*) {
            fn len(&self) -> usize {
                let ($a, $($b,)*) = self;
                let n = $a.len();
                $(
                    assert_eq!(
                        $b.len(),
                        n,
                        "lanes of a launch must have the same length"
                    );
                )*
                n
            }

            fn split_at(self, mid: usize) -> (Self, Self) {
                let ($a, $($b,)*) = self;
                let $a = $a.split_at(mid);
                $(let $b = $b.split_at(mid);)*
                (($a.0, $($b.0,)*), ($a.1, $($b.1,)*))
            }
        }
    };
}

impl_lanes_tuple!(A a);
impl_lanes_tuple!(A a, B b);
impl_lanes_tuple!(A a, B b, C c);
impl_lanes_tuple!(A a, B b, C c, D d);
impl_lanes_tuple!(A a, B b, C c, D d, E e);
impl_lanes_tuple!(A a, B b, C c, D d, E e, F f);

/// Cuts `lanes` into the contiguous groups of `config`, in index order.
///
/// Panics if the members of `lanes` differ in length or if the length is not
/// the configuration's element count.
pub fn partition<L: Lanes>(lanes: L, config: &LaunchConfig) -> Vec<L> {
    let n = lanes.len();
    assert_eq!(
        n, config.virtual_thread_count,
        "launch configuration was computed for a different element count"
    );
    if config.is_empty() {
        return Vec::new();
    }
    let chunk = config.elements_per_block();
    let mut groups = Vec::with_capacity(config.block_count);
    let mut rest = lanes;
    while rest.len() > chunk {
        let (head, tail) = rest.split_at(chunk);
        groups.push(head);
        rest = tail;
    }
    groups.push(rest);
    groups
}
