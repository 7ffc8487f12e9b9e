use std::iter::FusedIterator;
use std::{fmt, slice};

use crate::{DynamicArray, MemoryBlock, drop_slots};

/// An iterator that moves the elements out of a [`DynamicArray`].
///
/// Created by the [`IntoIterator`] implementation of [`DynamicArray`]. The iterator takes
/// over the array's block; elements that are never yielded are dropped together with
/// the iterator.
///
/// # Examples
///
/// ```
/// use dyn_array::DynamicArray;
///
/// let array: DynamicArray<_> = ["a", "b", "c"].into_iter().collect();
///
/// let mut iter = array.into_iter();
/// assert_eq!(iter.next(), Some("a"));
/// assert_eq!(iter.next_back(), Some("c"));
/// assert_eq!(iter.as_slice(), &["b"]);
/// ```
pub struct IntoIter<T> {
    block: MemoryBlock<T>,

    /// The live elements not yet yielded occupy `[front, back)`.
    front: usize,
    back: usize,
}

impl<T> IntoIter<T> {
    /// The elements that have not been yielded yet.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[front, back)` are live slots of the block.
        unsafe { slice::from_raw_parts(self.block.address_at(self.front), self.remaining()) }
    }

    fn remaining(&self) -> usize {
        self.back
            .checked_sub(self.front)
            .expect("front never moves past back")
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }

        let slot = self.block.address_at(self.front);

        // Cannot overflow because front < back.
        self.front = self.front.wrapping_add(1);

        // SAFETY: The slot was live and now lies outside `[front, back)`, so ownership passes
        // to the caller.
        Some(unsafe { slot.read() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }

        self.back = self
            .back
            .checked_sub(1)
            .expect("guarded by front < back above");

        // SAFETY: The slot was live and now lies outside `[front, back)`, so ownership passes
        // to the caller.
        Some(unsafe { self.block.address_at(self.back).read() })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        let remaining = self.remaining();

        // SAFETY: `[front, back)` are live and nothing uses them after this.
        unsafe {
            drop_slots(self.block.address_at_mut(self.front), remaining);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T> IntoIterator for DynamicArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        let (block, len) = self.into_raw_parts();

        IntoIter {
            block,
            front: 0,
            back: len,
        }
    }
}
