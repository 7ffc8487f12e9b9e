use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use crate::{DynamicArray, Relocation, TransferPolicy};

/// Builder for creating an instance of [`DynamicArray`].
///
/// You only need to use this builder if you want to customize the array configuration.
/// [`DynamicArray::new()`] and [`DynamicArray::with_capacity()`] are sufficient for most
/// use cases.
///
/// # Examples
///
/// ```
/// use dyn_array::{DynamicArray, TransferPolicy};
///
/// let array = DynamicArray::<String>::builder()
///     .capacity(16)
///     .transfer_policy(TransferPolicy::Move)
///     .build();
///
/// assert_eq!(array.capacity(), 16);
/// assert!(array.is_empty());
/// ```
#[must_use]
pub struct DynamicArrayBuilder<T> {
    capacity: usize,
    relocation: Relocation,

    _item: PhantomData<T>,
}

impl<T> fmt::Debug for DynamicArrayBuilder<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicArrayBuilder")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("capacity", &self.capacity)
            .field("transfer_policy", &self.relocation.policy())
            .finish()
    }
}

impl<T> DynamicArrayBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            capacity: 0,
            relocation: Relocation::Move,
            _item: PhantomData,
        }
    }

    /// Sets the initial capacity of the array. The array allocates exactly this many slots
    /// when built. Zero (the default) means the array does not allocate until first use.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Builds the array with the specified configuration.
    ///
    /// # Panics
    ///
    /// Panics if the requested capacity overflows the maximum allocation size.
    #[must_use]
    pub fn build(self) -> DynamicArray<T> {
        DynamicArray::new_inner(self.capacity, self.relocation)
            .unwrap_or_else(|e| e.raise::<T>())
    }

    /// Builds the array with the specified configuration, returning an error instead of
    /// panicking if the initial storage cannot be acquired.
    ///
    /// # Examples
    ///
    /// ```
    /// use dyn_array::DynamicArray;
    ///
    /// let result = DynamicArray::<u64>::builder().capacity(usize::MAX).try_build();
    /// assert!(result.is_err());
    /// ```
    pub fn try_build(self) -> crate::Result<DynamicArray<T>> {
        DynamicArray::new_inner(self.capacity, self.relocation)
    }
}

impl<T: Clone> DynamicArrayBuilder<T> {
    /// Sets the [transfer policy][TransferPolicy] for the array. This governs how
    /// live elements are carried over when the array grows into a new block.
    ///
    /// # Examples
    ///
    /// ```
    /// use dyn_array::{DynamicArray, TransferPolicy};
    ///
    /// let array = DynamicArray::<Vec<u8>>::builder()
    ///     .transfer_policy(TransferPolicy::CloneThenDrop)
    ///     .build();
    /// ```
    pub fn transfer_policy(mut self, policy: TransferPolicy) -> Self {
        self.relocation = Relocation::from_policy::<T>(policy);
        self
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let array = DynamicArrayBuilder::<u32>::new().build();

        assert_eq!(array.capacity(), 0);
        assert_eq!(array.len(), 0);
        assert_eq!(array.transfer_policy(), TransferPolicy::Move);
    }

    #[test]
    fn capacity_is_exact() {
        let array = DynamicArrayBuilder::<u32>::new().capacity(7).build();

        assert_eq!(array.capacity(), 7);
        assert!(array.is_empty());
    }

    #[test]
    fn transfer_policy_is_applied() {
        let array = DynamicArrayBuilder::<String>::new()
            .transfer_policy(TransferPolicy::CloneThenDrop)
            .build();

        assert_eq!(array.transfer_policy(), TransferPolicy::CloneThenDrop);
    }

    #[test]
    fn try_build_reports_overflow() {
        let result = DynamicArrayBuilder::<u64>::new()
            .capacity(usize::MAX)
            .try_build();

        assert!(matches!(result, Err(crate::Error::CapacityOverflow { .. })));
    }
}
