use std::alloc::{Layout, alloc, dealloc};
use std::any::type_name;
use std::ptr::{self, NonNull};
use std::{fmt, mem};

use crate::{Error, Result};

/// An owned block of raw, uninitialized storage with room for `capacity` values of `T`.
///
/// The block only owns memory. It never constructs a value in any of its slots and never drops
/// one: whoever places values into the block is responsible for tracking which slots are live
/// and for dropping them before the block is released. This is the storage half of
/// [`DynamicArray`][crate::DynamicArray], which does exactly that bookkeeping on top.
///
/// A block with zero capacity owns no allocation and reports a null address. Blocks for
/// zero-sized types never allocate either, although they report their requested capacity.
///
/// The block cannot be cloned, as that would duplicate ownership of the allocation. Moving
/// the block (or calling [`take()`][Self::take]) transfers ownership.
///
/// # Examples
///
/// ```
/// use dyn_array::MemoryBlock;
///
/// let mut block = MemoryBlock::<u64>::with_capacity(4);
/// assert_eq!(block.capacity(), 4);
///
/// // SAFETY: Slot 2 is within capacity and we write before we read.
/// unsafe {
///     block.address_at_mut(2).write(42);
///     assert_eq!(block.address_at(2).read(), 42);
/// }
///
/// // Dropping the block releases the memory without touching the slot contents.
/// ```
pub struct MemoryBlock<T> {
    /// `None` if and only if nothing was allocated. For zero-sized types with a non-zero
    /// capacity this is a dangling (but well-aligned) pointer.
    address: Option<NonNull<T>>,

    capacity: usize,
}

impl<T> MemoryBlock<T> {
    /// Creates a block with zero capacity. This does not allocate.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            address: None,
            capacity: 0,
        }
    }

    /// Allocates an uninitialized block with room for exactly `capacity` values of `T`.
    ///
    /// A zero `capacity` does not allocate.
    ///
    /// # Panics
    ///
    /// Panics if the size of the block in bytes would overflow `isize::MAX`. Aborts via
    /// [`handle_alloc_error()`][std::alloc::handle_alloc_error] if the allocator fails.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::try_with_capacity(capacity).unwrap_or_else(|e| e.raise::<T>())
    }

    /// Allocates an uninitialized block with room for exactly `capacity` values of `T`,
    /// returning an error instead of panicking if the storage cannot be acquired.
    ///
    /// # Examples
    ///
    /// ```
    /// use dyn_array::{Error, MemoryBlock};
    ///
    /// assert!(MemoryBlock::<u32>::try_with_capacity(16).is_ok());
    ///
    /// let result = MemoryBlock::<u32>::try_with_capacity(usize::MAX);
    /// assert!(matches!(result, Err(Error::CapacityOverflow { .. })));
    /// ```
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Ok(Self::new());
        }

        let layout = Self::layout(capacity)?;

        if layout.size() == 0 {
            return Ok(Self {
                address: Some(NonNull::dangling()),
                capacity,
            });
        }

        // SAFETY: The layout is not zero-sized (checked above).
        let raw = unsafe { alloc(layout) };

        let address = NonNull::new(raw.cast::<T>()).ok_or(Error::AllocationFailed { layout })?;

        Ok(Self {
            address: Some(address),
            capacity,
        })
    }

    fn layout(capacity: usize) -> Result<Layout> {
        Layout::array::<T>(capacity).map_err(|_layout_error| Error::CapacityOverflow {
            requested: capacity,
        })
    }

    /// The number of `T`-sized slots in the block. Says nothing about how many are live.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The address of the first slot, or null if the block owns no storage.
    #[must_use]
    pub fn address(&self) -> *const T {
        self.address
            .map_or(ptr::null(), |address| address.as_ptr().cast_const())
    }

    /// The address of the first slot, or null if the block owns no storage.
    #[must_use]
    pub fn address_mut(&mut self) -> *mut T {
        self.address
            .map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    /// A well-aligned, non-null base pointer, dangling if the block owns no storage.
    /// Suitable for building (possibly empty) slices over the block.
    #[must_use]
    pub(crate) fn base(&self) -> NonNull<T> {
        self.address.unwrap_or(NonNull::dangling())
    }

    /// Returns a pointer to the slot at `offset`.
    ///
    /// `offset` may equal the capacity, yielding a one-past-the-end pointer that must not be
    /// dereferenced. Offsets beyond the capacity are checked by a debug assertion only.
    /// The function itself is always safe to call; dereferencing the result is subject to the
    /// usual raw pointer rules, and the slot is only readable if the owner has written to it.
    #[must_use]
    pub fn address_at(&self, offset: usize) -> *const T {
        debug_assert!(
            offset <= self.capacity,
            "offset {offset} out of bounds in memory block of {} with capacity {}",
            type_name::<T>(),
            self.capacity
        );

        self.base().as_ptr().cast_const().wrapping_add(offset)
    }

    /// Returns a mutable pointer to the slot at `offset`.
    ///
    /// Same contract as [`address_at()`][Self::address_at].
    #[must_use]
    pub fn address_at_mut(&mut self, offset: usize) -> *mut T {
        debug_assert!(
            offset <= self.capacity,
            "offset {offset} out of bounds in memory block of {} with capacity {}",
            type_name::<T>(),
            self.capacity
        );

        self.base().as_ptr().wrapping_add(offset)
    }

    /// Exchanges the storage of two blocks. Neither allocates nor touches slot contents.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.address, &mut other.address);
        mem::swap(&mut self.capacity, &mut other.capacity);
    }

    /// Takes ownership of the storage, leaving `self` as an empty zero-capacity block.
    #[must_use]
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }
}

impl<T> Default for MemoryBlock<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for MemoryBlock<T> {
    fn drop(&mut self) {
        let Some(address) = self.address else {
            return;
        };

        let layout = Self::layout(self.capacity)
            .expect("layout was already validated when the block was allocated");

        if layout.size() == 0 {
            return;
        }

        // SAFETY: The layout must match between alloc and dealloc. It does, being calculated
        // from the same capacity by the same function.
        unsafe {
            dealloc(address.as_ptr().cast(), layout);
        }
    }
}

impl<T> fmt::Debug for MemoryBlock<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryBlock")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("address", &self.address())
            .field("capacity", &self.capacity)
            .finish()
    }
}

// SAFETY: The block is a uniquely owned allocation with nothing thread-bound about it, so it can
// move between threads as long as the values its owner places in it can.
unsafe impl<T: Send> Send for MemoryBlock<T> {}

// SAFETY: Shared access only hands out raw pointers; any read through them is the owner's
// responsibility and is governed by `T: Sync` at the owner's level.
unsafe impl<T: Sync> Sync for MemoryBlock<T> {}
