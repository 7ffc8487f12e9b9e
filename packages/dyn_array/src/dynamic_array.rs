use std::any::type_name;
use std::iter;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::{fmt, mem, ptr, slice};

use scopeguard::ScopeGuard;

use crate::{DynamicArrayBuilder, MemoryBlock, Relocation, Result, TransferPolicy, drop_slots};

/// A growable contiguous array of `T`.
///
/// The array owns one [`MemoryBlock`] and keeps its live elements in the prefix
/// `[0, len)` of that block. Slots in `[len, capacity)` are uninitialized. Memory ownership
/// lives in the block; the array is solely responsible for the lifetime of the elements.
///
/// # Growth
///
/// When an insertion finds the array full, the array allocates a new block with double the
/// capacity (or one slot if it had none), constructs the new element directly in its final slot
/// of the new block, transfers the existing elements around it and only then releases the old
/// block. [`reserve()`][Self::reserve] and [`resize()`][Self::resize] allocate exactly the
/// requested capacity instead. How elements are carried over is governed by the array's
/// [`TransferPolicy`].
///
/// # Panic safety
///
/// Every operation that constructs several elements (creation with a length, cloning,
/// resizing, growth under [`TransferPolicy::CloneThenDrop`]) either completes or leaves the
/// array exactly as it was. Elements constructed before a panic are dropped again before the
/// panic propagates.
///
/// # Element access
///
/// The array dereferences to a slice, so indexing, [`get()`][slice::get], iteration and all
/// other slice methods are available. Any growth or shifting operation invalidates pointers
/// previously obtained from the array.
///
/// # Thread safety
///
/// The array performs no synchronization of its own. It is [`Send`] and [`Sync`] whenever `T` is.
///
/// # Examples
///
/// ```
/// use dyn_array::DynamicArray;
///
/// let mut array = DynamicArray::new();
///
/// array.push(1);
/// array.push(2);
/// array.push(3);
/// assert_eq!(array.as_slice(), &[1, 2, 3]);
///
/// array.insert(1, 9);
/// assert_eq!(array.as_slice(), &[1, 9, 2, 3]);
///
/// assert_eq!(array.erase(0), Some(1));
/// assert_eq!(array.pop(), Some(3));
/// assert_eq!(array.as_slice(), &[9, 2]);
/// ```
pub struct DynamicArray<T> {
    block: MemoryBlock<T>,

    /// Number of live elements, all of them at the start of the block.
    len: usize,

    relocation: Relocation,

    /// The array owns values of `T` and drops them, which the block alone does not express.
    _owns: PhantomData<T>,
}

impl<T> DynamicArray<T> {
    /// Creates an empty array. This does not allocate.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            block: MemoryBlock::new(),
            len: 0,
            relocation: Relocation::Move,
            _owns: PhantomData,
        }
    }

    /// Starts building an array with a custom configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use dyn_array::{DynamicArray, TransferPolicy};
    ///
    /// let array = DynamicArray::<u32>::builder()
    ///     .capacity(8)
    ///     .transfer_policy(TransferPolicy::CloneThenDrop)
    ///     .build();
    /// ```
    pub fn builder() -> DynamicArrayBuilder<T> {
        DynamicArrayBuilder::new()
    }

    pub(crate) fn new_inner(capacity: usize, relocation: Relocation) -> Result<Self> {
        Ok(Self {
            block: MemoryBlock::try_with_capacity(capacity)?,
            len: 0,
            relocation,
            _owns: PhantomData,
        })
    }

    /// Creates an empty array with room for exactly `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if the requested capacity overflows the maximum allocation size.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::builder().capacity(capacity).build()
    }

    /// Creates an empty array with room for exactly `capacity` elements, returning an error
    /// instead of panicking if the storage cannot be acquired.
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        Self::builder().capacity(capacity).try_build()
    }

    /// Creates an array of `len` default-valued elements, with a capacity of exactly `len`.
    ///
    /// If `T::default()` panics, the elements created so far are dropped before the panic
    /// propagates.
    ///
    /// # Examples
    ///
    /// ```
    /// use dyn_array::DynamicArray;
    ///
    /// let array = DynamicArray::<i32>::with_len(5);
    ///
    /// assert_eq!(array.len(), 5);
    /// assert!(array.iter().all(|value| *value == 0));
    /// ```
    #[must_use]
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        let mut array = Self::with_capacity(len);

        // SAFETY: The array is empty with a capacity of exactly `len`.
        unsafe {
            array.construct_tail(iter::repeat_with(T::default).take(len));
        }

        array
    }

    /// The number of live elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the array has no live elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of elements the array can hold before it needs to grow.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.block.capacity()
    }

    /// How live elements are carried over when the array grows.
    #[must_use]
    pub fn transfer_policy(&self) -> TransferPolicy {
        self.relocation.policy()
    }

    /// Extracts a slice of all the live elements.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: The base pointer is non-null and aligned, and the first `len` slots are live.
        unsafe { slice::from_raw_parts(self.block.base().as_ptr(), self.len) }
    }

    /// Extracts a mutable slice of all the live elements.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: The base pointer is non-null and aligned, the first `len` slots are live and
        // we hold an exclusive borrow of the array.
        unsafe { slice::from_raw_parts_mut(self.block.base().as_ptr(), self.len) }
    }

    /// Ensures the capacity is at least `new_capacity`.
    ///
    /// Unlike [`Vec::reserve()`], the argument is the total capacity, not an additional amount.
    /// If the array is already large enough, this does nothing. Otherwise it allocates a block of
    /// exactly `new_capacity` slots and transfers the elements according to the
    /// [`TransferPolicy`]. The capacity and length never decrease.
    ///
    /// # Panics
    ///
    /// Panics if the requested capacity overflows the maximum allocation size, or if an element
    /// clone panics under [`TransferPolicy::CloneThenDrop`]. In the latter case the array is
    /// left unchanged.
    pub fn reserve(&mut self, new_capacity: usize) {
        if new_capacity <= self.capacity() {
            return;
        }

        self.relocate_into(MemoryBlock::with_capacity(new_capacity));
    }

    /// Ensures the capacity is at least `new_capacity`, returning an error instead of panicking
    /// if the storage cannot be acquired. On error, the array is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use dyn_array::DynamicArray;
    ///
    /// let mut array = DynamicArray::<u64>::new();
    ///
    /// assert!(array.try_reserve(10).is_ok());
    /// assert!(array.try_reserve(usize::MAX).is_err());
    /// assert_eq!(array.capacity(), 10);
    /// ```
    pub fn try_reserve(&mut self, new_capacity: usize) -> Result<()> {
        if new_capacity <= self.capacity() {
            return Ok(());
        }

        self.relocate_into(MemoryBlock::try_with_capacity(new_capacity)?);
        Ok(())
    }

    /// Resizes the array to `new_len` elements.
    ///
    /// Growing fills the new slots with default values, first reserving exactly `new_len` slots
    /// if the capacity is insufficient. Shrinking drops the excess elements and keeps the
    /// capacity.
    ///
    /// If `T::default()` panics, the values added so far are dropped again and the length
    /// is unchanged.
    pub fn resize(&mut self, new_len: usize)
    where
        T: Default,
    {
        self.resize_with(new_len, T::default);
    }

    /// Resizes the array to `new_len` elements, filling any new slots with values
    /// returned by `f`.
    ///
    /// See [`resize()`][Self::resize] for details.
    pub fn resize_with<F>(&mut self, new_len: usize, f: F)
    where
        F: FnMut() -> T,
    {
        let Some(additional) = new_len.checked_sub(self.len) else {
            self.truncate(new_len);
            return;
        };

        self.reserve(new_len);

        // SAFETY: We just reserved room for `new_len` elements.
        unsafe {
            self.construct_tail(iter::repeat_with(f).take(additional));
        }
    }

    /// Drops all elements past the first `new_len`. Does nothing if the array is not longer
    /// than that. The capacity is unchanged.
    pub fn truncate(&mut self, new_len: usize) {
        let Some(excess) = self.len.checked_sub(new_len) else {
            return;
        };

        let first_excess = self.block.address_at_mut(new_len);

        // Shorten first so a panicking drop cannot lead to a second drop of the same value.
        self.len = new_len;

        // SAFETY: These slots were live and are now outside the live prefix.
        unsafe {
            drop_slots(first_excess, excess);
        }
    }

    /// Drops all elements. The capacity is unchanged.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Appends a value to the end of the array, growing it if it is full.
    pub fn push(&mut self, value: T) {
        _ = self.emplace_back(|| value);
    }

    /// Removes the last element and returns it, or `None` if the array is empty.
    ///
    /// Discarding the returned value drops the element.
    pub fn pop(&mut self) -> Option<T> {
        let last = self.len.checked_sub(1)?;

        self.len = last;

        // SAFETY: The slot was live and is now outside the live prefix, so ownership of the
        // value passes to the caller.
        Some(unsafe { self.block.address_at(last).read() })
    }

    /// Appends the value returned by `f` to the end of the array and returns a reference to it.
    ///
    /// If the array is full, the value is written straight into its slot in the new block.
    ///
    /// # Examples
    ///
    /// ```
    /// use dyn_array::DynamicArray;
    ///
    /// let mut array = DynamicArray::new();
    ///
    /// let value = array.emplace_back(|| String::from("hello"));
    /// value.push_str(" world");
    ///
    /// assert_eq!(array[0], "hello world");
    /// ```
    pub fn emplace_back<F>(&mut self, f: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        self.emplace(self.len, f)
    }

    /// Inserts the value returned by `f` at `index`, shifting all elements after it one slot
    /// towards the end, and returns a reference to the inserted element.
    ///
    /// If `f` panics, the array is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn emplace<F>(&mut self, index: usize, f: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        assert!(
            index <= self.len,
            "emplace index {index} out of bounds in array of length {} of {}",
            self.len,
            type_name::<T>()
        );

        if self.len == self.capacity() {
            self.emplace_reallocating(index, f);
        } else {
            self.emplace_in_place(index, f);
        }

        // SAFETY: The slot at `index` now holds the inserted value and we hold an exclusive
        // borrow of the array for the lifetime of the returned reference.
        unsafe { &mut *self.block.address_at_mut(index) }
    }

    /// Inserts `value` at `index`, shifting all elements after it one slot towards the end,
    /// and returns a reference to the inserted element.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> &mut T {
        self.emplace(index, || value)
    }

    /// Removes the element at `index` and returns it, shifting all elements after it one slot
    /// towards the start. Returns `None` without doing anything if the array is empty.
    ///
    /// # Panics
    ///
    /// Panics if the array is not empty and `index >= len`.
    pub fn erase(&mut self, index: usize) -> Option<T> {
        if self.len == 0 {
            return None;
        }

        assert!(
            index < self.len,
            "erase index {index} out of bounds in array of length {} of {}",
            self.len,
            type_name::<T>()
        );

        let slot = self.block.address_at_mut(index);

        // SAFETY: The slot is live. Ownership passes to the caller; the slot is overwritten
        // below without being dropped.
        let value = unsafe { slot.read() };

        let last = self
            .len
            .checked_sub(1)
            .expect("guarded by the empty check above");
        let following = last
            .checked_sub(index)
            .expect("guarded by the bounds assertion above");

        // At most one past the last slot of the block.
        let next = slot.wrapping_add(1);

        // SAFETY: The `following` live slots after `index` move down by one. Bitwise moves
        // cannot fail, so the gap is closed before anyone can observe it.
        unsafe {
            ptr::copy(next, slot, following);
        }

        self.len = last;

        Some(value)
    }

    /// Exchanges the contents of two arrays without touching any element.
    ///
    /// Each array keeps its own [`TransferPolicy`].
    pub fn swap_with(&mut self, other: &mut Self) {
        self.block.swap(&mut other.block);
        mem::swap(&mut self.len, &mut other.len);
    }

    /// Takes the contents of the array, leaving it empty with no capacity.
    ///
    /// The returned array has the same [`TransferPolicy`].
    #[must_use]
    pub fn take(&mut self) -> Self {
        Self {
            block: self.block.take(),
            len: mem::replace(&mut self.len, 0),
            relocation: self.relocation,
            _owns: PhantomData,
        }
    }

    /// Replaces the contents of the array with the contents of `source`, leaving `source`
    /// empty with no capacity.
    ///
    /// The current elements are dropped before the current block is released. The array keeps
    /// its own [`TransferPolicy`].
    ///
    /// # Examples
    ///
    /// ```
    /// use dyn_array::DynamicArray;
    ///
    /// let mut target: DynamicArray<_> = [1, 2, 3].into_iter().collect();
    /// let mut source: DynamicArray<_> = [7].into_iter().collect();
    ///
    /// target.move_from(&mut source);
    ///
    /// assert_eq!(target.as_slice(), &[7]);
    /// assert!(source.is_empty());
    /// assert_eq!(source.capacity(), 0);
    /// ```
    pub fn move_from(&mut self, source: &mut Self) {
        self.clear();

        // The previous block is released when `block` goes out of scope.
        let mut block = source.block.take();
        self.block.swap(&mut block);

        self.len = mem::replace(&mut source.len, 0);
    }

    /// Splits the array into its block and the number of live elements at its start, which
    /// become the caller's responsibility to drop.
    pub(crate) fn into_raw_parts(mut self) -> (MemoryBlock<T>, usize) {
        // The emptied array is dropped afterwards without touching any element.
        let len = mem::replace(&mut self.len, 0);
        (self.block.take(), len)
    }

    /// Transfers the live elements into `new_block` and makes it the array's storage.
    fn relocate_into(&mut self, mut new_block: MemoryBlock<T>) {
        debug_assert!(new_block.capacity() >= self.len);

        // SAFETY: The first `len` slots of our block are live and the new block is a separate
        // allocation with room for all of them.
        unsafe {
            self.relocation.transfer(
                self.block.address_at(0),
                new_block.address_at_mut(0),
                self.len,
            );
        }

        self.install(new_block, self.len);
    }

    fn emplace_reallocating<F>(&mut self, index: usize, f: F)
    where
        F: FnOnce() -> T,
    {
        let new_capacity = match self.capacity() {
            0 => 1,
            capacity => capacity.checked_mul(2).unwrap_or_else(|| {
                panic!("capacity overflow growing array of {}", type_name::<T>())
            }),
        };

        let mut new_block = MemoryBlock::<T>::with_capacity(new_capacity);

        // The new value goes straight into its final slot. If `f` panics, only the fresh block
        // is released and the array is untouched.
        let value = f();
        let new_slot = new_block.address_at_mut(index);

        // SAFETY: `index <= len < new_capacity`, so the slot is in bounds and uninitialized.
        unsafe {
            new_slot.write(value);
        }

        // Only a clone transfer can unwind; a move transfer is a plain memory copy.
        let new_value = scopeguard::guard(new_slot, |new_slot| {
            // SAFETY: The value was written above and the block never becomes ours.
            unsafe {
                ptr::drop_in_place(new_slot);
            }
        });

        let source = self.block.address_at(0);
        let destination = new_block.address_at_mut(0);

        // SAFETY: The prefix `[0, index)` is live and fits before the new value.
        unsafe {
            self.relocation.transfer(source, destination, index);
        }

        let prefix = scopeguard::guard(destination, |destination| {
            // SAFETY: The prefix was fully transferred and the block never becomes ours.
            unsafe {
                drop_slots(destination, index);
            }
        });

        let after_new = index
            .checked_add(1)
            .expect("guarded by index < new_capacity");
        let suffix_len = self
            .len
            .checked_sub(index)
            .expect("guarded by the bounds assertion in emplace()");

        // SAFETY: The suffix `[index, len)` is live and fits after the new value because
        // `len < new_capacity`.
        unsafe {
            self.relocation.transfer(
                source.wrapping_add(index),
                destination.wrapping_add(after_new),
                suffix_len,
            );
        }

        ScopeGuard::into_inner(prefix);
        ScopeGuard::into_inner(new_value);

        let new_len = self
            .len
            .checked_add(1)
            .expect("guarded by len < new_capacity");

        self.install(new_block, new_len);
    }

    fn emplace_in_place<F>(&mut self, index: usize, f: F)
    where
        F: FnOnce() -> T,
    {
        debug_assert!(self.len < self.capacity());

        // Build the value before touching the array so a panic leaves it unchanged.
        let value = f();

        let slot = self.block.address_at_mut(index);
        let next = slot.wrapping_add(1);
        let following = self
            .len
            .checked_sub(index)
            .expect("guarded by the bounds assertion in emplace()");

        // SAFETY: There is a free slot at `len`, so the live range `[index, len)` can move up by
        // one. Bitwise moves cannot fail, so no slot is observed while half-shifted.
        unsafe {
            ptr::copy(slot, next, following);
        }

        // SAFETY: The slot at `index` was vacated by the shift (or was the free slot at `len`).
        unsafe {
            slot.write(value);
        }

        // Cannot overflow because the array had a free slot.
        self.len = self.len.wrapping_add(1);
    }

    /// Makes `new_block`, whose first `new_len` slots are live, the storage of the array and
    /// releases the previous block. The previous elements are dropped first if the transfer
    /// into the new block left them live.
    fn install(&mut self, mut new_block: MemoryBlock<T>, new_len: usize) {
        let old_len = mem::replace(&mut self.len, 0);

        self.block.swap(&mut new_block);
        self.len = new_len;

        if self.relocation.leaves_sources_live() {
            // SAFETY: The previous elements were cloned, not moved, so they are still live and
            // nothing else refers to them.
            unsafe {
                drop_slots(new_block.address_at_mut(0), old_len);
            }
        }

        // `new_block` holds the previous storage now and releases it here.
    }

    /// Writes the values yielded by `values` into the slots following the live prefix and
    /// extends the live prefix over them once all are written.
    ///
    /// If the iterator panics, the values written so far are dropped and the length is
    /// unchanged.
    ///
    /// # Safety
    ///
    /// The iterator must not yield more values than there are free slots.
    unsafe fn construct_tail<I>(&mut self, values: I)
    where
        I: Iterator<Item = T>,
    {
        let first = self.block.address_at_mut(self.len);

        let mut constructed = scopeguard::guard(0_usize, |constructed| {
            // SAFETY: Exactly `constructed` values were written starting at `first` and they
            // never became part of the live prefix.
            unsafe {
                drop_slots(first, constructed);
            }
        });

        for (index, value) in values.enumerate() {
            debug_assert!(
                self.len
                    .checked_add(index)
                    .is_some_and(|slot| slot < self.capacity()),
                "more values than free slots"
            );

            let slot = first.wrapping_add(index);

            // SAFETY: The caller guarantees there is a free slot for every value.
            unsafe {
                slot.write(value);
            }

            *constructed = index
                .checked_add(1)
                .expect("guarded by the free slot count");
        }

        self.len = self
            .len
            .checked_add(ScopeGuard::into_inner(constructed))
            .expect("guarded by the free slot count");
    }
}

impl<T> Default for DynamicArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for DynamicArray<T> {
    fn drop(&mut self) {
        // SAFETY: The first `len` slots are live and nothing uses them after this.
        unsafe {
            drop_slots(self.block.address_at_mut(0), self.len);
        }

        // The block releases the memory when it is dropped after us.
    }
}

impl<T: Clone> Clone for DynamicArray<T> {
    /// Clones the array into a new block of exactly `len` slots. The clone has the same
    /// [`TransferPolicy`].
    ///
    /// If an element clone panics, the clones made so far are dropped and the partially built
    /// array never escapes.
    fn clone(&self) -> Self {
        let mut copy =
            Self::new_inner(self.len, self.relocation).unwrap_or_else(|e| e.raise::<T>());

        // SAFETY: The copy is empty with room for exactly `len` elements.
        unsafe {
            copy.construct_tail(self.iter().cloned());
        }

        copy
    }

    /// Makes the array a copy of `source`, reusing the existing storage where possible.
    ///
    /// If `source` does not fit into the current capacity, a full copy is built first and then
    /// swapped in, so a panicking clone leaves the array unchanged. Otherwise the overlapping
    /// elements are assigned via [`Clone::clone_from()`], any excess elements are dropped and
    /// any missing elements are cloned into the free slots.
    ///
    /// The array keeps its own [`TransferPolicy`].
    fn clone_from(&mut self, source: &Self) {
        if source.len > self.capacity() {
            let mut copy = source.clone();
            self.swap_with(&mut copy);
            return;
        }

        let overlap = self.len.min(source.len);

        let (source_head, source_tail) = source.split_at(overlap);
        let (head, _) = self.split_at_mut(overlap);
        head.clone_from_slice(source_head);

        self.truncate(source.len);

        // SAFETY: `source.len` fits into our capacity (checked above) and the length is
        // `overlap` here, so the tail fits into the free slots.
        unsafe {
            self.construct_tail(source_tail.iter().cloned());
        }
    }
}

impl<T> Deref for DynamicArray<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for DynamicArray<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> AsRef<[T]> for DynamicArray<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> AsMut<[T]> for DynamicArray<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Extend<T> for DynamicArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();

        let (lower_bound, _) = iter.size_hint();
        self.reserve(self.len.saturating_add(lower_bound));

        for value in iter {
            self.push(value);
        }
    }
}

impl<T> FromIterator<T> for DynamicArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}

impl<'a, T> IntoIterator for &'a DynamicArray<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynamicArray<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::cell::Cell;
    use std::fmt::Debug;
    use std::panic::{self, AssertUnwindSafe};
    use std::rc::Rc;

    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;

    assert_impl_all!(DynamicArray<u32>: Send, Sync, Debug, Default, Clone);
    assert_not_impl_any!(DynamicArray<Rc<u32>>: Send, Sync);

    /// Counts live instances and panics once the per-thread default budget runs out.
    #[derive(Debug)]
    struct Counted {
        live: Rc<Cell<usize>>,
    }

    thread_local! {
        static DEFAULT_BUDGET: Cell<usize> = const { Cell::new(usize::MAX) };
        static DEFAULT_LIVE: Rc<Cell<usize>> = Rc::new(Cell::new(0));
    }

    impl Default for Counted {
        fn default() -> Self {
            let budget = DEFAULT_BUDGET.with(Cell::get);
            assert!(budget > 0, "default budget exhausted");
            DEFAULT_BUDGET.with(|b| b.set(budget - 1));

            let live = DEFAULT_LIVE.with(Rc::clone);
            live.set(live.get() + 1);

            Self { live }
        }
    }

    impl Drop for Counted {
        fn drop(&mut self) {
            self.live.set(self.live.get() - 1);
        }
    }

    fn live_counted() -> usize {
        DEFAULT_LIVE.with(|live| live.get())
    }

    #[test]
    fn new_does_not_allocate() {
        let array = DynamicArray::<u64>::new();

        assert_eq!(array.len(), 0);
        assert_eq!(array.capacity(), 0);
        assert!(array.is_empty());
        assert!(array.as_slice().is_empty());
    }

    #[test]
    fn with_len_default_constructs() {
        let array = DynamicArray::<i32>::with_len(5);

        assert_eq!(array.len(), 5);
        assert_eq!(array.capacity(), 5);
        assert_eq!(array.as_slice(), &[0; 5]);
    }

    #[test]
    fn with_len_panic_drops_constructed() {
        DEFAULT_BUDGET.with(|b| b.set(3));

        let result = panic::catch_unwind(|| DynamicArray::<Counted>::with_len(5));

        DEFAULT_BUDGET.with(|b| b.set(usize::MAX));

        assert!(result.is_err());
        assert_eq!(live_counted(), 0);
    }

    #[test]
    fn resize_panic_keeps_length() {
        let mut array = DynamicArray::<Counted>::with_len(2);
        assert_eq!(live_counted(), 2);

        DEFAULT_BUDGET.with(|b| b.set(2));

        let result = panic::catch_unwind(AssertUnwindSafe(|| array.resize(6)));

        DEFAULT_BUDGET.with(|b| b.set(usize::MAX));

        assert!(result.is_err());
        assert_eq!(array.len(), 2);
        assert_eq!(live_counted(), 2);

        drop(array);
        assert_eq!(live_counted(), 0);
    }

    #[test]
    fn growth_doubles_capacity() {
        let mut array = DynamicArray::new();
        let mut observed = vec![array.capacity()];

        for value in 0..9 {
            array.push(value);

            if observed.last() != Some(&array.capacity()) {
                observed.push(array.capacity());
            }
        }

        assert_eq!(observed, [0, 1, 2, 4, 8, 16]);
    }

    #[test]
    fn reserve_is_exact_and_monotonic() {
        let mut array = DynamicArray::<u8>::new();

        array.reserve(10);
        assert_eq!(array.capacity(), 10);

        array.reserve(3);
        assert_eq!(array.capacity(), 10);
        assert_eq!(array.len(), 0);
    }

    #[test]
    fn truncate_longer_is_noop() {
        let mut array: DynamicArray<_> = (0..3).collect();

        array.truncate(10);

        assert_eq!(array.as_slice(), &[0, 1, 2]);
    }

    #[test]
    fn emplace_in_place_shifts_suffix() {
        let mut array = DynamicArray::with_capacity(4);
        array.push(1);
        array.push(2);
        array.push(3);

        let inserted = array.emplace(1, || 9);
        assert_eq!(*inserted, 9);

        assert_eq!(array.capacity(), 4);
        assert_eq!(array.as_slice(), &[1, 9, 2, 3]);
    }

    #[test]
    fn emplace_reallocating_places_value() {
        let mut array = DynamicArray::with_capacity(2);
        array.push("a".to_string());
        array.push("c".to_string());

        _ = array.emplace(1, || "b".to_string());

        assert_eq!(array.capacity(), 4);
        assert_eq!(array.as_slice(), &["a", "b", "c"]);
    }

    #[test]
    fn panicking_emplace_leaves_array_unchanged() {
        for capacity in [3, 4] {
            let mut array = DynamicArray::with_capacity(capacity);
            array.extend(["a".to_string(), "b".to_string(), "c".to_string()]);

            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                _ = array.emplace(1, || panic!("construction failed"));
            }));

            assert!(result.is_err());
            assert_eq!(array.capacity(), capacity);
            assert_eq!(array.as_slice(), &["a", "b", "c"]);
        }
    }

    #[test]
    #[should_panic]
    fn emplace_past_end_panics() {
        let mut array = DynamicArray::<u32>::new();
        _ = array.emplace(1, || 5);
    }

    #[test]
    fn erase_on_empty_is_noop() {
        let mut array = DynamicArray::<u32>::new();

        assert_eq!(array.erase(0), None);
        assert_eq!(array.erase(100), None);
    }

    #[test]
    #[should_panic]
    fn erase_past_end_panics() {
        let mut array: DynamicArray<_> = (0..3).collect();
        _ = array.erase(3);
    }

    #[test]
    fn swap_with_keeps_policies() {
        let mut a = DynamicArray::<String>::builder()
            .transfer_policy(TransferPolicy::CloneThenDrop)
            .build();
        a.push("x".to_string());

        let mut b = DynamicArray::<String>::new();

        a.swap_with(&mut b);

        assert!(a.is_empty());
        assert_eq!(b.as_slice(), &["x"]);
        assert_eq!(a.transfer_policy(), TransferPolicy::CloneThenDrop);
        assert_eq!(b.transfer_policy(), TransferPolicy::Move);
    }

    #[test]
    fn take_keeps_policy() {
        let mut array = DynamicArray::<u8>::builder()
            .transfer_policy(TransferPolicy::CloneThenDrop)
            .build();
        array.push(1);

        let taken = array.take();

        assert_eq!(taken.as_slice(), &[1]);
        assert_eq!(taken.transfer_policy(), TransferPolicy::CloneThenDrop);
        assert_eq!(array.capacity(), 0);
    }

    #[test]
    fn debug_prints_as_list() {
        let array: DynamicArray<_> = [1, 2].into_iter().collect();

        assert_eq!(format!("{array:?}"), "[1, 2]");
    }

    #[test]
    fn zero_sized_elements() {
        let mut array = DynamicArray::<()>::new();

        for _ in 0..100 {
            array.push(());
        }

        assert_eq!(array.len(), 100);
        assert_eq!(array.erase(50), Some(()));
        assert_eq!(array.pop(), Some(()));
        assert_eq!(array.len(), 98);
    }

    #[test]
    fn is_covariant_in_element_type() {
        fn shorten<'a>(array: DynamicArray<&'static str>) -> DynamicArray<&'a str> {
            array
        }

        let local = String::from("local");

        let mut array = shorten(
            DynamicArray::<&'static str>::builder()
                .transfer_policy(TransferPolicy::CloneThenDrop)
                .build(),
        );
        array.push("static");
        array.push(&local);
        array.push(&local);

        assert_eq!(array.as_slice(), &["static", "local", "local"]);
        assert_eq!(array.capacity(), 4);
        assert_eq!(array.transfer_policy(), TransferPolicy::CloneThenDrop);
    }

    #[test]
    fn erase_last_and_middle_keep_order() {
        let mut array: DynamicArray<_> = (0..5).collect();

        assert_eq!(array.erase(4), Some(4));
        assert_eq!(array.erase(1), Some(1));
        assert_eq!(array.as_slice(), &[0, 2, 3]);
        assert_eq!(array.len(), 3);
    }
}
