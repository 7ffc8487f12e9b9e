/// Determines how live elements are carried over when a
/// [`DynamicArray`][crate::DynamicArray] moves to a larger block of storage.
///
/// Relocation happens on growth: in [`reserve()`][crate::DynamicArray::reserve],
/// [`resize()`][crate::DynamicArray::resize] and when an insertion finds the array full.
///
/// By default, elements are moved. A Rust move is a bitwise copy that cannot fail partway,
/// so growth can never leave the array torn and this is the right choice for nearly every type.
///
/// # Examples
///
/// ```
/// use dyn_array::{DynamicArray, TransferPolicy};
///
/// // The transfer policy is set at array creation time.
/// let array = DynamicArray::<String>::builder()
///     .transfer_policy(TransferPolicy::CloneThenDrop)
///     .build();
///
/// assert_eq!(array.transfer_policy(), TransferPolicy::CloneThenDrop);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum TransferPolicy {
    /// Elements are moved into the new block. This is the default.
    #[default]
    Move,

    /// Each element is cloned into the new block and the originals are dropped only once every
    /// clone has succeeded. If a clone panics, the clones made so far are dropped and the array
    /// keeps its original block and elements.
    ///
    /// This is only available for element types that implement [`Clone`]. It is meant for
    /// types that need to observe relocation through their `Clone` and `Drop` implementations.
    CloneThenDrop,
}
