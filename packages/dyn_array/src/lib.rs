#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A growable contiguous array built from two cooperating parts: a block of raw storage and an
//! owner that tracks which slots hold live values.
//!
//! This crate provides [`DynamicArray`], a dynamically growing array with the familiar
//! `Vec`-like contract, implemented on top of [`MemoryBlock`], which owns raw, uninitialized
//! memory and nothing else. Keeping memory ownership separate from element lifetime makes the
//! growth, insertion and assignment paths explicit about when values are constructed, moved,
//! cloned and dropped.
//!
//! # Key Features
//!
//! - **Separated ownership**: [`MemoryBlock`] allocates and releases storage, [`DynamicArray`]
//!   constructs and drops the elements within it
//! - **Transactional growth**: a new block is populated in isolation and swapped in only once
//!   the transfer is complete; the old block is released afterwards
//! - **Panic safety**: bulk construction (with a length, cloning, resizing) either completes or
//!   drops whatever it constructed and leaves the array as it was
//! - **Single construction on insert**: when an insertion triggers growth, the new element is
//!   written directly into its final slot in the new block
//! - **Configurable transfer**: [`TransferPolicy`] chooses between moving (default) and
//!   cloning elements into a new block
//! - **Fallible allocation**: `try_` methods return an [`Error`] instead of panicking
//! - **Slice access**: the array dereferences to `[T]`
//!
//! # Examples
//!
//! ## Basic usage
//!
//! ```rust
//! use dyn_array::DynamicArray;
//!
//! let mut array = DynamicArray::new();
//! assert_eq!(array.capacity(), 0);
//!
//! array.push("first".to_string());
//! array.push("second".to_string());
//!
//! // Capacity doubles as the array fills up.
//! assert_eq!(array.capacity(), 2);
//!
//! array.insert(1, "between".to_string());
//! assert_eq!(array.capacity(), 4);
//! assert_eq!(array.as_slice(), &["first", "between", "second"]);
//!
//! let removed = array.erase(0);
//! assert_eq!(removed.as_deref(), Some("first"));
//! ```
//!
//! ## Sizing up front
//!
//! ```rust
//! use dyn_array::DynamicArray;
//!
//! let mut array = DynamicArray::<u32>::with_len(3);
//! assert_eq!(array.as_slice(), &[0, 0, 0]);
//!
//! array.reserve(10);
//! assert_eq!(array.capacity(), 10);
//!
//! array.resize(5);
//! assert_eq!(array.as_slice(), &[0, 0, 0, 0, 0]);
//!
//! array.resize(1);
//! assert_eq!(array.len(), 1);
//! assert_eq!(array.capacity(), 10);
//! ```
//!
//! ## Working with raw storage
//!
//! ```rust
//! use dyn_array::MemoryBlock;
//!
//! let mut block = MemoryBlock::<String>::with_capacity(2);
//!
//! // Slot 0 is within capacity. We drop the value ourselves because
//! // the block never drops slot contents.
//! unsafe {
//!     block.address_at_mut(0).write("owned by us".to_string());
//!     block.address_at_mut(0).drop_in_place();
//! }
//! ```

mod builder;
mod dynamic_array;
mod error;
mod into_iter;
mod memory_block;
mod relocation;
mod transfer_policy;

pub use builder::*;
pub use dynamic_array::DynamicArray;
pub use error::Error;
pub(crate) use error::Result;
pub use into_iter::IntoIter;
pub use memory_block::MemoryBlock;
pub(crate) use relocation::*;
pub use transfer_policy::*;
