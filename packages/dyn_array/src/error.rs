use std::alloc::{Layout, handle_alloc_error};
use std::any::type_name;
use std::result;

use thiserror::Error;

/// Errors that can occur when acquiring storage for a [`DynamicArray`][crate::DynamicArray]
/// or a [`MemoryBlock`][crate::MemoryBlock].
///
/// Only the `try_` family of methods returns this error. The infallible counterparts panic
/// on capacity overflow and defer to [`handle_alloc_error()`] if the allocator fails.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The requested number of slots cannot be represented as a memory layout because the
    /// total size in bytes would overflow `isize::MAX`.
    #[error("capacity overflow: cannot lay out {requested} slots")]
    CapacityOverflow {
        /// The number of slots that was requested.
        requested: usize,
    },

    /// The global allocator could not provide a block of the requested layout.
    #[error("memory allocation of {} bytes failed", .layout.size())]
    AllocationFailed {
        /// The layout of the block that could not be allocated.
        layout: Layout,
    },
}

impl Error {
    /// Converts the error into the failure mode used by the infallible methods.
    pub(crate) fn raise<T>(self) -> ! {
        match self {
            Self::CapacityOverflow { requested } => panic!(
                "capacity overflow: cannot lay out {requested} slots of {}",
                type_name::<T>()
            ),
            Self::AllocationFailed { layout } => handle_alloc_error(layout),
        }
    }
}

/// A specialized `Result` type for storage operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = result::Result<T, Error>;
