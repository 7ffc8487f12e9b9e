use std::{fmt, ptr};

use crate::TransferPolicy;

/// Clones the `T` at the first pointer into the uninitialized slot at the second.
type CloneFn = unsafe fn(*const (), *mut ());

/// The transfer engine behind [`TransferPolicy`]. The public enum cannot carry the clone
/// function because the policy is offered for `T: Clone` only, while the array itself
/// works with any `T`. We capture the clone function when the policy is chosen instead.
///
/// The clone function is stored with its element type erased, so holding a relocation does
/// not make the owner invariant in `T`.
#[derive(Clone, Copy)]
pub(crate) enum Relocation {
    Move,
    Clone(CloneFn),
}

impl Relocation {
    #[must_use]
    pub(crate) fn from_policy<T: Clone>(policy: TransferPolicy) -> Self {
        match policy {
            TransferPolicy::Move => Self::Move,
            TransferPolicy::CloneThenDrop => Self::Clone(clone_into::<T>),
        }
    }

    #[must_use]
    pub(crate) fn policy(self) -> TransferPolicy {
        match self {
            Self::Move => TransferPolicy::Move,
            Self::Clone(_) => TransferPolicy::CloneThenDrop,
        }
    }

    /// Whether the source values remain live after a transfer, in which case the caller must
    /// still drop them.
    #[must_use]
    pub(crate) fn leaves_sources_live(self) -> bool {
        matches!(self, Self::Clone(_))
    }

    /// Transfers `count` live values starting at `source` into the uninitialized slots starting
    /// at `destination`.
    ///
    /// After a move transfer the source slots are logically uninitialized and must not be
    /// dropped. After a clone transfer the sources are untouched and still live.
    ///
    /// If a clone panics, the clones already written to `destination` are dropped before the
    /// panic propagates, so the destination slots are all uninitialized again.
    ///
    /// # Safety
    ///
    /// `source` must point to `count` live values and `destination` to `count` writable,
    /// uninitialized slots. The two ranges must not overlap. The relocation must have been
    /// created for the same `T`.
    pub(crate) unsafe fn transfer<T>(self, source: *const T, destination: *mut T, count: usize) {
        match self {
            Self::Move => {
                // SAFETY: Forwarding the caller's guarantees.
                unsafe {
                    ptr::copy_nonoverlapping(source, destination, count);
                }
            }
            Self::Clone(clone) => {
                let mut written = scopeguard::guard(0_usize, |written| {
                    // SAFETY: Exactly `written` clones were placed at the start of
                    // `destination` and nothing else refers to them yet.
                    unsafe {
                        drop_slots(destination, written);
                    }
                });

                for index in 0..count {
                    let original = source.wrapping_add(index);
                    let slot = destination.wrapping_add(index);

                    // SAFETY: The caller guarantees `count` live values at `source`, `count`
                    // writable slots at `destination` and that `clone` was made for `T`.
                    unsafe {
                        clone(original.cast(), slot.cast());
                    }

                    *written = index
                        .checked_add(1)
                        .expect("guarded by count being a valid slot count");
                }

                scopeguard::ScopeGuard::into_inner(written);
            }
        }
    }
}

/// # Safety
///
/// `source` must point to a live `T` and `destination` to a writable, uninitialized slot
/// for a `T`.
unsafe fn clone_into<T: Clone>(source: *const (), destination: *mut ()) {
    // SAFETY: Forwarding the caller's guarantees.
    let original = unsafe { &*source.cast::<T>() };
    let value = original.clone();

    // SAFETY: Forwarding the caller's guarantees.
    unsafe {
        destination.cast::<T>().write(value);
    }
}

impl fmt::Debug for Relocation {
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.policy(), f)
    }
}

/// Drops `count` live values starting at `first`, leaving the slots uninitialized.
///
/// # Safety
///
/// `first` must point to `count` live values that nothing else will use or drop afterwards.
pub(crate) unsafe fn drop_slots<T>(first: *mut T, count: usize) {
    // SAFETY: Forwarding the caller's guarantees.
    unsafe {
        ptr::drop_in_place(ptr::slice_from_raw_parts_mut(first, count));
    }
}
