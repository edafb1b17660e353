//! Errors from the checked constructors.
//!
//! Ring operations themselves never fail: reads past the write cursor yield `T::default()` and
//! writes past capacity evict the oldest element. Only binding storage can be rejected, and only
//! through the `try_*` constructors.

use thiserror::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BindError {
    /// The storage region has no slots.
    #[error("storage has zero capacity")]
    EmptyStorage,
    /// The write cursor is behind the read cursor.
    #[error("write cursor {write} is behind read cursor {read}")]
    InvertedCursors { read: u64, write: u64 },
    /// The storage has more slots than the cursor width can address.
    #[error("capacity {capacity} exceeds what 32-bit cursors can address")]
    CapacityTooLarge { capacity: usize },
}
