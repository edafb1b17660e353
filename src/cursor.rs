//! Logical cursor arithmetic and the places cursors can live.
//!
//! # Overview
//! - A ring is described by two monotonically increasing `u64` positions: `read` and `write`.
//! - `write - read` is the occupancy; it never exceeds the capacity at an observation point.
//! - Physical slots are derived (`pos % capacity`), never stored.
//! - An optional threshold periodically shifts both cursors down to bound their magnitude.
//!
//! # Cursor locations
//! A [`RingShell`](crate::RingShell) does not care where its cursors are stored, only that it
//! can load and store them through [`CursorSlots`]:
//! - [`Cursors`]: a plain owned pair (also usable as `&mut Cursors` to bind caller-owned cursors).
//! - [`SharedCursors`]: a `Cell`-backed pair that several shells, or a shell and outside code in
//!   the same execution context, can observe and advance through a shared reference.

use core::cell::Cell;
use core::num::NonZeroU64;

/// Number of readable elements between `read` and `write`.
///
/// An inverted pair (`write < read`) reports zero rather than wrapping.
#[inline]
pub const fn occupancy(read: u64, write: u64) -> u64 {
    write.saturating_sub(read)
}

/// Room left before the next `put` starts evicting.
#[inline]
pub const fn free_space(read: u64, write: u64, capacity: u64) -> u64 {
    capacity.saturating_sub(occupancy(read, write))
}

/// Unread elements lost to overflow correction: occupancy beyond `capacity`.
#[inline]
pub const fn evicted(read: u64, write: u64, capacity: u64) -> u64 {
    occupancy(read, write).saturating_sub(capacity)
}

#[inline]
pub const fn is_readable(pos: u64, write: u64) -> bool {
    pos < write
}

/// Storage slot for a logical position.
///
/// `capacity` must be nonzero.
#[inline]
pub const fn to_physical(pos: u64, capacity: u64) -> usize {
    (pos % capacity) as usize
}

/// Applies the self-correction every read path runs before touching storage.
///
/// In order:
/// 1. an inverted pair collapses to empty (`read = write`);
/// 2. overflow correction: if occupancy exceeds `capacity`, `read` jumps to `write - capacity`;
/// 3. renormalization: if `read > threshold`, both cursors drop by `threshold`.
///
/// Overflow correction runs first so the subtraction in step 3 never leaves `write < read`.
#[inline]
pub const fn normalize(
    read: u64,
    write: u64,
    capacity: u64,
    threshold: Option<NonZeroU64>,
) -> (u64, u64) {
    let mut read = if write < read { write } else { read };
    let mut write = write;

    if write - read > capacity {
        read = write - capacity;
    }

    if let Some(threshold) = threshold {
        let threshold = threshold.get();
        if read > threshold {
            read -= threshold;
            write -= threshold;
        }
    }

    (read, write)
}

/// Threshold actually applied for a requested value: rounded up to a multiple of `capacity` so a
/// shift keeps every logical position on its physical slot. `0` (or zero capacity) disables it.
pub(crate) fn effective_threshold(threshold: u64, capacity: u64) -> Option<NonZeroU64> {
    if capacity == 0 {
        return None;
    }
    NonZeroU64::new(threshold.div_ceil(capacity).saturating_mul(capacity))
}

/// Load/store access to a read and a write cursor.
///
/// Implementations only move values in and out; all arithmetic lives in the shell.
pub trait CursorSlots {
    fn read(&self) -> u64;
    fn write(&self) -> u64;
    fn set_read(&mut self, pos: u64);
    fn set_write(&mut self, pos: u64);

    /// Copy of the current pair.
    #[inline]
    fn snapshot(&self) -> Cursors {
        Cursors {
            read: self.read(),
            write: self.write(),
        }
    }
}

/// Owned cursor pair.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cursors {
    read: u64,
    write: u64,
}

impl Cursors {
    /// Both cursors at zero.
    pub const fn new() -> Self {
        Self { read: 0, write: 0 }
    }

    /// A pair at an arbitrary position, e.g. restored from memory shared with another context.
    ///
    /// No validation happens here; an inverted or overfull pair is corrected on the next read.
    pub const fn at(read: u64, write: u64) -> Self {
        Self { read, write }
    }

    #[inline]
    pub const fn read_pos(&self) -> u64 {
        self.read
    }

    #[inline]
    pub const fn write_pos(&self) -> u64 {
        self.write
    }

    #[inline]
    pub const fn occupancy(&self) -> u64 {
        occupancy(self.read, self.write)
    }

    #[inline]
    pub const fn free_space(&self, capacity: u64) -> u64 {
        free_space(self.read, self.write, capacity)
    }

    #[inline]
    pub const fn is_readable(&self, pos: u64) -> bool {
        is_readable(pos, self.write)
    }
}

impl CursorSlots for Cursors {
    #[inline]
    fn read(&self) -> u64 {
        self.read
    }

    #[inline]
    fn write(&self) -> u64 {
        self.write
    }

    #[inline]
    fn set_read(&mut self, pos: u64) {
        self.read = pos;
    }

    #[inline]
    fn set_write(&mut self, pos: u64) {
        self.write = pos;
    }
}

impl CursorSlots for &mut Cursors {
    #[inline]
    fn read(&self) -> u64 {
        self.read
    }

    #[inline]
    fn write(&self) -> u64 {
        self.write
    }

    #[inline]
    fn set_read(&mut self, pos: u64) {
        self.read = pos;
    }

    #[inline]
    fn set_write(&mut self, pos: u64) {
        self.write = pos;
    }
}

/// Cursor pair shared by reference within one execution context.
///
/// Every holder of `&SharedCursors` sees the same positions. It is `!Sync`; for a producer and a
/// consumer on different threads or interrupt levels use [`SplitRing`](crate::SplitRing).
#[derive(Debug, Default)]
pub struct SharedCursors {
    read: Cell<u64>,
    write: Cell<u64>,
}

impl SharedCursors {
    pub const fn new() -> Self {
        Self::at(0, 0)
    }

    pub const fn at(read: u64, write: u64) -> Self {
        Self {
            read: Cell::new(read),
            write: Cell::new(write),
        }
    }

    #[inline]
    pub fn read_pos(&self) -> u64 {
        self.read.get()
    }

    #[inline]
    pub fn write_pos(&self) -> u64 {
        self.write.get()
    }

    /// Moves the write cursor forward by `n` without touching storage.
    ///
    /// Used when outside code (a DMA engine, a driver callback) has already filled the slots.
    /// Overflow is corrected by the next read through a shell.
    #[inline]
    pub fn commit_write(&self, n: u64) {
        self.write.set(self.write.get().saturating_add(n));
    }

    /// Moves the read cursor forward by at most `n`, stopping at the write cursor.
    #[inline]
    pub fn release_read(&self, n: u64) {
        let write = self.write.get();
        let read = self.read.get().saturating_add(n).min(write);
        self.read.set(read);
    }

    pub fn snapshot(&self) -> Cursors {
        Cursors::at(self.read.get(), self.write.get())
    }
}

impl CursorSlots for &SharedCursors {
    #[inline]
    fn read(&self) -> u64 {
        self.read.get()
    }

    #[inline]
    fn write(&self) -> u64 {
        self.write.get()
    }

    #[inline]
    fn set_read(&mut self, pos: u64) {
        self.read.set(pos);
    }

    #[inline]
    fn set_write(&mut self, pos: u64) {
        self.write.set(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(v: u64) -> Option<NonZeroU64> {
        NonZeroU64::new(v)
    }

    #[test]
    fn arithmetic_basics() {
        assert_eq!(occupancy(3, 10), 7);
        assert_eq!(free_space(3, 10, 8), 1);
        assert_eq!(free_space(0, 12, 8), 0);
        assert!(is_readable(9, 10));
        assert!(!is_readable(10, 10));
        assert_eq!(to_physical(13, 5), 3);
    }

    #[test]
    fn evicted_counts_only_the_overflow() {
        assert_eq!(evicted(0, 10, 4), 6);
        assert_eq!(evicted(2, 5, 4), 0);
        assert_eq!(evicted(10, 3, 4), 0);
    }

    #[test]
    fn inverted_pair_reads_as_empty() {
        assert_eq!(occupancy(10, 3), 0);
        assert_eq!(normalize(10, 3, 4, None), (3, 3));
    }

    #[test]
    fn normalize_corrects_overflow() {
        assert_eq!(normalize(0, 10, 4, None), (6, 10));
        assert_eq!(normalize(2, 5, 4, None), (2, 5));
    }

    #[test]
    fn normalize_shifts_past_threshold() {
        assert_eq!(normalize(21, 24, 4, nz(20)), (1, 4));
        // At the threshold exactly nothing moves.
        assert_eq!(normalize(20, 24, 4, nz(20)), (20, 24));
    }

    #[test]
    fn overflow_runs_before_threshold() {
        // read would be 30 after overflow correction, then shifted by 20.
        assert_eq!(normalize(0, 34, 4, nz(20)), (10, 14));
    }

    #[test]
    fn effective_threshold_is_a_capacity_multiple() {
        assert_eq!(effective_threshold(0, 4), None);
        assert_eq!(effective_threshold(9, 0), None);
        assert_eq!(effective_threshold(8, 4), nz(8));
        assert_eq!(effective_threshold(9, 4), nz(12));
        assert_eq!(effective_threshold(1, 7), nz(7));
    }

    #[test]
    fn shared_cursors_are_visible_through_every_reference() {
        let shared = SharedCursors::new();
        let mut a = &shared;
        let b = &shared;

        a.set_write(5);
        assert_eq!(b.write(), 5);

        shared.release_read(9);
        assert_eq!(shared.read_pos(), 5);

        shared.commit_write(3);
        assert_eq!(shared.snapshot(), Cursors::at(5, 8));
    }
}
