//! Ring view over caller-owned storage and caller-owned cursors.
//!
//! # Overview
//! - Storage is a borrowed `&mut [T]`; its length is the capacity and never changes.
//! - Cursors are anything implementing [`CursorSlots`]: an owned [`Cursors`], a `&mut Cursors`
//!   owned by the caller, or a `&SharedCursors` shared with other views.
//! - `put` never rejects: once full, the oldest unread element is evicted.
//! - `get`/`peek` past the write cursor return `T::default()` and leave the cursors alone.
//!
//! # Self-correction
//! `get`, `peek` and `length` first run [`normalize`]: overflow correction, then (if a threshold
//! is set) renormalization. `length` is therefore not purely observational. `end` is.
//!
//! # No error channel
//! Out-of-range reads are silently zeroed and overflowing writes silently drop old data. Use
//! `try_get`/`try_peek` to see the difference between a stored default and an empty ring.

use core::num::NonZeroU64;

use crate::cursor::{
    effective_threshold, evicted, normalize, occupancy, to_physical, CursorSlots, Cursors,
};
use crate::error::BindError;

#[derive(Debug)]
pub struct RingShell<'a, T, C = &'a mut Cursors> {
    storage: &'a mut [T],
    cursors: C,
    threshold: Option<NonZeroU64>,
}

impl<'a, T, C: CursorSlots> RingShell<'a, T, C> {
    /// Maps `storage` as a ring driven by `cursors`, with renormalization disabled.
    ///
    /// Existing cursor values are kept, so rebinding the same storage and cursors resumes where
    /// the previous view left off. Empty storage yields an uninitialized shell: writes are
    /// discarded and reads return `T::default()`.
    pub fn bind(storage: &'a mut [T], cursors: C) -> Self {
        Self {
            storage,
            cursors,
            threshold: None,
        }
    }

    /// Like [`bind`](Self::bind), but rejects empty storage and inverted cursors.
    pub fn try_bind(storage: &'a mut [T], cursors: C) -> Result<Self, BindError> {
        if storage.is_empty() {
            return Err(BindError::EmptyStorage);
        }
        let (read, write) = (cursors.read(), cursors.write());
        if write < read {
            return Err(BindError::InvertedCursors { read, write });
        }
        Ok(Self::bind(storage, cursors))
    }

    /// Sets the renormalization threshold. `0` disables it.
    ///
    /// The value is rounded up to a multiple of the capacity so that shifting both cursors keeps
    /// every logical position on the same physical slot.
    pub fn with_threshold(mut self, threshold: u64) -> Self {
        self.set_threshold(threshold);
        self
    }

    pub fn set_threshold(&mut self, threshold: u64) {
        self.threshold = effective_threshold(threshold, self.cap());
    }

    /// Binds with an already-rounded threshold; used by the owning wrappers on every call.
    #[inline]
    pub(crate) fn bind_with(
        storage: &'a mut [T],
        cursors: C,
        threshold: Option<NonZeroU64>,
    ) -> Self {
        Self {
            storage,
            cursors,
            threshold,
        }
    }

    pub fn threshold(&self) -> u64 {
        self.threshold.map_or(0, NonZeroU64::get)
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        !self.storage.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    fn cap(&self) -> u64 {
        self.storage.len() as u64
    }

    /// Readable element count, after self-correction.
    pub fn length(&mut self) -> usize {
        self.adjust();
        occupancy(self.cursors.read(), self.cursors.write()) as usize
    }

    /// Slots left before the next `put` evicts, after self-correction.
    pub fn free_space(&mut self) -> usize {
        self.capacity() - self.length()
    }

    /// `true` when nothing is readable. Does not self-correct.
    #[inline]
    pub fn end(&self) -> bool {
        self.cursors.read() >= self.cursors.write()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end()
    }

    /// Current cursor positions, without self-correction.
    pub fn cursors(&self) -> Cursors {
        self.cursors.snapshot()
    }

    /// Writes `value` at the write cursor and advances it, evicting the oldest element when full.
    pub fn put(&mut self, value: T) {
        if !self.is_initialized() {
            return;
        }
        let cap = self.cap();
        if self.cursors.write() == u64::MAX {
            self.rebase();
        }
        let write = self.cursors.write();
        self.storage[to_physical(write, cap)] = value;

        let write = write + 1;
        self.cursors.set_write(write);

        let read = self.cursors.read();
        if occupancy(read, write) > cap {
            ring_trace!("ring full, evicted {} unread", evicted(read, write, cap));
            self.cursors.set_read(write - cap);
        }
    }

    /// Shifts both cursors down by whole capacities so the write cursor can advance again.
    /// Only reachable with externally supplied cursors at the top of the `u64` range.
    fn rebase(&mut self) {
        let cap = self.cap();
        let (read, write) = normalize(self.cursors.read(), self.cursors.write(), cap, None);
        let shift = read - read % cap;
        ring_debug!("cursors at the u64 limit, rebased by {}", shift);
        self.cursors.set_read(read - shift);
        self.cursors.set_write(write - shift);
    }

    /// Writes `value` at `offset` slots past the write cursor without moving any cursor.
    ///
    /// Pair with a later `put` or a cursor commit to publish the slot.
    pub fn poke(&mut self, offset: usize, value: T) {
        if !self.is_initialized() {
            return;
        }
        let pos = self.cursors.write().wrapping_add(offset as u64);
        self.storage[to_physical(pos, self.cap())] = value;
    }

    /// Discards up to `n` readable elements and returns how many were discarded.
    pub fn skip(&mut self, n: usize) -> usize {
        let skipped = n.min(self.length());
        let read = self.cursors.read();
        self.cursors.set_read(read + skipped as u64);
        skipped
    }

    /// Discards every readable element.
    pub fn clear(&mut self) {
        let write = self.cursors.write();
        self.cursors.set_read(write);
    }

    fn adjust(&mut self) {
        let (read, write) = (self.cursors.read(), self.cursors.write());
        let (new_read, new_write) = normalize(read, write, self.cap(), self.threshold);

        let dropped = evicted(read, write, self.cap());
        if dropped > 0 {
            ring_trace!("ring overfull, dropped {} unread", dropped);
        }
        if new_write != write {
            ring_debug!("renormalized cursors by {}", write - new_write);
            self.cursors.set_write(new_write);
        }
        if new_read != read {
            self.cursors.set_read(new_read);
        }
    }
}

impl<T: Clone + Default, C: CursorSlots> RingShell<'_, T, C> {
    /// Reads and consumes the element at the read cursor, or `T::default()` when empty.
    #[inline]
    pub fn get(&mut self) -> T {
        self.try_get().unwrap_or_default()
    }

    /// Reads `offset` elements past the read cursor without consuming, or `T::default()`.
    #[inline]
    pub fn peek(&mut self, offset: usize) -> T {
        self.try_peek(offset).unwrap_or_default()
    }

    pub fn try_get(&mut self) -> Option<T> {
        self.adjust();
        let read = self.cursors.read();
        if read >= self.cursors.write() {
            return None;
        }
        let value = self.storage[to_physical(read, self.cap())].clone();
        self.cursors.set_read(read + 1);
        Some(value)
    }

    pub fn try_peek(&mut self, offset: usize) -> Option<T> {
        self.adjust();
        let pos = self.cursors.read().checked_add(offset as u64)?;
        if pos >= self.cursors.write() {
            return None;
        }
        Some(self.storage[to_physical(pos, self.cap())].clone())
    }

    /// `put`s every element of `values`; always consumes all of them.
    pub fn put_slice(&mut self, values: &[T]) -> usize {
        for value in values {
            self.put(value.clone());
        }
        values.len()
    }

    /// `get`s into `out` until it is full or the ring is empty; returns the count read.
    pub fn get_slice(&mut self, out: &mut [T]) -> usize {
        let mut read = 0;
        while read < out.len() {
            match self.try_get() {
                Some(value) => out[read] = value,
                None => break,
            }
            read += 1;
        }
        read
    }
}
