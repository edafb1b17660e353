//! Lock-free SPSC overwrite ring with the producer and consumer in different contexts.
//!
//! # Overview
//! - One producer, one consumer, handed out together by [`SplitRing::split`].
//! - The producer owns the write cursor and never looks at the read cursor; it never blocks.
//! - The consumer owns the read cursor and performs the overwrite-on-full correction itself:
//!   if it lags by more than `N`, it skips ahead and counts the dropped elements.
//! - Cursors are `u64` logical positions, as in [`RingShell`](crate::RingShell). There is no
//!   threshold renormalization: the two cursors belong to different contexts and cannot be
//!   shifted together atomically.
//!
//! # Memory ordering
//! Each slot carries a stamp (`pos + 1` of the element it holds, `0` while being written). The
//! producer clears the stamp, writes the value, restamps the slot, then publishes the write
//! cursor. The consumer checks the stamp before and after copying the value, so a slot
//! overwritten mid-read is reported as a drop instead of a torn value.
//!
//! With the `portable-atomic` feature the cursors use `portable_atomic::AtomicU64`, for targets
//! without native 64-bit atomics.

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::sync::atomic::{fence, Ordering};

#[cfg(not(feature = "portable-atomic"))]
use core::sync::atomic::AtomicU64;
#[cfg(feature = "portable-atomic")]
use portable_atomic::AtomicU64;

use crate::cursor::Cursors;

fn atomic_u64_array<const N: usize>(init: u64) -> [AtomicU64; N] {
    core::array::from_fn(|_| AtomicU64::new(init))
}

fn unsafe_cell_array<T, const N: usize>() -> [UnsafeCell<MaybeUninit<T>>; N] {
    core::array::from_fn(|_| UnsafeCell::new(MaybeUninit::uninit()))
}

#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DrainStats {
    pub read: usize,
    pub dropped: u64,
    /// Write cursor observed at the end of the drain.
    pub write: u64,
}

pub struct SplitRing<T: Copy, const N: usize> {
    write: AtomicU64,
    read: AtomicU64,
    stamps: [AtomicU64; N],
    slots: [UnsafeCell<MaybeUninit<T>>; N],
}

unsafe impl<T: Copy + Send, const N: usize> Sync for SplitRing<T, N> {}

impl<T: Copy, const N: usize> SplitRing<T, N> {
    pub fn new() -> Self {
        const { assert!(N > 0, "ring capacity must be nonzero") };
        Self {
            write: AtomicU64::new(0),
            read: AtomicU64::new(0),
            stamps: atomic_u64_array::<N>(0),
            slots: unsafe_cell_array::<T, N>(),
        }
    }

    #[inline(always)]
    const fn idx_for(pos: u64) -> usize {
        (pos % N as u64) as usize
    }

    /// Hands out the producer and the consumer. The exclusive borrow keeps it to one of each.
    pub fn split(&mut self) -> (Producer<'_, T, N>, Consumer<'_, T, N>) {
        let ring = &*self;
        let read = ring.read.load(Ordering::Relaxed);
        (
            Producer { ring },
            Consumer {
                ring,
                read,
                dropped: 0,
            },
        )
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Cursor positions as seen from outside either handle.
    pub fn cursors(&self) -> Cursors {
        let read = self.read.load(Ordering::Acquire);
        let write = self.write.load(Ordering::Acquire);
        Cursors::at(read, write)
    }

    /// Readable element count as seen from outside either handle, capped at `N`.
    pub fn len(&self) -> usize {
        self.cursors().occupancy().min(N as u64) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    fn newest(&self) -> u64 {
        self.write.load(Ordering::Acquire)
    }

    #[inline]
    fn put_inner(&self, value: T) -> u64 {
        let pos = self.write.load(Ordering::Relaxed);
        let idx = Self::idx_for(pos);

        self.stamps[idx].store(0, Ordering::Relaxed);
        fence(Ordering::Release);
        unsafe { (*self.slots[idx].get()).as_mut_ptr().write(value) };

        self.stamps[idx].store(pos + 1, Ordering::Release);
        self.write.store(pos + 1, Ordering::Release);
        pos
    }

    #[inline]
    fn read_at(&self, pos: u64) -> Option<T> {
        let idx = Self::idx_for(pos);

        let s1 = self.stamps[idx].load(Ordering::Acquire);
        if s1 != pos + 1 {
            return None;
        }

        let v = unsafe { (*self.slots[idx].get()).assume_init_read() };

        fence(Ordering::Acquire);
        let s2 = self.stamps[idx].load(Ordering::Relaxed);
        if s2 != s1 {
            return None;
        }

        Some(v)
    }
}

impl<T: Copy, const N: usize> Default for SplitRing<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Producer<'a, T: Copy, const N: usize> {
    ring: &'a SplitRing<T, N>,
}

impl<T: Copy, const N: usize> Producer<'_, T, N> {
    /// Publishes `value`, overwriting the oldest slot once the ring has wrapped.
    /// Returns the logical position written.
    #[inline]
    pub fn put(&mut self, value: T) -> u64 {
        self.ring.put_inner(value)
    }

    /// Publishes every element of `values`; returns `values.len()`.
    pub fn put_slice(&mut self, values: &[T]) -> usize {
        for &value in values {
            self.ring.put_inner(value);
        }
        values.len()
    }
}

pub struct Consumer<'a, T: Copy, const N: usize> {
    ring: &'a SplitRing<T, N>,
    read: u64,
    dropped: u64,
}

impl<T: Copy, const N: usize> Consumer<'_, T, N> {
    /// How many elements were lost to overwrite since creation (or since reset).
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    #[inline]
    pub fn reset_dropped(&mut self) {
        self.dropped = 0;
    }

    #[inline]
    fn commit(&mut self, read: u64) {
        self.read = read;
        self.ring.read.store(read, Ordering::Release);
    }

    /// Overwrite-on-full correction, consumer side. Returns the write cursor it saw.
    fn catch_up(&mut self) -> u64 {
        let write = self.ring.newest();
        let lag = write.saturating_sub(self.read);
        if lag > N as u64 {
            let keep_from = write - N as u64;
            let dropped = keep_from - self.read;
            ring_trace!("consumer lagged, skipped {} overwritten", dropped);
            self.dropped += dropped;
            self.commit(keep_from);
        }
        write
    }

    /// Readable element count, after catching up.
    pub fn len(&mut self) -> usize {
        let write = self.catch_up();
        (write - self.read) as usize
    }

    /// `true` when nothing is readable.
    pub fn is_empty(&self) -> bool {
        self.read >= self.ring.newest()
    }

    /// Consumes the oldest retained element, or `None` when empty.
    pub fn get(&mut self) -> Option<T> {
        loop {
            let write = self.catch_up();
            if self.read >= write {
                return None;
            }

            let pos = self.read;
            self.commit(pos + 1);
            match self.ring.read_at(pos) {
                Some(v) => return Some(v),
                None => self.dropped += 1,
            }
        }
    }

    /// Like [`get`](Self::get), but yields `T::default()` when empty.
    #[inline]
    pub fn get_or_default(&mut self) -> T
    where
        T: Default,
    {
        self.get().unwrap_or_default()
    }

    /// Reads `offset` elements past the read cursor without consuming.
    ///
    /// `None` when out of range, or when the slot was overwritten during the read.
    pub fn peek(&mut self, offset: usize) -> Option<T> {
        let write = self.catch_up();
        let pos = self.read.checked_add(offset as u64)?;
        if pos >= write {
            return None;
        }
        self.ring.read_at(pos)
    }

    /// Drains at most `max` elements in order, handing each to `hook` with its logical position.
    pub fn drain_up_to(&mut self, max: usize, mut hook: impl FnMut(u64, &T)) -> DrainStats {
        let before = self.dropped;
        let mut read = 0usize;

        while read < max {
            let write = self.catch_up();
            if self.read >= write {
                break;
            }

            let pos = self.read;
            self.commit(pos + 1);
            match self.ring.read_at(pos) {
                Some(v) => {
                    hook(pos, &v);
                    read += 1;
                }
                None => self.dropped += 1,
            }
        }

        DrainStats {
            read,
            dropped: self.dropped - before,
            write: self.ring.newest(),
        }
    }

    /// Fast-forwards so the next `get` yields the newest element, skipping the backlog.
    pub fn skip_to_latest(&mut self) {
        let write = self.ring.newest();
        if write > self.read + 1 {
            self.commit(write - 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SplitRing;
    use std::vec::Vec;

    #[test]
    fn get_on_empty_returns_none() {
        let mut ring = SplitRing::<u32, 4>::new();
        let (_producer, mut consumer) = ring.split();
        assert_eq!(consumer.get(), None);
        assert_eq!(consumer.get_or_default(), 0);
        assert!(consumer.is_empty());
    }

    #[test]
    fn gets_in_order() {
        let mut ring = SplitRing::<u32, 8>::new();
        let (mut producer, mut consumer) = ring.split();

        producer.put(10);
        producer.put(11);
        producer.put(12);

        let mut seen = Vec::new();
        let stats = consumer.drain_up_to(10, |pos, v| seen.push((pos, *v)));

        assert_eq!(stats.read, 3);
        assert_eq!(stats.dropped, 0);
        assert_eq!(stats.write, 3);
        assert_eq!(&seen[..], &[(0, 10), (1, 11), (2, 12)]);
    }

    #[test]
    fn drops_when_consumer_lags() {
        let mut ring = SplitRing::<u32, 4>::new();
        let (mut producer, mut consumer) = ring.split();

        for i in 0..10 {
            producer.put(i);
        }

        assert_eq!(consumer.len(), 4);
        assert_eq!(consumer.dropped(), 6);

        let mut seen = Vec::new();
        while let Some(v) = consumer.get() {
            seen.push(v);
        }
        assert_eq!(seen, [6, 7, 8, 9]);
        consumer.reset_dropped();
        assert_eq!(consumer.dropped(), 0);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut ring = SplitRing::<u8, 4>::new();
        let (mut producer, mut consumer) = ring.split();
        producer.put_slice(&[1, 2, 3]);

        assert_eq!(consumer.peek(2), Some(3));
        assert_eq!(consumer.peek(3), None);
        assert_eq!(consumer.get(), Some(1));
    }

    #[test]
    fn skip_to_latest_makes_next_get_newest() {
        let mut ring = SplitRing::<u32, 8>::new();
        let (mut producer, mut consumer) = ring.split();

        producer.put(10);
        producer.put(11);
        producer.put(12);

        consumer.skip_to_latest();
        assert_eq!(consumer.get(), Some(12));
        assert_eq!(consumer.get(), None);
    }

    #[test]
    fn observer_view_tracks_both_cursors() {
        let mut ring = SplitRing::<u16, 4>::new();
        {
            let (mut producer, mut consumer) = ring.split();
            producer.put_slice(&[1, 2, 3]);
            consumer.get();
        }
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.cursors().read_pos(), 1);

        // A fresh split resumes from the stored read cursor.
        let (_producer, mut consumer) = ring.split();
        assert_eq!(consumer.get(), Some(2));
    }

    #[test]
    fn threaded_producer_and_consumer() {
        const TOTAL: u64 = 200_000;
        let mut ring = SplitRing::<u64, 64>::new();
        let (mut producer, mut consumer) = ring.split();

        std::thread::scope(|s| {
            let writer = s.spawn(move || {
                for v in 0..TOTAL {
                    producer.put(v);
                }
            });

            let mut last = None;
            let mut received = 0u64;
            loop {
                match consumer.get() {
                    Some(v) => {
                        if let Some(prev) = last {
                            assert!(v > prev, "out of order: {v} after {prev}");
                        }
                        last = Some(v);
                        received += 1;
                        if v == TOTAL - 1 {
                            break;
                        }
                    }
                    None => std::thread::yield_now(),
                }
            }
            writer.join().unwrap();
            assert_eq!(received + consumer.dropped(), TOTAL);
        });
    }
}
