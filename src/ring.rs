//! Fixed-capacity ring that owns its storage and cursors.
//!
//! Every operation binds a [`RingShell`] over the instance's own array and cursor pair and
//! delegates to it, so the semantics are exactly those of the shell.

use core::num::NonZeroU64;

use crate::cursor::{effective_threshold, Cursors};
use crate::shell::RingShell;

#[derive(Clone, Debug)]
pub struct RingBuffer<T, const N: usize> {
    data: [T; N],
    cursors: Cursors,
    threshold: Option<NonZeroU64>,
}

impl<T: Default, const N: usize> RingBuffer<T, N> {
    /// Creates an empty ring with every slot set to `T::default()`.
    pub fn new() -> Self {
        const { assert!(N > 0, "ring capacity must be nonzero") };
        Self {
            data: core::array::from_fn(|_| T::default()),
            cursors: Cursors::new(),
            threshold: None,
        }
    }
}

impl<T: Default, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> RingBuffer<T, N> {
    /// Sets the renormalization threshold (rounded up to a multiple of `N`). `0` disables it.
    pub fn with_threshold(mut self, threshold: u64) -> Self {
        self.threshold = effective_threshold(threshold, N as u64);
        self
    }

    pub fn threshold(&self) -> u64 {
        self.threshold.map_or(0, NonZeroU64::get)
    }

    #[inline]
    fn shell(&mut self) -> RingShell<'_, T, &mut Cursors> {
        RingShell::bind_with(&mut self.data, &mut self.cursors, self.threshold)
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    #[inline]
    pub const fn is_initialized(&self) -> bool {
        N > 0
    }

    pub fn length(&mut self) -> usize {
        self.shell().length()
    }

    pub fn free_space(&mut self) -> usize {
        self.shell().free_space()
    }

    #[inline]
    pub fn end(&self) -> bool {
        self.cursors.read_pos() >= self.cursors.write_pos()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end()
    }

    pub fn cursors(&self) -> Cursors {
        self.cursors
    }

    #[inline]
    pub fn put(&mut self, value: T) {
        self.shell().put(value);
    }

    #[inline]
    pub fn poke(&mut self, offset: usize, value: T) {
        self.shell().poke(offset, value);
    }

    pub fn skip(&mut self, n: usize) -> usize {
        self.shell().skip(n)
    }

    pub fn clear(&mut self) {
        self.shell().clear();
    }
}

impl<T: Clone + Default, const N: usize> RingBuffer<T, N> {
    #[inline]
    pub fn get(&mut self) -> T {
        self.shell().get()
    }

    #[inline]
    pub fn peek(&mut self, offset: usize) -> T {
        self.shell().peek(offset)
    }

    pub fn try_get(&mut self) -> Option<T> {
        self.shell().try_get()
    }

    pub fn try_peek(&mut self, offset: usize) -> Option<T> {
        self.shell().try_peek(offset)
    }

    pub fn put_slice(&mut self, values: &[T]) -> usize {
        self.shell().put_slice(values)
    }

    pub fn get_slice(&mut self, out: &mut [T]) -> usize {
        self.shell().get_slice(out)
    }
}
