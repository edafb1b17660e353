//! Heap-backed byte ring with bulk `write`/`read`.
//!
//! Capacity is chosen at construction. Writes always consume the whole input, evicting the
//! oldest unread bytes when the ring is full; reads stop early when the ring runs empty.
//! With the `std` feature the buffer also implements [`std::io::Read`] and [`std::io::Write`].

use alloc::boxed::Box;
use alloc::vec;
use core::num::NonZeroU64;

use crate::cursor::{effective_threshold, Cursors};
use crate::error::BindError;
use crate::shell::RingShell;

#[derive(Clone, Debug)]
pub struct CircularBuffer {
    data: Box<[u8]>,
    cursors: Cursors,
    threshold: Option<NonZeroU64>,
}

impl CircularBuffer {
    /// Allocates `capacity` zeroed bytes. A zero capacity gives an inert buffer.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            cursors: Cursors::new(),
            threshold: None,
        }
    }

    pub fn try_with_capacity(capacity: usize) -> Result<Self, BindError> {
        if capacity == 0 {
            return Err(BindError::EmptyStorage);
        }
        Ok(Self::with_capacity(capacity))
    }

    /// Sets the renormalization threshold (rounded up to a multiple of the capacity).
    /// `0` disables it.
    pub fn with_threshold(mut self, threshold: u64) -> Self {
        self.threshold = effective_threshold(threshold, self.data.len() as u64);
        self
    }

    pub fn threshold(&self) -> u64 {
        self.threshold.map_or(0, NonZeroU64::get)
    }

    #[inline]
    fn shell(&mut self) -> RingShell<'_, u8, &mut Cursors> {
        RingShell::bind_with(&mut self.data[..], &mut self.cursors, self.threshold)
    }

    /// Puts every byte of `bytes`; returns `bytes.len()`.
    pub fn write(&mut self, bytes: &[u8]) -> usize {
        self.shell().put_slice(bytes)
    }

    /// Gets bytes into `buf` until it is full or the ring is empty; returns the count read.
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        self.shell().get_slice(buf)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        !self.data.is_empty()
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
    pub fn put(&mut self, byte: u8) {
        self.shell().put(byte);
    }

    #[inline]
    pub fn get(&mut self) -> u8 {
        self.shell().get()
    }

    #[inline]
    pub fn peek(&mut self, offset: usize) -> u8 {
        self.shell().peek(offset)
    }

    pub fn try_get(&mut self) -> Option<u8> {
        self.shell().try_get()
    }

    pub fn try_peek(&mut self, offset: usize) -> Option<u8> {
        self.shell().try_peek(offset)
    }

    pub fn poke(&mut self, offset: usize, byte: u8) {
        self.shell().poke(offset, byte);
    }

    pub fn skip(&mut self, n: usize) -> usize {
        self.shell().skip(n)
    }

    pub fn clear(&mut self) {
        self.shell().clear();
    }
}

#[cfg(feature = "std")]
impl std::io::Write for CircularBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Ok(CircularBuffer::write(self, buf))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(feature = "std")]
impl std::io::Read for CircularBuffer {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        Ok(CircularBuffer::read(self, buf))
    }
}
