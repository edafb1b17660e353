//! Byte ring as free functions over an explicit context record.
//!
//! For call sites that want plain functions and no generics. Behaviour matches a
//! [`RingShell<u8, _>`](crate::RingShell) with bulk byte I/O, with two differences:
//! - cursors are `u32`, so renormalization is always on (`threshold = factor * capacity`,
//!   [`DEFAULT_THRESHOLD_FACTOR`] unless chosen with [`init_with_factor`]);
//! - `put` renormalizes too, so a writer that is never read from still keeps the cursors small.
//!
//! Capacity is limited to [`MAX_CAPACITY`] so the threshold always covers at least one full
//! capacity and the cursors provably stay below `u32::MAX`.
//!
//! The same context doubles as a queue of delimited records ([`put_record`], [`get_record`]),
//! usually NUL-terminated strings, with [`init_records`] choosing a `10 *` capacity threshold.
//!
//! ```
//! use ph_ring::raw;
//!
//! let mut storage = [0u8; 16];
//! let mut ctx = raw::init(&mut storage);
//! raw::write(&mut ctx, b"abc");
//!
//! let mut out = [0u8; 4];
//! assert_eq!(raw::read(&mut ctx, &mut out), 3);
//! assert_eq!(&out[..3], b"abc");
//! ```

use crate::error::BindError;

/// Multiplier applied to the capacity to get the renormalization threshold.
pub const DEFAULT_THRESHOLD_FACTOR: u32 = 8;

/// Threshold multiplier of a record queue bound with [`init_records`].
pub const RECORD_THRESHOLD_FACTOR: u32 = 10;

/// Largest storage a context uses.
pub const MAX_CAPACITY: u32 = u32::MAX / 4;

/// Context record: borrowed storage plus 32-bit cursors.
#[derive(Debug)]
pub struct RawRing<'a> {
    data: &'a mut [u8],
    length: u32,
    read: u32,
    write: u32,
    threshold: u32,
}

impl RawRing<'_> {
    pub fn read_pos(&self) -> u32 {
        self.read
    }

    pub fn write_pos(&self) -> u32 {
        self.write
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}

/// Binds `storage` with the default threshold factor.
///
/// Storage beyond [`MAX_CAPACITY`] bytes is ignored; use [`try_init`] to reject it instead.
pub fn init(storage: &mut [u8]) -> RawRing<'_> {
    init_with_factor(storage, DEFAULT_THRESHOLD_FACTOR)
}

/// Binds `storage` with `threshold = factor * capacity`.
///
/// `factor` is raised to at least `1`. The threshold is capped to a multiple of the capacity
/// low enough that the write cursor never passes `u32::MAX`; with at most [`MAX_CAPACITY`] bytes
/// that cap is still at least three capacities.
pub fn init_with_factor(storage: &mut [u8], factor: u32) -> RawRing<'_> {
    let length = u32::try_from(storage.len())
        .unwrap_or(u32::MAX)
        .min(MAX_CAPACITY);
    let data = &mut storage[..length as usize];

    // Between adjustments read can be one past the threshold and write one past read + length.
    let threshold = match length {
        0 => 0,
        len => len
            .saturating_mul(factor.max(1))
            .min((u32::MAX - 2 - len) / len * len),
    };

    RawRing {
        data,
        length,
        read: 0,
        write: 0,
        threshold,
    }
}

pub fn try_init(storage: &mut [u8]) -> Result<RawRing<'_>, BindError> {
    match u32::try_from(storage.len()) {
        Ok(0) => Err(BindError::EmptyStorage),
        Ok(len) if len <= MAX_CAPACITY => Ok(init(storage)),
        _ => Err(BindError::CapacityTooLarge {
            capacity: storage.len(),
        }),
    }
}

#[inline]
fn slot(ctx: &RawRing<'_>, pos: u32) -> usize {
    (pos % ctx.length) as usize
}

fn adjust(ctx: &mut RawRing<'_>) {
    if ctx.write.wrapping_sub(ctx.read) > ctx.length {
        let dropped = ctx.write.wrapping_sub(ctx.read) - ctx.length;
        ring_trace!("raw ring full, evicted {} unread", dropped);
        ctx.read = ctx.write.wrapping_sub(ctx.length);
    }
    if ctx.threshold > 0 && ctx.read > ctx.threshold {
        ring_debug!("raw ring renormalized by {}", ctx.threshold);
        ctx.read -= ctx.threshold;
        ctx.write -= ctx.threshold;
    }
}

/// Readable byte count, after self-correction.
pub fn len(ctx: &mut RawRing<'_>) -> u32 {
    adjust(ctx);
    ctx.write.wrapping_sub(ctx.read)
}

#[inline]
pub fn capacity(ctx: &RawRing<'_>) -> u32 {
    ctx.length
}

#[inline]
pub fn end(ctx: &RawRing<'_>) -> bool {
    ctx.read == ctx.write
}

pub fn put(ctx: &mut RawRing<'_>, val: u8) {
    if ctx.length == 0 {
        return;
    }
    let idx = slot(ctx, ctx.write);
    ctx.data[idx] = val;
    ctx.write = ctx.write.wrapping_add(1);
    adjust(ctx);
}

/// Writes `offset` bytes past the write cursor without moving it.
pub fn poke(ctx: &mut RawRing<'_>, offset: u32, val: u8) {
    if ctx.length == 0 {
        return;
    }
    let pos = u64::from(ctx.write) + u64::from(offset);
    let idx = (pos % u64::from(ctx.length)) as usize;
    ctx.data[idx] = val;
}

/// Consumes one byte, or returns `0` when empty.
pub fn get(ctx: &mut RawRing<'_>) -> u8 {
    if len(ctx) == 0 {
        return 0;
    }
    let val = ctx.data[slot(ctx, ctx.read)];
    ctx.read = ctx.read.wrapping_add(1);
    val
}

/// Reads `offset` bytes past the read cursor without consuming, or `0`.
pub fn peek(ctx: &mut RawRing<'_>, offset: u32) -> u8 {
    if offset >= len(ctx) {
        return 0;
    }
    ctx.data[slot(ctx, ctx.read.wrapping_add(offset))]
}

/// Puts every byte; returns `bytes.len()`.
pub fn write(ctx: &mut RawRing<'_>, bytes: &[u8]) -> usize {
    for &b in bytes {
        put(ctx, b);
    }
    bytes.len()
}

/// Gets bytes into `out` until it is full or the ring is empty; returns the count read.
pub fn read(ctx: &mut RawRing<'_>, out: &mut [u8]) -> usize {
    let mut n = 0;
    while n < out.len() && len(ctx) > 0 {
        out[n] = get(ctx);
        n += 1;
    }
    n
}

/// Binds `storage` as a record queue (`threshold = 10 * capacity`).
pub fn init_records(storage: &mut [u8]) -> RawRing<'_> {
    init_with_factor(storage, RECORD_THRESHOLD_FACTOR)
}

/// Puts `record` up to and including its first `delim`, appending `delim` when there is none.
/// Returns the bytes written.
///
/// Overwrite-on-full applies byte by byte, so a reader may later see the tail of a record whose
/// head was evicted.
pub fn put_record(ctx: &mut RawRing<'_>, record: &[u8], delim: u8) -> usize {
    match record.iter().position(|&b| b == delim) {
        Some(end) => write(ctx, &record[..=end]),
        None => write(ctx, record) + write(ctx, &[delim]),
    }
}

/// Gets bytes into `out` up to and including the next `delim`; stops early when the ring is
/// empty or `out` is full. Returns the count read.
pub fn get_record(ctx: &mut RawRing<'_>, out: &mut [u8], delim: u8) -> usize {
    let mut n = 0;
    while n < out.len() && len(ctx) > 0 {
        let b = get(ctx);
        out[n] = b;
        n += 1;
        if b == delim {
            break;
        }
    }
    n
}
