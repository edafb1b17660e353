//! Fixed-capacity overwrite ring buffers for no-std embedded targets.
//!
//! # Highlights
//! - A ring "shell" that maps caller-owned memory and caller-owned cursors as a ring.
//! - Never rejects a write: once full, the oldest unread element is evicted.
//! - Never fails a read: reading an empty ring yields `T::default()` (or `None` from `try_*`).
//! - No allocation on the hot path, no dynamic dispatch.
//!
//! # Components
//! - [`cursor`]: logical cursor arithmetic and cursor locations ([`Cursors`], [`SharedCursors`]).
//! - [`RingShell`]: the ring over a borrowed `&mut [T]`.
//! - [`RingBuffer`]: a shell that owns a `[T; N]` and its cursors.
//! - [`CircularBuffer`]: heap-backed byte ring with bulk `write`/`read` (`alloc` feature).
//! - [`MovingAverage`]: N-point smoothing over a [`RingBuffer`].
//! - [`raw`]: the byte ring as free functions over a context record, with `u32` cursors, also
//!   usable as a queue of delimited records.
//! - [`SplitRing`]: lock-free SPSC variant for a producer and a consumer in different contexts.
//!
//! # Quick start
//! ```
//! use ph_ring::{Cursors, RingShell};
//!
//! let mut storage = [0u32; 4];
//! let mut cursors = Cursors::new();
//! let mut ring = RingShell::bind(&mut storage, &mut cursors);
//!
//! for v in 1..=6 {
//!     ring.put(v);
//! }
//! assert_eq!(ring.length(), 4);
//! assert_eq!(ring.get(), 3);
//! assert_eq!(ring.peek(0), 4);
//! ```
//!
//! # Semantics
//! - Cursors are monotonically increasing `u64` logical positions; slots are `pos % capacity`.
//! - `get`, `peek` and `length` self-correct first: an overfull pair is clamped to the newest
//!   `capacity` elements, then an optional threshold shifts both cursors down by the same amount.
//! - Nothing here is synchronized except [`SplitRing`]. [`SharedCursors`] shares cursors within
//!   one execution context only.
//!
//! # Features
//! - `alloc` (default): [`CircularBuffer`].
//! - `std`: `std::io::Read`/`Write` for [`CircularBuffer`].
//! - `tracing` / `defmt`: log evictions and renormalizations (`defmt` wins if both are on).
//! - `portable-atomic*`: [`SplitRing`] on targets without native 64-bit atomics.
#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

#[macro_use]
mod macros;

pub mod cursor;
pub mod error;
pub mod raw;
pub mod ring;
pub mod shell;
pub mod smooth;

#[cfg(feature = "alloc")]
pub mod circular;

#[cfg(any(feature = "portable-atomic", target_has_atomic = "64"))]
pub mod split;

pub use cursor::{CursorSlots, Cursors, SharedCursors};
pub use error::BindError;
pub use raw::RawRing;
pub use ring::RingBuffer;
pub use shell::RingShell;
pub use smooth::MovingAverage;

#[cfg(feature = "alloc")]
pub use circular::CircularBuffer;

#[cfg(any(feature = "portable-atomic", target_has_atomic = "64"))]
pub use split::{Consumer, DrainStats, Producer, SplitRing};
