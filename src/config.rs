//! Compile-time tunables for the streaming harness.
//!
//! `BLK` is the fixed feed-block size: input is offered to the encoder in
//! chunks of at most `BLK` bytes so that output can be emitted incrementally
//! instead of buffering a whole compressed stream. 32 KiB matches one
//! deflate window and keeps the working set cache-resident.

/// Fixed feed-block size in bytes.
pub const BLK: usize = 32 * 1024;

/// Extra headroom reserved in the output-accumulation buffer beyond `BLK`.
///
/// A stored deflate block costs 5 bytes per 65 535 bytes of payload plus
/// constant framing, so one BLK of incompressible input stays well inside
/// `BLK + OUT_MARGIN` and intermediate flushes almost never reallocate.
pub const OUT_MARGIN: usize = 4096;

/// Default number of measurement passes.
pub const DEFAULT_PASSES: u32 = 1;
