//! The streaming-encoder contract.
//!
//! The harness drives an encoder through a narrow, stateful interface:
//! one [`StreamEncoder`] instance per pass, fed bounded blocks in order via
//! [`StreamEncoder::encode`], terminated exactly once by
//! [`StreamEncoder::finish`] which appends the format trailer. Encoder
//! operations are infallible by contract — the encoder consumes every input
//! byte it is handed and reports how many output bytes it appended.
//!
//! [`prepare`] must run once per process before the first encoder is
//! constructed. [`deflate::DeflateStream`] is the flate2-backed
//! implementation used by the binary.

use std::sync::Once;

pub mod deflate;

pub use deflate::DeflateStream;

// ── Output format ─────────────────────────────────────────────────────────────

/// Wire format of the encoded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Raw deflate stream (RFC 1951), no framing.
    Deflate,
    /// Zlib-wrapped (RFC 1950): 2-byte header, Adler-32 trailer.
    Zlib,
    /// Gzip-wrapped (RFC 1952): 10-byte header, CRC-32 + size trailer.
    #[default]
    Gzip,
}

impl Format {
    /// Short name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Format::Deflate => "deflate",
            Format::Zlib => "zlib",
            Format::Gzip => "gzip",
        }
    }
}

// ── Contract ──────────────────────────────────────────────────────────────────

/// One pass worth of encoder state.
///
/// Construction corresponds to the contract's `init`: a fresh instance holds
/// the compression level, the output format, and a zeroed running checksum.
/// State is never reused across passes.
pub trait StreamEncoder {
    /// Consumes all of `input`, appends encoded output to `out`, and returns
    /// the number of bytes appended. `more` tells the encoder whether further
    /// input blocks follow in this pass; it may influence internal buffering
    /// and block-boundary placement but never the correctness of the final
    /// stream.
    fn encode(&mut self, out: &mut Vec<u8>, input: &[u8], more: bool) -> usize;

    /// Appends the format trailer and any remaining buffered bytes to `out`,
    /// returning the number of bytes appended. Must be called exactly once,
    /// after the last `encode` of the pass.
    fn finish(&mut self, out: &mut Vec<u8>) -> usize;

    /// CRC-32 of all input consumed since construction. Final only after
    /// [`StreamEncoder::finish`].
    fn checksum(&self) -> u32;
}

// ── One-time global preparation ───────────────────────────────────────────────

static PREPARE: Once = Once::new();

/// One-time process-wide encoder preparation.
///
/// Forces the CRC-32 implementation through its CPU-feature dispatch before
/// the first timed pass, so hardware-probe cost never lands inside a
/// measurement. Idempotent; later calls are no-ops.
pub fn prepare() {
    PREPARE.call_once(|| {
        let mut crc = flate2::Crc::new();
        crc.update(&[0u8; 64]);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_default_is_gzip() {
        assert_eq!(Format::default(), Format::Gzip);
    }

    #[test]
    fn prepare_is_idempotent() {
        prepare();
        prepare();
    }
}
