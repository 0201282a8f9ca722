//! flate2-backed implementation of the [`StreamEncoder`] contract.
//!
//! Raw deflate and zlib streams come straight from [`flate2::Compress`]
//! (zlib framing is handled by the backend). Gzip is the raw stream wrapped
//! by hand: the 10-byte header is emitted lazily before the first output
//! byte, and `finish` appends the CRC-32 and ISIZE trailer words.
//!
//! The running checksum is a CRC-32 of the consumed input, maintained for
//! every format so reporting and test-mode comparison are
//! format-independent.

use flate2::{Compress, Compression, FlushCompress, Status};

use crate::encoder::{Format, StreamEncoder};

// Gzip member header: magic, CM=8 (deflate), no flags, zero mtime,
// no XFL hints, unknown OS.
const GZIP_HEADER: [u8; 10] = [0x1f, 0x8b, 0x08, 0, 0, 0, 0, 0, 0, 0xff];

// Spare capacity reserved per compress call when the backend reports it
// needs more room.
const GROW_STEP: usize = 4096;

/// One pass of deflate-family encoding state.
pub struct DeflateStream {
    raw: Compress,
    crc: flate2::Crc,
    format: Format,
    // Gzip header not yet emitted (always false for other formats).
    header_pending: bool,
}

impl DeflateStream {
    /// Fresh per-pass state. `level` 0 selects stored blocks (format framing
    /// only); any other value selects the fast compression setting.
    pub fn new(level: u32, format: Format) -> Self {
        let compression = if level == 0 {
            Compression::none()
        } else {
            Compression::fast()
        };
        let zlib_header = format == Format::Zlib;
        DeflateStream {
            raw: Compress::new(compression, zlib_header),
            crc: flate2::Crc::new(),
            format,
            header_pending: format == Format::Gzip,
        }
    }

    /// Runs the backend until `input` is fully consumed (or, for `Finish`,
    /// until the stream ends), growing `out` as needed.
    fn drive(&mut self, out: &mut Vec<u8>, input: &[u8], flush: FlushCompress) {
        let mut consumed = 0usize;
        loop {
            if out.capacity() == out.len() {
                out.reserve(GROW_STEP);
            }
            let before_in = self.raw.total_in();
            let status = match self.raw.compress_vec(&input[consumed..], out, flush) {
                Ok(s) => s,
                // Compress only errors on a corrupted internal state, which
                // the call sequence here cannot produce.
                Err(e) => unreachable!("deflate state poisoned: {}", e),
            };
            consumed += (self.raw.total_in() - before_in) as usize;
            match status {
                Status::StreamEnd => break,
                Status::Ok => {
                    if matches!(flush, FlushCompress::None) && consumed == input.len() {
                        break;
                    }
                    // Otherwise loop: either input remains or the trailer is
                    // still being drained; more output space is reserved at
                    // the top.
                }
                // No forward progress without more output room.
                Status::BufError => out.reserve(GROW_STEP),
            }
        }
    }
}

impl StreamEncoder for DeflateStream {
    fn encode(&mut self, out: &mut Vec<u8>, input: &[u8], _more: bool) -> usize {
        let start = out.len();
        if self.header_pending {
            out.extend_from_slice(&GZIP_HEADER);
            self.header_pending = false;
        }
        self.crc.update(input);
        self.drive(out, input, FlushCompress::None);
        out.len() - start
    }

    fn finish(&mut self, out: &mut Vec<u8>) -> usize {
        let start = out.len();
        // An empty pass still owes the header before the trailer.
        if self.header_pending {
            out.extend_from_slice(&GZIP_HEADER);
            self.header_pending = false;
        }
        self.drive(out, &[], FlushCompress::Finish);
        if self.format == Format::Gzip {
            out.extend_from_slice(&self.crc.sum().to_le_bytes());
            out.extend_from_slice(&(self.crc.amount()).to_le_bytes());
        }
        out.len() - start
    }

    fn checksum(&self) -> u32 {
        self.crc.sum()
    }
}
