//! Pass orchestration: feed blocks through the encoder, batch output, and
//! accumulate run totals.
//!
//! One pass = one fresh encoder fed every block of the source in order,
//! terminated by `finish`. Output is accumulated in a reused buffer and
//! handed to the sink once per full-size intermediate block, which batches
//! write syscalls; the final fragment and the trailer go out in a single
//! last write. Passes are strictly sequential; the source is rewound
//! between passes when it re-reads the descriptor.

use std::io::{self, Write};

use crate::config::{BLK, OUT_MARGIN};
use crate::displaylevel;
use crate::encoder::StreamEncoder;
use crate::error::{Error, Result};
use crate::source::InputSource;
use crate::timefn;

// ---------------------------------------------------------------------------
// Output sink
// ---------------------------------------------------------------------------

/// Destination for batched encoder output.
pub enum Sink {
    /// Verbatim writes to stdout.
    Console(io::Stdout),
    /// Test mode: no I/O; byte totals are still accumulated by the runner.
    Null,
    /// Captures each flush as a separate chunk, preserving flush boundaries
    /// for tests and benchmarks.
    Memory(Vec<Vec<u8>>),
}

impl Sink {
    /// Emits one flush worth of output.
    pub fn write(&mut self, buf: &[u8]) -> Result<()> {
        match self {
            Sink::Console(out) => out
                .lock()
                .write_all(buf)
                .map_err(|e| Error::resource("write stdout", e)),
            Sink::Null => Ok(()),
            Sink::Memory(chunks) => {
                chunks.push(buf.to_vec());
                Ok(())
            }
        }
    }

    /// Chunks captured so far (empty for non-memory sinks).
    pub fn captured(&self) -> &[Vec<u8>] {
        match self {
            Sink::Memory(chunks) => chunks,
            _ => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Run totals
// ---------------------------------------------------------------------------

/// Cumulative statistics across all passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunTotals {
    /// Input bytes consumed, summed over every pass.
    pub bytes_in: u64,
    /// Encoder output bytes produced, summed over every pass.
    pub bytes_out: u64,
    /// Checksum reported by the last pass's encoder.
    pub checksum: u32,
}

impl RunTotals {
    /// Output-to-input size ratio in percent (100.0 when nothing was read).
    pub fn ratio(&self) -> f64 {
        if self.bytes_in == 0 {
            100.0
        } else {
            self.bytes_out as f64 * 100.0 / self.bytes_in as f64
        }
    }
}

// ---------------------------------------------------------------------------
// Pass runner
// ---------------------------------------------------------------------------

/// Runs `requested_passes` complete passes over `source`, creating a fresh
/// encoder per pass via `new_encoder` and writing batched output to `sink`.
///
/// The requested pass count is downgraded first when the source cannot be
/// re-read identically. Returns the folded [`RunTotals`]; any read or write
/// failure aborts the whole run.
pub fn run_passes<E, F>(
    source: &mut InputSource,
    requested_passes: u32,
    mut new_encoder: F,
    sink: &mut Sink,
) -> Result<RunTotals>
where
    E: StreamEncoder,
    F: FnMut() -> E,
{
    let passes = source.effective_passes(requested_passes);
    let mut totals = RunTotals::default();
    let mut outbuf: Vec<u8> = Vec::with_capacity(BLK + OUT_MARGIN);

    for pass in 0..passes {
        let pass_start = timefn::get_time();
        let mut enc = new_encoder();
        outbuf.clear();
        let mut pass_in: u64 = 0;

        while let Some(block) = source.next_block()? {
            let more = !block.last;
            enc.encode(&mut outbuf, block.data, more);
            pass_in += block.data.len() as u64;
            if more {
                // Flush point: every full-size intermediate block.
                sink.write(&outbuf)?;
                totals.bytes_out += outbuf.len() as u64;
                outbuf.clear();
            }
        }

        // Trailer plus whatever the final block left unflushed, in one write.
        enc.finish(&mut outbuf);
        totals.bytes_in += pass_in;
        totals.bytes_out += outbuf.len() as u64;
        sink.write(&outbuf)?;
        outbuf.clear();
        totals.checksum = enc.checksum();

        let ns = timefn::clock_span_ns(pass_start).max(1);
        displaylevel!(
            4,
            "pass {}/{}: {} bytes in, {:.1} MB/s\n",
            pass + 1,
            passes,
            pass_in,
            pass_in as f64 * 1_000.0 / ns as f64
        );

        if pass + 1 < passes {
            source.rewind()?;
        }
    }

    Ok(totals)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{DeflateStream, Format};
    use crate::source::{Channel, InputSource};
    use std::io::Read;
    use tempfile::TempDir;

    fn crc32(data: &[u8]) -> u32 {
        let mut crc = flate2::Crc::new();
        crc.update(data);
        crc.sum()
    }

    fn source_for(dir: &TempDir, data: &[u8], limit: Option<u64>, mmap: bool) -> InputSource {
        let path = dir.path().join("input.bin");
        std::fs::write(&path, data).unwrap();
        let channel = Channel::open(Some(path.to_str().unwrap())).unwrap();
        InputSource::acquire_with(channel, limit, mmap).unwrap()
    }

    fn gunzip(stream: &[u8]) -> Vec<u8> {
        let mut dec = flate2::read::GzDecoder::new(stream);
        let mut out = Vec::new();
        dec.read_to_end(&mut out).unwrap();
        out
    }

    fn run(
        source: &mut InputSource,
        passes: u32,
        sink: &mut Sink,
    ) -> RunTotals {
        run_passes(
            source,
            passes,
            || DeflateStream::new(1, Format::Gzip),
            sink,
        )
        .unwrap()
    }

    #[test]
    fn single_block_input_produces_exactly_one_write() {
        let dir = TempDir::new().unwrap();
        let data = b"small input".repeat(10);
        let mut src = source_for(&dir, &data, None, true);
        let mut sink = Sink::Memory(Vec::new());

        let totals = run(&mut src, 1, &mut sink);
        assert_eq!(sink.captured().len(), 1);
        assert_eq!(totals.bytes_in, data.len() as u64);
        assert_eq!(gunzip(&sink.captured()[0]), data);
    }

    #[test]
    fn one_write_per_intermediate_block_plus_final() {
        let dir = TempDir::new().unwrap();
        let data: Vec<u8> = (0..(3 * BLK + 123)).map(|i| (i % 7) as u8).collect();
        let mut src = source_for(&dir, &data, None, true);
        let mut sink = Sink::Memory(Vec::new());

        let totals = run(&mut src, 1, &mut sink);
        // ceil(S / BLK) = 4 blocks: three intermediate flushes + one final.
        assert_eq!(sink.captured().len(), 4);
        assert_eq!(totals.bytes_in, data.len() as u64);
        assert_eq!(
            totals.bytes_out,
            sink.captured().iter().map(|c| c.len() as u64).sum::<u64>()
        );

        let stream: Vec<u8> = sink.captured().concat();
        assert_eq!(gunzip(&stream), data);
        assert_eq!(totals.checksum, crc32(&data));
    }

    #[test]
    fn repeated_passes_accumulate_n_times_the_input() {
        let dir = TempDir::new().unwrap();
        let data: Vec<u8> = (0..(2 * BLK)).map(|i| (i % 11) as u8).collect();
        let passes = 3;

        // Buffered streaming forces an actual rewind between passes.
        let mut src = source_for(&dir, &data, None, false);
        assert!(src.needs_rewind());
        let mut sink = Sink::Memory(Vec::new());

        let totals = run(&mut src, passes, &mut sink);
        assert_eq!(totals.bytes_in, passes as u64 * data.len() as u64);
        assert_eq!(totals.checksum, crc32(&data));

        // 2 writes per pass (one intermediate block + final).
        assert_eq!(sink.captured().len(), 2 * passes as usize);
        for pass_chunks in sink.captured().chunks(2) {
            let stream: Vec<u8> = pass_chunks.concat();
            assert_eq!(gunzip(&stream), data);
        }
    }

    #[test]
    fn zero_limit_still_finishes_the_stream() {
        let dir = TempDir::new().unwrap();
        let mut src = source_for(&dir, b"ignored bytes", Some(0), true);
        let mut sink = Sink::Memory(Vec::new());

        let totals = run(&mut src, 1, &mut sink);
        assert_eq!(totals.bytes_in, 0);
        assert_eq!(sink.captured().len(), 1);
        // Trailer of an empty stream still decodes (to nothing).
        assert!(gunzip(&sink.captured()[0]).is_empty());
        assert_eq!(totals.checksum, 0);
        assert!(totals.bytes_out > 0);
    }

    #[test]
    fn multi_pass_request_on_empty_source_downgrades() {
        let dir = TempDir::new().unwrap();
        let mut src = source_for(&dir, &[], None, true);
        let mut sink = Sink::Memory(Vec::new());

        let totals = run(&mut src, 4, &mut sink);
        // One pass ran: a single finish-only write.
        assert_eq!(sink.captured().len(), 1);
        assert_eq!(totals.bytes_in, 0);
    }

    #[test]
    fn null_sink_matches_memory_sink_totals() {
        let dir = TempDir::new().unwrap();
        let data: Vec<u8> = (0..(BLK + 999)).map(|i| (i * 31 % 256) as u8).collect();

        let mut src_mem = source_for(&dir, &data, None, true);
        let mut mem = Sink::Memory(Vec::new());
        let with_output = run(&mut src_mem, 2, &mut mem);

        let mut src_null = source_for(&dir, &data, None, true);
        let mut null = Sink::Null;
        let without_output = run(&mut src_null, 2, &mut null);

        assert_eq!(with_output.bytes_in, without_output.bytes_in);
        assert_eq!(with_output.bytes_out, without_output.bytes_out);
        assert_eq!(with_output.checksum, without_output.checksum);
        assert!(null.captured().is_empty());
    }

    #[test]
    fn mapped_and_buffered_strategies_agree() {
        let dir = TempDir::new().unwrap();
        let data: Vec<u8> = (0..(2 * BLK + 17)).map(|i| (i % 97) as u8).collect();

        let mut mapped = source_for(&dir, &data, None, true);
        let mut sink_a = Sink::Memory(Vec::new());
        let a = run(&mut mapped, 1, &mut sink_a);

        let mut buffered = source_for(&dir, &data, None, false);
        let mut sink_b = Sink::Memory(Vec::new());
        let b = run(&mut buffered, 1, &mut sink_b);

        assert_eq!(a.bytes_in, b.bytes_in);
        assert_eq!(a.bytes_out, b.bytes_out);
        assert_eq!(a.checksum, b.checksum);
        assert_eq!(sink_a.captured().concat(), sink_b.captured().concat());
    }

    #[test]
    fn ratio_handles_empty_input() {
        let totals = RunTotals::default();
        assert_eq!(totals.ratio(), 100.0);
        let totals = RunTotals {
            bytes_in: 200,
            bytes_out: 50,
            checksum: 0,
        };
        assert_eq!(totals.ratio(), 25.0);
    }
}
