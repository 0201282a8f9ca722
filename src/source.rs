//! Input acquisition and block segmentation.
//!
//! The harness feeds the encoder from one of two input representations,
//! chosen at startup:
//!
//! - **Mapped** — the whole readable range is mapped read-only into memory
//!   and blocks are bounds-checked sub-slices of the mapping; no read calls
//!   during the passes.
//! - **Buffered** — a reusable working buffer of at most [`BLK`] bytes.
//!   When the byte budget is known and fits in one buffer, the buffer is
//!   filled once up front and reused read-only across passes; otherwise
//!   every block is produced by a fresh blocking read.
//!
//! [`InputSource::next_block`] yields the pass's blocks in order, each at
//! most [`BLK`] bytes and tagged with whether it is the pass's final block.
//! The union of the blocks of one pass covers the requested byte range
//! exactly once, in order.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};

use memmap2::MmapOptions;

use crate::cli::constants::STDIN_MARK;
use crate::config::BLK;
use crate::displaylevel;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Input channel
// ---------------------------------------------------------------------------

/// The underlying descriptor blocks are read from.
#[derive(Debug)]
pub enum Channel {
    /// Standard input (non-seekable, size unknown).
    Stdin(io::Stdin),
    /// An opened regular file or file-like path.
    File { path: String, file: File },
}

impl Channel {
    /// Resolves an optional path to a channel; `None` selects stdin.
    pub fn open(path: Option<&str>) -> Result<Channel> {
        match path {
            None => {
                displaylevel!(4, "using stdin for input\n");
                #[cfg(windows)]
                // SAFETY: switching stdin (fd 0) to binary mode is always valid.
                unsafe {
                    libc::_setmode(0, libc::O_BINARY);
                }
                Ok(Channel::Stdin(io::stdin()))
            }
            Some(p) => {
                let file =
                    File::open(p).map_err(|e| Error::resource(format!("open {}", p), e))?;
                Ok(Channel::File {
                    path: p.to_owned(),
                    file,
                })
            }
        }
    }

    /// Name used in diagnostics.
    pub fn describe(&self) -> &str {
        match self {
            Channel::Stdin(_) => STDIN_MARK,
            Channel::File { path, .. } => path,
        }
    }

    /// Size of the channel when it refers to a regular file, `None` for
    /// stdin and non-regular files. A failing metadata inquiry on an opened
    /// file is fatal.
    fn regular_size(&self) -> Result<Option<u64>> {
        match self {
            Channel::Stdin(_) => Ok(None),
            Channel::File { path, file } => {
                let meta = file
                    .metadata()
                    .map_err(|e| Error::resource(format!("stat {}", path), e))?;
                Ok(meta.file_type().is_file().then(|| meta.len()))
            }
        }
    }

    /// Repositions a seekable channel to its start. A no-op on stdin: a
    /// stream cannot be replayed, and pass-count downgrading has already
    /// handled the cases where that would matter.
    fn rewind(&mut self) -> Result<()> {
        match self {
            Channel::Stdin(_) => Ok(()),
            Channel::File { path, file } => file
                .seek(SeekFrom::Start(0))
                .map(|_| ())
                .map_err(|e| Error::resource(format!("rewind {}", path), e)),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Channel::Stdin(stdin) => stdin.read(buf),
            Channel::File { file, .. } => file.read(buf),
        }
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        match self {
            Channel::Stdin(stdin) => stdin.read_exact(buf),
            Channel::File { file, .. } => file.read_exact(buf),
        }
    }
}

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// One bounded chunk of input offered to the encoder in a single call.
///
/// `last` is true exactly when this is the final block of a pass over a
/// known byte budget. For unbounded sources no block is ever marked last;
/// end of input is signaled by segmentation ending instead, so the encoder's
/// trailer is only produced at true end-of-input.
pub struct Block<'a> {
    pub data: &'a [u8],
    pub last: bool,
}

// ---------------------------------------------------------------------------
// Input source
// ---------------------------------------------------------------------------

enum Backing {
    /// Read-only private mapping of the whole usable range.
    Mapped(memmap2::Mmap),
    /// Reusable working buffer. `resident` means the entire budget was read
    /// into the buffer once up front and passes re-slice it without I/O.
    Buffered { buf: Vec<u8>, resident: bool },
}

/// The acquired input representation plus the segmentation cursor.
pub struct InputSource {
    channel: Channel,
    backing: Backing,
    /// Byte budget of one pass. `None` = unknown, read until EOF.
    total: Option<u64>,
    /// Bytes consumed so far in the current pass.
    offset: u64,
}

impl InputSource {
    /// Acquires `channel`, resolving the byte budget and choosing a strategy.
    ///
    /// `limit` caps the bytes taken per pass; `None` means "use the file
    /// size" (unknown for stdin). For a regular file the budget is clamped
    /// to the file's actual size, so a limit past EOF behaves like no limit.
    /// Mapping is attempted only for a known, nonzero budget on a regular
    /// file; mapping failure falls back to buffered reads.
    pub fn acquire(channel: Channel, limit: Option<u64>) -> Result<InputSource> {
        Self::acquire_with(channel, limit, true)
    }

    /// Strategy-forcing variant: `allow_mmap = false` skips the mapping
    /// attempt so the buffered paths can be exercised deterministically.
    pub(crate) fn acquire_with(
        mut channel: Channel,
        limit: Option<u64>,
        allow_mmap: bool,
    ) -> Result<InputSource> {
        let file_size = channel.regular_size()?;
        let total: Option<u64> = match (limit, file_size) {
            // Reading past EOF of a regular file cannot yield more bytes;
            // clamping keeps the mapped range valid as well.
            (Some(n), Some(len)) => Some(n.min(len)),
            (Some(n), None) => Some(n),
            (None, resolved) => resolved,
        };

        if allow_mmap {
            if let (Some(budget @ 1..), Channel::File { path, file }) = (total, &channel) {
                // SAFETY: the mapping is private and read-only, and the
                // length is clamped to the file size above, so every byte of
                // the mapped range is backed by the file.
                match unsafe { MmapOptions::new().len(budget as usize).map(file) } {
                    Ok(map) => {
                        displaylevel!(4, "mapped {} bytes of {}\n", budget, path);
                        return Ok(InputSource {
                            channel,
                            backing: Backing::Mapped(map),
                            total,
                            offset: 0,
                        });
                    }
                    Err(e) => {
                        displaylevel!(4, "mmap {} failed ({}), using buffered reads\n", path, e);
                    }
                }
            }
        }

        let cap = match total {
            Some(budget @ 1..) => BLK.min(budget as usize),
            _ => BLK,
        };
        let mut buf = vec![0u8; cap];
        let mut resident = false;
        if let Some(budget @ 1..) = total {
            if budget as usize <= cap {
                // Whole budget in one buffer: fill it now and reuse it
                // read-only across passes. Anything short of the requested
                // count here is a hard failure, not EOF handling.
                channel
                    .read_exact(&mut buf[..budget as usize])
                    .map_err(|e| Error::read(format!("read {}", channel.describe()), e))?;
                resident = true;
            }
        }
        displaylevel!(
            4,
            "buffered reads from {} ({} byte buffer{})\n",
            channel.describe(),
            cap,
            if resident { ", resident" } else { "" }
        );
        Ok(InputSource {
            channel,
            backing: Backing::Buffered { buf, resident },
            total,
            offset: 0,
        })
    }

    /// Byte budget of one pass (`None` = unknown).
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Strategy name for diagnostics.
    pub fn strategy(&self) -> &'static str {
        match self.backing {
            Backing::Mapped(_) => "mapped",
            Backing::Buffered { .. } => "buffered",
        }
    }

    /// Downgrades a multi-pass request over a source that cannot be re-read
    /// identically (unknown or zero size) to a single pass, with a warning.
    pub fn effective_passes(&self, requested: u32) -> u32 {
        if requested > 1 && self.total.unwrap_or(0) == 0 {
            displaylevel!(
                2,
                "warning: disabling repeated passes on a source of unknown or zero size\n"
            );
            1
        } else {
            requested
        }
    }

    /// True when the next pass must reposition the descriptor: buffered,
    /// not resident, so the pass actually re-reads the underlying file.
    pub fn needs_rewind(&self) -> bool {
        matches!(
            self.backing,
            Backing::Buffered {
                resident: false,
                ..
            }
        )
    }

    /// Resets the segmentation cursor for the next pass, seeking the
    /// descriptor back to the start when the pass re-reads it.
    pub fn rewind(&mut self) -> Result<()> {
        self.offset = 0;
        if self.needs_rewind() {
            self.channel.rewind()?;
        }
        Ok(())
    }

    /// Produces the next block of the current pass, or `None` when the pass
    /// is complete (budget consumed, or EOF on an unbounded or short read).
    pub fn next_block(&mut self) -> Result<Option<Block<'_>>> {
        let InputSource {
            channel,
            backing,
            total,
            offset,
        } = self;
        match backing {
            Backing::Mapped(map) => Ok(resident_block(&map[..], *total, offset)),
            Backing::Buffered {
                buf,
                resident: true,
            } => Ok(resident_block(&buf[..], *total, offset)),
            Backing::Buffered {
                buf,
                resident: false,
            } => {
                let want = match *total {
                    Some(t) => {
                        let remaining = t - *offset;
                        if remaining == 0 {
                            return Ok(None);
                        }
                        BLK.min(remaining as usize)
                    }
                    None => BLK,
                };
                let n = loop {
                    match channel.read(&mut buf[..want]) {
                        Ok(n) => break n,
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => {
                            return Err(Error::read(format!("read {}", channel.describe()), e))
                        }
                    }
                };
                if n == 0 {
                    // EOF. Before a known budget is met this is normal
                    // termination of the pass, not an error.
                    return Ok(None);
                }
                *offset += n as u64;
                let last = *total == Some(*offset);
                Ok(Some(Block {
                    data: &buf[..n],
                    last,
                }))
            }
        }
    }
}

/// Block over a fully resident region: bounds-checked sub-slice at the
/// cursor, `BLK` bytes except for a shorter final block.
fn resident_block<'a>(region: &'a [u8], total: Option<u64>, offset: &mut u64) -> Option<Block<'a>> {
    // Resident backings always have a known budget within the region.
    let total = total.unwrap_or(0);
    let remaining = total - *offset;
    if remaining == 0 {
        return None;
    }
    let len = BLK.min(remaining as usize);
    let start = *offset as usize;
    let data = &region[start..start + len];
    *offset += len as u64;
    Some(Block {
        data,
        last: *offset == total,
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
