//! Command-line argument parsing for the `zenc` binary.
//!
//! The entry points are [`parse_args`] (reads `std::env::args()`) and
//! [`parse_args_from`] (takes an explicit slice, suitable for unit-testing).
//! Both return a [`ParsedArgs`] value capturing every option and the
//! optional input filename.
//!
//! Bad or unrecognised options return an `Err` with a human-readable
//! message that begins with `"bad usage: "`.

use anyhow::anyhow;

use crate::cli::constants::{display_level, set_display_level};
use crate::cli::help::print_usage;
use crate::config::DEFAULT_PASSES;
use crate::encoder::Format;

// ── Public output type ────────────────────────────────────────────────────────

/// Complete set of options produced by the argument parsing loop.
#[derive(Debug)]
pub struct ParsedArgs {
    /// Compression level: 0 = format only (stored blocks), 1 = fast.
    pub level: u32,
    /// Output stream format.
    pub format: Format,
    /// Optional byte-count limit per pass (`-b`); `None` = whole input.
    pub limit: Option<u64>,
    /// Number of measurement passes (`-l`), at least 1.
    pub passes: u32,
    /// Send output to stdout (currently the only destination).
    pub console: bool,
    /// Allow compressed output on a terminal (`-f`).
    pub force: bool,
    /// Test mode: run everything, emit nothing (`-t`).
    pub test: bool,
    /// Positional input path; `None` = stdin.
    pub input_filename: Option<String>,
    /// A help flag was processed; the caller should exit 0 without running.
    pub exit_early: bool,
}

// ── Size parsing ──────────────────────────────────────────────────────────────

/// Parses an unsigned byte count, optionally followed by a size suffix.
/// The whole string must be consumed.
///
/// Recognised suffixes (case-sensitive):
///   `K` / `KB` / `KiB`  → multiply by 1 024
///   `M` / `MB` / `MiB`  → multiply by 1 048 576
///   `G` / `GB` / `GiB`  → multiply by 1 073 741 824
pub fn read_u64_from_str(s: &str) -> Option<u64> {
    let bytes = s.as_bytes();
    let mut i = 0usize;

    if i >= bytes.len() || !bytes[i].is_ascii_digit() {
        return None;
    }

    let mut result: u64 = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        result = result
            .checked_mul(10)?
            .checked_add((bytes[i] - b'0') as u64)?;
        i += 1;
    }

    if i < bytes.len() {
        let shift = match bytes[i] {
            b'K' => 10,
            b'M' => 20,
            b'G' => 30,
            _ => return None,
        };
        result = result.checked_shl(shift).filter(|_| result >> (64 - shift) == 0)?;
        i += 1;
        if i < bytes.len() && bytes[i] == b'i' {
            i += 1;
        }
        if i < bytes.len() && bytes[i] == b'B' {
            i += 1;
        }
    }

    (i == bytes.len()).then_some(result)
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` (skipping argv[0]).
pub fn parse_args() -> anyhow::Result<ParsedArgs> {
    let exe_name = std::env::args().next().unwrap_or_default();
    let argv: Vec<String> = std::env::args().skip(1).collect();
    parse_args_from(&exe_name, &argv)
}

/// Parse an explicit argument list. `exe_name` is argv[0] (used for help
/// text); `argv` is argv[1..]. Callable from tests without touching
/// `std::env`.
pub fn parse_args_from(exe_name: &str, argv: &[String]) -> anyhow::Result<ParsedArgs> {
    let mut level: u32 = 1;
    let mut format = Format::default();
    let mut limit: Option<u64> = None;
    let mut passes: u32 = DEFAULT_PASSES;
    let mut console = true;
    let mut force = false;
    let mut test = false;
    let mut input_filename: Option<String> = None;
    let mut exit_early = false;

    let mut arg_idx = 0usize;
    while arg_idx < argv.len() {
        let argument = argv[arg_idx].as_str();

        match argument {
            "-0" => level = 0,
            "-1" => level = 1,

            "-b" => {
                arg_idx += 1;
                let value = argv
                    .get(arg_idx)
                    .ok_or_else(|| anyhow!("bad usage: -b requires a byte count"))?;
                limit = Some(
                    read_u64_from_str(value)
                        .ok_or_else(|| anyhow!("bad usage: invalid byte count '{}'", value))?,
                );
            }

            "-c" => console = true,
            "-f" => force = true,

            "-h" => {
                print_usage(exe_name);
                exit_early = true;
            }

            "-l" => {
                arg_idx += 1;
                let value = argv
                    .get(arg_idx)
                    .ok_or_else(|| anyhow!("bad usage: -l requires a pass count"))?;
                passes = value
                    .parse::<u32>()
                    .ok()
                    .filter(|&n| n >= 1)
                    .ok_or_else(|| anyhow!("bad usage: invalid pass count '{}'", value))?;
            }

            "-t" => test = true,
            "-v" => set_display_level(display_level() + 1),
            "-q" => set_display_level(display_level().saturating_sub(1)),

            "-D" => format = Format::Deflate,
            "-G" => format = Format::Gzip,
            "-Z" => format = Format::Zlib,

            _ if argument.starts_with('-') && argument.len() > 1 => {
                return Err(anyhow!("bad usage: unknown option '{}'", argument));
            }

            _ => {
                if input_filename.is_some() {
                    return Err(anyhow!("bad usage: unexpected argument '{}'", argument));
                }
                input_filename = Some(argument.to_owned());
            }
        }

        arg_idx += 1;
    }

    Ok(ParsedArgs {
        level,
        format,
        limit,
        passes,
        console,
        force,
        test,
        input_filename,
        exit_early,
    })
}
