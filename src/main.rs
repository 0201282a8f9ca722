//! Binary entry point for the `zenc` streaming-encoder benchmark harness.
//!
//! Streams a file (or stdin) through the deflate-family encoder in
//! fixed-size blocks, optionally repeating the whole pass to measure
//! sustained throughput.
//!
//! # Control flow
//!
//! 1. [`parse_args`] processes all flags and builds a [`ParsedArgs`] value.
//! 2. [`run`] refuses terminal output without `-f`, acquires the input
//!    (mapped or buffered), drives the passes, and reports totals.
//! 3. `main` converts a propagated [`zenc::Error`] into the process exit
//!    code for its class (1 = usage/resource, 2 = read failure).

use std::io::{self, IsTerminal};

use zenc::cli::args::{parse_args, ParsedArgs};
use zenc::cli::constants::{MB, PROGRAM_NAME};
use zenc::displaylevel;
use zenc::encoder::{self, DeflateStream};
use zenc::error::Error;
use zenc::runner::{run_passes, Sink};
use zenc::source::{Channel, InputSource};
use zenc::timefn;

// POSIX fixes the clock() unit at one microsecond regardless of the
// actual tick rate.
const CLOCKS_PER_SEC: libc::clock_t = 1_000_000;

// The vendored libc build does not declare `clock()` for this target,
// so bind the libc symbol directly.
extern "C" {
    fn clock() -> libc::clock_t;
}

/// True when reading would block on an interactive terminal: stdin was
/// selected as the input and nothing is piped into it.
fn stdin_is_interactive(reading_stdin: bool, force: bool, stdin_terminal: bool) -> bool {
    reading_stdin && !force && stdin_terminal
}

/// Execute the run selected by argument parsing.
fn run(args: ParsedArgs) -> zenc::Result<()> {
    displaylevel!(
        4,
        "*** {} v{} {}-bit ***\n",
        PROGRAM_NAME,
        zenc::ZENC_VERSION_STRING,
        std::mem::size_of::<*const ()>() * 8
    );

    // Compressed data on an interactive terminal is almost always a mistake.
    if args.console && !args.test && !args.force && io::stdout().is_terminal() {
        return Err(Error::Terminal(
            "Use -f if you really want to send compressed data to a terminal, or -h for help."
                .to_owned(),
        ));
    }

    // Likewise, waiting on keyboard input for the benchmark corpus is
    // almost always a forgotten file argument.
    if stdin_is_interactive(
        args.input_filename.is_none(),
        args.force,
        io::stdin().is_terminal(),
    ) {
        return Err(Error::Terminal(
            "Refusing to read input from a terminal. Pipe data in, pass a file, or use -f to force."
                .to_owned(),
        ));
    }

    // One-time encoder table/dispatch preparation, before any timed work.
    encoder::prepare();

    let channel = Channel::open(args.input_filename.as_deref())?;
    let mut source = InputSource::acquire(channel, args.limit)?;
    displaylevel!(
        4,
        "input strategy: {}, budget: {}\n",
        source.strategy(),
        match source.total() {
            Some(n) => n.to_string(),
            None => "unknown".to_owned(),
        }
    );

    let mut sink = if args.test {
        Sink::Null
    } else {
        Sink::Console(io::stdout())
    };

    let time_start = timefn::get_time();
    // SAFETY: clock() has no preconditions.
    let cpu_start = unsafe { clock() };

    let level = args.level;
    let format = args.format;
    let totals = run_passes(
        &mut source,
        args.passes,
        || DeflateStream::new(level, format),
        &mut sink,
    )?;

    let wall_ns = timefn::clock_span_ns(time_start).max(1);
    // SAFETY: clock() has no preconditions.
    let cpu_ns = (unsafe { clock() } - cpu_start) as f64 * 1e9 / CLOCKS_PER_SEC as f64;

    displaylevel!(
        3,
        "totin={} totout={} ratio={:.2}% crc32={:08x}\n",
        totals.bytes_in,
        totals.bytes_out,
        totals.ratio(),
        totals.checksum
    );
    displaylevel!(
        3,
        "done in {:.3}s (cpu {:.3}s), {:.1} MB/s\n",
        wall_ns as f64 / 1e9,
        cpu_ns / 1e9,
        totals.bytes_in as f64 / MB as f64 / (wall_ns as f64 / 1e9)
    );

    Ok(())
}

fn main() {
    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{}: {}", PROGRAM_NAME, e);
            std::process::exit(1);
        }
    };

    // -h prints usage; nothing left to do.
    if args.exit_early {
        std::process::exit(0);
    }

    match run(args) {
        Ok(()) => {}
        Err(e) => {
            let code = e.exit_code();
            eprintln!("{}: {}", PROGRAM_NAME, e);
            std::process::exit(code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::stdin_is_interactive;

    #[test]
    fn stdin_refused_only_on_an_unforced_terminal() {
        // stdin input, no -f, terminal attached: refused.
        assert!(stdin_is_interactive(true, false, true));
        // -f overrides the refusal.
        assert!(!stdin_is_interactive(true, true, true));
        // Piped stdin is fine.
        assert!(!stdin_is_interactive(true, false, false));
        // File input never consults the terminal state.
        assert!(!stdin_is_interactive(false, false, true));
    }
}
