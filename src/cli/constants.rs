//! Program identity constants and display-level infrastructure.
//!
//! All diagnostics go to stderr so that compressed output on stdout stays
//! clean. Verbosity is a crate-level atomic shared by every module:
//!
//! 0 = silent; 1 = errors only; 2 = errors + warnings (default);
//! 3 = pass statistics; 4 = trace (strategy selection, block sizes).

use std::sync::atomic::{AtomicU32, Ordering};

// ── String / identity constants ───────────────────────────────────────────────
pub const PROGRAM_NAME: &str = "zenc";

/// Sentinel: read from standard input.
pub const STDIN_MARK: &str = "stdin";

// ── Size multiplier constants ─────────────────────────────────────────────────
/// 1 MiB, for throughput reporting.
pub const MB: u64 = 1 << 20;

// ── Display level global ──────────────────────────────────────────────────────
pub static DISPLAY_LEVEL: AtomicU32 = AtomicU32::new(2);

/// Returns the current display level.
#[inline]
pub fn display_level() -> u32 {
    DISPLAY_LEVEL.load(Ordering::Relaxed)
}

/// Sets the display level.
#[inline]
pub fn set_display_level(level: u32) {
    DISPLAY_LEVEL.store(level, Ordering::Relaxed);
}

/// Conditionally print to stderr at or above `level`.
#[macro_export]
macro_rules! displaylevel {
    ($level:expr, $($arg:tt)*) => {
        if $crate::cli::constants::display_level() >= $level {
            eprint!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_level_round_trips() {
        // Other tests may mutate the global; restore it afterwards.
        let prev = display_level();
        set_display_level(4);
        assert_eq!(display_level(), 4);
        set_display_level(prev);
    }
}
