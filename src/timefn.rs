// timefn - portable high-resolution monotonic timer abstraction
//
// Rust's std::time::Instant is monotonic and MT-safe on all supported
// platforms, so a single implementation replaces the platform-specific
// clock sources the pass timer would otherwise need.

use std::time::Instant;

/// Nanosecond duration type.
pub type DurationNs = u64;

/// Opaque timestamp container. The absolute value is not meaningful;
/// use it only to compute a duration between two measurements.
#[derive(Clone, Copy)]
pub struct TimeT {
    pub(crate) t: Instant,
}

impl TimeT {
    /// Returns a timestamp from now.
    pub fn new() -> Self {
        TimeT { t: Instant::now() }
    }
}

impl Default for TimeT {
    fn default() -> Self {
        TimeT::new()
    }
}

/// Returns the current monotonic timestamp.
pub fn get_time() -> TimeT {
    TimeT { t: Instant::now() }
}

/// Returns the nanosecond duration between `clock_start` and `clock_end`.
pub fn span_ns(clock_start: TimeT, clock_end: TimeT) -> DurationNs {
    clock_end.t.duration_since(clock_start.t).as_nanos() as DurationNs
}

/// Measures nanoseconds elapsed since `clock_start`.
pub fn clock_span_ns(clock_start: TimeT) -> DurationNs {
    clock_start.t.elapsed().as_nanos() as DurationNs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_are_monotonic() {
        let t0 = get_time();
        let a = clock_span_ns(t0);
        let b = clock_span_ns(t0);
        assert!(b >= a);
    }

    #[test]
    fn span_between_two_timestamps() {
        let t0 = get_time();
        let t1 = get_time();
        // Instant is monotonic; the span is well-defined and small.
        let _ = span_ns(t0, t1);
    }
}
