//! Fatal-error taxonomy for the harness.
//!
//! Every failure the core can hit is classified by the exit code the process
//! must terminate with. Nothing in the core calls `process::exit` itself;
//! errors propagate as [`Error`] values and only the binary entry point
//! converts them into termination (see `src/main.rs`).
//!
//! Classes:
//! - usage / refused-terminal / resource acquisition → exit code 1
//! - read failure while feeding the encoder          → exit code 2

use std::fmt;
use std::io;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// A fatal harness error, tagged with its exit-code class.
#[derive(Debug)]
pub enum Error {
    /// Invalid command line; diagnostic already formatted.
    Usage(String),
    /// Output would go to a terminal and `-f` was not given (or stdin is a
    /// terminal).
    Terminal(String),
    /// Resource acquisition failed: open, size inquiry, allocation, or an
    /// output write.
    Resource { what: String, source: io::Error },
    /// A read failed while filling the input buffer or segmenting a pass.
    Read { what: String, source: io::Error },
}

impl Error {
    /// Wraps an I/O failure from acquiring or writing a resource.
    pub fn resource(what: impl Into<String>, source: io::Error) -> Self {
        Error::Resource {
            what: what.into(),
            source,
        }
    }

    /// Wraps an input read failure.
    pub fn read(what: impl Into<String>, source: io::Error) -> Self {
        Error::Read {
            what: what.into(),
            source,
        }
    }

    /// Process exit code for this error class.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Usage(_) | Error::Terminal(_) | Error::Resource { .. } => 1,
            Error::Read { .. } => 2,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Usage(msg) => write!(f, "bad usage: {}", msg),
            Error::Terminal(msg) => write!(f, "{}", msg),
            Error::Resource { what, source } => write!(f, "{}: {}", what, source),
            Error::Read { what, source } => write!(f, "{}: {}", what, source),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Resource { source, .. } | Error::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_failures_use_a_distinct_exit_code() {
        let r = Error::read("read", io::Error::other("boom"));
        assert_eq!(r.exit_code(), 2);
        let a = Error::resource("mmap", io::Error::other("boom"));
        assert_eq!(a.exit_code(), 1);
        assert_eq!(Error::Usage("x".into()).exit_code(), 1);
    }

    #[test]
    fn display_includes_context_and_cause() {
        let e = Error::resource("open input.bin", io::Error::other("denied"));
        let s = e.to_string();
        assert!(s.contains("open input.bin"));
        assert!(s.contains("denied"));
    }
}
