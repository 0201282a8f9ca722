// zenc — streaming deflate/zlib/gzip encoder benchmark harness

pub mod cli;
pub mod config;
pub mod encoder;
pub mod error;
pub mod runner;
pub mod source;
pub mod timefn;

pub use error::{Error, Result};

pub const ZENC_VERSION_STRING: &str = env!("CARGO_PKG_VERSION");
