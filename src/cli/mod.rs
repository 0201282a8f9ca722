//! Command-line surface: constants and display infrastructure, argument
//! parsing, and help text.

pub mod args;
pub mod constants;
pub mod help;
