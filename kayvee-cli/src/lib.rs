//! kayvee CLI library
//!
//! The binary in `main.rs` is a thin shell over these modules so that
//! argument parsing, command handlers and output rendering can be tested
//! without spawning a process.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
