//! Subprocess execution with streaming output classification.

pub mod ansi;
mod classify;
mod error;
mod runner;

pub use classify::*;
pub use error::*;
pub use runner::*;
