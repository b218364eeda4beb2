//! ci-action - CI build steps with classified, real-time tool output.
//!
//! The core is [`run::ProcessRunner`]: it supervises a build tool, streams
//! both of its output pipes line by line, assigns each line a
//! [`run::Severity`] and hands it to a [`log::LogSink`]. The [`actions`]
//! module drives CMake, CTest and friends through it for a preset.

pub mod actions;
pub mod config;
pub mod docker;
pub mod log;
pub mod preset;
pub mod run;
