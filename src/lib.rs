//! habitkeep: a command-line habit tracker on top of `habitkeep-core`.

pub mod cli;
pub mod config;
pub mod render;
