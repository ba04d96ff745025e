//! Command-line interface for Pigeonhole.

pub mod args;
pub mod commands;
