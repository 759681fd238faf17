//! Library surface of the reposmith CLI.
//!
//! The binary in `main.rs` is a thin clap dispatcher; the command
//! implementations, config loading, and terminal helpers live here so
//! they can be tested directly.

pub mod commands;
pub mod config;
pub mod prompter;
pub mod ui;
