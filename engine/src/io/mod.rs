//! I/O helpers for the CLI commands.

pub mod config;
pub mod deck;
