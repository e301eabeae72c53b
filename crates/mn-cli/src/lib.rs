//! Keypress-driven behavioral annotation CLI library.
//!
//! This crate provides the terminal front end for `mn-core`.

mod cli;
pub mod commands;
mod config;
pub mod render;
pub mod terminal;

pub use cli::{ChartKind, Cli, Commands};
pub use config::Config;
