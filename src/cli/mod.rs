//! CLI module - argument parsing and command dispatch

pub mod args;
pub mod commands;
pub mod context;
pub mod helpers;
pub mod output;
pub mod table;
pub mod wizard;

pub use args::{Cli, Commands, GlobalOpts, OutputFormat};
