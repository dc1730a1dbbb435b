//! CLI module for tripcrew - command-line interface and subcommands.

pub mod commands;
pub mod hints;
pub mod input;
pub mod interrupt;

pub use commands::Cli;
