//! CLI subcommands.

pub mod browse;
pub mod transfer;
