//! Command-line interface for davstore.

pub mod args;
pub mod command_context;
mod commands;

use clap::{Parser, Subcommand};
use thiserror::Error;

use command_context::{CommandContext, CommandContextError};

pub use args::{GlobalArgs, OutputSink};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during CLI execution.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument processing error.
    #[error("{0}")]
    Args(#[from] args::ArgsError),

    /// Context creation error.
    #[error("{0}")]
    Context(#[from] CommandContextError),

    /// Repository error.
    #[error("{0}")]
    Dav(#[from] crate::directory::DavError),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

// =============================================================================
// CLI Definition
// =============================================================================

/// davstore - Browse and publish files on a WebDAV share.
#[derive(Parser, Debug)]
#[command(name = "davstore", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List a directory, skipping hidden entries.
    Ls(commands::browse::LsArgs),

    /// Show what a path is, its size and modification time.
    Stat(commands::browse::StatArgs),

    /// Download a file.
    Get(commands::transfer::GetArgs),

    /// Upload a file, creating parent directories as needed.
    Put(commands::transfer::PutArgs),

    /// Delete a file or directory.
    Rm(commands::transfer::RmArgs),

    /// Create a directory and its missing parents.
    Mkdir(commands::transfer::MkdirArgs),
}

// =============================================================================
// CLI Execution
// =============================================================================

impl Cli {
    /// Parse command-line arguments and return the CLI instance.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Run the CLI command.
    pub async fn run(self) -> Result<()> {
        let ctx = CommandContext::new(&self.global)?;

        match self.command {
            Command::Ls(args) => args.run(&ctx).await,
            Command::Stat(args) => args.run(&ctx).await,
            Command::Get(args) => args.run(&ctx).await,
            Command::Put(args) => args.run(&ctx).await,
            Command::Rm(args) => args.run(&ctx).await,
            Command::Mkdir(args) => args.run(&ctx).await,
        }
    }
}

/// Main entry point for the CLI.
pub async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli.run().await
}
