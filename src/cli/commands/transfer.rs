//! Commands that move or change data: `get`, `put`, `rm` and `mkdir`.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::cli::command_context::CommandContext;
use crate::cli::{OutputSink, Result};

#[derive(Serialize)]
struct TransferOutput {
    location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes: Option<u64>,
}

async fn report(
    ctx: &CommandContext,
    output: &OutputSink,
    action: &str,
    path: &str,
    bytes: Option<u64>,
) -> Result<()> {
    let report = TransferOutput {
        location: ctx.repository.display_name(path),
        bytes,
    };
    if ctx.json {
        output.write_json(&report).await?;
    } else {
        let line = match bytes {
            Some(bytes) => format!("{} {} ({} bytes)", action, report.location, bytes),
            None => format!("{} {}", action, report.location),
        };
        output.write_str(&line).await?;
    }
    Ok(())
}

// =============================================================================
// Get
// =============================================================================

/// Arguments for the get command.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Remote file, relative to the repository root.
    pub path: String,

    /// Local destination file.
    pub destination: PathBuf,

    #[command(flatten)]
    pub output: OutputSink,
}

impl GetArgs {
    pub async fn run(self, ctx: &CommandContext) -> Result<()> {
        let bytes = ctx.repository.get(&self.path, &self.destination).await?;
        report(ctx, &self.output, "downloaded", &self.path, Some(bytes)).await
    }
}

// =============================================================================
// Put
// =============================================================================

/// Arguments for the put command.
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Local file to upload.
    pub source: PathBuf,

    /// Remote destination, relative to the repository root.
    pub path: String,

    /// Replace the destination if it already exists.
    #[arg(long)]
    pub overwrite: bool,

    #[command(flatten)]
    pub output: OutputSink,
}

impl PutArgs {
    pub async fn run(self, ctx: &CommandContext) -> Result<()> {
        ctx.repository
            .put(&self.source, &self.path, self.overwrite)
            .await?;
        report(ctx, &self.output, "uploaded", &self.path, None).await
    }
}

// =============================================================================
// Rm
// =============================================================================

/// Arguments for the rm command.
#[derive(Args, Debug)]
pub struct RmArgs {
    /// File or directory to delete, relative to the repository root.
    pub path: String,

    #[command(flatten)]
    pub output: OutputSink,
}

impl RmArgs {
    pub async fn run(self, ctx: &CommandContext) -> Result<()> {
        ctx.repository.delete(&self.path).await?;
        report(ctx, &self.output, "deleted", &self.path, None).await
    }
}

// =============================================================================
// Mkdir
// =============================================================================

/// Arguments for the mkdir command.
#[derive(Args, Debug)]
pub struct MkdirArgs {
    /// Directory to create, with any missing parents.
    pub path: String,

    #[command(flatten)]
    pub output: OutputSink,
}

impl MkdirArgs {
    pub async fn run(self, ctx: &CommandContext) -> Result<()> {
        ctx.repository.make_directory(&self.path).await?;
        report(ctx, &self.output, "created", &self.path, None).await
    }
}
