//! Read-only commands: `ls` and `stat`.

use clap::Args;
use serde::Serialize;

use crate::cli::command_context::CommandContext;
use crate::cli::{OutputSink, Result};
use crate::resource::{Existence, Resource};

// =============================================================================
// Ls
// =============================================================================

/// Arguments for the ls command.
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Directory to list, relative to the repository root.
    #[arg(default_value = "/")]
    pub path: String,

    #[command(flatten)]
    pub output: OutputSink,
}

impl LsArgs {
    pub async fn run(self, ctx: &CommandContext) -> Result<()> {
        let children = ctx.repository.list(&self.path).await?;

        if ctx.json {
            self.output.write_json(&children).await?;
        } else {
            self.output.write_lines(&children).await?;
        }
        Ok(())
    }
}

// =============================================================================
// Stat
// =============================================================================

/// Arguments for the stat command.
#[derive(Args, Debug)]
pub struct StatArgs {
    /// Path to describe, relative to the repository root.
    pub path: String,

    #[command(flatten)]
    pub output: OutputSink,
}

#[derive(Serialize)]
struct StatOutput {
    location: String,
    kind: &'static str,
    content_type: Option<String>,
    content_length: i64,
    last_modified: i64,
}

impl StatArgs {
    pub async fn run(self, ctx: &CommandContext) -> Result<()> {
        let resource = ctx.repository.resource(&self.path);
        let kind = match resource.existence().await {
            Existence::Directory => "directory",
            Existence::File => "file",
            Existence::Absent => "absent",
        };
        let stat = StatOutput {
            location: ctx.repository.display_name(&self.path),
            kind,
            content_type: resource
                .metadata()
                .await
                .metadata()
                .and_then(|metadata| metadata.content_type.clone()),
            content_length: resource.content_length().await,
            last_modified: resource.last_modified().await,
        };

        if ctx.json {
            self.output.write_json(&stat).await?;
        } else {
            self.output
                .write_lines([
                    format!("location:       {}", stat.location),
                    format!("kind:           {}", stat.kind),
                    format!(
                        "content type:   {}",
                        stat.content_type.as_deref().unwrap_or("-")
                    ),
                    format!("content length: {}", stat.content_length),
                    format!("last modified:  {}", stat.last_modified),
                ])
                .await?;
        }
        Ok(())
    }
}
