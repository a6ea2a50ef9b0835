//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod image;
mod submit;
mod task;

pub use submit::{DescribeArgs, GenerateArgs, VtoArgs};
pub use task::TaskCommands;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start a virtual try-on task
    Vto(VtoArgs),
    /// Start an image generation task
    Generate(GenerateArgs),
    /// Describe a product image
    Describe(DescribeArgs),
    /// Task status
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Download a result image
    Image {
        /// Image identifier
        id: String,

        /// File to write the image to
        #[arg(short, long)]
        output: std::path::PathBuf,
    },
}

/// How to follow a task after submitting it
#[derive(Args, Debug, Clone, Copy)]
pub struct FollowArgs {
    /// Poll the task until it finishes
    #[arg(long, conflicts_with = "stream")]
    pub wait: bool,

    /// Follow the task's live status stream until it finishes
    #[arg(long)]
    pub stream: bool,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let client = config.client()?;

    match command {
        Commands::Vto(args) => submit::submit_vto(&client, args).await,
        Commands::Generate(args) => submit::submit_generation(&client, args).await,
        Commands::Describe(args) => submit::describe_product(&client, args).await,
        Commands::Task { command } => task::handle_task_command(&client, command).await,
        Commands::Image { id, output } => image::download_image(&client, &id, &output).await,
    }
}
