//! Task command handlers
//!
//! Handles fetching, polling and streaming the status of a task.

use std::time::Duration;

use anyhow::{Result, bail};
use aurax_client::{AuraxClient, PollConfig, StreamCloser, StreamFault, StreamHandler};
use aurax_core::domain::heartbeat::Heartbeat;
use aurax_core::domain::status::TaskPhase;
use aurax_core::domain::task::{TaskId, TaskStatusSnapshot};
use clap::Subcommand;
use colored::*;
use tracing::debug;

/// Task subcommands
#[derive(Subcommand)]
pub enum TaskCommands {
    /// Get the current status of a task
    Get {
        /// Task ID
        id: String,
    },
    /// Poll a task until it finishes
    Poll {
        /// Task ID
        id: String,

        /// Delay between status checks
        #[arg(long, default_value_t = 2_000)]
        interval_ms: u64,

        /// Give up after this long
        #[arg(long, default_value_t = 300_000)]
        timeout_ms: u64,
    },
    /// Follow a task's live status stream until it finishes
    Stream {
        /// Task ID
        id: String,
    },
}

/// Handle task commands
///
/// # Arguments
/// * `client` - The API client
/// * `command` - The task command to execute
pub async fn handle_task_command(client: &AuraxClient, command: TaskCommands) -> Result<()> {
    match command {
        TaskCommands::Get { id } => get_task(client, &TaskId::new(id)).await,
        TaskCommands::Poll {
            id,
            interval_ms,
            timeout_ms,
        } => {
            let config = PollConfig::default()
                .with_interval(Duration::from_millis(interval_ms))
                .with_timeout(Duration::from_millis(timeout_ms));
            poll_task(client, &TaskId::new(id), &config).await
        }
        TaskCommands::Stream { id } => stream_until_terminal(client, &TaskId::new(id)).await,
    }
}

async fn get_task(client: &AuraxClient, task_id: &TaskId) -> Result<()> {
    let snapshot = client.get_task(task_id).await?;
    print_snapshot(&snapshot);
    Ok(())
}

async fn poll_task(client: &AuraxClient, task_id: &TaskId, config: &PollConfig) -> Result<()> {
    println!(
        "{}",
        format!("Polling task {} every {:?}...", task_id, config.interval).dimmed()
    );
    let snapshot = client.poll_task(task_id, config).await?;
    print_snapshot(&snapshot);
    outcome(&snapshot)
}

/// Stream a task's status until it reaches a terminal status
///
/// Ctrl-C closes the stream.
pub async fn stream_until_terminal(client: &AuraxClient, task_id: &TaskId) -> Result<()> {
    let mut stream = client.stream_task(task_id);

    let closer = stream.closer();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupted, closing stream");
            closer.close();
        }
    });

    println!("{}", format!("Streaming task {}...", task_id).dimmed());
    let mut printer = StatusPrinter::default();
    stream.dispatch(&mut printer).await;
    interrupt.abort();

    match printer.last {
        Some(snapshot) if snapshot.status.is_terminal() => {
            print_snapshot(&snapshot);
            outcome(&snapshot)
        }
        Some(snapshot) => bail!(
            "Stream closed before task {} finished (last status: {})",
            task_id,
            snapshot.status
        ),
        None => bail!("Stream closed before any status for task {} arrived", task_id),
    }
}

/// Prints stream events as they arrive and closes on a terminal status
#[derive(Default)]
struct StatusPrinter {
    last: Option<TaskStatusSnapshot>,
}

impl StreamHandler for StatusPrinter {
    fn on_message(&mut self, snapshot: TaskStatusSnapshot, closer: &StreamCloser) {
        println!("  {} {}", "▸".cyan(), colorize_status(&snapshot));
        if snapshot.status.is_terminal() {
            closer.close();
        }
        self.last = Some(snapshot);
    }

    fn on_heartbeat(&mut self, heartbeat: Heartbeat, _closer: &StreamCloser) {
        let at = heartbeat
            .at()
            .map(|at| at.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| heartbeat.timestamp.to_string());
        println!("  {}", format!("♥ {}", at).dimmed());
    }

    fn on_error(&mut self, fault: StreamFault, _closer: &StreamCloser) {
        eprintln!("  {} {}", "⚠".yellow(), fault.to_string().yellow());
    }
}

/// Turn a terminal snapshot into the command's exit status
fn outcome(snapshot: &TaskStatusSnapshot) -> Result<()> {
    match snapshot.status.phase() {
        TaskPhase::Failed | TaskPhase::Cancelled => {
            bail!("Task {} ended with status {}", snapshot.id, snapshot.status)
        }
        _ => Ok(()),
    }
}

/// Print detailed task information
pub fn print_snapshot(snapshot: &TaskStatusSnapshot) {
    println!("{}", "Task Details:".bold());
    println!("  ID:      {}", snapshot.id.as_str().cyan());
    println!("  Status:  {}", colorize_status(snapshot));

    if let Some(output) = &snapshot.output {
        println!("\n{}", "Output:".bold());
        match output.as_str() {
            Some(text) => println!("{}", text),
            None => match serde_json::to_string_pretty(output) {
                Ok(pretty) => println!("{}", pretty),
                Err(_) => println!("{:?}", output),
            },
        }
    }

    if let Some(error) = &snapshot.error_message {
        println!("\n{}", "Error:".bold());
        println!("{}", error.red());
    }
}

/// Colorize task status for display
fn colorize_status(snapshot: &TaskStatusSnapshot) -> ColoredString {
    let label = if snapshot.status.is_empty() {
        "<none>"
    } else {
        snapshot.status.as_str()
    };
    match snapshot.status.phase() {
        TaskPhase::Queued => label.yellow(),
        TaskPhase::Processing => label.cyan(),
        TaskPhase::Succeeded => label.green(),
        TaskPhase::Failed => label.red(),
        TaskPhase::Cancelled => label.dimmed(),
        TaskPhase::Unknown => label.normal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurax_core::domain::task::TaskStatus;

    fn snapshot(status: &str) -> TaskStatusSnapshot {
        TaskStatusSnapshot {
            id: TaskId::new("task-1"),
            status: TaskStatus::new(status),
            output: None,
            error_message: None,
        }
    }

    #[test]
    fn test_outcome_follows_phase() {
        assert!(outcome(&snapshot("COMPLETED")).is_ok());
        assert!(outcome(&snapshot("FAILED")).is_err());
        assert!(outcome(&snapshot("cancelled")).is_err());
    }

    #[test]
    fn test_printer_closes_on_terminal_status() {
        let (closer, _keep) = test_closer();
        let mut printer = StatusPrinter::default();

        printer.on_message(snapshot("PROCESSING"), &closer);
        assert!(!closer.is_closed());

        printer.on_message(snapshot("COMPLETED"), &closer);
        assert!(closer.is_closed());
        assert_eq!(printer.last.unwrap().status.as_str(), "COMPLETED");
    }

    #[test]
    fn test_printer_keeps_stream_open_on_errors() {
        let (closer, _keep) = test_closer();
        let mut printer = StatusPrinter::default();

        printer.on_error(StreamFault::Disconnected, &closer);

        assert!(!closer.is_closed());
        assert!(printer.last.is_none());
    }

    fn test_closer() -> (StreamCloser, aurax_client::TaskEventStream) {
        let client = AuraxClient::new(
            aurax_client::ClientConfig::new("key", "key-id").with_base_url("http://127.0.0.1:1"),
        )
        .unwrap();
        let stream = client.stream_task(&TaskId::new("task-1"));
        (stream.closer(), stream)
    }
}
