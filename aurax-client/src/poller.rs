//! Task poller
//!
//! Repeatedly queries a task's status until the status is terminal or the
//! deadline passes. The loop is a plain future: dropping it cancels polling.
//!
//! Each tick runs: fetch → terminal check → deadline check → sleep. Because
//! the terminal check comes first, a task observed terminal on the tick that
//! crosses the deadline is still reported as finished, not timed out.

use async_trait::async_trait;
use aurax_core::domain::status::StatusVocabulary;
use aurax_core::domain::task::{TaskId, TaskStatus, TaskStatusSnapshot};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant};
use tracing::{debug, info};

use crate::error::{ClientError, Result};

/// Single-shot status query used by the poller
///
/// Implementations must not share mutable state between calls, so that one
/// source can serve concurrent polls of different tasks.
#[async_trait]
pub trait TaskStatusSource: Send + Sync {
    /// Fetches the current status of a task
    async fn fetch_status(&self, task_id: &TaskId) -> Result<TaskStatusSnapshot>;
}

/// Decides whether a status ends polling
#[derive(Clone)]
pub struct TerminalPredicate(Arc<dyn Fn(&TaskStatus) -> bool + Send + Sync>);

impl TerminalPredicate {
    pub fn new(predicate: impl Fn(&TaskStatus) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    /// Terminal when the vocabulary classifies the status as a final phase
    pub fn from_vocabulary(vocabulary: StatusVocabulary) -> Self {
        Self::new(move |status| vocabulary.is_terminal(status))
    }

    /// Empty status labels are never terminal, whatever the predicate says
    pub fn is_terminal(&self, status: &TaskStatus) -> bool {
        !status.is_empty() && (self.0)(status)
    }
}

impl Default for TerminalPredicate {
    fn default() -> Self {
        Self::from_vocabulary(StatusVocabulary::default())
    }
}

impl fmt::Debug for TerminalPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TerminalPredicate(..)")
    }
}

/// Polling parameters, supplied per call
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Pause between two status queries
    pub interval: Duration,

    /// Time after which a non-terminal task fails the poll with `Timeout`
    pub timeout: Duration,

    pub is_terminal: TerminalPredicate,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            timeout: Duration::from_secs(5 * 60),
            is_terminal: TerminalPredicate::default(),
        }
    }
}

impl PollConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a custom status vocabulary for the terminal check
    pub fn with_vocabulary(mut self, vocabulary: StatusVocabulary) -> Self {
        self.is_terminal = TerminalPredicate::from_vocabulary(vocabulary);
        self
    }

    pub fn with_terminal_predicate(
        mut self,
        predicate: impl Fn(&TaskStatus) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.is_terminal = TerminalPredicate::new(predicate);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(ClientError::Config("poll interval must be greater than 0".into()));
        }
        Ok(())
    }
}

/// Polls `task_id` until its status is terminal
///
/// # Returns
/// The first snapshot whose status satisfies the terminal predicate
///
/// # Errors
/// - Any fetch failure, returned immediately without further attempts
/// - [`ClientError::Timeout`] once more than `timeout` has elapsed without a
///   terminal status
pub async fn poll_until_terminal<S>(
    source: &S,
    task_id: &TaskId,
    config: &PollConfig,
) -> Result<TaskStatusSnapshot>
where
    S: TaskStatusSource + ?Sized,
{
    config.validate()?;

    let start = Instant::now();
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let snapshot = source.fetch_status(task_id).await?;

        if config.is_terminal.is_terminal(&snapshot.status) {
            info!(%task_id, status = %snapshot.status, attempts, "task reached terminal status");
            return Ok(snapshot);
        }

        let elapsed = start.elapsed();
        if elapsed > config.timeout {
            info!(%task_id, status = %snapshot.status, ?elapsed, "gave up polling task");
            return Err(ClientError::Timeout {
                task_id: task_id.clone(),
                elapsed,
                last_status: snapshot.status,
            });
        }

        debug!(%task_id, status = %snapshot.status, attempts, "task not finished yet");
        time::sleep(config.interval).await;
    }
}
