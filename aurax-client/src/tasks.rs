//! Task status endpoints

use async_trait::async_trait;
use aurax_core::domain::task::{TaskId, TaskStatusSnapshot};
use tracing::debug;

use crate::error::Result;
use crate::poller::{PollConfig, TaskStatusSource, poll_until_terminal};
use crate::stream::TaskEventStream;
use crate::{AuraxClient, path_segment};

impl AuraxClient {
    // =============================================================================
    // Task Status
    // =============================================================================

    /// Get the current status of a task
    ///
    /// # Arguments
    /// * `task_id` - The task identifier returned at submission
    ///
    /// # Returns
    /// A snapshot of the task at the time of the query
    pub async fn get_task(&self, task_id: &TaskId) -> Result<TaskStatusSnapshot> {
        let url = format!(
            "{}/api/ai/task/{}",
            self.base_url,
            path_segment(task_id.as_str())
        );
        debug!(%task_id, "fetching task status");
        let response = self.get(&url).send().await?;

        Self::handle_response(response).await
    }

    /// Poll a task until it reaches a terminal status
    ///
    /// Drop the returned future to stop polling.
    ///
    /// # Example
    /// ```no_run
    /// # use aurax_client::{AuraxClient, ClientConfig, PollConfig};
    /// # use std::time::Duration;
    /// # async fn example(client: AuraxClient) -> aurax_client::Result<()> {
    /// let config = PollConfig::default()
    ///     .with_interval(Duration::from_millis(500))
    ///     .with_timeout(Duration::from_secs(60));
    /// let snapshot = client.poll_task(&"task-123".into(), &config).await?;
    /// println!("{:?}", snapshot.output);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn poll_task(
        &self,
        task_id: &TaskId,
        config: &PollConfig,
    ) -> Result<TaskStatusSnapshot> {
        poll_until_terminal(self, task_id, config).await
    }

    /// Open the live status stream of a task
    ///
    /// The connection is made when the first event is requested. Call
    /// [`TaskEventStream::close`] (or a [`crate::StreamCloser`]) when done;
    /// the stream does not close itself on a terminal status.
    pub fn stream_task(&self, task_id: &TaskId) -> TaskEventStream {
        let url = format!(
            "{}/api/ai/task/{}/stream",
            self.base_url,
            path_segment(task_id.as_str())
        );
        TaskEventStream::connect(self, task_id.clone(), url)
    }
}

#[async_trait]
impl TaskStatusSource for AuraxClient {
    async fn fetch_status(&self, task_id: &TaskId) -> Result<TaskStatusSnapshot> {
        self.get_task(task_id).await
    }
}
