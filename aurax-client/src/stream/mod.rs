//! Task event streams
//!
//! A [`TaskEventStream`] follows one task over a server-sent event connection
//! and yields [`StreamEvent`]s in the order the server emitted them.
//!
//! Lifecycle: `Connecting → Open → Closed`. The stream never closes itself on
//! a terminal status; only the caller knows when it has seen enough. It does
//! close on a fatal fault (rejected handshake, wrong content type, reconnect
//! attempts exhausted). Once the connection is requested, failures are never
//! returned as errors: they arrive as [`StreamEvent::ConnectionError`].
//!
//! Events can be consumed three ways:
//! - pull: [`TaskEventStream::next_event`]
//! - as a `futures::Stream`: [`TaskEventStream::into_stream`]
//! - callbacks: [`TaskEventStream::dispatch`] with a [`StreamHandler`]

mod event;
mod sse;

pub use event::{StreamEvent, StreamFault, classify};
pub use sse::{MAX_FRAME_BYTES, OversizedFrame, SseDecoder, SseFrame};

use async_trait::async_trait;
use aurax_core::domain::heartbeat::Heartbeat;
use aurax_core::domain::task::{TaskId, TaskStatusSnapshot};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time;
use tracing::{debug, info, warn};

use crate::AuraxClient;
use crate::config::StreamOptions;

/// Header used to resume a stream after a reconnect
pub const LAST_EVENT_ID_HEADER: &str = "Last-Event-ID";

type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StreamFault>> + Send>>;

/// Connection state of a task stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// No connection yet, or waiting to reconnect
    Connecting,
    Open,
    Closed,
}

/// Handle that closes a task stream
///
/// Cheap to clone and safe to use from any task, including from inside a
/// [`StreamHandler`] callback. Closing more than once has no effect.
#[derive(Debug, Clone)]
pub struct StreamCloser {
    tx: Arc<watch::Sender<bool>>,
}

impl StreamCloser {
    fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (Self { tx: Arc::new(tx) }, rx)
    }

    pub fn close(&self) {
        let already_closed = self.tx.send_replace(true);
        if !already_closed {
            debug!("task stream close requested");
        }
    }

    pub fn is_closed(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Callbacks for [`TaskEventStream::dispatch`]
///
/// Only `on_message` is required. Every callback receives the stream's
/// closer; closing from a callback stops delivery before the next event.
pub trait StreamHandler {
    fn on_message(&mut self, snapshot: TaskStatusSnapshot, closer: &StreamCloser);

    fn on_heartbeat(&mut self, heartbeat: Heartbeat, closer: &StreamCloser) {
        let _ = (heartbeat, closer);
    }

    fn on_error(&mut self, fault: StreamFault, closer: &StreamCloser) {
        let _ = (fault, closer);
    }
}

/// Opens the byte stream behind a [`TaskEventStream`]
#[async_trait]
trait Connector: Send {
    async fn connect(&mut self, last_event_id: Option<&str>) -> Result<ByteStream, StreamFault>;
}

/// Connects to `GET /api/ai/task/{id}/stream` with the client's credentials
struct HttpConnector {
    client: AuraxClient,
    url: String,
}

#[async_trait]
impl Connector for HttpConnector {
    async fn connect(&mut self, last_event_id: Option<&str>) -> Result<ByteStream, StreamFault> {
        // no request timeout: the connection is expected to stay open
        let mut request = self
            .client
            .authorize(self.client.client.get(&self.url))
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache");
        if let Some(id) = last_event_id {
            request = request.header(LAST_EVENT_ID_HEADER, id);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StreamFault::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StreamFault::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let is_event_stream = content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("text/event-stream"));
        if !is_event_stream {
            return Err(StreamFault::UnexpectedContentType(content_type));
        }

        Ok(Box::pin(response.bytes_stream().map(|chunk| {
            chunk.map_err(|e| StreamFault::Transport(e.to_string()))
        })))
    }
}

/// Live status stream for one task
///
/// Owns its connection exclusively; dropping the stream drops the connection.
pub struct TaskEventStream {
    task_id: TaskId,
    connector: Box<dyn Connector>,
    options: StreamOptions,
    state: StreamState,
    body: Option<ByteStream>,
    decoder: SseDecoder,
    pending: VecDeque<StreamEvent>,
    /// Consecutive connection failures since the last decoded frame
    failures: u32,
    reconnect_delay: Option<Duration>,
    closer: StreamCloser,
    close_rx: watch::Receiver<bool>,
}

impl TaskEventStream {
    pub(crate) fn connect(client: &AuraxClient, task_id: TaskId, url: String) -> Self {
        let connector = HttpConnector {
            client: client.clone(),
            url,
        };
        Self::with_connector(task_id, Box::new(connector), client.stream_options())
    }

    fn with_connector(
        task_id: TaskId,
        connector: Box<dyn Connector>,
        options: StreamOptions,
    ) -> Self {
        let (closer, close_rx) = StreamCloser::new();
        Self {
            task_id,
            connector,
            options,
            state: StreamState::Connecting,
            body: None,
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
            failures: 0,
            reconnect_delay: None,
            closer,
            close_rx,
        }
    }

    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    pub fn state(&self) -> StreamState {
        if self.closer.is_closed() {
            StreamState::Closed
        } else {
            self.state
        }
    }

    /// A handle that can close this stream from elsewhere
    pub fn closer(&self) -> StreamCloser {
        self.closer.clone()
    }

    /// Closes the stream and drops its connection
    ///
    /// Events not yet delivered are discarded. Calling this again is a no-op.
    pub fn close(&mut self) {
        self.closer.close();
        self.shutdown();
    }

    /// Waits for the next event
    ///
    /// Returns `None` once the stream is closed, whether by the caller or
    /// after a fatal fault (which is itself delivered first).
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        loop {
            if self.closer.is_closed() {
                self.shutdown();
                return None;
            }
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            match self.state {
                StreamState::Closed => return None,
                StreamState::Connecting => self.open().await,
                StreamState::Open => self.read_chunk().await,
            }
        }
    }

    /// Delivers events to `handler` until the stream closes
    pub async fn dispatch<H>(&mut self, handler: &mut H)
    where
        H: StreamHandler + ?Sized,
    {
        let closer = self.closer();
        while let Some(event) = self.next_event().await {
            match event {
                StreamEvent::StatusUpdate(snapshot) => handler.on_message(snapshot, &closer),
                StreamEvent::Heartbeat(heartbeat) => handler.on_heartbeat(heartbeat, &closer),
                StreamEvent::ConnectionError(fault) => handler.on_error(fault, &closer),
            }
        }
    }

    /// Adapts the stream into a `futures::Stream` of events
    pub fn into_stream(self) -> impl Stream<Item = StreamEvent> + Send {
        futures::stream::unfold(self, |mut stream| async move {
            stream.next_event().await.map(|event| (event, stream))
        })
    }

    async fn open(&mut self) {
        if let Some(delay) = self.reconnect_delay.take() {
            debug!(task_id = %self.task_id, ?delay, "waiting before reconnecting");
            tokio::select! {
                _ = time::sleep(delay) => {}
                _ = wait_closed(self.close_rx.clone()) => return,
            }
        }

        let last_event_id = self.decoder.last_event_id().map(str::to_string);
        let result = tokio::select! {
            result = self.connector.connect(last_event_id.as_deref()) => result,
            _ = wait_closed(self.close_rx.clone()) => return,
        };

        match result {
            Ok(body) => {
                info!(task_id = %self.task_id, "task stream open");
                self.decoder.reset();
                self.body = Some(body);
                self.state = StreamState::Open;
            }
            Err(fault) => self.fail(fault),
        }
    }

    async fn read_chunk(&mut self) {
        let Some(body) = self.body.as_mut() else {
            self.state = StreamState::Connecting;
            return;
        };

        let chunk = tokio::select! {
            chunk = body.next() => chunk,
            _ = wait_closed(self.close_rx.clone()) => return,
        };

        match chunk {
            Some(Ok(bytes)) => {
                // Frames completed by one chunk wait here in server order;
                // close() drops whatever has not been handed out yet.
                for decoded in self.decoder.feed(&bytes) {
                    self.failures = 0;
                    let event = match decoded {
                        Ok(frame) => {
                            debug!(
                                task_id = %self.task_id,
                                event = %frame.event,
                                "stream frame received"
                            );
                            classify(frame)
                        }
                        Err(oversized) => Some(StreamEvent::ConnectionError(
                            StreamFault::MalformedFrame {
                                event: oversized.event,
                                data: String::new(),
                                reason: format!("frame exceeds {} bytes", oversized.limit),
                            },
                        )),
                    };
                    if let Some(event) = event {
                        if let StreamEvent::ConnectionError(fault) = &event {
                            warn!(
                                task_id = %self.task_id,
                                %fault,
                                "stream frame reported a problem"
                            );
                        }
                        self.pending.push_back(event);
                    }
                }
            }
            Some(Err(fault)) => self.fail(fault),
            None => self.fail(StreamFault::Disconnected),
        }
    }

    /// Records a connection-level fault and decides whether to reconnect
    fn fail(&mut self, fault: StreamFault) {
        self.body = None;

        let reconnect = !fault.is_fatal() && self.failures < self.options.max_reconnects;
        if reconnect {
            self.failures += 1;
            let delay = self.decoder.retry().unwrap_or(self.options.default_retry);
            warn!(
                task_id = %self.task_id,
                %fault,
                attempt = self.failures,
                max = self.options.max_reconnects,
                "task stream interrupted, reconnecting"
            );
            self.reconnect_delay = Some(delay);
            self.state = StreamState::Connecting;
        } else {
            warn!(task_id = %self.task_id, %fault, "task stream failed, closing");
            self.state = StreamState::Closed;
        }

        self.pending.push_back(StreamEvent::ConnectionError(fault));
    }

    fn shutdown(&mut self) {
        if self.state != StreamState::Closed {
            info!(task_id = %self.task_id, "task stream closed");
        }
        self.state = StreamState::Closed;
        self.body = None;
        self.pending.clear();
        self.reconnect_delay = None;
    }
}

/// Resolves once the closer has been triggered
async fn wait_closed(mut close_rx: watch::Receiver<bool>) {
    loop {
        if *close_rx.borrow_and_update() {
            return;
        }
        if close_rx.changed().await.is_err() {
            // closer dropped without closing
            std::future::pending::<()>().await;
        }
    }
}

impl std::fmt::Debug for TaskEventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskEventStream")
            .field("task_id", &self.task_id)
            .field("state", &self.state())
            .field("pending", &self.pending.len())
            .field("failures", &self.failures)
            .finish()
    }
}
