//! Stream events and their classification

use aurax_core::domain::heartbeat::Heartbeat;
use aurax_core::domain::task::TaskStatusSnapshot;
use thiserror::Error;
use tracing::debug;

use crate::stream::sse::SseFrame;

/// Frame name carrying a task status snapshot
pub const MESSAGE_EVENT: &str = "message";

/// Frame name carrying a heartbeat
pub const HEARTBEAT_EVENT: &str = "heartbeat";

/// Frame name the server uses to report a failure on the stream
pub const ERROR_EVENT: &str = "error";

/// One item delivered by a task stream
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// New state of the task
    StatusUpdate(TaskStatusSnapshot),
    /// Liveness signal; carries no task state
    Heartbeat(Heartbeat),
    /// Connection failure, server-reported error, or undecodable frame
    ConnectionError(StreamFault),
}

/// Problem observed on a task stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamFault {
    /// The server answered the handshake with a non-success status
    #[error("stream rejected (status {status}): {body}")]
    Rejected { status: u16, body: String },

    /// The server answered with something other than an event stream
    #[error("expected a text/event-stream response, got content type {0:?}")]
    UnexpectedContentType(Option<String>),

    /// The connection could not be established or broke mid-stream
    #[error("stream transport error: {0}")]
    Transport(String),

    /// The server closed the stream
    #[error("stream closed by server")]
    Disconnected,

    /// A frame arrived whose payload could not be decoded
    #[error("malformed `{event}` frame: {reason}")]
    MalformedFrame {
        event: String,
        data: String,
        reason: String,
    },

    /// The server sent an `error` frame
    #[error("server reported an error: {0}")]
    Server(String),
}

impl StreamFault {
    /// Whether reconnecting cannot help
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Rejected { .. } | Self::UnexpectedContentType(_)
        )
    }

    /// Whether the fault ended the current connection
    pub fn ends_connection(&self) -> bool {
        !matches!(self, Self::MalformedFrame { .. } | Self::Server(_))
    }

    /// HTTP status of a rejected handshake
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Maps a decoded frame onto exactly one event
///
/// Returns `None` for frame names this client does not know.
pub fn classify(frame: SseFrame) -> Option<StreamEvent> {
    match frame.event.as_str() {
        MESSAGE_EVENT => Some(match serde_json::from_str::<TaskStatusSnapshot>(&frame.data) {
            Ok(snapshot) => StreamEvent::StatusUpdate(snapshot),
            Err(e) => malformed(frame, e),
        }),
        HEARTBEAT_EVENT => Some(match serde_json::from_str::<Heartbeat>(&frame.data) {
            Ok(heartbeat) => StreamEvent::Heartbeat(heartbeat),
            Err(e) => malformed(frame, e),
        }),
        ERROR_EVENT => Some(StreamEvent::ConnectionError(StreamFault::Server(frame.data))),
        other => {
            debug!(event = other, "ignoring unknown stream frame");
            None
        }
    }
}

fn malformed(frame: SseFrame, error: serde_json::Error) -> StreamEvent {
    StreamEvent::ConnectionError(StreamFault::MalformedFrame {
        event: frame.event,
        data: frame.data,
        reason: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(event: &str, data: &str) -> SseFrame {
        SseFrame {
            event: event.to_string(),
            data: data.to_string(),
            id: None,
        }
    }

    #[test]
    fn test_message_frame_is_status_update() {
        let event = classify(frame(
            "message",
            r#"{"id":"t1","status":"COMPLETED","output":"result-url","errorMessage":null}"#,
        ));

        match event {
            Some(StreamEvent::StatusUpdate(snapshot)) => {
                assert_eq!(snapshot.id.as_str(), "t1");
                assert_eq!(snapshot.status.as_str(), "COMPLETED");
                assert_eq!(snapshot.output_str(), Some("result-url"));
            }
            other => panic!("expected StatusUpdate, got {:?}", other),
        }
    }

    #[test]
    fn test_heartbeat_frame_is_heartbeat() {
        assert_eq!(
            classify(frame("heartbeat", r#"{"timestamp":1700000000000}"#)),
            Some(StreamEvent::Heartbeat(Heartbeat {
                timestamp: 1_700_000_000_000
            }))
        );
    }

    #[test]
    fn test_fractional_heartbeat_is_not_malformed() {
        assert_eq!(
            classify(frame("heartbeat", r#"{"timestamp":1700000000000.5}"#)),
            Some(StreamEvent::Heartbeat(Heartbeat {
                timestamp: 1_700_000_000_000
            }))
        );
    }

    #[test]
    fn test_status_payload_on_heartbeat_frame_is_malformed() {
        // classification is by frame name, never by payload shape
        let event = classify(frame("heartbeat", r#"{"id":"t1","status":"QUEUED"}"#));
        assert!(matches!(
            event,
            Some(StreamEvent::ConnectionError(StreamFault::MalformedFrame { ref event, .. }))
                if event.as_str() == "heartbeat"
        ));
    }

    #[test]
    fn test_unparseable_message_is_reported() {
        let event = classify(frame("message", "not json"));
        match event {
            Some(StreamEvent::ConnectionError(fault @ StreamFault::MalformedFrame { .. })) => {
                assert!(!fault.ends_connection());
                assert!(!fault.is_fatal());
                if let StreamFault::MalformedFrame { data, .. } = fault {
                    assert_eq!(data, "not json");
                }
            }
            other => panic!("expected MalformedFrame, got {:?}", other),
        }
    }

    #[test]
    fn test_error_frame_is_server_fault() {
        assert_eq!(
            classify(frame("error", "task expired")),
            Some(StreamEvent::ConnectionError(StreamFault::Server(
                "task expired".to_string()
            )))
        );
    }

    #[test]
    fn test_unknown_frame_is_ignored() {
        assert_eq!(classify(frame("progress", "42")), None);
    }

    #[test]
    fn test_fault_kinds() {
        let rejected = StreamFault::Rejected {
            status: 401,
            body: "bad key".to_string(),
        };
        assert!(rejected.is_fatal());
        assert_eq!(rejected.status(), Some(401));
        assert!(!StreamFault::Disconnected.is_fatal());
        assert!(StreamFault::Disconnected.ends_connection());
    }
}
