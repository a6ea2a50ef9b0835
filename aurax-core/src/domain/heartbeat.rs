//! Stream heartbeat payload

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Liveness signal sent on a task stream
///
/// Carries no task state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heartbeat {
    /// Milliseconds since the Unix epoch
    #[serde(deserialize_with = "deserialize_millis")]
    pub timestamp: i64,
}

impl Heartbeat {
    /// The heartbeat time, if the timestamp is representable
    pub fn at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Millis {
    Whole(i64),
    Fractional(f64),
}

/// Accepts any JSON number; fractional milliseconds are truncated
fn deserialize_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Millis::deserialize(deserializer)? {
        Millis::Whole(millis) => millis,
        Millis::Fractional(millis) => millis.trunc() as i64,
    })
}
