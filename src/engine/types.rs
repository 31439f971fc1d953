//! What a stream sync produces, and how far it may go

use crate::types::{FlatRecord, JsonValue};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Severity of a [`Message::Log`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// Output of a sync, in emission order
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Record {
        stream: String,
        data: FlatRecord,
        emitted_at: DateTime<Utc>,
    },
    /// Highest cursor value of a finished stream, keyed by cursor field
    State { stream: String, data: JsonValue },
    Log { level: LogLevel, message: String },
}

impl Message {
    /// Record stamped with the current time
    pub fn record(stream: &str, data: FlatRecord) -> Self {
        Self::Record {
            stream: stream.to_string(),
            data,
            emitted_at: Utc::now(),
        }
    }

    pub fn state(stream: &str, data: JsonValue) -> Self {
        Self::State {
            stream: stream.to_string(),
            data,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Info, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Warn, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Error, message)
    }

    fn log(level: LogLevel, message: impl Into<String>) -> Self {
        Self::Log {
            level,
            message: message.into(),
        }
    }

    /// Record payload, for record messages only
    pub fn as_record(&self) -> Option<&FlatRecord> {
        match self {
            Self::Record { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn is_state(&self) -> bool {
        matches!(self, Self::State { .. })
    }
}

/// Limits applied to every stream of a read
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncConfig {
    /// Records emitted per stream at most; 0 means no limit
    pub max_records: usize,
}

impl SyncConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records = max;
        self
    }

    /// Whether `emitted` records exhaust the limit
    pub fn limit_reached(&self, emitted: usize) -> bool {
        self.max_records != 0 && emitted >= self.max_records
    }
}

/// Running totals over every stream an engine has synced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub records_synced: usize,
    pub pages_fetched: usize,
    pub streams_synced: usize,
    pub duration_ms: u64,
}
