//! Sync engine
//!
//! Reads the selected streams one after another, page by page. Each page's
//! records are handed to the consumer before the next page is requested, so
//! a failure on page N still leaves pages 1 to N-1 delivered.

mod types;

pub use types::{LogLevel, Message, SyncConfig, SyncStats};

use crate::connector::MessageStream;
use crate::error::Result;
use crate::http::HttpClient;
use crate::pagination::PaginationState;
use crate::streams::StreamDefinition;
use crate::types::{FlatRecord, JsonObject, JsonValue};
use futures::StreamExt;
use std::cmp::Ordering;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Drives stream definitions against the Personio API
pub struct SyncEngine {
    client: HttpClient,
    config: SyncConfig,
    stats: SyncStats,
}

impl SyncEngine {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            config: SyncConfig::default(),
            stats: SyncStats::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Read `streams` in order.
    ///
    /// The first failing stream yields one `Err` and ends the read; streams
    /// after it are not requested.
    pub fn read<S>(self, streams: Vec<S>) -> MessageStream
    where
        S: StreamDefinition + 'static,
    {
        let state = ReadState {
            engine: self,
            pending: streams.into_iter(),
            active: None,
        };
        Box::pin(futures::stream::unfold(state, step).flat_map(futures::stream::iter))
    }

    fn begin(&self, stream: &dyn StreamDefinition) -> (StreamProgress, Message) {
        info!(stream = stream.name(), "Starting sync");
        let progress = StreamProgress {
            pagination: PaginationState::new(),
            emitted: 0,
            max_cursor: None,
            started: Instant::now(),
        };
        let message = Message::info(format!("Starting sync for stream: {}", stream.name()));
        (progress, message)
    }

    /// Fetch, parse and paginate one page.
    ///
    /// The page is parsed in full before any of its records is returned, so
    /// one malformed item fails the page.
    async fn next_page(
        &mut self,
        stream: &dyn StreamDefinition,
        progress: &mut StreamProgress,
    ) -> Result<Vec<Message>> {
        let request = stream.build_request(progress.pagination.token.as_ref())?;
        let body = self
            .client
            .get_json(&request, stream.authenticator(), &|status| {
                stream.should_retry(status)
            })
            .await?;
        self.stats.pages_fetched += 1;

        let records = stream
            .parse_page(&body)?
            .collect::<Result<Vec<FlatRecord>>>()?;
        debug!(
            stream = stream.name(),
            page = progress.pagination.pages + 1,
            records = records.len(),
            "Fetched page"
        );
        stream.next_page_token(records.len(), &mut progress.pagination);

        let cursor_field = stream.config().cursor_field;
        let mut messages = Vec::with_capacity(records.len());
        for record in records {
            if self.config.limit_reached(progress.emitted) {
                break;
            }
            if let Some(value) = cursor_field.and_then(|field| record.get(field)) {
                progress.observe_cursor(value);
            }
            messages.push(Message::record(stream.name(), record));
            progress.emitted += 1;
        }

        if self.config.limit_reached(progress.emitted) {
            progress.pagination.mark_done();
        }
        Ok(messages)
    }

    /// State for the highest cursor seen, if any, then the summary log
    fn finish(&mut self, stream: &dyn StreamDefinition, progress: StreamProgress) -> Vec<Message> {
        let name = stream.name();
        let mut messages = Vec::new();

        if let (Some(field), Some(cursor)) = (stream.config().cursor_field, progress.max_cursor) {
            let mut state = JsonObject::new();
            state.insert(field.to_string(), cursor);
            messages.push(Message::state(name, JsonValue::Object(state)));
        }

        if self.config.limit_reached(progress.emitted) {
            messages.push(Message::warn(format!(
                "Stopped {name} at the limit of {} records",
                self.config.max_records
            )));
        }

        self.stats.records_synced += progress.emitted;
        self.stats.streams_synced += 1;
        self.stats.duration_ms += progress.started.elapsed().as_millis() as u64;

        let pages = progress.pagination.pages;
        info!(stream = name, records = progress.emitted, pages, "Completed sync");
        messages.push(Message::info(format!(
            "Completed sync for {name}: {} records in {pages} pages",
            progress.emitted
        )));
        messages
    }
}

/// Position within one stream
#[derive(Debug)]
struct StreamProgress {
    pagination: PaginationState,
    emitted: usize,
    max_cursor: Option<JsonValue>,
    started: Instant,
}

impl StreamProgress {
    fn observe_cursor(&mut self, value: &JsonValue) {
        let newer = match &self.max_cursor {
            None => value.is_string() || value.is_number(),
            Some(max) => cursor_cmp(value, max) == Some(Ordering::Greater),
        };
        if newer {
            self.max_cursor = Some(value.clone());
        }
    }
}

/// Numbers compare numerically, strings lexically; other pairs are unordered
fn cursor_cmp(a: &JsonValue, b: &JsonValue) -> Option<Ordering> {
    match (a, b) {
        (JsonValue::Number(a), JsonValue::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
        },
        (JsonValue::String(a), JsonValue::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

struct ReadState<S> {
    engine: SyncEngine,
    pending: std::vec::IntoIter<S>,
    active: Option<(S, StreamProgress)>,
}

/// One unit of a read: a stream start, one page, or a stream's end
async fn step<S: StreamDefinition>(
    mut state: ReadState<S>,
) -> Option<(Vec<Result<Message>>, ReadState<S>)> {
    let Some((stream, mut progress)) = state.active.take() else {
        let Some(stream) = state.pending.next() else {
            let stats = &state.engine.stats;
            info!(
                streams = stats.streams_synced,
                records = stats.records_synced,
                pages = stats.pages_fetched,
                "Read finished"
            );
            return None;
        };
        let (progress, started) = state.engine.begin(&stream);
        state.active = Some((stream, progress));
        return Some((vec![Ok(started)], state));
    };

    if !progress.pagination.has_next_page() {
        let done = state.engine.finish(&stream, progress);
        return Some((done.into_iter().map(Ok).collect(), state));
    }

    match state.engine.next_page(&stream, &mut progress).await {
        Ok(records) => {
            state.active = Some((stream, progress));
            Some((records.into_iter().map(Ok).collect(), state))
        }
        Err(e) => {
            warn!(stream = stream.name(), error = %e, "Stream failed");
            state.pending = Vec::new().into_iter();
            Some((vec![Err(e)], state))
        }
    }
}
