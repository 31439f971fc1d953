//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ConfiguredCatalog;
use crate::connector::Connector;
use crate::engine::{Message, SyncConfig};
use crate::error::{Error, Result};
use crate::source::PersonioSource;
use futures::StreamExt;
use serde_json::{json, Value};
use std::fs;
use std::io::Write;
use tracing::error;

/// CLI runner
pub struct Runner {
    cli: Cli,
    source: PersonioSource,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self::with_source(cli, PersonioSource::new())
    }

    /// Create a runner around a preconfigured source
    pub fn with_source(cli: Cli, source: PersonioSource) -> Self {
        Self { cli, source }
    }

    /// Run the CLI command, writing messages to stdout
    pub async fn run(&self) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.run_with_output(&mut out).await
    }

    /// Run the CLI command, writing messages to `out`
    pub async fn run_with_output(&self, out: &mut dyn Write) -> Result<()> {
        match &self.cli.command {
            Commands::Spec => self.spec(out),
            Commands::Check { live } => self.check(*live, out).await,
            Commands::Discover => self.discover(out).await,
            Commands::Read {
                streams,
                max_records,
            } => self.read(streams.as_deref(), *max_records, out).await,
        }
    }

    /// Load configuration
    fn load_config(&self) -> Result<Value> {
        // Inline config takes precedence
        if let Some(json_str) = &self.cli.config_json {
            return serde_json::from_str(json_str)
                .map_err(|e| Error::config(format!("Invalid config JSON: {e}")));
        }

        if let Some(path) = &self.cli.config {
            let content = fs::read_to_string(path)
                .map_err(|e| Error::config(format!("Failed to read config file: {e}")))?;
            return serde_json::from_str(&content)
                .map_err(|e| Error::config(format!("Invalid config JSON: {e}")));
        }

        // Default empty config
        Ok(json!({}))
    }

    fn spec(&self, out: &mut dyn Write) -> Result<()> {
        let spec = self.source.spec();
        self.output_message(
            out,
            &json!({
                "type": "SPEC",
                "spec": spec
            }),
        )
    }

    async fn check(&self, live: bool, out: &mut dyn Write) -> Result<()> {
        let config = self.load_config()?;
        let result = if live {
            self.source.check_connection_live(&config).await
        } else {
            self.source.check(&config).await?
        };

        let status = if result.success { "SUCCEEDED" } else { "FAILED" };
        let mut connection_status = json!({ "status": status });
        if let Some(message) = result.message {
            connection_status["message"] = Value::String(message);
        }

        self.output_message(
            out,
            &json!({
                "type": "CONNECTION_STATUS",
                "connectionStatus": connection_status
            }),
        )
    }

    async fn discover(&self, out: &mut dyn Write) -> Result<()> {
        let config = self.load_config()?;
        let catalog = self.source.discover(&config).await?;
        self.output_message(
            out,
            &json!({
                "type": "CATALOG",
                "catalog": catalog
            }),
        )
    }

    async fn read(
        &self,
        streams: Option<&str>,
        max_records: Option<usize>,
        out: &mut dyn Write,
    ) -> Result<()> {
        let config = self.load_config()?;
        let catalog = self.source.discover(&config).await?;

        let names: Vec<&str> = streams
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        let configured = if names.is_empty() {
            ConfiguredCatalog::all(&catalog)
        } else {
            ConfiguredCatalog::select(&catalog, &names)?
        };

        let source = self
            .source
            .clone()
            .with_sync_config(SyncConfig::new().with_max_records(max_records.unwrap_or(0)));

        let mut messages = source.read(&config, &configured).await?;
        while let Some(message) = messages.next().await {
            match message {
                Ok(msg) => self.output_message(out, &message_to_json(&msg))?,
                Err(e) => {
                    error!(error = %e, "Read failed");
                    self.output_message(
                        out,
                        &message_to_json(&Message::error(format!("Read failed: {e}"))),
                    )?;
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    /// Output a message
    fn output_message(&self, out: &mut dyn Write, msg: &Value) -> Result<()> {
        let line = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(msg)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(msg)?,
        };
        writeln!(out, "{line}")?;
        Ok(())
    }
}

/// Protocol envelope for an engine message
pub fn message_to_json(msg: &Message) -> Value {
    match msg {
        Message::Record {
            stream,
            data,
            emitted_at,
        } => json!({
            "type": "RECORD",
            "record": {
                "stream": stream,
                "data": data,
                "emitted_at": emitted_at.timestamp_millis()
            }
        }),
        Message::State { stream, data } => json!({
            "type": "STATE",
            "state": {
                "type": "STREAM",
                "stream": {
                    "stream_descriptor": {
                        "name": stream
                    },
                    "stream_state": data
                }
            }
        }),
        Message::Log { level, message } => json!({
            "type": "LOG",
            "log": {
                "level": level,
                "message": message
            }
        }),
    }
}
