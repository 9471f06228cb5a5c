//! Rendering of records to standard output.
//!
//! The `text` format is one record per line; `json` and `yaml` serialize the
//! same records, in the same order, as a single document.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{Conversation, MessageRecord, SearchHit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(Error::Usage(format!(
                "Unsupported format '{}'. Use text|json|yaml",
                other
            ))),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// ISO-8601 timestamp with explicit UTC offset, e.g. `2024-05-01T12:30:00+00:00`.
pub fn iso_timestamp(date: &DateTime<Utc>) -> String {
    date.to_rfc3339()
}

/// Collapse line breaks so a message body fits on one output line.
pub fn flatten_text(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

pub fn dialog_line(dialog: &Conversation) -> String {
    format!("{}\t{}", dialog.id, dialog.label.display().unwrap_or_default())
}

pub fn message_line(message: &MessageRecord) -> String {
    format!(
        "[{}] {}",
        iso_timestamp(&message.date),
        flatten_text(&message.text)
    )
}

pub fn search_line(hit: &SearchHit) -> String {
    format!(
        "[{}] in {}: {}",
        iso_timestamp(&hit.date),
        hit.chat_label(),
        flatten_text(&hit.text)
    )
}

/// Write `records` to `out` in the requested format.
pub fn write_records<W, T, F>(out: &mut W, format: OutputFormat, records: &[T], line: F) -> Result<()>
where
    W: Write,
    T: Serialize,
    F: Fn(&T) -> String,
{
    match format {
        OutputFormat::Text => {
            for record in records {
                writeln!(out, "{}", line(record))?;
            }
        }
        OutputFormat::Json => {
            let payload = serde_json::to_string_pretty(records)?;
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Yaml => {
            let payload = serde_yaml::to_string(records)?;
            write!(out, "{payload}")?;
        }
    }
    out.flush()?;
    Ok(())
}
