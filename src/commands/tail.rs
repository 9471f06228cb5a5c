//! Print the latest messages of one chat, oldest first.

use std::io::{self, Write};

use tracing::info;

use crate::api::MessagingApi;
use crate::config::Config;
use crate::error::Result;
use crate::models::MessageRecord;
use crate::output::{message_line, write_records, OutputFormat};
use crate::session;

/// CLI entry point.
pub async fn run(config: &Config, chat: &str, limit: usize, format: OutputFormat) -> Result<()> {
    let (_lock, api) = session::connect(config).await?;
    let result = tail(&api, chat, limit, format, &mut io::stdout()).await;
    api.close().await;
    result.map(|_| ())
}

pub async fn tail<A, W>(
    api: &A,
    chat: &str,
    limit: usize,
    format: OutputFormat,
    out: &mut W,
) -> Result<usize>
where
    A: MessagingApi,
    W: Write,
{
    let entity = api.resolve_chat(chat).await?;
    let mut messages = api.recent_messages(&entity, limit).await?;
    messages.truncate(limit);
    sort_chronologically(&mut messages);
    info!(chat, count = messages.len(), "Tailing chat");

    write_records(out, format, &messages, message_line)?;
    Ok(messages.len())
}

/// Oldest first; ties keep message-id order.
pub fn sort_chronologically(messages: &mut [MessageRecord]) {
    messages.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
}
