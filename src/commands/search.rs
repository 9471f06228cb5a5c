//! Global keyword search across every accessible chat.

use std::io::{self, Write};

use tracing::info;

use crate::api::MessagingApi;
use crate::config::Config;
use crate::error::Result;
use crate::output::{search_line, write_records, OutputFormat};
use crate::session;

/// CLI entry point.
pub async fn run(config: &Config, query: &str, limit: usize, format: OutputFormat) -> Result<()> {
    let (_lock, api) = session::connect(config).await?;
    let result = search(&api, query, limit, format, &mut io::stdout()).await;
    api.close().await;
    result.map(|_| ())
}

/// Print up to `limit` hits in service order.
///
/// Hits whose chat could not be resolved are labelled with the raw chat id.
pub async fn search<A, W>(
    api: &A,
    query: &str,
    limit: usize,
    format: OutputFormat,
    out: &mut W,
) -> Result<usize>
where
    A: MessagingApi,
    W: Write,
{
    let mut hits = api.search_messages(query, limit).await?;
    hits.truncate(limit);
    info!(query, count = hits.len(), "Search finished");

    write_records(out, format, &hits, search_line)?;
    Ok(hits.len())
}
