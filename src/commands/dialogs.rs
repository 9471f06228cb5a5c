//! List the most recent dialogs as `<id>\t<label>`.

use std::io::{self, Write};

use tracing::info;

use crate::api::MessagingApi;
use crate::config::Config;
use crate::error::Result;
use crate::output::{dialog_line, write_records, OutputFormat};
use crate::session;

/// CLI entry point.
pub async fn run(config: &Config, limit: usize, format: OutputFormat) -> Result<()> {
    let (_lock, api) = session::connect(config).await?;
    let result = list_dialogs(&api, limit, format, &mut io::stdout()).await;
    api.close().await;
    result.map(|_| ())
}

/// Print up to `limit` dialogs in the order the service returns them.
pub async fn list_dialogs<A, W>(
    api: &A,
    limit: usize,
    format: OutputFormat,
    out: &mut W,
) -> Result<usize>
where
    A: MessagingApi,
    W: Write,
{
    let mut dialogs = api.dialogs(limit).await?;
    dialogs.truncate(limit);
    info!(count = dialogs.len(), "Listing dialogs");

    write_records(out, format, &dialogs, dialog_line)?;
    Ok(dialogs.len())
}
