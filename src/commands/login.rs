//! Interactive login with optional two-step verification.
//!
//! Reuses an authorized session when there is one; otherwise requests a
//! login code for `--phone`, reads it from the terminal and signs in,
//! asking for the 2FA password when the account requires it.

use std::io::{self, BufRead, Write};

use tracing::info;

use crate::api::MessagingApi;
use crate::config::Config;
use crate::error::{requires_second_factor, Error, Result};
use crate::models::Account;
use crate::session;

pub const PHONE_REQUIRED: &str = "First-time login requires --phone +<countrycode><number>";
pub const CODE_PROMPT: &str = "Enter the Telegram login code you received: ";
pub const PASSWORD_PROMPT: &str = "Enter your Telegram 2FA password: ";

/// CLI entry point.
pub async fn run(config: &Config, phone: Option<&str>) -> Result<()> {
    let (_lock, api) = session::connect(config).await?;

    let stdin = io::stdin();
    let result = login(&api, phone, &mut stdin.lock(), &mut io::stdout()).await;

    api.close().await;
    result.map(|_| ())
}

/// Drive the login dialogue over `input`/`out` and print the identity.
///
/// A failed password attempt is returned as-is; there is no second prompt.
pub async fn login<A, R, W>(
    api: &A,
    phone: Option<&str>,
    input: &mut R,
    out: &mut W,
) -> Result<Account>
where
    A: MessagingApi,
    R: BufRead,
    W: Write,
{
    if !api.is_authorized().await? {
        let phone = phone
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::Usage(PHONE_REQUIRED.to_string()))?;

        api.request_login_code(phone).await?;
        let code = prompt(input, out, CODE_PROMPT)?;

        match api.sign_in(code.trim()).await {
            Ok(_) => {}
            Err(err) if requires_second_factor(&err) => {
                info!("Account requires a 2FA password");
                let password = prompt(input, out, PASSWORD_PROMPT)?;
                api.check_password(&password).await?;
            }
            Err(err) => return Err(err),
        }
    }

    let me = api.me().await?;
    writeln!(out, "{}", logged_in_line(&me))?;
    out.flush()?;
    Ok(me)
}

pub fn logged_in_line(account: &Account) -> String {
    match account.username.as_deref() {
        Some(username) => format!("Logged in as: {} @{}", account.id, username),
        None => format!("Logged in as: {}", account.id),
    }
}

/// Print `message` and read one line, without its line terminator.
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, message: &str) -> Result<String> {
    write!(out, "{}", message)?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(Error::IoError(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input closed while waiting for an answer",
        )));
    }

    let trimmed = line.strip_suffix('\n').unwrap_or(&line);
    let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
    Ok(trimmed.to_string())
}
