//! Tests for the login command

use std::io::Cursor;

use tg_tools::commands::login::{login, CODE_PROMPT, PASSWORD_PROMPT, PHONE_REQUIRED};
use tg_tools::{Account, Error};

use super::fake::{FakeApi, SignIn};

async fn run_login(api: &FakeApi, phone: Option<&str>, input: &str) -> (Result<Account, Error>, String) {
    let mut input = Cursor::new(input.to_string());
    let mut out = Vec::new();
    let result = login(api, phone, &mut input, &mut out).await;
    (result, String::from_utf8(out).expect("utf-8 output"))
}

#[tokio::test]
async fn authorized_session_reports_identity_only() {
    let api = FakeApi::default();

    let (result, out) = run_login(&api, None, "").await;

    assert_eq!(result.unwrap().id, 1001);
    assert_eq!(out, "Logged in as: 1001 @me\n");
    assert_eq!(api.calls(), vec!["is_authorized", "me"]);
}

#[tokio::test]
async fn first_login_without_phone_is_usage_error() {
    let api = FakeApi {
        authorized: false,
        ..Default::default()
    };

    let (result, out) = run_login(&api, None, "12345\n").await;

    match result {
        Err(Error::Usage(message)) => assert_eq!(message, PHONE_REQUIRED),
        other => panic!("expected usage error, got {other:?}"),
    }
    assert!(out.is_empty());
    assert_eq!(api.calls(), vec!["is_authorized"]);
}

#[tokio::test]
async fn blank_phone_counts_as_missing() {
    let api = FakeApi {
        authorized: false,
        ..Default::default()
    };

    let (result, _) = run_login(&api, Some("   "), "").await;

    assert!(matches!(result, Err(Error::Usage(_))));
    assert_eq!(api.calls(), vec!["is_authorized"]);
}

#[tokio::test]
async fn code_login_signs_in_with_trimmed_code() {
    let api = FakeApi {
        authorized: false,
        ..Default::default()
    };

    let (result, out) = run_login(&api, Some("+15551234567"), " 12345 \n").await;

    assert!(result.is_ok());
    assert_eq!(
        api.calls(),
        vec![
            "is_authorized",
            "request_login_code +15551234567",
            "sign_in 12345",
            "me",
        ]
    );
    assert!(out.starts_with(CODE_PROMPT));
    assert!(!out.contains(PASSWORD_PROMPT));
    assert!(out.ends_with("Logged in as: 1001 @me\n"));
}

#[tokio::test]
async fn password_required_prompts_for_second_factor() {
    let api = FakeApi {
        authorized: false,
        sign_in: SignIn::PasswordRequired,
        ..Default::default()
    };

    let (result, out) = run_login(&api, Some("+15551234567"), "12345\nhunter2\n").await;

    assert!(result.is_ok());
    assert!(out.contains(PASSWORD_PROMPT));
    assert_eq!(
        api.calls(),
        vec![
            "is_authorized",
            "request_login_code +15551234567",
            "sign_in 12345",
            "check_password hunter2",
            "me",
        ]
    );
}

#[tokio::test]
async fn password_mentioned_in_error_text_prompts_for_second_factor() {
    let api = FakeApi {
        authorized: false,
        sign_in: SignIn::Fail("SESSION_PASSWORD_NEEDED".to_string()),
        ..Default::default()
    };

    let (result, _) = run_login(&api, Some("+15551234567"), "12345\nhunter2\n").await;

    assert!(result.is_ok());
    assert!(api.calls().contains(&"check_password hunter2".to_string()));
}

#[tokio::test]
async fn other_sign_in_failures_propagate() {
    let api = FakeApi {
        authorized: false,
        sign_in: SignIn::Fail("PHONE_CODE_INVALID".to_string()),
        ..Default::default()
    };

    let (result, out) = run_login(&api, Some("+15551234567"), "00000\nhunter2\n").await;

    assert!(matches!(result, Err(Error::Authorization(ref m)) if m == "PHONE_CODE_INVALID"));
    assert!(!out.contains(PASSWORD_PROMPT));
    assert!(!api.calls().iter().any(|c| c.starts_with("check_password")));
    assert!(!api.calls().contains(&"me".to_string()));
}

#[tokio::test]
async fn wrong_password_is_not_retried() {
    let api = FakeApi {
        authorized: false,
        sign_in: SignIn::PasswordRequired,
        ..Default::default()
    };

    let (result, out) = run_login(&api, Some("+15551234567"), "12345\nwrong\nhunter2\n").await;

    assert!(matches!(result, Err(Error::Authorization(_))));
    assert_eq!(out.matches(PASSWORD_PROMPT).count(), 1);
    let attempts = api
        .calls()
        .iter()
        .filter(|c| c.starts_with("check_password"))
        .count();
    assert_eq!(attempts, 1);
}

#[tokio::test]
async fn identity_without_username_omits_handle() {
    let api = FakeApi {
        account: Account {
            id: 5,
            username: None,
        },
        ..Default::default()
    };

    let (_, out) = run_login(&api, None, "").await;

    assert_eq!(out, "Logged in as: 5\n");
}
