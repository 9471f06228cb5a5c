//! Tests for the tail command

use std::collections::HashMap;

use tg_tools::commands::tail::tail;
use tg_tools::{Error, MessageRecord, OutputFormat};

use super::fake::{message, FakeApi};

fn api_with(chat: &str, messages: Vec<MessageRecord>) -> FakeApi {
    FakeApi {
        chats: HashMap::from([(chat.to_string(), messages)]),
        ..Default::default()
    }
}

async fn render(api: &FakeApi, chat: &str, limit: usize) -> Result<String, Error> {
    let mut out = Vec::new();
    tail(api, chat, limit, OutputFormat::Text, &mut out).await?;
    Ok(String::from_utf8(out).expect("utf-8 output"))
}

#[tokio::test]
async fn prints_oldest_first_with_flattened_text() {
    let api = api_with(
        "@rustlang",
        vec![
            message(3, 1_700_000_300, "third"),
            message(2, 1_700_000_200, "line1\nline2"),
            message(1, 1_700_000_100, ""),
        ],
    );

    let out = render(&api, "@rustlang", 50).await.unwrap();

    assert_eq!(
        out,
        "[2023-11-14T22:15:00+00:00] \n\
         [2023-11-14T22:16:40+00:00] line1 line2\n\
         [2023-11-14T22:18:20+00:00] third\n"
    );
    assert_eq!(
        api.calls(),
        vec!["resolve_chat @rustlang", "recent_messages @rustlang 50"]
    );
}

#[tokio::test]
async fn output_is_chronological_for_any_upstream_order() {
    let api = api_with(
        "42",
        vec![
            message(5, 500, "e"),
            message(1, 100, "a"),
            message(4, 400, "d"),
            message(2, 200, "b"),
        ],
    );

    let out = render(&api, "42", 10).await.unwrap();
    let texts: Vec<&str> = out
        .lines()
        .map(|l| l.split_once("] ").unwrap().1)
        .collect();

    assert_eq!(texts, vec!["a", "b", "d", "e"]);
}

#[tokio::test]
async fn limit_is_passed_and_enforced() {
    let mut api = api_with(
        "chat",
        (1..=10).rev().map(|i| message(i, i as i64 * 10, "x")).collect(),
    );
    api.ignore_limit = true;

    let out = render(&api, "chat", 3).await.unwrap();

    assert_eq!(out.lines().count(), 3);
    assert!(api.calls().contains(&"recent_messages chat 3".to_string()));
}

#[tokio::test]
async fn unknown_chat_is_an_error_and_prints_nothing() {
    let api = api_with("known", vec![]);

    let err = render(&api, "@unknown", 5).await.unwrap_err();

    assert!(matches!(err, Error::ChatNotFound(ref c) if c == "@unknown"));
    assert_eq!(api.calls(), vec!["resolve_chat @unknown"]);
}
