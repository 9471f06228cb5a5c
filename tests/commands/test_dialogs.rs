//! Tests for the dialogs command

use tg_tools::commands::dialogs::list_dialogs;
use tg_tools::chat::{marked_id, PeerKind};
use tg_tools::{ChatLabel, Conversation, OutputFormat};

use super::fake::{dialog, FakeApi};

fn abc() -> Vec<Conversation> {
    vec![dialog(11, "A"), dialog(22, "B"), dialog(33, "C")]
}

async fn render(api: &FakeApi, limit: usize, format: OutputFormat) -> String {
    let mut out = Vec::new();
    list_dialogs(api, limit, format, &mut out)
        .await
        .expect("dialogs");
    String::from_utf8(out).expect("utf-8 output")
}

#[tokio::test]
async fn limit_two_prints_first_two_in_order() {
    let api = FakeApi {
        dialogs: abc(),
        ..Default::default()
    };

    let out = render(&api, 2, OutputFormat::Text).await;

    assert_eq!(out, "11\tA\n22\tB\n");
    assert_eq!(api.calls(), vec!["dialogs 2"]);
}

#[tokio::test]
async fn limit_is_enforced_even_if_backend_over_delivers() {
    let api = FakeApi {
        dialogs: abc(),
        ignore_limit: true,
        ..Default::default()
    };

    let out = render(&api, 2, OutputFormat::Text).await;

    assert_eq!(out.lines().count(), 2);
}

#[tokio::test]
async fn limit_above_total_prints_everything() {
    let api = FakeApi {
        dialogs: abc(),
        ..Default::default()
    };

    let out = render(&api, 30, OutputFormat::Text).await;

    assert_eq!(out.lines().collect::<Vec<_>>(), vec!["11\tA", "22\tB", "33\tC"]);
}

#[tokio::test]
async fn label_precedence_title_username_first_name() {
    let api = FakeApi {
        dialogs: vec![
            Conversation {
                id: 1,
                label: ChatLabel::new(Some("Group"), Some("group_handle"), None),
            },
            Conversation {
                id: 2,
                label: ChatLabel::new(None, Some("ferris"), Some("Ferris")),
            },
            Conversation {
                id: 3,
                label: ChatLabel::new(None, None, Some("Ferris")),
            },
        ],
        ..Default::default()
    };

    let out = render(&api, 10, OutputFormat::Text).await;

    assert_eq!(out, "1\tGroup\n2\tferris\n3\tFerris\n");
}

#[tokio::test]
async fn json_output_keeps_order() {
    let api = FakeApi {
        dialogs: abc(),
        ..Default::default()
    };

    let out = render(&api, 3, OutputFormat::Json).await;
    let parsed: serde_json::Value = serde_json::from_str(&out).expect("json");

    let ids: Vec<i64> = parsed
        .as_array()
        .expect("array")
        .iter()
        .map(|d| d["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![11, 22, 33]);
}

#[tokio::test]
async fn ids_are_printed_in_marked_form() {
    let api = FakeApi {
        dialogs: vec![
            dialog(marked_id(PeerKind::Channel, 1234567890), "Channel"),
            dialog(marked_id(PeerKind::Group, 4567), "Group"),
            dialog(marked_id(PeerKind::User, 777), "User"),
        ],
        ..Default::default()
    };

    let out = render(&api, 10, OutputFormat::Text).await;

    assert_eq!(out, "-1001234567890\tChannel\n-4567\tGroup\n777\tUser\n");
}
