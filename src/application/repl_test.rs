use std::env;
use std::sync::Arc;

use anyhow::Result;
use chrono::TimeZone;
use chrono::Utc;

use super::format_message;
use super::help_text;
use super::Flow;
use crate::application::app::App;
use crate::domain::models::ChatMessage;
use crate::domain::models::ChatReply;
use crate::domain::models::Role;
use crate::domain::models::UploadPolicy;
use crate::domain::services::testing::history_record;
use crate::domain::services::testing::Call;
use crate::domain::services::testing::FakeGateway;

fn setup() -> (Arc<FakeGateway>, App) {
    let gateway = Arc::new(FakeGateway::default());
    let app = App::new(gateway.clone(), UploadPolicy::default());

    return (gateway, app);
}

fn reply(session_id: &str, text: &str) -> ChatReply {
    return ChatReply {
        session_id: session_id.to_string(),
        reply: text.to_string(),
    };
}

#[test]
fn it_lists_every_command_in_help() {
    let text = help_text();
    for cmd in ["/clear", "/export", "/history", "/session", "/quit", "/help"] {
        assert!(text.contains(cmd), "missing {cmd}");
    }
}

#[test]
fn it_formats_messages_by_role() {
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();

    assert_eq!(
        format_message(&ChatMessage::new(1, Role::User, "What is X?", at)),
        "You: What is X?"
    );
    assert_eq!(
        format_message(&ChatMessage::new(2, Role::Assistant, "X is...", at)),
        "SolveX: X is..."
    );
}

#[tokio::test]
async fn it_ignores_blank_lines() -> Result<()> {
    let (gateway, mut app) = setup();

    let res = app.handle_line("   ").await?;

    assert_eq!(res, Flow::Continue);
    assert!(gateway.calls().is_empty());

    return Ok(());
}

#[tokio::test]
async fn it_sends_plain_lines_as_messages() -> Result<()> {
    let (gateway, mut app) = setup();
    gateway.chat.push(Ok(reply("s1", "X is...")));

    let res = app.handle_line("What is X?").await?;

    assert_eq!(res, Flow::Continue);
    let state = app.chat.state();
    assert_eq!(state.session_id, Some("s1".to_string()));
    assert_eq!(state.messages.len(), 2);

    return Ok(());
}

#[tokio::test]
async fn it_quits() -> Result<()> {
    let (_gateway, mut app) = setup();

    assert_eq!(app.handle_line("/quit").await?, Flow::Quit);
    assert_eq!(app.handle_line("/q").await?, Flow::Quit);

    return Ok(());
}

#[tokio::test]
async fn it_clears_the_conversation() -> Result<()> {
    let (gateway, mut app) = setup();
    gateway.chat.push(Ok(reply("s1", "hi")));
    app.handle_line("hello").await?;

    let res = app.handle_line("/clear").await?;

    assert_eq!(res, Flow::Continue);
    let state = app.chat.state();
    assert!(state.messages.is_empty());
    assert_eq!(state.session_id, None);

    return Ok(());
}

#[tokio::test]
async fn it_loads_history_by_session() -> Result<()> {
    let (gateway, mut app) = setup();
    gateway.history.push(Ok(vec![
        history_record(Role::User, "hello", ""),
        history_record(Role::Assistant, "hi there", ""),
    ]));

    app.handle_line("/history s9").await?;

    assert_eq!(gateway.calls(), vec![Call::History("s9".to_string())]);
    let state = app.chat.state();
    assert_eq!(state.session_id, Some("s9".to_string()));
    assert_eq!(state.messages[1].text, "hi there");

    return Ok(());
}

#[tokio::test]
async fn it_needs_a_session_to_load_history() -> Result<()> {
    let (gateway, mut app) = setup();

    let res = app.handle_line("/history").await?;

    assert_eq!(res, Flow::Continue);
    assert!(gateway.calls().is_empty());

    return Ok(());
}

#[tokio::test]
async fn it_exports_to_a_file() -> Result<()> {
    let (gateway, mut app) = setup();
    gateway.chat.push(Ok(reply("s1", "X is...")));
    app.handle_line("What is X?").await?;

    let file_path = env::temp_dir().join(format!("solvex-export-{}.json", std::process::id()));
    app.handle_line(&format!("/export {}", file_path.display()))
        .await?;

    let json = tokio::fs::read_to_string(&file_path).await?;
    let exported: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(exported["sessionId"], "s1");
    assert_eq!(exported["messages"][0]["type"], "user");
    assert_eq!(exported["messages"][1]["content"], "X is...");

    return Ok(());
}

#[tokio::test]
async fn it_keeps_chatting_when_export_cannot_be_written() -> Result<()> {
    let (gateway, mut app) = setup();
    gateway.chat.push(Ok(reply("s1", "X is...")));
    app.handle_line("What is X?").await?;

    let file_path = env::temp_dir()
        .join(format!("solvex-missing-{}", std::process::id()))
        .join("nested/export.json");
    let res = app
        .handle_line(&format!("/export {}", file_path.display()))
        .await?;

    assert_eq!(res, Flow::Continue);
    assert!(!file_path.exists());
    let state = app.chat.state();
    assert_eq!(state.session_id, Some("s1".to_string()));
    assert_eq!(state.messages.len(), 2);

    return Ok(());
}
