use chrono::TimeZone;
use chrono::Utc;

use super::ChatState;
use crate::domain::models::ChatAction;
use crate::domain::models::Exchange;
use crate::domain::models::OperationId;
use crate::domain::models::Role;
use crate::domain::models::StoreError;
use crate::domain::services::testing::history_record;

fn begin(state: ChatState, action: ChatAction) -> (ChatState, OperationId) {
    let state = state.apply(action);
    let op = state.operations.last_issued().unwrap();
    return (state, op);
}

fn exchange(session_id: &str, text: &str, reply: &str) -> Exchange {
    return Exchange {
        session_id: session_id.to_string(),
        text: text.to_string(),
        reply: reply.to_string(),
        received_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 15).unwrap(),
    };
}

fn send(state: ChatState, session_id: &str, text: &str, reply: &str) -> ChatState {
    let (state, op) = begin(state, ChatAction::SendStarted());
    return state.apply(ChatAction::SendSucceeded(op, exchange(session_id, text, reply)));
}

fn texts(state: &ChatState) -> Vec<(Role, String)> {
    return state
        .messages
        .iter()
        .map(|msg| return (msg.role, msg.text.to_string()))
        .collect();
}

#[test]
fn it_appends_user_then_assistant_on_success() {
    let (state, op) = begin(ChatState::default(), ChatAction::SendStarted());
    assert!(state.loading());
    assert!(state.is_sending());

    let state = state.apply(ChatAction::SendSucceeded(op, exchange("s1", "hello", "hi there")));

    assert!(!state.loading());
    assert_eq!(state.session_id, Some("s1".to_string()));
    assert_eq!(
        texts(&state),
        vec![
            (Role::User, "hello".to_string()),
            (Role::Assistant, "hi there".to_string())
        ]
    );
}

#[test]
fn it_appends_nothing_on_failure() {
    let state = send(ChatState::default(), "s1", "hello", "hi");
    let before = state.messages.clone();

    let (state, op) = begin(state, ChatAction::SendStarted());
    let err = StoreError::Server {
        status: 500,
        detail: "Error processing chat".to_string(),
    };
    let state = state.apply(ChatAction::SendFailed(op, err.clone()));

    assert_eq!(state.messages, before);
    assert_eq!(state.error, Some(err));
    assert!(!state.loading());
}

#[test]
fn it_clears_error_after_a_successful_send() {
    let (state, op) = begin(ChatState::default(), ChatAction::SendStarted());
    let state = state.apply(ChatAction::SendFailed(op, StoreError::Transport("down".to_string())));
    let state = send(state, "s1", "retry", "ok");

    assert!(state.error.is_none());
    assert_eq!(state.messages.len(), 2);
}

#[test]
fn it_keeps_the_session_across_sends() {
    let state = send(ChatState::default(), "s1", "one", "1");
    let state = send(state, "s1", "two", "2");

    assert_eq!(state.session_id, Some("s1".to_string()));
    assert_eq!(state.messages.len(), 4);
}

#[test]
fn it_adopts_a_reissued_session() {
    let state = send(ChatState::default(), "s1", "one", "1");
    let state = send(state, "s2", "two", "2");

    assert_eq!(state.session_id, Some("s2".to_string()));
}

#[test]
fn it_keeps_the_session_when_reply_has_none() {
    let state = send(ChatState::default(), "s1", "one", "1");
    let state = send(state, "", "two", "2");

    assert_eq!(state.session_id, Some("s1".to_string()));
}

#[test]
fn it_assigns_unique_increasing_ids_within_a_millisecond() {
    let state = send(ChatState::default(), "s1", "one", "1");
    let state = send(state, "s1", "two", "2");

    let ids = state
        .messages
        .iter()
        .map(|msg| return msg.id)
        .collect::<Vec<u64>>();
    for pair in ids.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

#[test]
fn it_keeps_concurrent_pairs_adjacent_in_completion_order() {
    let (state, first) = begin(ChatState::default(), ChatAction::SendStarted());
    let (state, second) = begin(state, ChatAction::SendStarted());

    let state = state.apply(ChatAction::SendSucceeded(second, exchange("s1", "second", "2")));
    let state = state.apply(ChatAction::SendSucceeded(first, exchange("s1", "first", "1")));

    assert_eq!(
        texts(&state),
        vec![
            (Role::User, "second".to_string()),
            (Role::Assistant, "2".to_string()),
            (Role::User, "first".to_string()),
            (Role::Assistant, "1".to_string()),
        ]
    );
}

#[test]
fn it_clears_messages_and_session() {
    let state = send(ChatState::default(), "s1", "hello", "hi");
    let state = state.apply(ChatAction::Clear());

    assert!(state.messages.is_empty());
    assert_eq!(state.session_id, None);
    assert!(state.error.is_none());
}

#[test]
fn it_clears_an_empty_store() {
    let state = ChatState::default().apply(ChatAction::Clear());
    assert!(state.messages.is_empty());
    assert_eq!(state.session_id, None);
}

#[test]
fn it_discards_replies_that_arrive_after_clear() {
    let (state, op) = begin(ChatState::default(), ChatAction::SendStarted());
    let state = state.apply(ChatAction::Clear());
    assert!(!state.loading());

    let state = state.apply(ChatAction::SendSucceeded(op, exchange("s1", "late", "reply")));

    assert!(state.messages.is_empty());
    assert_eq!(state.session_id, None);
}

#[test]
fn it_discards_failures_that_arrive_after_clear() {
    let (state, op) = begin(ChatState::default(), ChatAction::SendStarted());
    let state = state.apply(ChatAction::Clear());
    let state = state.apply(ChatAction::SendFailed(op, StoreError::Transport("late".to_string())));

    assert!(state.error.is_none());
}

#[test]
fn it_loads_history_and_sets_session() {
    let state = send(ChatState::default(), "old", "hello", "hi");
    let (state, op) = begin(state, ChatAction::HistoryStarted("s9".to_string()));
    let state = state.apply(ChatAction::HistorySucceeded(
        op,
        "s9".to_string(),
        vec![
            history_record(Role::User, "what is x?", ""),
            history_record(Role::Assistant, "x is a letter", ""),
        ],
    ));

    assert_eq!(state.session_id, Some("s9".to_string()));
    assert_eq!(
        texts(&state),
        vec![
            (Role::User, "what is x?".to_string()),
            (Role::Assistant, "x is a letter".to_string()),
        ]
    );
    assert!(!state.loading());
}

#[test]
fn it_keeps_state_when_history_fails() {
    let state = send(ChatState::default(), "s1", "hello", "hi");
    let before = state.messages.clone();
    let (state, op) = begin(state, ChatAction::HistoryStarted("s9".to_string()));
    let state = state.apply(ChatAction::HistoryFailed(
        op,
        StoreError::Transport("down".to_string()),
    ));

    assert_eq!(state.messages, before);
    assert_eq!(state.session_id, Some("s1".to_string()));
    assert!(state.error.is_some());
}

#[test]
fn it_discards_history_that_arrives_after_clear() {
    let (state, op) = begin(ChatState::default(), ChatAction::HistoryStarted("s9".to_string()));
    let state = state.apply(ChatAction::Clear());
    let state = state.apply(ChatAction::HistorySucceeded(
        op,
        "s9".to_string(),
        vec![history_record(Role::User, "hello", "")],
    ));

    assert!(state.messages.is_empty());
    assert_eq!(state.session_id, None);
}

#[test]
fn it_discards_replies_from_the_conversation_a_history_load_replaced() {
    let (state, send_op) = begin(ChatState::default(), ChatAction::SendStarted());
    let (state, load_op) = begin(state, ChatAction::HistoryStarted("s9".to_string()));

    let state = state.apply(ChatAction::HistorySucceeded(load_op, "s9".to_string(), vec![]));
    let state = state.apply(ChatAction::SendSucceeded(send_op, exchange("s1", "late", "reply")));

    assert!(state.messages.is_empty());
    assert_eq!(state.session_id, Some("s9".to_string()));
}

#[test]
fn it_discards_older_history_loads() {
    let (state, older) = begin(ChatState::default(), ChatAction::HistoryStarted("a".to_string()));
    let (state, newer) = begin(state, ChatAction::HistoryStarted("b".to_string()));

    let state = state.apply(ChatAction::HistorySucceeded(newer, "b".to_string(), vec![]));
    let state = state.apply(ChatAction::HistorySucceeded(
        older,
        "a".to_string(),
        vec![history_record(Role::User, "stale", "")],
    ));

    assert_eq!(state.session_id, Some("b".to_string()));
    assert!(state.messages.is_empty());
}
