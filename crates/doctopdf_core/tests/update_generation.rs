use std::sync::Once;

use doctopdf_core::{
    build_prompt, update, AgentResponse, AgentStatus, AppState, Artifact, ArtifactSlot,
    CallFailure, Effect, GenerationState, Msg, ParsedResult, RequestId, StepStatus, Timestamp,
    DEFAULT_AGENT_ID, GATEWAY_FALLBACK_ERROR, TIMEOUT_ERROR, UNEXPECTED_ERROR,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(doctopdf_logging::initialize_for_tests);
}

fn at(epoch_millis: u64) -> Timestamp {
    Timestamp {
        epoch_millis,
        rfc3339: "2026-10-19T12:00:00+00:00".to_string(),
    }
}

fn submit(state: AppState, url: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::InputChanged(url.to_string()));
    update(state, Msg::GenerateClicked)
}

fn submitted_request(effects: &[Effect]) -> RequestId {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::Submit { request, .. } => Some(*request),
            _ => None,
        })
        .expect("submit effect")
}

fn finish(
    state: AppState,
    request: RequestId,
    outcome: Result<AgentResponse, CallFailure>,
) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::AgentFinished {
            request,
            outcome,
            completed_at: at(1_000),
        },
    )
}

fn guide_response() -> AgentResponse {
    AgentResponse {
        success: true,
        result: Some(json!({"document_title": "Guide", "section_count": 5})),
        artifacts: vec![
            Artifact::new("https://files.example.com/clean.pdf").with_format("pdf"),
            Artifact::new("https://files.example.com/report.pdf").with_format("pdf"),
        ],
        error: None,
    }
}

#[test]
fn guide_scenario_shows_result_and_records_history() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "https://docs.example.com/api/guide");
    assert_eq!(
        effects,
        vec![Effect::Submit {
            request: 1,
            prompt: build_prompt("https://docs.example.com/api/guide"),
            agent_id: DEFAULT_AGENT_ID.to_string(),
        }]
    );
    assert_eq!(state.view().agent_status, AgentStatus::Processing);

    let (state, effects) = finish(state, 1, Ok(guide_response()));
    let view = state.view();
    let result = view.result.expect("result view");
    assert_eq!(result.title, "Guide");
    assert_eq!(result.section_badge.as_deref(), Some("5 sections"));
    assert_eq!(result.word_badge, None);
    assert_eq!(result.cards.len(), 2);
    assert_eq!(result.cards[0].slot, ArtifactSlot::CleanCopy);
    assert!(result.cards.iter().all(|card| card.download_url.is_some()));
    assert!(view.loading.is_none());
    assert!(view.can_generate);
    assert_eq!(view.agent_status, AgentStatus::Ready);

    assert_eq!(state.history().len(), 1);
    assert_eq!(state.history()[0].title, "Guide");
    assert_eq!(state.history()[0].source_url, "https://docs.example.com/api/guide");
    assert_eq!(state.history()[0].artifacts.len(), 2);
    assert_eq!(effects, vec![Effect::AppendHistory(state.history()[0].clone())]);
}

#[test]
fn invalid_url_never_submits() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "not-a-url");
    let view = state.view();
    assert!(effects.is_empty());
    assert!(!view.can_generate);
    assert!(view.url_hint.is_some());
    assert_eq!(state.generation(), &GenerationState::Idle);
}

#[test]
fn only_one_request_in_flight() {
    init_logging();
    let (state, first) = submit(AppState::new(), "https://docs.example.com/a");
    assert_eq!(first.len(), 1);
    let (state, second) = update(state, Msg::GenerateClicked);
    assert!(second.is_empty());
    assert!(!state.view().can_generate);
}

#[test]
fn input_is_locked_while_in_flight() {
    init_logging();
    let (state, _) = submit(AppState::new(), "https://docs.example.com/a");
    let (state, _) = update(state, Msg::InputChanged("https://other.example.com".into()));
    assert_eq!(state.url_input(), "https://docs.example.com/a");
    assert!(state.view().input_locked);
}

#[test]
fn gateway_error_is_shown_verbatim_and_retry_reissues_request() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "https://docs.example.com/api/guide");
    let request = submitted_request(&effects);
    let (state, _) = finish(
        state,
        request,
        Ok(AgentResponse {
            success: false,
            error: Some("rate limited".to_string()),
            ..AgentResponse::default()
        }),
    );
    assert_eq!(state.view().error.as_deref(), Some("rate limited"));

    let (state, retry) = update(state, Msg::RetryClicked);
    assert!(state.view().error.is_none());
    match (&effects[0], &retry[0]) {
        (
            Effect::Submit {
                prompt: first_prompt,
                agent_id: first_agent,
                ..
            },
            Effect::Submit {
                request,
                prompt,
                agent_id,
            },
        ) => {
            assert_eq!(prompt, first_prompt);
            assert_eq!(agent_id, first_agent);
            assert_eq!(*request, 2);
        }
        other => panic!("unexpected effects {other:?}"),
    }
}

#[test]
fn missing_gateway_error_uses_fallback() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "https://docs.example.com/a");
    let request = submitted_request(&effects);
    let (state, _) = finish(state, request, Ok(AgentResponse::default()));
    assert_eq!(state.view().error.as_deref(), Some(GATEWAY_FALLBACK_ERROR));
}

#[test]
fn present_gateway_error_is_shown_verbatim_even_when_blank() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "https://docs.example.com/a");
    let reply = AgentResponse {
        error: Some("  ".to_string()),
        ..AgentResponse::default()
    };
    let (state, _) = finish(state, submitted_request(&effects), Ok(reply));
    assert_eq!(state.view().error.as_deref(), Some("  "));
}

#[test]
fn transport_and_timeout_failures_map_to_generic_messages() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "https://docs.example.com/a");
    let (state, _) = finish(state, submitted_request(&effects), Err(CallFailure::Transport));
    assert_eq!(state.view().error.as_deref(), Some(UNEXPECTED_ERROR));

    let (state, effects) = update(state, Msg::RetryClicked);
    let (state, _) = finish(state, submitted_request(&effects), Err(CallFailure::Timeout));
    assert_eq!(state.view().error.as_deref(), Some(TIMEOUT_ERROR));
    assert!(state.history().is_empty());
}

#[test]
fn string_payload_is_decoded() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "https://docs.example.com/a");
    let response = AgentResponse {
        success: true,
        result: Some(json!(r#"{"document_title":"Encoded","word_count":1200}"#)),
        ..AgentResponse::default()
    };
    let (state, _) = finish(state, submitted_request(&effects), Ok(response));
    let result = state.view().result.expect("result");
    assert_eq!(result.title, "Encoded");
    assert_eq!(result.word_badge.as_deref(), Some("1,200 words"));
}

#[test]
fn malformed_payload_still_succeeds_with_empty_result() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "https://docs.example.com/a");
    let response = AgentResponse {
        success: true,
        result: Some(json!("{broken json")),
        ..AgentResponse::default()
    };
    let (state, effects) = finish(state, submitted_request(&effects), Ok(response));
    match state.generation() {
        GenerationState::Succeeded { result, .. } => assert_eq!(result, &ParsedResult::default()),
        other => panic!("expected success, got {other:?}"),
    }
    assert_eq!(state.history()[0].title, "Untitled");
    assert_eq!(effects.len(), 1);
}

#[test]
fn steps_advance_to_final_and_stop() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "https://docs.example.com/a");
    let request = submitted_request(&effects);
    let statuses = |state: &AppState| -> Vec<StepStatus> {
        state
            .view()
            .loading
            .expect("loading")
            .steps
            .iter()
            .map(|step| step.status)
            .collect()
    };
    assert_eq!(
        statuses(&state),
        vec![StepStatus::Active, StepStatus::Pending, StepStatus::Pending]
    );

    let (state, _) = update(state, Msg::StepElapsed { request, step: 1 });
    let (state, _) = update(state, Msg::StepElapsed { request, step: 2 });
    let (state, _) = update(state, Msg::StepElapsed { request, step: 3 });
    assert_eq!(
        statuses(&state),
        vec![StepStatus::Complete, StepStatus::Complete, StepStatus::Active]
    );
    match state.generation() {
        GenerationState::InProgress { step, .. } => assert_eq!(*step, 2),
        other => panic!("expected in progress, got {other:?}"),
    }
}

#[test]
fn ticks_after_completion_are_ignored() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "https://docs.example.com/a");
    let request = submitted_request(&effects);
    let (mut state, _) = finish(state, request, Ok(guide_response()));
    assert!(state.consume_dirty());

    let (mut state, effects) = update(state, Msg::StepElapsed { request, step: 1 });
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
    assert!(matches!(state.generation(), GenerationState::Succeeded { .. }));
}

#[test]
fn stale_reply_after_reset_is_dropped() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "https://docs.example.com/a");
    let request = submitted_request(&effects);
    let (state, reset_effects) = update(state, Msg::Reset);
    assert_eq!(reset_effects, vec![Effect::CancelRequest { request }]);
    assert_eq!(state.url_input(), "");

    let (state, effects) = finish(state, request, Ok(guide_response()));
    assert!(effects.is_empty());
    assert!(state.history().is_empty());
    assert_eq!(state.generation(), &GenerationState::Idle);
}

#[test]
fn shutdown_cancels_in_flight_request() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "https://docs.example.com/a");
    let request = submitted_request(&effects);
    let (state, effects) = update(state, Msg::Shutdown);
    assert_eq!(effects, vec![Effect::CancelRequest { request }]);

    let (_state, effects) = update(state, Msg::Shutdown);
    assert!(effects.is_empty());
}

#[test]
fn new_generation_clears_previous_result() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "https://docs.example.com/a");
    let (state, _) = finish(state, submitted_request(&effects), Ok(guide_response()));
    let (state, _) = update(state, Msg::GenerateClicked);
    let view = state.view();
    assert!(view.result.is_none());
    assert!(view.loading.is_some());
    assert!(!view.show_empty_state);
}

#[test]
fn custom_agent_id_is_forwarded() {
    init_logging();
    let state = AppState::new().with_agent_id("agent-42");
    let (_state, effects) = submit(state, "http://docs.example.com");
    match &effects[0] {
        Effect::Submit { agent_id, .. } => assert_eq!(agent_id, "agent-42"),
        other => panic!("unexpected {other:?}"),
    }
}
