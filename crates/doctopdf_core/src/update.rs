use crate::model::{AgentResponse, CallFailure, ConversionRecord, ParsedResult, Timestamp, UNTITLED};
use crate::validate::is_valid_url;
use crate::{AppState, Effect, Msg, RequestId};

pub const GATEWAY_FALLBACK_ERROR: &str = "Failed to generate PDFs. Please try again.";
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred. Please try again.";
pub const TIMEOUT_ERROR: &str = "The agent did not respond in time. Please try again.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.set_url_input(text);
            Vec::new()
        }
        Msg::GenerateClicked => start_generation(&mut state),
        Msg::RetryClicked => {
            state.clear_error();
            start_generation(&mut state)
        }
        Msg::StepElapsed { request, step } => {
            state.advance_step(request, step);
            Vec::new()
        }
        Msg::AgentFinished {
            request,
            outcome,
            completed_at,
        } => finish_generation(&mut state, request, outcome, completed_at),
        Msg::HistoryRestored(records) => {
            state.restore_history(records);
            Vec::new()
        }
        Msg::ClearHistoryClicked => {
            // Sample mode displays demo history; clearing it must not wipe the real one.
            if state.sample_mode() {
                Vec::new()
            } else {
                state.clear_history();
                vec![Effect::ClearHistory]
            }
        }
        Msg::SampleModeToggled(on) => {
            state.set_sample_mode(on);
            Vec::new()
        }
        Msg::HistoryPanelToggled => {
            state.toggle_history_panel();
            Vec::new()
        }
        Msg::Reset => {
            let effects = cancel_in_flight(&mut state);
            state.reset();
            effects
        }
        Msg::Shutdown => cancel_in_flight(&mut state),
        Msg::Tick => {
            state.mark_dirty();
            Vec::new()
        }
    };

    (state, effects)
}

/// The instruction sent to the agent for `url`.
pub fn build_prompt(url: &str) -> String {
    format!(
        "Extract content from this documentation URL and generate two PDF files \
         (clean copy and compliance report): {url}"
    )
}

fn start_generation(state: &mut AppState) -> Vec<Effect> {
    // At most one request in flight.
    if state.in_flight().is_some() || !is_valid_url(state.url_input()) {
        return Vec::new();
    }
    let prompt = build_prompt(state.url_input());
    let request = state.begin_request();
    vec![Effect::Submit {
        request,
        prompt,
        agent_id: state.agent_id().to_string(),
    }]
}

fn finish_generation(
    state: &mut AppState,
    request: RequestId,
    outcome: Result<AgentResponse, CallFailure>,
    completed_at: Timestamp,
) -> Vec<Effect> {
    // Late replies for cancelled or superseded requests are dropped.
    let Some(source_url) = state.submitted_url(request).map(ToOwned::to_owned) else {
        return Vec::new();
    };

    match outcome {
        Ok(response) if response.success => {
            let result = ParsedResult::from_payload(response.result.as_ref());
            let record = ConversionRecord {
                id: state.next_record_id(completed_at.epoch_millis),
                source_url,
                title: result
                    .document_title
                    .clone()
                    .unwrap_or_else(|| UNTITLED.to_string()),
                created_at: completed_at.rfc3339,
                artifacts: response.artifacts.clone(),
            };
            state.succeed(result, response.artifacts);
            state.record_history(record.clone());
            vec![Effect::AppendHistory(record)]
        }
        Ok(response) => {
            let message = response
                .error
                .unwrap_or_else(|| GATEWAY_FALLBACK_ERROR.to_string());
            state.fail(message);
            Vec::new()
        }
        Err(CallFailure::Timeout) => {
            state.fail(TIMEOUT_ERROR.to_string());
            Vec::new()
        }
        Err(CallFailure::Transport) => {
            state.fail(UNEXPECTED_ERROR.to_string());
            Vec::new()
        }
    }
}

fn cancel_in_flight(state: &mut AppState) -> Vec<Effect> {
    state
        .abandon_request()
        .map(|request| vec![Effect::CancelRequest { request }])
        .unwrap_or_default()
}
