use crate::model::{prepend_bounded, Artifact, ConversionRecord, ParsedResult};
use crate::present::{present_history_row, present_result};
use crate::sample::{sample_artifacts, sample_history, sample_result};
use crate::validate::{is_valid_url, url_hint};
use crate::view_model::{AgentStatus, AppViewModel, LoadingView, StepStatus, StepView};

pub type RequestId = u64;

/// Index of the last cosmetic loading step.
pub const FINAL_STEP: u8 = 2;

pub const LOADING_STEPS: [&str; 3] = [
    "Extracting content from URL...",
    "Structuring document sections...",
    "Generating compliance PDFs...",
];

pub const DEFAULT_AGENT_ID: &str = "69a28b54e72641e0c6070b2c";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenerationState {
    #[default]
    Idle,
    InProgress {
        request: RequestId,
        step: u8,
        url: String,
    },
    Succeeded {
        result: ParsedResult,
        artifacts: Vec<Artifact>,
    },
    Failed {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    url_input: String,
    agent_id: String,
    generation: GenerationState,
    history: Vec<ConversionRecord>,
    history_open: bool,
    sample_mode: bool,
    last_request: RequestId,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            url_input: String::new(),
            agent_id: DEFAULT_AGENT_ID.to_string(),
            generation: GenerationState::Idle,
            history: Vec::new(),
            history_open: false,
            sample_mode: false,
            last_request: 0,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = agent_id.into();
        self
    }

    pub fn url_input(&self) -> &str {
        &self.url_input
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn generation(&self) -> &GenerationState {
        &self.generation
    }

    /// Real history, independent of sample mode.
    pub fn history(&self) -> &[ConversionRecord] {
        &self.history
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        match self.generation {
            GenerationState::InProgress { request, .. } => Some(request),
            _ => None,
        }
    }

    pub fn view(&self) -> AppViewModel {
        let url_valid = is_valid_url(&self.url_input);
        let loading = match &self.generation {
            GenerationState::InProgress { step, .. } => Some(loading_view(*step)),
            _ => None,
        };
        let error = match &self.generation {
            GenerationState::Failed { message } => Some(message.clone()),
            _ => None,
        };

        let result = if self.sample_mode {
            Some(present_result(&sample_result(), &sample_artifacts()))
        } else {
            match &self.generation {
                GenerationState::Succeeded { result, artifacts } => {
                    Some(present_result(result, artifacts))
                }
                _ => None,
            }
        };

        let history: Vec<_> = if self.sample_mode {
            sample_history().iter().map(present_history_row).collect()
        } else {
            self.history.iter().map(present_history_row).collect()
        };

        AppViewModel {
            url_input: self.url_input.clone(),
            url_hint: url_hint(&self.url_input),
            can_generate: url_valid && loading.is_none(),
            input_locked: loading.is_some(),
            show_empty_state: result.is_none() && loading.is_none() && error.is_none(),
            agent_status: if loading.is_some() {
                AgentStatus::Processing
            } else {
                AgentStatus::Ready
            },
            loading,
            error,
            result,
            history_count: history.len(),
            history,
            history_open: self.history_open,
            sample_mode: self.sample_mode,
        }
    }

    /// Returns whether the state changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_url_input(&mut self, text: String) -> bool {
        if self.in_flight().is_some() || self.url_input == text {
            return false;
        }
        self.url_input = text;
        self.mark_dirty();
        true
    }

    /// Enters `InProgress { step: 0 }` for a fresh request id.
    pub(crate) fn begin_request(&mut self) -> RequestId {
        self.last_request += 1;
        self.generation = GenerationState::InProgress {
            request: self.last_request,
            step: 0,
            url: self.url_input.clone(),
        };
        self.mark_dirty();
        self.last_request
    }

    pub(crate) fn advance_step(&mut self, request: RequestId, next: u8) -> bool {
        match &mut self.generation {
            GenerationState::InProgress {
                request: current,
                step,
                ..
            } if *current == request => {
                let next = next.min(FINAL_STEP);
                if next <= *step {
                    return false;
                }
                *step = next;
                self.dirty = true;
                true
            }
            _ => false,
        }
    }

    /// Url submitted with `request`, if it is the one in flight.
    pub(crate) fn submitted_url(&self, request: RequestId) -> Option<&str> {
        match &self.generation {
            GenerationState::InProgress {
                request: current,
                url,
                ..
            } if *current == request => Some(url.as_str()),
            _ => None,
        }
    }

    pub(crate) fn succeed(&mut self, result: ParsedResult, artifacts: Vec<Artifact>) {
        self.generation = GenerationState::Succeeded { result, artifacts };
        self.mark_dirty();
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.generation = GenerationState::Failed { message };
        self.mark_dirty();
    }

    pub(crate) fn clear_error(&mut self) {
        if matches!(self.generation, GenerationState::Failed { .. }) {
            self.generation = GenerationState::Idle;
            self.mark_dirty();
        }
    }

    /// Strictly greater than every stored id so ids stay monotonic under clock skew.
    pub(crate) fn next_record_id(&self, now_millis: u64) -> u64 {
        match self.history.first() {
            Some(newest) => now_millis.max(newest.id.saturating_add(1)),
            None => now_millis,
        }
    }

    pub(crate) fn record_history(&mut self, record: ConversionRecord) {
        prepend_bounded(&mut self.history, record);
        self.mark_dirty();
    }

    pub(crate) fn restore_history(&mut self, records: Vec<ConversionRecord>) {
        self.history = records;
        self.history.truncate(crate::HISTORY_CAPACITY);
        self.mark_dirty();
    }

    pub(crate) fn sample_mode(&self) -> bool {
        self.sample_mode
    }

    pub(crate) fn clear_history(&mut self) {
        self.history.clear();
        self.mark_dirty();
    }

    pub(crate) fn set_sample_mode(&mut self, on: bool) {
        if self.sample_mode != on {
            self.sample_mode = on;
            self.mark_dirty();
        }
    }

    pub(crate) fn toggle_history_panel(&mut self) {
        self.history_open = !self.history_open;
        self.mark_dirty();
    }

    /// Drops the in-flight request, if any, and returns its id.
    pub(crate) fn abandon_request(&mut self) -> Option<RequestId> {
        let request = self.in_flight()?;
        self.generation = GenerationState::Idle;
        self.mark_dirty();
        Some(request)
    }

    pub(crate) fn reset(&mut self) {
        self.url_input.clear();
        self.generation = GenerationState::Idle;
        self.history_open = false;
        self.mark_dirty();
    }
}

fn loading_view(current: u8) -> LoadingView {
    let steps = LOADING_STEPS
        .into_iter()
        .enumerate()
        .map(|(idx, label)| {
            let idx = idx as u8;
            let status = if idx < current {
                StepStatus::Complete
            } else if idx == current {
                StepStatus::Active
            } else {
                StepStatus::Pending
            };
            StepView { label, status }
        })
        .collect();
    LoadingView { steps }
}
