use crate::present::{HistoryRowView, ResultView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Pending,
    Active,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    pub label: &'static str,
    pub status: StepStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingView {
    pub steps: Vec<StepView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentStatus {
    #[default]
    Ready,
    Processing,
}

impl AgentStatus {
    pub fn label(self) -> &'static str {
        match self {
            AgentStatus::Ready => "Ready",
            AgentStatus::Processing => "Processing",
        }
    }
}

/// Read-only snapshot handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub url_input: String,
    pub url_hint: Option<&'static str>,
    pub can_generate: bool,
    /// Input is read-only while a request is in flight.
    pub input_locked: bool,
    pub loading: Option<LoadingView>,
    pub error: Option<String>,
    pub result: Option<ResultView>,
    pub history: Vec<HistoryRowView>,
    pub history_count: usize,
    pub history_open: bool,
    pub sample_mode: bool,
    pub agent_status: AgentStatus,
    pub show_empty_state: bool,
}
