//! Doctopdf core: pure state machine, validation and view-model helpers.
mod effect;
mod markdown;
mod model;
mod msg;
mod present;
mod sample;
mod state;
mod update;
mod validate;
mod view_model;

pub use effect::Effect;
pub use markdown::{format_inline, format_markdown, plain_text, InlineSpan, MarkdownLine};
pub use model::{
    prepend_bounded, AgentResponse, Artifact, CallFailure, ConversionRecord, ParsedResult,
    Timestamp, HISTORY_CAPACITY, UNTITLED,
};
pub use msg::Msg;
pub use present::{
    format_with_commas, present_history_row, present_result, truncate_url, ArtifactCard,
    ArtifactSlot, DownloadLink, HistoryRowView, ResultView, UNTITLED_DOCUMENT,
};
pub use sample::{sample_artifacts, sample_history, sample_result};
pub use state::{
    AppState, GenerationState, RequestId, DEFAULT_AGENT_ID, FINAL_STEP, LOADING_STEPS,
};
pub use update::{build_prompt, update, GATEWAY_FALLBACK_ERROR, TIMEOUT_ERROR, UNEXPECTED_ERROR};
pub use validate::{is_valid_url, url_hint, URL_HINT};
pub use view_model::{AgentStatus, AppViewModel, LoadingView, StepStatus, StepView};
