use crate::model::{AgentResponse, CallFailure, ConversionRecord, Timestamp};
use crate::RequestId;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the URL input.
    InputChanged(String),
    /// User pressed Generate.
    GenerateClicked,
    /// User pressed Retry on the error banner.
    RetryClicked,
    /// Cosmetic step timer fired for an in-flight request.
    StepElapsed { request: RequestId, step: u8 },
    /// Terminal outcome of the delegated call.
    AgentFinished {
        request: RequestId,
        outcome: Result<AgentResponse, CallFailure>,
        completed_at: Timestamp,
    },
    /// Restore history loaded from persistent storage.
    HistoryRestored(Vec<ConversionRecord>),
    /// User cleared the whole history.
    ClearHistoryClicked,
    /// User switched sample data on or off.
    SampleModeToggled(bool),
    /// User opened or closed the history panel.
    HistoryPanelToggled,
    /// Recovery action after a render failure.
    Reset,
    /// The client is shutting down.
    Shutdown,
    /// Redraw request; changes nothing but the dirty flag.
    Tick,
}
