use crate::model::ConversionRecord;
use crate::RequestId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Invoke the agent and run the step timer until it answers.
    Submit {
        request: RequestId,
        prompt: String,
        agent_id: String,
    },
    /// Abort an in-flight request and its step timer.
    CancelRequest { request: RequestId },
    AppendHistory(ConversionRecord),
    ClearHistory,
}
