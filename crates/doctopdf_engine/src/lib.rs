//! Doctopdf engine: agent calls, step timer and history persistence.
mod engine;
mod gateway;
mod history;
mod persist;
mod store;
mod timer;
mod types;

pub use engine::{ChannelEventSink, EngineConfig, EngineHandle, EventSink};
pub use gateway::{
    decode_envelope, AgentGateway, GatewaySettings, HttpAgentGateway, API_KEY_HEADER,
};
pub use history::{HistoryStore, HISTORY_KEY};
pub use persist::{BlobDir, PersistError};
pub use store::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, StoreError};
pub use timer::StepTimer;
pub use types::{EngineEvent, FailureKind, GatewayError};
