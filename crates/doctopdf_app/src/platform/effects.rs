use std::sync::{mpsc, Arc};

use chrono::{SecondsFormat, Utc};
use doctopdf_core::{CallFailure, ConversionRecord, Effect, Msg, Timestamp};
use doctopdf_engine::{
    EngineEvent, EngineHandle, EventSink, GatewayError, HistoryStore, KeyValueStore,
};
use doctopdf_logging::{dtp_debug, dtp_info};

use super::commands::Command;

/// Executes effects emitted by `update` against the engine and the history store.
pub struct EffectRunner<S: KeyValueStore> {
    engine: EngineHandle,
    history: HistoryStore<S>,
}

impl<S: KeyValueStore> EffectRunner<S> {
    pub fn new(engine: EngineHandle, history: HistoryStore<S>) -> Self {
        Self { engine, history }
    }

    pub fn load_history(&mut self) -> Vec<ConversionRecord> {
        self.history.load()
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Submit {
                    request,
                    prompt,
                    agent_id,
                } => {
                    dtp_info!("Submit request={} prompt_len={}", request, prompt.len());
                    self.engine.submit(request, prompt, agent_id);
                }
                Effect::CancelRequest { request } => {
                    dtp_debug!("CancelRequest request={}", request);
                    self.engine.cancel(request);
                }
                Effect::AppendHistory(record) => {
                    dtp_debug!("AppendHistory id={}", record.id);
                    self.history.append(record);
                }
                Effect::ClearHistory => self.history.clear(),
            }
        }
    }

    #[cfg(test)]
    pub fn history(&self) -> &HistoryStore<S> {
        &self.history
    }

    /// Cancels any in-flight request and joins the engine worker.
    pub fn shutdown(self) {
        self.engine.shutdown();
    }
}

/// Forwards engine events into the app's command channel.
pub struct MsgSink {
    tx: mpsc::Sender<Command>,
}

impl MsgSink {
    pub fn new(tx: mpsc::Sender<Command>) -> Arc<Self> {
        Arc::new(Self { tx })
    }
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(Command::Msg(map_event(event, now())));
    }
}

pub fn map_event(event: EngineEvent, completed_at: Timestamp) -> Msg {
    match event {
        EngineEvent::StepElapsed { request, step } => Msg::StepElapsed { request, step },
        EngineEvent::AgentFinished { request, result } => Msg::AgentFinished {
            request,
            outcome: result.map_err(|err| call_failure(&err)),
            completed_at,
        },
    }
}

fn call_failure(err: &GatewayError) -> CallFailure {
    if err.kind.is_timeout() {
        CallFailure::Timeout
    } else {
        CallFailure::Transport
    }
}

pub fn now() -> Timestamp {
    let now = Utc::now();
    Timestamp {
        epoch_millis: u64::try_from(now.timestamp_millis()).unwrap_or_default(),
        rfc3339: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}
