use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use doctopdf_core::{RequestId, FINAL_STEP};
use doctopdf_logging::{dtp_debug, dtp_error, dtp_info, dtp_warn};
use tokio_util::sync::CancellationToken;

use crate::gateway::AgentGateway;
use crate::timer::StepTimer;
use crate::EngineEvent;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Period of the cosmetic loading-step timer.
    pub step_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            step_interval: Duration::from_secs(4),
        }
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

enum EngineCommand {
    Submit {
        request: RequestId,
        prompt: String,
        agent_id: String,
    },
    Cancel {
        request: RequestId,
    },
}

/// Runs agent calls on a background tokio runtime.
///
/// At most one request is active; submitting another cancels the previous
/// one. Dropping the handle cancels the active request and joins the worker.
pub struct EngineHandle {
    cmd_tx: Option<mpsc::Sender<EngineCommand>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(
        config: EngineConfig,
        gateway: Arc<dyn AgentGateway>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let worker = thread::spawn(move || run_worker(config, gateway, sink, cmd_rx));
        Self {
            cmd_tx: Some(cmd_tx),
            worker: Some(worker),
        }
    }

    pub fn submit(
        &self,
        request: RequestId,
        prompt: impl Into<String>,
        agent_id: impl Into<String>,
    ) {
        self.send(EngineCommand::Submit {
            request,
            prompt: prompt.into(),
            agent_id: agent_id.into(),
        });
    }

    pub fn cancel(&self, request: RequestId) {
        self.send(EngineCommand::Cancel { request });
    }

    /// Cancels any active request and waits for the worker to stop.
    pub fn shutdown(self) {
        drop(self);
    }

    fn send(&self, command: EngineCommand) {
        let Some(tx) = self.cmd_tx.as_ref() else {
            return;
        };
        if tx.send(command).is_err() {
            dtp_warn!("Engine worker is gone; command dropped");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        // Closing the command channel ends the worker loop.
        self.cmd_tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                dtp_error!("Engine worker panicked");
            }
        }
    }
}

fn run_worker(
    config: EngineConfig,
    gateway: Arc<dyn AgentGateway>,
    sink: Arc<dyn EventSink>,
    cmd_rx: mpsc::Receiver<EngineCommand>,
) {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            dtp_error!("Failed to start engine runtime: {}", err);
            return;
        }
    };

    let mut active: Option<(RequestId, CancellationToken)> = None;
    while let Ok(command) = cmd_rx.recv() {
        match command {
            EngineCommand::Submit {
                request,
                prompt,
                agent_id,
            } => {
                if let Some((previous, token)) = active.take() {
                    dtp_debug!("Request {} superseded by {}", previous, request);
                    token.cancel();
                }
                let token = CancellationToken::new();
                dtp_info!("Submitting request {} to agent {}", request, agent_id);
                runtime.spawn(run_request(
                    gateway.clone(),
                    sink.clone(),
                    config.step_interval,
                    request,
                    prompt,
                    agent_id,
                    token.clone(),
                ));
                active = Some((request, token));
            }
            EngineCommand::Cancel { request } => {
                if let Some((current, token)) = active.take() {
                    if current == request {
                        dtp_info!("Cancelling request {}", request);
                        token.cancel();
                    } else {
                        active = Some((current, token));
                    }
                }
            }
        }
    }

    if let Some((request, token)) = active.take() {
        dtp_debug!("Engine shutting down; cancelling request {}", request);
        token.cancel();
    }
    runtime.shutdown_timeout(Duration::from_secs(1));
}

/// One request: races the agent call against the step timer.
///
/// The timer lives only inside this task, so no step is emitted after the
/// terminal event or after cancellation.
async fn run_request(
    gateway: Arc<dyn AgentGateway>,
    sink: Arc<dyn EventSink>,
    step_interval: Duration,
    request: RequestId,
    prompt: String,
    agent_id: String,
    token: CancellationToken,
) {
    let mut timer = StepTimer::start(step_interval, FINAL_STEP);
    let call = gateway.invoke(&prompt, &agent_id);
    tokio::pin!(call);

    let result = loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                timer.cancel();
                dtp_debug!("Request {} cancelled before the agent replied", request);
                return;
            }
            result = &mut call => break result,
            Some(step) = timer.next_step() => {
                sink.emit(EngineEvent::StepElapsed { request, step });
            }
        }
    };
    timer.cancel();

    match &result {
        Ok(reply) => dtp_info!(
            "Request {} finished success={} artifacts={}",
            request,
            reply.success,
            reply.artifacts.len()
        ),
        Err(err) => dtp_warn!("Request {} failed: {}", request, err),
    }
    sink.emit(EngineEvent::AgentFinished { request, result });
}
