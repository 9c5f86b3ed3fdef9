use std::io::{self, BufRead, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc};
use std::thread;

use doctopdf_core::{update, AppState, Msg};
use doctopdf_engine::{
    EngineConfig, EngineHandle, FileKeyValueStore, HistoryStore, HttpAgentGateway,
    KeyValueStore,
};
use doctopdf_logging::{dtp_error, dtp_info, dtp_warn};

use super::commands::{parse_command, Command, HELP_TEXT};
use super::config::AppConfig;
use super::effects::{EffectRunner, MsgSink};
use super::logging::{self, LogDestination};
use super::ui;

pub fn run_app() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    logging::initialize(LogDestination::from_flag(config.log_to_terminal));
    dtp_info!(
        "Starting doctopdf endpoint={} agent_id={} history_dir={:?}",
        config.endpoint,
        config.agent_id,
        config.history_dir
    );

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();

    let gateway = Arc::new(HttpAgentGateway::new(
        config.gateway_settings(|name| std::env::var(name).ok()),
    ));
    let engine = EngineHandle::new(
        EngineConfig {
            step_interval: config.step_interval(),
        },
        gateway,
        MsgSink::new(cmd_tx.clone()),
    );
    let history = HistoryStore::new(FileKeyValueStore::new(config.history_dir.clone()));
    let mut runner = EffectRunner::new(engine, history);

    let restored = runner.load_history();
    let state = AppState::new().with_agent_id(config.agent_id.clone());
    let (state, effects) = update(state, Msg::HistoryRestored(restored));
    runner.run(effects);

    spawn_stdin_reader(cmd_tx);
    println!("{HELP_TEXT}");
    let mut app = App::new(state, runner);
    app.render_now();
    app.run(cmd_rx);
    app.shutdown();
    dtp_info!("doctopdf stopped");
    Ok(())
}

fn spawn_stdin_reader(cmd_tx: mpsc::Sender<Command>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let command = match line {
                Ok(line) => parse_command(&line),
                Err(err) => {
                    dtp_warn!("Failed to read stdin: {}", err);
                    break;
                }
            };
            if cmd_tx.send(command).is_err() {
                return;
            }
        }
        let _ = cmd_tx.send(Command::Quit);
    });
}

struct App<S: KeyValueStore> {
    state: AppState,
    runner: EffectRunner<S>,
    render_failed: bool,
}

impl<S: KeyValueStore> App<S> {
    fn new(state: AppState, runner: EffectRunner<S>) -> Self {
        Self {
            state,
            runner,
            render_failed: false,
        }
    }

    /// Drains commands until `quit` or the channel closes, rendering once per batch.
    fn run(&mut self, cmd_rx: mpsc::Receiver<Command>) {
        while let Ok(first) = cmd_rx.recv() {
            let mut batch = vec![first];
            batch.extend(cmd_rx.try_iter());

            for command in batch {
                match command {
                    Command::Quit => return,
                    Command::Help => println!("{HELP_TEXT}"),
                    Command::Unknown(line) => {
                        println!("Unknown command: {line}. Type `help` for the list.")
                    }
                    Command::Msg(msg) => self.dispatch_msg(msg),
                }
            }

            if self.state.consume_dirty() {
                self.render_now();
            }
        }
    }

    fn dispatch_msg(&mut self, msg: Msg) {
        if matches!(msg, Msg::Reset) {
            self.render_failed = false;
        }
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.run(effects);
    }

    fn render_now(&mut self) {
        self.state.consume_dirty();
        let view = self.state.view();
        let screen = if self.render_failed {
            ui::render::RECOVERY_SCREEN.to_string()
        } else {
            match render_guarded(|| ui::render::render(&view)) {
                Some(screen) => screen,
                None => {
                    self.render_failed = true;
                    ui::render::RECOVERY_SCREEN.to_string()
                }
            }
        };
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "\n{screen}");
        let _ = write!(stdout, "> ");
        let _ = stdout.flush();
    }

    fn shutdown(self) {
        let (_, effects) = update(self.state, Msg::Shutdown);
        let mut runner = self.runner;
        runner.run(effects);
        runner.shutdown();
    }
}

/// Runs `render` inside a panic boundary; `None` means the frame failed.
fn render_guarded(render: impl FnOnce() -> String) -> Option<String> {
    match panic::catch_unwind(AssertUnwindSafe(render)) {
        Ok(screen) => Some(screen),
        Err(_) => {
            dtp_error!("Render failed; showing recovery screen");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doctopdf_engine::{GatewaySettings, MemoryKeyValueStore};

    fn app() -> App<MemoryKeyValueStore> {
        let (tx, _rx) = mpsc::channel();
        let gateway = Arc::new(HttpAgentGateway::new(GatewaySettings::new(
            "http://127.0.0.1:9/unused",
        )));
        let engine = EngineHandle::new(EngineConfig::default(), gateway, MsgSink::new(tx));
        let runner = EffectRunner::new(engine, HistoryStore::new(MemoryKeyValueStore::new()));
        App::new(AppState::new(), runner)
    }

    #[test]
    fn panicking_render_is_contained() {
        let hook = panic::take_hook();
        panic::set_hook(Box::new(|_| {}));
        let outcome = render_guarded(|| panic!("bad frame"));
        panic::set_hook(hook);

        assert_eq!(outcome, None);
        assert_eq!(render_guarded(|| "ok".to_string()).as_deref(), Some("ok"));
    }

    #[test]
    fn reset_clears_the_recovery_screen() {
        let mut app = app();
        app.dispatch_msg(Msg::InputChanged("https://docs.example.com".into()));
        app.render_failed = true;

        app.dispatch_msg(Msg::Reset);
        assert!(!app.render_failed);
        assert_eq!(app.state.url_input(), "");
        app.shutdown();
    }

    #[test]
    fn quit_stops_the_loop_before_later_commands() {
        let mut app = app();
        let (tx, rx) = mpsc::channel();
        tx.send(Command::Msg(Msg::InputChanged("https://a.example".into())))
            .unwrap();
        tx.send(Command::Quit).unwrap();
        tx.send(Command::Msg(Msg::InputChanged("https://b.example".into())))
            .unwrap();

        app.run(rx);
        assert_eq!(app.state.url_input(), "https://a.example");
        app.shutdown();
    }
}
