use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Repeating cosmetic step counter.
///
/// Yields `1..=final_step`, one step per `period`, then ends by itself.
/// Must be created inside a tokio runtime.
pub struct StepTimer {
    token: CancellationToken,
    steps: mpsc::Receiver<u8>,
    task: JoinHandle<()>,
}

impl StepTimer {
    pub fn start(period: Duration, final_step: u8) -> Self {
        let token = CancellationToken::new();
        let (tx, steps) = mpsc::channel(usize::from(final_step).max(1));
        let task_token = token.clone();
        let task = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            for step in 1..=final_step {
                tokio::select! {
                    _ = task_token.cancelled() => return,
                    _ = ticks.tick() => {}
                }
                if tx.send(step).await.is_err() {
                    return;
                }
            }
        });
        Self { token, steps, task }
    }

    /// Next step, or `None` once the final step was delivered or the timer was cancelled.
    pub async fn next_step(&mut self) -> Option<u8> {
        if self.token.is_cancelled() {
            return None;
        }
        self.steps.recv().await
    }

    /// Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// True once the background task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for StepTimer {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn yields_each_step_once_then_ends() {
        let mut timer = StepTimer::start(Duration::from_secs(4), 2);
        let started = Instant::now();
        assert_eq!(timer.next_step().await, Some(1));
        assert!(started.elapsed() >= Duration::from_secs(4));
        assert_eq!(timer.next_step().await, Some(2));
        assert!(started.elapsed() >= Duration::from_secs(8));
        assert_eq!(timer.next_step().await, None);
        tokio::task::yield_now().await;
        assert!(timer.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_is_idempotent_and_stops_delivery() {
        let mut timer = StepTimer::start(Duration::from_secs(4), 2);
        assert_eq!(timer.next_step().await, Some(1));
        timer.cancel();
        timer.cancel();
        assert!(timer.is_cancelled());
        assert_eq!(timer.next_step().await, None);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(timer.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_the_task() {
        let timer = StepTimer::start(Duration::from_secs(4), 2);
        let token = timer.token.clone();
        drop(timer);
        assert!(token.is_cancelled());
    }
}
