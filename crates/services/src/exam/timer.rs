use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::debug;

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Expired,
}

/// Countdown that publishes the remaining seconds and emits a single
/// [`TimerEvent::Expired`] when it reaches zero.
///
/// Dropping the timer cancels it. A cancelled timer never emits.
pub struct ExamTimer {
    remaining: watch::Receiver<u32>,
    events: Option<mpsc::Receiver<TimerEvent>>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ExamTimer {
    /// Start counting down from `initial_secs`. Must be called inside a tokio runtime.
    #[must_use]
    pub fn start(initial_secs: u32) -> Self {
        Self::start_with_token(initial_secs, &CancellationToken::new())
    }

    /// Like [`ExamTimer::start`], but also stops when `parent` is cancelled.
    #[must_use]
    pub fn start_with_token(initial_secs: u32, parent: &CancellationToken) -> Self {
        let cancel = parent.child_token();
        let (remaining_tx, remaining) = watch::channel(initial_secs);
        let (events_tx, events) = mpsc::channel(1);
        let task = tokio::spawn(run_countdown(
            initial_secs,
            remaining_tx,
            events_tx,
            cancel.clone(),
        ));

        Self {
            remaining,
            events: Some(events),
            cancel,
            task,
        }
    }

    #[must_use]
    pub fn remaining(&self) -> watch::Receiver<u32> {
        self.remaining.clone()
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        *self.remaining.borrow()
    }

    /// Hand the expiry channel to its single subscriber.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<TimerEvent>> {
        self.events.take()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled() && !self.task.is_finished()
    }

    /// Stop ticking immediately.
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

impl Drop for ExamTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run_countdown(
    initial_secs: u32,
    remaining: watch::Sender<u32>,
    events: mpsc::Sender<TimerEvent>,
    cancel: CancellationToken,
) {
    let mut left = initial_secs;
    let mut ticks = interval_at(Instant::now() + TICK, TICK);

    while left > 0 {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            _ = ticks.tick() => {}
        }
        left -= 1;
        remaining.send_replace(left);
    }

    if cancel.is_cancelled() {
        return;
    }
    debug!(initial_secs, "exam timer expired");
    let _ = events.try_send(TimerEvent::Expired);
}
