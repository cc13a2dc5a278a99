//! Cancellable scheduled tasks for idle detection, countdowns and slideshows.
//!
//! Every timer is a tokio task owned by a [`ScheduledTask`] handle. Dropping
//! the handle aborts the task, so a timer can never outlive the screen that
//! armed it.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::config::Config;
use crate::flow::FlowState;

/// Handle to a spawned timer task; aborts the task when dropped.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Run `on_tick` every `period`, first after one full period, until it breaks.
    pub fn every<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if on_tick().is_break() {
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel explicitly; equivalent to dropping the handle.
    pub fn cancel(self) {}
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Count down from `from` once per `tick`, reporting each remaining value.
///
/// `on_tick` receives `from - 1`, `from - 2`, … `0`; the task ends after 0.
pub fn countdown<F>(from: u64, tick: Duration, mut on_tick: F) -> ScheduledTask
where
    F: FnMut(u64) + Send + 'static,
{
    let mut remaining = from;
    ScheduledTask::every(tick, move || {
        remaining = remaining.saturating_sub(1);
        on_tick(remaining);
        if remaining == 0 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })
}

/// What an inactivity timeout does on the current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdlePolicy {
    /// Welcome screen: raise the attract overlay.
    Attract(Duration),
    /// Every other screen: force a restart.
    Reset(Duration),
}

impl IdlePolicy {
    pub fn for_state(state: &FlowState, config: &Config) -> Self {
        match state {
            FlowState::Welcome => IdlePolicy::Attract(config.attract_timeout()),
            _ => IdlePolicy::Reset(config.reset_timeout()),
        }
    }

    pub fn timeout(self) -> Duration {
        match self {
            IdlePolicy::Attract(timeout) | IdlePolicy::Reset(timeout) => timeout,
        }
    }
}

/// Inactivity timer restarted by every qualifying input.
///
/// Fires once per quiet period: after firing it stays silent until the next
/// [`IdleTimer::activity`] re-arms it.
#[derive(Debug)]
pub struct IdleTimer {
    activity: Arc<Notify>,
    _task: ScheduledTask,
}

impl IdleTimer {
    pub fn spawn<F>(timeout: Duration, mut on_idle: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let activity = Arc::new(Notify::new());
        let signal = Arc::clone(&activity);
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = signal.notified() => continue,
                    _ = tokio::time::sleep(timeout) => {
                        debug!(?timeout, "idle timeout reached");
                        on_idle();
                        signal.notified().await;
                    }
                }
            }
        });
        Self {
            activity,
            _task: ScheduledTask { handle },
        }
    }

    /// Record user input (click, pointer move, key press, touch, scroll).
    pub fn activity(&self) {
        self.activity.notify_one();
    }
}
