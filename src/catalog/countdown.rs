//! Time remaining until a tour departs.
//!
//! [`compute_countdown`] is the pure breakdown. [`CountdownTimer`] adds the
//! freeze-once-passed rule, and [`spawn_countdown`] drives a timer once per
//! second on the runtime so the hero banner can read a live value.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

const SECOND_MS: i64 = 1_000;
const MINUTE_MS: i64 = 60 * SECOND_MS;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

/// Floor breakdown of `target - now`, `None` once the target has passed.
pub fn compute_countdown(target: DateTime<Utc>, now: DateTime<Utc>) -> Option<Countdown> {
    let distance = (target - now).num_milliseconds();
    if distance < 0 {
        return None;
    }
    Some(Countdown {
        days: distance / DAY_MS,
        hours: (distance / HOUR_MS) % 24,
        minutes: (distance / MINUTE_MS) % 60,
        seconds: (distance / SECOND_MS) % 60,
    })
}

/// Last value shown plus whether it is final.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CountdownState {
    pub countdown: Countdown,
    pub finished: bool,
}

/// Countdown that stops updating once the target passes.
///
/// Starts at zero, so a target already in the past never shows anything else.
#[derive(Debug, Clone)]
pub struct CountdownTimer {
    target: DateTime<Utc>,
    state: CountdownState,
}

impl CountdownTimer {
    pub fn new(target: DateTime<Utc>) -> Self {
        Self {
            target,
            state: CountdownState::default(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state.finished
    }

    /// Recompute for `now`. After finishing, the frozen value is returned unchanged.
    pub fn tick(&mut self, now: DateTime<Utc>) -> CountdownState {
        if !self.state.finished {
            match compute_countdown(self.target, now) {
                Some(countdown) => self.state.countdown = countdown,
                None => self.state.finished = true,
            }
        }
        self.state
    }
}

/// Drive a [`CountdownTimer`] once per second until the target passes.
///
/// The receiver holds a value computed before this returns. The task exits
/// when the countdown finishes or every receiver is dropped.
pub fn spawn_countdown(target: DateTime<Utc>) -> (watch::Receiver<CountdownState>, JoinHandle<()>) {
    let mut timer = CountdownTimer::new(target);
    let (tx, rx) = watch::channel(timer.tick(Utc::now()));

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK);
        interval.tick().await;
        while !timer.is_finished() {
            interval.tick().await;
            if tx.send(timer.tick(Utc::now())).is_err() {
                return;
            }
        }
        tracing::debug!("Countdown to {} finished", target);
    });

    (rx, task)
}

struct Ticker {
    target: DateTime<Utc>,
    rx: watch::Receiver<CountdownState>,
    task: JoinHandle<()>,
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// One running countdown, restarted whenever the requested target changes.
#[derive(Default)]
pub struct LiveCountdown {
    ticker: Mutex<Option<Ticker>>,
}

impl LiveCountdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of the countdown to `target`.
    pub async fn current(&self, target: DateTime<Utc>) -> CountdownState {
        let mut ticker = self.ticker.lock().await;
        if let Some(running) = ticker.as_ref() {
            if running.target == target {
                return *running.rx.borrow();
            }
        }

        tracing::debug!("Starting countdown to {}", target);
        let (rx, task) = spawn_countdown(target);
        let state = *rx.borrow();
        *ticker = Some(Ticker { target, rx, task });
        state
    }
}
