//! SMS delivery poller
//!
//! ```text
//!            Start                      Status(no code) / CheckFailed
//!   Idle ───────────► Polling{attempt} ◄──────────────────────────────┐
//!                         │  │  │  └───────────────────────────────────┘
//!          Status(code) ──┘  │  └── Status(terminal order) ──► Closed(status)
//!                ▼           ├── Cancel   ──► Cancelled
//!          Received{code}    └── Deadline ──► TimedOut
//! ```
//!
//! Transitions are pure ([`PollState::on`]); [`SmsPoller::run`] owns the
//! timers and the network calls.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use bunk3r_core::config::SmsConfig;

use crate::backoff::{backoff_delay, BackoffPolicy};
use crate::source::SmsStatusSource;
use crate::status::{OrderStatus, SmsStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    Idle,
    /// Waiting `delay` before check number `attempt`
    Polling { attempt: u32, delay: Duration },
    Received { code: String },
    /// The order ended without delivering a code
    Closed(OrderStatus),
    Cancelled,
    TimedOut,
}

#[derive(Debug, Clone)]
pub enum PollEvent {
    Start,
    Status(SmsStatus),
    CheckFailed,
    Cancel,
    Deadline,
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Idle | Self::Polling { .. })
    }

    pub fn on(self, event: PollEvent, policy: &BackoffPolicy) -> PollState {
        if self.is_terminal() {
            return self;
        }
        match (self, event) {
            (_, PollEvent::Cancel) => Self::Cancelled,
            (_, PollEvent::Deadline) => Self::TimedOut,
            (Self::Idle, PollEvent::Start) => Self::polling(0, policy),
            (Self::Polling { attempt, .. }, PollEvent::Status(status)) => {
                if let Some(code) = status.code() {
                    Self::Received {
                        code: code.to_string(),
                    }
                } else if status.status.descriptor().terminal {
                    Self::Closed(status.status)
                } else {
                    Self::polling(attempt.saturating_add(1), policy)
                }
            }
            (Self::Polling { attempt, .. }, PollEvent::CheckFailed) => {
                Self::polling(attempt.saturating_add(1), policy)
            }
            (state, _) => state,
        }
    }

    fn polling(attempt: u32, policy: &BackoffPolicy) -> Self {
        Self::Polling {
            attempt,
            delay: backoff_delay(attempt, policy),
        }
    }
}

pub struct SmsPoller<S> {
    source: S,
    policy: BackoffPolicy,
    max_wait: Duration,
}

impl<S: SmsStatusSource> SmsPoller<S> {
    pub fn new(source: S, policy: BackoffPolicy, max_wait: Duration) -> Self {
        Self {
            source,
            policy,
            max_wait,
        }
    }

    pub fn from_config(source: S, cfg: &SmsConfig) -> Self {
        Self::new(
            source,
            BackoffPolicy::from(cfg),
            Duration::from_secs(cfg.max_wait_secs),
        )
    }

    /// Poll until a code arrives, the order closes, the deadline passes, or
    /// `cancel` fires. Always returns a terminal state.
    pub async fn run(&self, order_id: &str, cancel: CancellationToken) -> PollState {
        let deadline = tokio::time::Instant::now() + self.max_wait;
        let mut state = PollState::Idle.on(PollEvent::Start, &self.policy);

        while let PollState::Polling { attempt, delay } = state {
            debug!(order_id, attempt, delay_ms = delay.as_millis() as u64, "next sms check");

            // cancel and deadline cover the in-flight check, not just the wait
            let check = async {
                tokio::time::sleep(delay).await;
                self.source.check(order_id).await
            };

            let event = tokio::select! {
                _ = cancel.cancelled() => PollEvent::Cancel,
                _ = tokio::time::sleep_until(deadline) => PollEvent::Deadline,
                result = check => match result {
                    Ok(status) => PollEvent::Status(status),
                    Err(e) => {
                        warn!(order_id, attempt, error = %e, "sms status check failed");
                        PollEvent::CheckFailed
                    }
                },
            };
            state = state.on(event, &self.policy);
        }

        match &state {
            PollState::Received { .. } => info!(order_id, "sms received"),
            PollState::Closed(status) => info!(order_id, status = %status, "order closed without sms"),
            PollState::Cancelled => info!(order_id, "sms polling cancelled"),
            PollState::TimedOut => warn!(order_id, "sms polling timed out"),
            PollState::Idle | PollState::Polling { .. } => {}
        }
        state
    }
}
