//! Polling delay policy: start at `min`, double per attempt, cap at `max`

use std::time::Duration;

use bunk3r_core::config::SmsConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub min: Duration,
    pub max: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            min: Duration::from_secs(2),
            max: Duration::from_secs(30),
        }
    }
}

impl From<&SmsConfig> for BackoffPolicy {
    fn from(cfg: &SmsConfig) -> Self {
        let min = Duration::from_millis(cfg.min_delay_ms);
        Self {
            min,
            max: Duration::from_millis(cfg.max_delay_ms).max(min),
        }
    }
}

/// Delay to wait before poll number `attempt` (0-based).
pub fn backoff_delay(attempt: u32, policy: &BackoffPolicy) -> Duration {
    let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
    policy
        .min
        .checked_mul(factor)
        .unwrap_or(policy.max)
        .min(policy.max)
}
