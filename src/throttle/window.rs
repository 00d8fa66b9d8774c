//! In-process sliding-window throttle.
//!
//! Keeps the instants of recent attempts per key.  An attempt is allowed
//! when fewer than `max_attempts` instants fall inside the trailing
//! window; the answer for a denied attempt is how long until the oldest
//! one ages out.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::warn;

use super::{RetrievalThrottle, ThrottleDecision, ThrottlePolicy};
use crate::errors::Result;

/// Above this many tracked keys, idle buckets are swept on each call.
const SWEEP_THRESHOLD: usize = 4_096;

/// Mutex-guarded map of attempt timestamps.
#[derive(Debug)]
pub struct SlidingWindowThrottle {
    policy: ThrottlePolicy,
    attempts: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl SlidingWindowThrottle {
    pub fn new(policy: ThrottlePolicy) -> Self {
        Self {
            policy,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> ThrottlePolicy {
        self.policy
    }

    /// Same as `check_and_consume`, with the clock supplied by the caller.
    pub fn check_and_consume_at(&self, key: &str, now: Instant) -> ThrottleDecision {
        let window = self.policy.window;
        let mut attempts = self.attempts.lock().unwrap_or_else(PoisonError::into_inner);

        if attempts.len() > SWEEP_THRESHOLD {
            attempts.retain(|_, seen| {
                seen.back()
                    .is_some_and(|last| now.saturating_duration_since(*last) < window)
            });
        }

        let seen = attempts.entry(key.to_string()).or_default();
        while seen
            .front()
            .is_some_and(|first| now.saturating_duration_since(*first) >= window)
        {
            seen.pop_front();
        }

        if seen.len() >= self.policy.max_attempts as usize {
            let retry_after = seen.front().map_or(Duration::ZERO, |first| {
                window.saturating_sub(now.saturating_duration_since(*first))
            });
            warn!(key, ?retry_after, "unlock attempt throttled");
            return ThrottleDecision::Denied { retry_after };
        }

        seen.push_back(now);
        ThrottleDecision::Allowed
    }
}

impl Default for SlidingWindowThrottle {
    fn default() -> Self {
        Self::new(ThrottlePolicy::default())
    }
}

impl RetrievalThrottle for SlidingWindowThrottle {
    fn check_and_consume(&self, key: &str) -> Result<ThrottleDecision> {
        Ok(self.check_and_consume_at(key, Instant::now()))
    }
}
