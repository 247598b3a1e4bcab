//! Token-bucket rate limiter with jittered refill
//!
//! Each probe owns one limiter, sized from the probe's events-per-second
//! budget. The refill is jittered so that a fleet of probes firing in
//! lock-step does not commit captures in synchronized bursts.

use rand::Rng;
use std::fmt;
use std::sync::Mutex;
use std::time::Instant;

/// Outcome of a single budget check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Exceeded,
}

struct BucketState {
    budget: f64,
    last_refill: Instant,
}

/// Token-bucket limiter.
///
/// The bucket starts with one token and refills at `rate * elapsed * jitter`
/// tokens, with jitter uniform in `[0.5, 1.5)`, capped at
/// `max(1.0, rate * tau)`. A rate of zero never refills and starts empty, so
/// the limiter always denies - the probe is effectively muted.
///
/// Each firing performs exactly one budget check; `limit` never panics and
/// never errors, a denial only invokes the optional `on_exceed` observer.
pub struct RateLimiter {
    rate: f64,
    tau: f64,
    max_budget: f64,
    on_exceed: Option<Box<dyn Fn() + Send + Sync>>,
    state: Mutex<BucketState>,
}

impl RateLimiter {
    /// Create a limiter for the given events-per-second budget.
    ///
    /// `tau` is `1 / rate`, or 1.0 when the rate is zero.
    pub fn new(rate: f64) -> Self {
        let rate = rate.max(0.0);
        let tau = if rate > 0.0 { 1.0 / rate } else { 1.0 };
        Self {
            rate,
            tau,
            max_budget: (rate * tau).max(1.0),
            on_exceed: None,
            state: Mutex::new(BucketState {
                budget: if rate > 0.0 { 1.0 } else { 0.0 },
                last_refill: Instant::now(),
            }),
        }
    }

    /// Attach an observer invoked on every denial
    pub fn with_on_exceed<F>(mut self, on_exceed: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_exceed = Some(Box::new(on_exceed));
        self
    }

    /// The events-per-second budget this limiter was sized for
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// The refill time constant
    pub fn tau(&self) -> f64 {
        self.tau
    }

    /// Perform one budget check, consuming a token when allowed.
    pub fn limit(&self) -> RateLimitDecision {
        let allowed = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            let now = Instant::now();
            if self.rate > 0.0 {
                let elapsed = now.duration_since(state.last_refill).as_secs_f64();
                let jitter = rand::thread_rng().gen_range(0.5..1.5);
                state.budget = (state.budget + self.rate * elapsed * jitter).min(self.max_budget);
            }
            state.last_refill = now;

            if state.budget >= 1.0 {
                state.budget -= 1.0;
                true
            } else {
                false
            }
        };

        if allowed {
            RateLimitDecision::Allowed
        } else {
            if let Some(on_exceed) = &self.on_exceed {
                on_exceed();
            }
            RateLimitDecision::Exceeded
        }
    }

    /// Convenience wrapper over [`limit`](Self::limit)
    pub fn is_allowed(&self) -> bool {
        self.limit() == RateLimitDecision::Allowed
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("rate", &self.rate)
            .field("tau", &self.tau)
            .field("max_budget", &self.max_budget)
            .finish_non_exhaustive()
    }
}
