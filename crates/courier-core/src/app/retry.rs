//! Retry policy: decides how often and how long to wait between sends.

use std::time::Duration;

use rand::Rng;

/// Bounded exponential backoff with jitter.
///
/// Before retry `n` (0-based) the nominal delay is `base_delay * 2^n`, capped
/// at `max_backoff`. A jitter offset of up to `jitter_factor * nominal` is
/// then added or subtracted, but the result never drops below `base_delay`
/// and never exceeds `max_backoff`.
///
/// Example with base_delay=1s, jitter_factor=0.9:
/// - retry 0: nominal 1s, drawn from [1s, 1.9s]
/// - retry 1: nominal 2s, drawn from [1s, 3.8s]
/// - retry 4: nominal 16s, drawn from [1.6s, 30.4s]
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,

    /// Nominal delay before the first retry, and the floor for every delay.
    pub base_delay: Duration,

    /// Width of the jitter window relative to the nominal delay, in [0, 1].
    pub jitter_factor: f64,

    /// Upper bound for any single delay. `None` means unbounded.
    pub max_backoff: Option<Duration>,
}

impl Default for RetryPolicy {
    /// 5 retries, 1s base, 0.9 jitter.
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_secs(1),
            jitter_factor: 0.9,
            max_backoff: None,
        }
    }
}

impl RetryPolicy {
    /// No retries at all. Handy for one-shot tools.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Total send attempts, first one included.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Nominal (un-jittered) delay before retry `retry` (0-based).
    pub fn nominal_delay(&self, retry: u32) -> Duration {
        let factor = 2f64.powi(retry.min(1024) as i32);
        let nominal = secs(self.base_delay.as_secs_f64() * factor);
        match self.max_backoff {
            Some(max) => nominal.min(max),
            None => nominal,
        }
    }

    /// Inclusive range the jittered delay before retry `retry` is drawn from.
    pub fn jitter_bounds(&self, retry: u32) -> (Duration, Duration) {
        let nominal = self.nominal_delay(retry).as_secs_f64();
        let base = self.base_delay.as_secs_f64();
        let max = self
            .max_backoff
            .map(|d| d.as_secs_f64())
            .unwrap_or(f64::INFINITY);
        let offset = nominal * self.jitter_factor.clamp(0.0, 1.0);

        let low = (nominal + (base - nominal).max(-offset)).max(0.0);
        let high = (nominal + (max - nominal).min(offset)).max(low);
        (secs(low), secs(high))
    }

    /// Jittered delay before retry `retry`, drawn from `rng`.
    pub fn delay_with<R: Rng + ?Sized>(&self, retry: u32, rng: &mut R) -> Duration {
        let (low, high) = self.jitter_bounds(retry);
        if low >= high {
            return low;
        }
        secs(rng.gen_range(low.as_secs_f64()..=high.as_secs_f64()))
    }

    /// Jittered delay before retry `retry`, using the thread-local rng.
    pub fn next_delay(&self, retry: u32) -> Duration {
        self.delay_with(retry, &mut rand::thread_rng())
    }
}

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
}
