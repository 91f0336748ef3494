//! Bounded retry with backoff for blocking I/O.

use std::fmt::Display;
use std::thread;
use std::time::Duration;

use tracing::warn;

/// Backoff strategy for retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackoffStrategy {
    /// Same delay before every retry.
    Fixed,
    /// `base * 2^(retry - 1)`
    #[default]
    Exponential,
    /// `base * retry`
    Linear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 = try once).
    pub max_retries: u32,
    pub base_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
    pub strategy: BackoffStrategy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(1),
            strategy: BackoffStrategy::Exponential,
        }
    }
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay: delay,
            max_delay: delay,
            strategy: BackoffStrategy::Fixed,
        }
    }

    pub fn linear(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
            strategy: BackoffStrategy::Linear,
        }
    }

    pub fn exponential(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
            strategy: BackoffStrategy::Exponential,
        }
    }

    /// Delay before retry number `retry` (1-indexed); zero for `retry == 0`.
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let delay = match self.strategy {
            BackoffStrategy::Fixed => self.base_delay,
            BackoffStrategy::Exponential => {
                let factor = 2_u32.checked_pow(retry - 1).unwrap_or(u32::MAX);
                self.base_delay.saturating_mul(factor)
            }
            BackoffStrategy::Linear => self.base_delay.saturating_mul(retry),
        };
        delay.min(self.max_delay)
    }

    /// Run `op` until it succeeds or retries are exhausted, returning the last error.
    pub fn run<T, E, F>(&self, what: &str, mut op: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Result<T, E>,
    {
        let mut retry = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if retry < self.max_retries => {
                    retry += 1;
                    let delay = self.delay_for_retry(retry);
                    warn!(operation = what, retry, delay_ms = delay.as_millis() as u64, error = %err, "retrying");
                    thread::sleep(delay);
                }
                Err(err) => return Err(err),
            }
        }
    }
}
