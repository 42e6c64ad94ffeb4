//! Bounded exponential backoff for operation polling.
//!
//! Interval `n` is `sleep * multiplier^n` plus up to `jitter` of random extra
//! time, capped at `wait_ceiling`. The schedule ends once the next sleep would
//! cross `max_wait` or `max_retrials` polls have been made.

use std::time::Duration;

use rand::Rng;

/// Polling schedule for a single wait.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryConfig {
    /// Delay before the first poll
    pub pre_start_sleep: Duration,
    /// Initial delay between polls
    pub sleep: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
    /// Upper bound of the random extra added to each delay
    pub jitter: Duration,
    /// Maximum delay between two polls
    pub wait_ceiling: Duration,
    /// Total wait budget (None = unbounded)
    pub max_wait: Option<Duration>,
    /// Maximum number of polls (None = unbounded)
    pub max_retrials: Option<u32>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            pre_start_sleep: Duration::from_millis(1_000),
            sleep: Duration::from_millis(2_000),
            multiplier: 1.4,
            jitter: Duration::from_millis(1_000),
            wait_ceiling: Duration::from_millis(180_000),
            max_wait: Some(Duration::from_millis(1_800_000)),
            max_retrials: None,
        }
    }
}

impl RetryConfig {
    /// Zero-delay schedule, mostly useful against local mock servers.
    pub fn immediate() -> Self {
        Self {
            pre_start_sleep: Duration::ZERO,
            sleep: Duration::ZERO,
            jitter: Duration::ZERO,
            ..Default::default()
        }
    }

    pub fn backoff(&self) -> Backoff {
        Backoff {
            config: self.clone(),
            attempt: 0,
        }
    }
}

/// Stateful iterator over the delays of one wait.
#[derive(Debug)]
pub struct Backoff {
    config: RetryConfig,
    attempt: u32,
}

impl Backoff {
    /// Number of delays handed out so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Delay before the next poll, or `None` when the budget is spent.
    ///
    /// `elapsed` is the time already spent waiting, including the pre-start
    /// sleep.
    pub fn next_delay(&mut self, elapsed: Duration) -> Option<Duration> {
        if let Some(max) = self.config.max_retrials {
            if self.attempt + 1 >= max {
                return None;
            }
        }

        let delay = self.delay_for(self.attempt);

        if let Some(max_wait) = self.config.max_wait {
            if elapsed + delay > max_wait {
                return None;
            }
        }

        self.attempt += 1;
        Some(delay)
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.config.sleep.as_secs_f64() * self.config.multiplier.powi(attempt as i32);
        let jitter = if self.config.jitter.is_zero() {
            0.0
        } else {
            rand::thread_rng().gen_range(0.0..self.config.jitter.as_secs_f64())
        };
        let ceiling = self.config.wait_ceiling.as_secs_f64();
        Duration::from_secs_f64((base + jitter).min(ceiling))
    }
}
