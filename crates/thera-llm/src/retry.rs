//! Bounded retries with exponential backoff
//!
//! The backoff schedule is a plain function of the attempt number so it can
//! be tested without a network. [`RetryingProvider`] applies it around any
//! [`LlmProvider`] whose error type is [`LlmError`].

use crate::config::RetryConfig;
use crate::LlmError;
use std::time::Duration;
use thera_domain::traits::LlmProvider;
use tracing::{debug, warn};

/// Retry schedule and soft-failure threshold
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    min_response_chars: usize,
}

impl RetryPolicy {
    /// Create a policy; `max_attempts` below 1 is raised to 1
    pub fn new(max_attempts: u32, base_delay: Duration, min_response_chars: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            min_response_chars,
        }
    }

    /// Total attempts, including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Minimum trimmed reply length
    pub fn min_response_chars(&self) -> usize {
        self.min_response_chars
    }

    /// Wait after failed attempt `attempt` (1-based): `base * 2^(attempt-1)`
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use thera_llm::RetryPolicy;
    ///
    /// let policy = RetryPolicy::new(5, Duration::from_secs(2), 10);
    /// assert_eq!(policy.backoff_delay(1), Duration::from_secs(2));
    /// assert_eq!(policy.backoff_delay(2), Duration::from_secs(4));
    /// assert_eq!(policy.backoff_delay(3), Duration::from_secs(8));
    /// ```
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    /// Longest a prompt can take when every attempt runs to `per_attempt`,
    /// backoff included
    pub fn worst_case(&self, per_attempt: Duration) -> Duration {
        (1..self.max_attempts).fold(per_attempt.saturating_mul(self.max_attempts), |total, attempt| {
            total.saturating_add(self.backoff_delay(attempt))
        })
    }

    /// Whether a reply is long enough to hand to the parser
    pub fn accepts(&self, reply: &str) -> bool {
        reply.trim().chars().count() >= self.min_response_chars
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryConfig::default().into()
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(config: RetryConfig) -> Self {
        Self::new(config.max_attempts, config.base_delay(), config.min_response_chars)
    }
}

/// Provider decorator that retries transient failures and short replies
///
/// Non-retryable errors (e.g. a missing model) return immediately. When every
/// attempt fails the result is [`LlmError::Exhausted`] carrying the last error.
#[derive(Debug, Clone)]
pub struct RetryingProvider<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P> RetryingProvider<P> {
    /// Wrap `inner` with `policy`
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped provider
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// The active policy
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl<P> LlmProvider for RetryingProvider<P>
where
    P: LlmProvider<Error = LlmError> + Sync,
{
    type Error = LlmError;

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let max_attempts = self.policy.max_attempts;
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            match self.inner.generate(prompt).await {
                Ok(reply) if self.policy.accepts(&reply) => {
                    debug!(attempt, chars = reply.len(), "Generation succeeded");
                    return Ok(reply);
                }
                Ok(reply) => {
                    last_error = Some(LlmError::EmptyResponse {
                        len: reply.trim().chars().count(),
                        min: self.policy.min_response_chars,
                    });
                }
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => last_error = Some(e),
            }

            if attempt < max_attempts {
                let delay = self.policy.backoff_delay(attempt);
                if let Some(e) = &last_error {
                    warn!(attempt, max_attempts, ?delay, error = %e, "Generation attempt failed, backing off");
                }
                tokio::time::sleep(delay).await;
            }
        }

        Err(LlmError::Exhausted {
            attempts: max_attempts,
            last: Box::new(
                last_error.unwrap_or_else(|| LlmError::Other("no attempt was made".to_string())),
            ),
        })
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        self.inner.health_check().await
    }
}
