//! Bounded polling for remote state that becomes ready eventually.
use log::*;
use std::{future::Future, time::Duration};
use tokio::time::sleep;

use crate::error::{ReleaseBuilderError, Result};

/// How often and how many times to check a remote condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }
}

/// Result of a single check.
#[derive(Debug)]
pub enum PollOutcome<T> {
    /// The condition is met; stop polling.
    Ready(T),
    /// Not yet; check again after the interval.
    Pending,
    /// The condition can never be met; stop with this error.
    Failed(ReleaseBuilderError),
}

/// Run `check` until it reports [`PollOutcome::Ready`], sleeping
/// `policy.interval` between attempts.
///
/// An `Err` returned by `check` is treated as transient: it is logged and the
/// attempt counts against `policy.max_attempts`. Once every attempt is used
/// up a [`ReleaseBuilderError::PollTimeout`] naming `target` is returned.
pub async fn poll_until<T, F, Fut>(
    target: &str,
    policy: PollPolicy,
    mut check: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollOutcome<T>>>,
{
    for attempt in 1..=policy.max_attempts {
        match check().await {
            Ok(PollOutcome::Ready(value)) => {
                debug!("{target} ready after {attempt} attempt(s)");
                return Ok(value);
            }
            Ok(PollOutcome::Pending) => {
                debug!(
                    "{target} not ready: attempt {attempt}/{}",
                    policy.max_attempts
                );
            }
            Ok(PollOutcome::Failed(err)) => return Err(err),
            Err(err) => {
                warn!(
                    "error while waiting for {target} (attempt {attempt}/{}): {err}",
                    policy.max_attempts
                );
            }
        }

        if attempt < policy.max_attempts {
            sleep(policy.interval).await;
        }
    }

    Err(ReleaseBuilderError::poll_timeout(target, policy.max_attempts))
}
