//! Network bring-up
//!
//! Connecting is an explicit, bounded step: every attempt has a timeout,
//! failed attempts back off exponentially, and after a fixed number of
//! attempts the caller gets an error instead of waiting forever.

use core::future::Future;

use embassy_time::{Duration, Timer, with_timeout};
use log::{info, warn};
use thiserror_no_std::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkError {
    #[error("association with access point failed ({details})")]
    Association { details: &'static str },
    #[error("no IP configuration ({details})")]
    Configuration { details: &'static str },
    #[error("connection attempt timed out")]
    AttemptTimeout,
    #[error("gave up after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

/// A link that can be brought up, e.g. a Wi-Fi station plus DHCP.
pub trait Network {
    /// Associate and wait for an address. May block until done or failed.
    fn connect(&mut self) -> impl Future<Output = Result<(), NetworkError>>;
}

/// Bounds for [`establish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectPolicy {
    pub attempt_timeout: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub max_attempts: u32,
}

impl ConnectPolicy {
    /// Backoff to wait after the `attempt`-th failure (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        let ticks = self
            .initial_backoff
            .as_ticks()
            .saturating_mul(1u64 << shift);
        Duration::from_ticks(ticks).min(self.max_backoff)
    }
}

/// Bring the network up, retrying with exponential backoff.
///
/// Returns the number of attempts it took.
pub async fn establish<N: Network>(
    network: &mut N,
    policy: &ConnectPolicy,
) -> Result<u32, NetworkError> {
    for attempt in 1..=policy.max_attempts {
        info!("Connecting to network (attempt {}/{})", attempt, policy.max_attempts);

        let error = match with_timeout(policy.attempt_timeout, network.connect()).await {
            Ok(Ok(())) => {
                info!("Network connected after {} attempt(s)", attempt);
                return Ok(attempt);
            }
            Ok(Err(e)) => e,
            Err(_) => NetworkError::AttemptTimeout,
        };

        if attempt < policy.max_attempts {
            let backoff = policy.backoff(attempt);
            warn!(
                "Network attempt {} failed: {}, retrying in {} ms",
                attempt,
                error,
                backoff.as_millis()
            );
            Timer::after(backoff).await;
        } else {
            warn!("Network attempt {} failed: {}", attempt, error);
        }
    }

    Err(NetworkError::Exhausted {
        attempts: policy.max_attempts,
    })
}
