//! Rate-limited telemetry uploads
//!
//! The reporter pushes the latest [`Reading`] to a remote channel at most once
//! per upload interval. Uploads are fire-and-forget: a failed attempt is
//! logged and dropped, and the next attempt waits for the next full interval.

pub mod payload;

use core::future::Future;

use embassy_time::{Duration, Instant, with_timeout};
use log::{debug, error, info, warn};
use thiserror_no_std::Error;

use crate::config::ChannelConfig;
use crate::reading::Reading;

pub use payload::TelemetryPayload;

/// HTTP status the channel answers with when an update was accepted.
pub const STATUS_OK: u16 = 200;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("{operation} failed ({details})")]
    Transport {
        operation: &'static str,
        details: &'static str,
    },
    #[error("no response within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
    #[error("payload exceeds {capacity} bytes")]
    PayloadOverflow { capacity: usize },
}

/// Carries an encoded update body to the remote channel.
pub trait TelemetryTransport {
    /// Submit `body` and return the transport status code.
    fn submit(
        &mut self,
        channel: &ChannelConfig<'_>,
        body: &str,
    ) -> impl Future<Output = Result<u16, TelemetryError>>;
}

/// Result of [`TelemetryReporter::maybe_upload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadResult {
    /// Upload interval has not elapsed; nothing was sent.
    Skipped,
    /// The channel acknowledged the update.
    Success,
    /// The channel answered with a status other than [`STATUS_OK`].
    RemoteError(u16),
    /// The update never got a status back.
    Failed(TelemetryError),
}

impl UploadResult {
    /// `true` for every variant except [`UploadResult::Skipped`].
    pub const fn attempted(&self) -> bool {
        !matches!(self, Self::Skipped)
    }
}

pub struct TelemetryReporter<'a, T> {
    transport: T,
    channel: ChannelConfig<'a>,
    interval: Duration,
    timeout: Duration,
    last_upload: Instant,
}

impl<'a, T: TelemetryTransport> TelemetryReporter<'a, T> {
    /// Create a reporter. The upload clock starts at boot (tick 0), so the
    /// first upload happens once a full interval has passed since boot.
    pub const fn new(
        transport: T,
        channel: ChannelConfig<'a>,
        interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            channel,
            interval,
            timeout,
            last_upload: Instant::from_ticks(0),
        }
    }

    pub const fn last_upload(&self) -> Instant {
        self.last_upload
    }

    pub const fn channel(&self) -> &ChannelConfig<'a> {
        &self.channel
    }

    /// Whether strictly more than one interval has passed since the last attempt.
    pub fn is_due(&self, now: Instant) -> bool {
        now.checked_duration_since(self.last_upload)
            .is_some_and(|elapsed| elapsed > self.interval)
    }

    /// Upload `reading` if the interval has elapsed.
    ///
    /// After any attempt, successful or not, the upload clock restarts at `now`.
    pub async fn maybe_upload(&mut self, reading: &Reading, now: Instant) -> UploadResult {
        if !self.is_due(now) {
            debug!("Telemetry upload not due yet");
            return UploadResult::Skipped;
        }

        let result = self.upload(reading).await;
        self.last_upload = now;

        match result {
            UploadResult::Success => {
                info!("Telemetry update OK (channel {})", self.channel.id)
            }
            UploadResult::RemoteError(code) => {
                warn!("Telemetry error: status {} (channel {})", code, self.channel.id)
            }
            UploadResult::Failed(e) => {
                error!("Telemetry error: {} (channel {})", e, self.channel.id)
            }
            UploadResult::Skipped => {}
        }

        result
    }

    async fn upload(&mut self, reading: &Reading) -> UploadResult {
        let body = match TelemetryPayload::from(reading).encode(self.channel.api_key) {
            Ok(body) => body,
            Err(e) => return UploadResult::Failed(e),
        };

        let submit = self.transport.submit(&self.channel, body.as_str());
        match with_timeout(self.timeout, submit).await {
            Ok(Ok(STATUS_OK)) => UploadResult::Success,
            Ok(Ok(code)) => UploadResult::RemoteError(code),
            Ok(Err(e)) => UploadResult::Failed(e),
            Err(_) => UploadResult::Failed(TelemetryError::Timeout {
                timeout_ms: self.timeout.as_millis(),
            }),
        }
    }
}
