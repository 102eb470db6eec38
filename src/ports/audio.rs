use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{AudioSample, DomainError};

/// Port for bounded utterance capture.
///
/// Implementations acquire the input device for the duration of one call
/// only, and must release it on every exit path.
#[async_trait]
pub trait AudioCapture: Send + Sync {
    /// Capture one utterance from the input device.
    ///
    /// Waits up to `timeout` for speech to start, then records until the
    /// utterance ends. The returned sample owns a spooled WAV copy that is
    /// deleted when the sample is dropped.
    ///
    /// Fails with `CaptureTimeout` if no speech starts within `timeout`,
    /// or `AudioDevice` for device problems.
    async fn capture(&self, timeout: Duration) -> Result<AudioSample, DomainError>;
}
