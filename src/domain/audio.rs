use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;
use zeroize::Zeroize;

/// Audio buffer that is securely zeroed on drop.
/// Samples are cleared from memory once the utterance has been recognized.
#[derive(Debug, Zeroize)]
#[zeroize(drop)]
pub struct AudioBuffer {
    /// PCM audio samples (16-bit mono).
    samples: Vec<i16>,
    /// Sample rate in Hz.
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a new empty audio buffer.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            samples: Vec::new(),
            sample_rate,
        }
    }

    /// Create a buffer from already-captured samples.
    pub fn from_samples(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Append samples to the buffer.
    pub fn push_samples(&mut self, samples: &[i16]) {
        self.samples.extend_from_slice(samples);
    }

    /// Get the samples as a slice.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Get the sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the duration in seconds.
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Get the number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

/// Removes the spooled capture file when dropped.
///
/// The spool exists only while its capture is in flight; it must not
/// outlive the listen operation, whichever way that operation ends.
#[derive(Debug)]
pub struct SpoolGuard {
    path: PathBuf,
}

impl SpoolGuard {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SpoolGuard {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != io::ErrorKind::NotFound {
                warn!(path = ?self.path, ?err, "Failed to remove capture spool");
            }
        }
    }
}

/// One captured utterance, plus the on-disk spool backing it.
#[derive(Debug)]
pub struct AudioSample {
    buffer: AudioBuffer,
    spool: Option<SpoolGuard>,
}

impl AudioSample {
    pub fn new(buffer: AudioBuffer, spool: Option<SpoolGuard>) -> Self {
        Self { buffer, spool }
    }

    pub fn buffer(&self) -> &AudioBuffer {
        &self.buffer
    }

    /// Path of the spooled WAV copy, if one was written.
    pub fn spool_path(&self) -> Option<&Path> {
        self.spool.as_ref().map(SpoolGuard::path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_buffer_creation() {
        let buffer = AudioBuffer::new(16000);
        assert!(buffer.is_empty());
        assert_eq!(buffer.sample_rate(), 16000);
    }

    #[test]
    fn test_audio_buffer_push_samples() {
        let mut buffer = AudioBuffer::new(16000);
        buffer.push_samples(&[100, 200, 300]);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.samples(), &[100, 200, 300]);
    }

    #[test]
    fn test_audio_buffer_duration() {
        let buffer = AudioBuffer::from_samples(vec![0i16; 16000], 16000);
        assert!((buffer.duration_secs() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_spool_guard_removes_file_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.wav");
        fs::write(&path, b"RIFF").unwrap();

        let guard = SpoolGuard::new(path.clone());
        assert!(path.exists());
        drop(guard);
        assert!(!path.exists());
    }

    #[test]
    fn test_spool_guard_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let guard = SpoolGuard::new(dir.path().join("never-written.wav"));
        drop(guard);
    }

    #[test]
    fn test_sample_exposes_spool_path_while_alive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.wav");
        fs::write(&path, b"RIFF").unwrap();

        let sample = AudioSample::new(
            AudioBuffer::from_samples(vec![1, 2, 3], 16000),
            Some(SpoolGuard::new(path.clone())),
        );
        assert_eq!(sample.spool_path(), Some(path.as_path()));
        drop(sample);
        assert!(!path.exists());
    }
}
