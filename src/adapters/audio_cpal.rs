use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use parking_lot::Mutex;
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::HeapRb;
use tracing::{debug, info, warn};

use crate::adapters::wav;
use crate::domain::config::AudioConfig;
use crate::domain::{AudioBuffer, AudioSample, DomainError, SpoolGuard};
use crate::ports::AudioCapture;

type RingProducer = ringbuf::HeapProd<i16>;
type RingConsumer = ringbuf::HeapCons<i16>;

/// Utterance capture backed by the default cpal host.
///
/// The device and stream live inside a single blocking call: both are
/// released before `capture` returns, whichever way it returns. Each
/// successful capture is spooled to one well-known WAV path; the returned
/// sample's guard deletes that file when the sample is dropped.
pub struct CpalUtteranceCapture {
    config: AudioConfig,
    spool_path: PathBuf,
}

impl CpalUtteranceCapture {
    pub fn new(config: AudioConfig, spool_path: PathBuf) -> Self {
        info!(
            sample_rate = config.sample_rate,
            spool = ?spool_path,
            "CpalUtteranceCapture created"
        );
        Self { config, spool_path }
    }
}

#[async_trait]
impl AudioCapture for CpalUtteranceCapture {
    async fn capture(&self, timeout: Duration) -> Result<AudioSample, DomainError> {
        let config = self.config.clone();
        let spool_path = self.spool_path.clone();

        tokio::task::spawn_blocking(move || capture_blocking(&config, spool_path, timeout))
            .await
            .map_err(|e| DomainError::AudioDevice {
                message: format!("Capture task failed: {e}"),
            })?
    }
}

fn capture_blocking(
    config: &AudioConfig,
    spool_path: PathBuf,
    timeout: Duration,
) -> Result<AudioSample, DomainError> {
    let device = select_device(config.device.as_deref())?;
    let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());

    let supported = device
        .default_input_config()
        .map_err(|e| DomainError::AudioDevice {
            message: format!("Failed to get default config: {e}"),
        })?;
    let sample_format = supported.sample_format();
    let stream_config = StreamConfig {
        channels: supported.channels(),
        sample_rate: supported.sample_rate(),
        buffer_size: cpal::BufferSize::Default,
    };
    let device_rate = stream_config.sample_rate.0;

    debug!(
        device = %device_name,
        device_rate,
        channels = stream_config.channels,
        format = ?sample_format,
        "Opening capture stream"
    );

    // Ring sized for the utterance cap at the device rate, plus slack.
    let capacity = (config.max_utterance_secs as usize + 2) * device_rate as usize;
    let (producer, mut consumer) = HeapRb::<i16>::new(capacity).split();
    let stream_error: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

    let stream = build_stream(
        &device,
        &stream_config,
        sample_format,
        producer,
        Arc::clone(&stream_error),
    )?;
    stream.play().map_err(|e| DomainError::AudioDevice {
        message: format!("Failed to start stream: {e}"),
    })?;

    let outcome = run_capture_loop(&mut consumer, config, device_rate, timeout, &stream_error);

    // Release the device before touching the spool.
    drop(stream);

    let captured = outcome?;
    let samples = resample(&captured, device_rate, config.sample_rate);
    let buffer = AudioBuffer::from_samples(samples, config.sample_rate);

    let guard = SpoolGuard::new(spool_path);
    wav::write_spool(guard.path(), &buffer)?;

    info!(
        duration_secs = buffer.duration_secs(),
        device = %device_name,
        "Utterance captured"
    );

    Ok(AudioSample::new(buffer, Some(guard)))
}

fn select_device(requested: Option<&str>) -> Result<Device, DomainError> {
    let host = cpal::default_host();

    if let Some(name) = requested {
        let devices = host.input_devices().map_err(|e| DomainError::AudioDevice {
            message: format!("Failed to enumerate devices: {e}"),
        })?;
        for device in devices {
            if device.name().map(|n| n == name).unwrap_or(false) {
                return Ok(device);
            }
        }
        warn!(device = %name, "Requested device not found, falling back to default");
    }

    host.default_input_device()
        .ok_or_else(|| DomainError::AudioDevice {
            message: "No default input device available".to_string(),
        })
}

fn error_callback(slot: Arc<Mutex<Option<String>>>) -> impl FnMut(cpal::StreamError) {
    move |err| {
        warn!(?err, "Audio stream error");
        *slot.lock() = Some(err.to_string());
    }
}

fn build_stream(
    device: &Device,
    config: &StreamConfig,
    sample_format: SampleFormat,
    mut producer: RingProducer,
    stream_error: Arc<Mutex<Option<String>>>,
) -> Result<Stream, DomainError> {
    let channels = config.channels as usize;

    let stream = match sample_format {
        SampleFormat::I16 => device.build_input_stream(
            config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                push_mono(&mut producer, data, channels);
            },
            error_callback(stream_error),
            None,
        ),
        SampleFormat::F32 => device.build_input_stream(
            config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let converted: Vec<i16> = data
                    .iter()
                    .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
                    .collect();
                push_mono(&mut producer, &converted, channels);
            },
            error_callback(stream_error),
            None,
        ),
        other => {
            return Err(DomainError::AudioDevice {
                message: format!("Unsupported sample format: {other:?}"),
            })
        }
    };

    stream.map_err(|e| DomainError::AudioDevice {
        message: format!("Failed to build stream: {e}"),
    })
}

/// Downmix interleaved frames to mono and push them into the ring.
fn push_mono(producer: &mut RingProducer, data: &[i16], channels: usize) {
    if channels <= 1 {
        let _ = producer.push_slice(data);
        return;
    }
    let mono: Vec<i16> = data
        .chunks_exact(channels)
        .map(|frame| (frame.iter().map(|&s| s as i32).sum::<i32>() / channels as i32) as i16)
        .collect();
    let _ = producer.push_slice(&mono);
}

/// Drain the ring until the utterance ends.
///
/// No speech within `timeout` -> CaptureTimeout. After onset, recording
/// stops at the trailing-silence hold or the utterance cap.
fn run_capture_loop(
    consumer: &mut RingConsumer,
    config: &AudioConfig,
    device_rate: u32,
    timeout: Duration,
    stream_error: &Mutex<Option<String>>,
) -> Result<Vec<i16>, DomainError> {
    let silence_hold = Duration::from_millis(config.silence_hold_ms);
    let utterance_cap = config.max_utterance_secs as usize * device_rate as usize;

    let started = Instant::now();
    let mut last_voice = Instant::now();
    let mut speech_started = false;
    let mut captured: Vec<i16> = Vec::new();
    let mut chunk = vec![0i16; 2048];

    loop {
        if let Some(message) = stream_error.lock().take() {
            return Err(DomainError::AudioDevice { message });
        }

        let drained = consumer.pop_slice(&mut chunk);
        if drained == 0 {
            if !speech_started && started.elapsed() >= timeout {
                return Err(DomainError::CaptureTimeout);
            }
            if speech_started && last_voice.elapsed() >= silence_hold {
                break;
            }
            thread::sleep(Duration::from_millis(10));
            continue;
        }

        let frame = &chunk[..drained];
        let level = rms(frame);

        if speech_started {
            captured.extend_from_slice(frame);
            if level >= config.speech_threshold {
                last_voice = Instant::now();
            }
            if last_voice.elapsed() >= silence_hold || captured.len() >= utterance_cap {
                break;
            }
        } else if level >= config.speech_threshold {
            speech_started = true;
            last_voice = Instant::now();
            captured.extend_from_slice(frame);
        } else if started.elapsed() >= timeout {
            return Err(DomainError::CaptureTimeout);
        }
    }

    Ok(captured)
}

/// Normalized RMS level of a frame (0.0 - 1.0).
fn rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = samples
        .iter()
        .map(|&s| {
            let v = s as f64 / 32768.0;
            v * v
        })
        .sum();
    (sum_squares / samples.len() as f64).sqrt() as f32
}

/// Linear resampling between device rate and target rate.
fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }
    let ratio = from_rate as f64 / to_rate as f64;
    let out_len = (samples.len() as f64 / ratio).floor() as usize;
    let mut out = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let pos = i as f64 * ratio;
        let idx = pos as usize;
        let frac = pos - idx as f64;
        let a = samples[idx] as f64;
        let b = samples[(idx + 1).min(samples.len() - 1)] as f64;
        out.push((a + (b - a) * frac).round() as i16);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms_of_silence_is_zero() {
        assert_eq!(rms(&[0; 512]), 0.0);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn test_rms_of_full_scale_square_wave() {
        let wave: Vec<i16> = (0..512)
            .map(|i| if i % 2 == 0 { i16::MAX } else { i16::MIN + 1 })
            .collect();
        assert!((rms(&wave) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_resample_identity() {
        let samples = vec![1, 2, 3, 4];
        assert_eq!(resample(&samples, 16000, 16000), samples);
    }

    #[test]
    fn test_resample_halves_length() {
        let samples: Vec<i16> = (0..32000).map(|i| (i % 100) as i16).collect();
        let out = resample(&samples, 32000, 16000);
        assert_eq!(out.len(), 16000);
    }

    #[test]
    fn test_push_mono_averages_stereo_frames() {
        let (mut producer, mut consumer) = HeapRb::<i16>::new(16).split();
        push_mono(&mut producer, &[100, 200, -50, 50], 2);

        let mut out = [0i16; 4];
        let n = consumer.pop_slice(&mut out);
        assert_eq!(n, 2);
        assert_eq!(&out[..2], &[150, 0]);
    }
}
