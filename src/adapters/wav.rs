use std::io::Cursor;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::domain::{AudioBuffer, DomainError};

fn spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Encode a buffer as a 16-bit mono WAV in memory.
pub fn encode_wav(buffer: &AudioBuffer) -> Result<Vec<u8>, DomainError> {
    let mut cursor = Cursor::new(Vec::new());
    let mut writer = WavWriter::new(&mut cursor, spec(buffer.sample_rate()))
        .map_err(|e| DomainError::Io(e.to_string()))?;
    for &sample in buffer.samples() {
        writer
            .write_sample(sample)
            .map_err(|e| DomainError::Io(e.to_string()))?;
    }
    writer
        .finalize()
        .map_err(|e| DomainError::Io(e.to_string()))?;
    Ok(cursor.into_inner())
}

/// Write the buffer to the capture spool on disk.
pub fn write_spool(path: &Path, buffer: &AudioBuffer) -> Result<(), DomainError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = WavWriter::create(path, spec(buffer.sample_rate()))
        .map_err(|e| DomainError::Io(e.to_string()))?;
    for &sample in buffer.samples() {
        writer
            .write_sample(sample)
            .map_err(|e| DomainError::Io(e.to_string()))?;
    }
    writer
        .finalize()
        .map_err(|e| DomainError::Io(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::WavReader;

    #[test]
    fn test_encode_wav_round_trips() {
        let buffer = AudioBuffer::from_samples(vec![0, 1000, -1000, 32767], 16000);
        let bytes = encode_wav(&buffer).unwrap();
        assert_eq!(&bytes[..4], b"RIFF");

        let reader = WavReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.spec().sample_rate, 16000);
        assert_eq!(reader.spec().channels, 1);
        let samples: Vec<i16> = reader.into_samples().collect::<Result<_, _>>().unwrap();
        assert_eq!(samples, vec![0, 1000, -1000, 32767]);
    }

    #[test]
    fn test_write_spool_creates_readable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.wav");
        let buffer = AudioBuffer::from_samples(vec![5; 160], 16000);

        write_spool(&path, &buffer).unwrap();

        let reader = WavReader::open(&path).unwrap();
        assert_eq!(reader.len(), 160);
    }
}
