use hound::{SampleFormat, WavSpec};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::CliError;

/// Write mono f32 samples as 16-bit PCM
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), CliError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let file = File::create(path)?;
    let mut writer = hound::WavWriter::new(std::io::BufWriter::new(file), spec)?;
    for &sample in samples {
        let clamped = sample.clamp(-1.0, 1.0);
        writer.write_sample((clamped * 32767.0) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Read a 16-bit integer or 32-bit float WAV; only the first channel is kept
pub fn read_wav(path: &Path) -> Result<(Vec<f32>, u32), CliError> {
    let mut reader = hound::WavReader::new(BufReader::new(File::open(path)?))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect::<Result<_, _>>()?,
        (SampleFormat::Float, 32) => reader.samples::<f32>().collect::<Result<_, _>>()?,
        (format, bits) => {
            return Err(CliError::UnsupportedFormat(format!(
                "{} bit {:?}",
                bits, format
            )))
        }
    };

    let samples = interleaved.into_iter().step_by(channels).collect();
    Ok((samples, spec.sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcm16_roundtrip_within_quantization() {
        let dir = std::env::temp_dir().join(format!("tonelink-wav-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("roundtrip.wav");

        let samples = vec![0.0, 0.5, -0.5, 0.8, -1.5];
        write_wav(&path, &samples, 44100).unwrap();
        let (read, rate) = read_wav(&path).unwrap();
        assert_eq!(rate, 44100);
        assert_eq!(read.len(), samples.len());
        for (a, b) in read.iter().zip([0.0f32, 0.5, -0.5, 0.8, -1.0]) {
            assert!((a - b).abs() < 1e-3, "{} vs {}", a, b);
        }
        std::fs::remove_dir_all(&dir).ok();
    }
}
