use thiserror::Error;
use tonelink_core::ModemError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Modem(#[from] ModemError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("config file error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("WAV sample rate {found} Hz does not match configured {expected} Hz")]
    SampleRateMismatch { expected: u32, found: u32 },

    #[error("unsupported WAV format: {0}")]
    UnsupportedFormat(String),
}
