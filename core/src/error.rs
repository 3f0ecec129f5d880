use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModemError {
    #[error("message of {bits} bits exceeds capacity of {max} bits")]
    CapacityExceeded { bits: usize, max: usize },

    #[error("ambiguous decoding: {0} candidate corrections")]
    AmbiguousDecoding(usize),

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("no sync pattern found within {windows} windows")]
    SyncTimeout { windows: usize },

    #[error("reception did not complete within {windows} windows")]
    Timeout { windows: usize },

    #[error("reception cancelled")]
    Cancelled,

    #[error("sample source exhausted")]
    EndOfStream,

    #[error("invalid frame size: expected {expected} bits, got {actual}")]
    InvalidFrameSize { expected: usize, actual: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("audio error: {0}")]
    Audio(String),
}

pub type Result<T> = std::result::Result<T, ModemError>;
