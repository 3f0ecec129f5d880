//! Acoustic modem for short bit strings
//!
//! M-ary FSK with a marker tone between symbols, a 5-bit length preamble and
//! CRC-style cyclic codes that correct up to 2 (or 3) bit errors per frame.

pub mod config;
pub mod decoder;
pub mod demodulator;
pub mod encoder;
pub mod error;
pub mod fec;
pub mod framing;
pub mod fsk;
pub mod gf2;
pub mod noise;
pub mod session;
pub mod spectrum;
pub mod tones;

pub use config::ModemConfig;
pub use decoder::Decoder;
pub use demodulator::{Demodulator, ReceiverState, Reception};
pub use encoder::{inject_bit_errors, Encoder};
pub use error::{ModemError, Result};
pub use fec::{CorrectionClass, FecDecoder, FecEncoder};
pub use gf2::{format_bits, parse_bits, Gf2Word};
pub use session::{BufferSource, CancelToken, ReceiveSession, SampleSource};

// Audio configuration
pub const SAMPLE_RATE: u32 = 44100;
pub const DEFAULT_DATA_TONES: usize = 64;
pub const DEFAULT_TONE_SECS: f32 = 0.15;

// Tone layout
pub const BASE_FREQUENCY_HZ: f32 = 800.0; // marker
pub const FREQUENCY_STEP_HZ: f32 = 200.0;
pub const BAND_HALF_WIDTH_HZ: f32 = 100.0;

// Noise calibration
pub const CALIBRATION_SEGMENTS: usize = 50;
pub const CALIBRATION_SEGMENT_SECS: f32 = 0.04;
