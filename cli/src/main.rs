use clap::{ArgGroup, Parser};
use log::info;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tonelink_core::framing::length_preamble;
use tonelink_core::{format_bits, inject_bit_errors, ModemConfig};
use tonelink_core::{Decoder, Encoder, FecDecoder};

mod error;
mod prompt;
mod settings;
mod wav;

use error::CliError;
use prompt::Prompter;
use settings::{ConfigFile, Correction, Overrides};

#[derive(Parser)]
#[command(name = "tonelink")]
#[command(about = "Send and receive short bit strings as FSK audio")]
#[command(group(ArgGroup::new("mode").required(true).args(["send", "recv"])))]
struct Cli {
    /// Prompt for a message and write its transmission to the WAV file
    #[arg(long)]
    send: bool,

    /// Decode a transmission from the WAV file
    #[arg(long)]
    recv: bool,

    /// WAV file written by --send and read by --recv
    #[arg(long, value_name = "FILE.WAV", default_value = "transmission.wav")]
    wav: PathBuf,

    /// Number of data tones (power of two)
    #[arg(long, value_name = "M")]
    tones: Option<usize>,

    /// Seconds per data tone and per marker tone
    #[arg(long, value_name = "SECONDS")]
    tone_duration: Option<f32>,

    #[arg(long, value_name = "HZ")]
    sample_rate: Option<u32>,

    /// Bit errors correctable per frame
    #[arg(long, value_enum)]
    correction: Option<Correction>,

    /// JSON file overriding configuration defaults
    #[arg(long, value_name = "FILE.JSON")]
    config: Option<PathBuf>,

    /// Print the received result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct ReceiveReport {
    message: String,
    message_bits: usize,
    transmitted: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let file = cli.config.as_deref().map(ConfigFile::load).transpose()?;
    let overrides = Overrides {
        tones: cli.tones,
        tone_duration: cli.tone_duration,
        sample_rate: cli.sample_rate,
        correction: cli.correction,
    };
    let config = settings::resolve(file.as_ref(), &overrides)?;

    if cli.send {
        send_command(&cli.wav, config)?;
    } else {
        recv_command(&cli.wav, config, cli.json)?;
    }
    Ok(())
}

fn send_command(wav_path: &Path, config: ModemConfig) -> Result<(), CliError> {
    let stdin = io::stdin();
    let request = Prompter::new(stdin.lock(), io::stdout()).send_request()?;

    let encoder = Encoder::new(config)?;
    let codeword = encoder.codeword(&request.message)?;
    println!("Codeword: {}", format_bits(&codeword));

    let mut corrupted = codeword.clone();
    let positions = inject_bit_errors(&mut corrupted, &request.error_fractions)?;
    if !positions.is_empty() {
        info!("flipped bits at {:?}", positions);
    }
    println!("Corrupted codeword: {}", format_bits(&corrupted));

    let preamble = length_preamble(request.message.len())?;
    println!("Preamble: {}", format_bits(&preamble));
    println!(
        "Transmission: {}{}",
        format_bits(&preamble),
        format_bits(&corrupted)
    );

    let samples = encoder.encode_codeword(request.message.len(), &corrupted)?;
    wav::write_wav(wav_path, &samples, encoder.config().sample_rate)?;
    println!(
        "Wrote {} samples ({:.2} s) to {}",
        samples.len(),
        samples.len() as f32 / encoder.config().sample_rate as f32,
        wav_path.display()
    );
    Ok(())
}

fn recv_command(wav_path: &Path, config: ModemConfig, json: bool) -> Result<(), CliError> {
    let (samples, sample_rate) = wav::read_wav(wav_path)?;
    if sample_rate != config.sample_rate {
        return Err(CliError::SampleRateMismatch {
            expected: config.sample_rate,
            found: sample_rate,
        });
    }
    info!("read {} samples from {}", samples.len(), wav_path.display());

    let fec = FecDecoder::new(config.correction);
    let decoder = Decoder::new(config)?;
    let reception = decoder.receive(&mut tonelink_core::BufferSource::new(samples))?;
    let message = fec.decode(&reception.transmitted, reception.message_bits)?;

    if json {
        let report = ReceiveReport {
            message: format_bits(&message),
            message_bits: reception.message_bits,
            transmitted: format_bits(&reception.transmitted),
        };
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("Received transmission: {}", format_bits(&reception.transmitted));
        println!("Message: {}", format_bits(&message));
    }
    Ok(())
}
