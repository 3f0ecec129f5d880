use crate::config::ModemConfig;
use crate::demodulator::Reception;
use crate::error::{ModemError, Result};
use crate::fec::FecDecoder;
use crate::session::{BufferSource, CancelToken, ReceiveSession, SampleSource};
use log::info;

/// Audio to message bits: runs one receive session, then the FEC decoder
pub struct Decoder {
    config: ModemConfig,
    fec: FecDecoder,
    cancel: CancelToken,
}

impl Decoder {
    pub fn new(config: ModemConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            fec: FecDecoder::new(config.correction),
            config,
            cancel: CancelToken::new(),
        })
    }

    pub fn config(&self) -> &ModemConfig {
        &self.config
    }

    /// Token that aborts a running `receive` or `decode` from another thread
    ///
    /// A cancellation ends one session: the flag is cleared once that
    /// session returns `Cancelled`, so the decoder can be reused.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Announced length and raw transmitted bits, before correction
    pub fn receive<S: SampleSource>(&self, source: &mut S) -> Result<Reception> {
        let result = ReceiveSession::new(source, self.config.clone())?
            .with_cancel(self.cancel.clone())
            .run();
        if matches!(result, Err(ModemError::Cancelled)) {
            self.cancel.reset();
        }
        result
    }

    pub fn decode<S: SampleSource>(&self, source: &mut S) -> Result<Vec<u8>> {
        let reception = self.receive(source)?;
        let message = self.fec.decode(&reception.transmitted, reception.message_bits)?;
        info!("decoded {} message bits", message.len());
        Ok(message)
    }

    pub fn decode_samples(&self, samples: &[f32]) -> Result<Vec<u8>> {
        self.decode(&mut BufferSource::new(samples.to_vec()))
    }
}
