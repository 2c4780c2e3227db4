use bytes::{BufMut, Bytes, BytesMut};
use hound::{SampleFormat, WavSpec};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::FormatError;

pub const HEADER_LEN: usize = 44;
pub const MIME_TYPE: &str = "audio/wav";

const PCM_FMT_CHUNK_LEN: u32 = 16;
const PCM_AUDIO_FORMAT: u16 = 1;

/// Layout of the PCM samples. Not derivable from the samples themselves,
/// so callers must know it out-of-band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub num_channels: u16,
    pub bits_per_sample: u16,
}

impl AudioFormat {
    /// 24 kHz mono 16-bit, the output contract of the Gemini TTS models.
    pub const SPEECH: AudioFormat = AudioFormat {
        sample_rate: 24_000,
        num_channels: 1,
        bits_per_sample: 16,
    };

    pub fn new(sample_rate: u32, num_channels: u16, bits_per_sample: u16) -> Self {
        Self {
            sample_rate,
            num_channels,
            bits_per_sample,
        }
    }

    pub fn with_sample_rate(self, sample_rate: u32) -> Self {
        Self {
            sample_rate,
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), FormatError> {
        if self.sample_rate == 0 {
            return Err(FormatError::ZeroSampleRate);
        }
        if self.num_channels == 0 {
            return Err(FormatError::ZeroChannels);
        }
        if self.bits_per_sample == 0 || self.bits_per_sample % 8 != 0 {
            return Err(FormatError::BitsPerSample(self.bits_per_sample));
        }
        Ok(())
    }

    pub fn block_align(&self) -> Result<u16, FormatError> {
        self.validate()?;
        let align = u32::from(self.num_channels) * u32::from(self.bits_per_sample) / 8;
        u16::try_from(align).map_err(|_| FormatError::Overflow {
            field: "block align",
        })
    }

    pub fn byte_rate(&self) -> Result<u32, FormatError> {
        let block_align = self.block_align()?;
        self.sample_rate
            .checked_mul(u32::from(block_align))
            .ok_or(FormatError::Overflow { field: "byte rate" })
    }

    /// The matching `hound` spec, for reading containers back.
    pub fn spec(&self) -> WavSpec {
        WavSpec {
            channels: self.num_channels,
            sample_rate: self.sample_rate,
            bits_per_sample: self.bits_per_sample,
            sample_format: SampleFormat::Int,
        }
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::SPEECH
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Hz, {} ch, {}-bit",
            self.sample_rate, self.num_channels, self.bits_per_sample
        )
    }
}

/// Builds the canonical 44-byte PCM header for `data_len` bytes of samples.
pub fn wav_header(data_len: usize, format: &AudioFormat) -> Result<Bytes, FormatError> {
    let block_align = format.block_align()?;
    let byte_rate = format.byte_rate()?;
    let data_len = u32::try_from(data_len)
        .ok()
        .filter(|len| len.checked_add(36).is_some())
        .ok_or(FormatError::DataTooLarge(data_len))?;

    let mut header = BytesMut::with_capacity(HEADER_LEN);

    // RIFF chunk
    header.put_slice(b"RIFF");
    header.put_u32_le(36 + data_len);
    header.put_slice(b"WAVE");

    // fmt chunk
    header.put_slice(b"fmt ");
    header.put_u32_le(PCM_FMT_CHUNK_LEN);
    header.put_u16_le(PCM_AUDIO_FORMAT);
    header.put_u16_le(format.num_channels);
    header.put_u32_le(format.sample_rate);
    header.put_u32_le(byte_rate);
    header.put_u16_le(block_align);
    header.put_u16_le(format.bits_per_sample);

    // data chunk
    header.put_slice(b"data");
    header.put_u32_le(data_len);

    debug_assert_eq!(header.len(), HEADER_LEN);
    Ok(header.freeze())
}

/// Wraps raw PCM bytes in a WAV container. Nothing is allocated for the
/// output until the header has been validated.
pub fn build_wav(pcm: &[u8], format: &AudioFormat) -> Result<WavContainer, FormatError> {
    debug!("Wrapping {} PCM bytes as WAV ({})", pcm.len(), format);
    let header = wav_header(pcm.len(), format)?;

    let mut wav = BytesMut::with_capacity(HEADER_LEN + pcm.len());
    wav.put_slice(&header);
    wav.put_slice(pcm);

    debug!("Finished WAV container of {} bytes", wav.len());
    Ok(WavContainer {
        bytes: wav.freeze(),
        format: *format,
    })
}

/// A complete, immutable WAV file. Cloning shares the underlying buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavContainer {
    bytes: Bytes,
    format: AudioFormat,
}

impl WavContainer {
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn mime_type(&self) -> &'static str {
        MIME_TYPE
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn header(&self) -> &[u8] {
        &self.bytes[..HEADER_LEN]
    }

    pub fn pcm(&self) -> &[u8] {
        &self.bytes[HEADER_LEN..]
    }

    /// Playback length implied by the header.
    pub fn duration_secs(&self) -> f64 {
        match self.format.byte_rate() {
            Ok(rate) => self.pcm().len() as f64 / f64::from(rate),
            Err(_) => 0.0,
        }
    }
}

impl AsRef<[u8]> for WavContainer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
