//! Text-to-speech front end: sends text to a speech model, wraps the raw
//! PCM it returns in a WAV container and keeps the latest results around
//! for playback or download.

pub mod batch;
pub mod config;
pub mod decode;
pub mod error;
pub mod history;
pub mod inspect;
pub mod media;
pub mod speech;
pub mod studio;
pub mod voice;
pub mod wav;

pub use config::AppConfig;
pub use decode::decode_base64;
pub use error::{DecodeError, Error, FormatError, Result, UpstreamError};
pub use speech::{GeminiSpeech, SpeechAudio, SpeechSource};
pub use studio::Studio;
pub use voice::Voice;
pub use wav::{build_wav, AudioFormat, WavContainer};
