use thiserror::Error;

/// Malformed base64 input.
#[derive(Debug, Error)]
#[error("invalid base64 payload: {0}")]
pub struct DecodeError(#[from] base64::DecodeError);

/// An audio format descriptor that cannot produce a valid WAV header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("sample rate must be positive")]
    ZeroSampleRate,

    #[error("channel count must be positive")]
    ZeroChannels,

    #[error("bits per sample must be a positive multiple of 8, got {0}")]
    BitsPerSample(u16),

    #[error("{field} overflows its header field")]
    Overflow { field: &'static str },

    #[error("PCM payload of {0} bytes does not fit in a RIFF chunk")]
    DataTooLarge(usize),
}

/// The speech source failed or returned nothing playable.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("API key is not configured (set {0})")]
    MissingCredentials(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("speech API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("no audio content was generated in the response")]
    NoAudio,
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("unknown or released media handle: {0}")]
    UnknownHandle(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("text to synthesize is empty")]
    EmptyText,

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
