use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, error};

use crate::config::SpeechConfig;
use crate::error::UpstreamError;
use crate::voice::Voice;

/// Base64 PCM audio as returned by a speech source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    pub data: String,
    pub mime_type: Option<String>,
}

impl SpeechAudio {
    /// Sample rate declared in the mime type, e.g. `audio/L16;codec=pcm;rate=24000`.
    pub fn sample_rate(&self) -> Option<u32> {
        self.mime_type
            .as_deref()?
            .split(';')
            .filter_map(|param| param.trim().split_once('='))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case("rate"))
            .and_then(|(_, value)| value.trim().parse().ok())
            .filter(|rate| *rate > 0)
    }
}

pub trait SpeechSource: Send + Sync {
    fn synthesize(&self, text: &str, voice: Voice) -> Result<SpeechAudio, UpstreamError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [TextPart<'a>; 1],
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_modalities: [&'static str; 1],
    speech_config: SpeechSettings<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechSettings<'a> {
    voice_config: VoiceConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig<'a> {
    prebuilt_voice_config: PrebuiltVoice<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoice<'a> {
    voice_name: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: Option<String>,
    data: Option<String>,
}

/// Gemini `generateContent` with audio output.
pub struct GeminiSpeech {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl GeminiSpeech {
    pub fn new(config: &SpeechConfig, api_key: Option<String>) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            api_key_env: config.api_key_env.clone(),
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl SpeechSource for GeminiSpeech {
    fn synthesize(&self, text: &str, voice: Voice) -> Result<SpeechAudio, UpstreamError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| UpstreamError::MissingCredentials(self.api_key_env.clone()))?;

        let body = GenerateRequest {
            contents: [Content {
                parts: [TextPart { text }],
            }],
            generation_config: GenerationConfig {
                response_modalities: ["AUDIO"],
                speech_config: SpeechSettings {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoice {
                            voice_name: voice.name(),
                        },
                    },
                },
            },
        };

        debug!(model = %self.model, %voice, text_len = text.len(), "Requesting speech");
        let start = Instant::now();

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            error!(status = status.as_u16(), "Speech request rejected");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let raw = response.text()?;
        let parsed: GenerateResponse = serde_json::from_str(&raw)
            .map_err(|e| UpstreamError::MalformedResponse(e.to_string()))?;

        let inline = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.inline_data)
            .ok_or(UpstreamError::NoAudio)?;

        let data = inline
            .data
            .filter(|data| !data.is_empty())
            .ok_or(UpstreamError::NoAudio)?;

        debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            encoded_len = data.len(),
            "Speech response received"
        );

        Ok(SpeechAudio {
            data,
            mime_type: inline.mime_type,
        })
    }
}
