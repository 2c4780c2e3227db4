use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::decode::decode_base64;
use crate::error::{Error, Result};
use crate::history::{History, HistoryItem};
use crate::media::MediaStore;
use crate::speech::SpeechSource;
use crate::voice::Voice;
use crate::wav::{build_wav, AudioFormat, WavContainer};

/// Text → speech source → base64 decode → WAV, with the results kept
/// in a bounded history.
pub struct Studio<S> {
    source: S,
    format: AudioFormat,
    snippet_chars: usize,
    media: MediaStore,
    history: History,
}

impl<S: SpeechSource> Studio<S> {
    pub fn new(source: S, config: &AppConfig) -> Self {
        Self {
            source,
            format: config.audio,
            snippet_chars: config.history.snippet_chars,
            media: MediaStore::new(),
            history: History::with_prefix(config.history.capacity, &config.output.file_prefix),
        }
    }

    /// Synthesizes `text` into a standalone WAV without touching the history.
    pub fn render(&self, text: &str, voice: Voice) -> Result<WavContainer> {
        if text.trim().is_empty() {
            return Err(Error::EmptyText);
        }

        let audio = self.source.synthesize(text, voice)?;
        let pcm = decode_base64(&audio.data)?;

        let format = match audio.sample_rate() {
            Some(rate) if rate != self.format.sample_rate => {
                debug!(
                    "Speech source declared {} Hz, overriding configured {} Hz",
                    rate, self.format.sample_rate
                );
                self.format.with_sample_rate(rate)
            }
            _ => self.format,
        };

        let wav = build_wav(&pcm, &format)?;
        debug!(
            "Rendered {:.2}s of audio for {} characters",
            wav.duration_secs(),
            text.chars().count()
        );
        Ok(wav)
    }

    /// Renders `text` and records it. On failure nothing is recorded.
    pub fn generate(&mut self, text: &str, voice: Voice) -> Result<HistoryItem> {
        let wav = self.render(text, voice)?;
        let handle = self.media.register(wav);

        let item = HistoryItem::new(text, self.snippet_chars, voice, handle);
        info!("Generated {} with voice {}", item.id, voice);

        if let Some(evicted) = self.history.push(item.clone()) {
            debug!("History full, evicting {}", evicted.id);
            if !self.media.revoke(&evicted.handle) {
                warn!("Evicted entry {} had no live media", evicted.id);
            }
        }

        Ok(item)
    }

    /// Writes a history entry's audio into `dir` under its download name.
    pub fn save(&self, item: &HistoryItem, dir: &Path) -> Result<PathBuf> {
        let name = self.history.download_name(item);
        let stem = name.trim_end_matches(".wav");
        Ok(self.media.save(&item.handle, dir, stem)?)
    }

    pub fn audio(&self, item: &HistoryItem) -> Option<&WavContainer> {
        self.media.get(&item.handle)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn media(&self) -> &MediaStore {
        &self.media
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Drops every entry and releases its media.
    pub fn clear_history(&mut self) {
        for item in self.history.clear() {
            self.media.revoke(&item.handle);
        }
    }
}
