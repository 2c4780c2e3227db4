use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::error::MediaError;
use crate::wav::WavContainer;

const SCHEME: &str = "media:";

/// Ephemeral address of a registered WAV container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaHandle(String);

impl MediaHandle {
    fn generate() -> Self {
        Self(format!("{}{}", SCHEME, Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Owns every live container. Memory is held until the handle is revoked.
#[derive(Debug, Default)]
pub struct MediaStore {
    entries: HashMap<MediaHandle, WavContainer>,
}

impl MediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, container: WavContainer) -> MediaHandle {
        let handle = MediaHandle::generate();
        debug!("Registered {} ({} bytes)", handle, container.len());
        self.entries.insert(handle.clone(), container);
        handle
    }

    pub fn get(&self, handle: &MediaHandle) -> Option<&WavContainer> {
        self.entries.get(handle)
    }

    /// Releases the container behind `handle`. Returns false if it was already gone.
    pub fn revoke(&mut self, handle: &MediaHandle) -> bool {
        let released = self.entries.remove(handle).is_some();
        if released {
            debug!("Revoked {}", handle);
        }
        released
    }

    /// Writes the container to `<dir>/<stem>.wav`; a trailing `.wav` on `stem` is not doubled.
    pub fn save(
        &self,
        handle: &MediaHandle,
        dir: &Path,
        stem: &str,
    ) -> Result<PathBuf, MediaError> {
        let container = self
            .get(handle)
            .ok_or_else(|| MediaError::UnknownHandle(handle.to_string()))?;

        let path = dir.join(format!("{}.wav", stem.trim_end_matches(".wav")));
        fs::write(&path, container.bytes())?;
        debug!("Saved {} to {}", handle, path.display());
        Ok(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total bytes currently held.
    pub fn resident_bytes(&self) -> usize {
        self.entries.values().map(WavContainer::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wav::{build_wav, AudioFormat};

    fn container(len: usize) -> WavContainer {
        build_wav(&vec![0u8; len], &AudioFormat::SPEECH).unwrap()
    }

    #[test]
    fn register_then_revoke() {
        let mut store = MediaStore::new();
        let handle = store.register(container(4));
        assert!(handle.as_str().starts_with("media:"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.resident_bytes(), 48);

        assert!(store.revoke(&handle));
        assert!(!store.revoke(&handle));
        assert!(store.get(&handle).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn handles_are_unique() {
        let mut store = MediaStore::new();
        let a = store.register(container(0));
        let b = store.register(container(0));
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn save_forces_wav_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = MediaStore::new();
        let handle = store.register(container(6));

        let path = store.save(&handle, dir.path(), "clip").unwrap();
        assert_eq!(path, dir.path().join("clip.wav"));
        assert_eq!(fs::read(&path).unwrap().len(), 50);
    }

    #[test]
    fn save_after_revoke_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = MediaStore::new();
        let handle = store.register(container(2));
        store.revoke(&handle);

        assert!(matches!(
            store.save(&handle, dir.path(), "gone"),
            Err(MediaError::UnknownHandle(_))
        ));
    }
}
