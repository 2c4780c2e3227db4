use chrono::{DateTime, Local, Utc};
use std::collections::VecDeque;
use uuid::Uuid;

use crate::media::MediaHandle;
use crate::voice::Voice;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItem {
    pub id: Uuid,
    /// Possibly shortened copy of the submitted text.
    pub text: String,
    pub voice: Voice,
    pub handle: MediaHandle,
    pub timestamp: DateTime<Utc>,
}

impl HistoryItem {
    pub fn new(text: &str, snippet_chars: usize, voice: Voice, handle: MediaHandle) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: snippet(text, snippet_chars),
            voice,
            handle,
            timestamp: Utc::now(),
        }
    }

    /// Local wall-clock time, `HH:MM`.
    pub fn time_label(&self) -> String {
        self.timestamp.with_timezone(&Local).format("%H:%M").to_string()
    }
}

/// First `max_chars` characters of `text`, with `...` appended when cut.
pub fn snippet(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Most recent generations, newest first. Bounded; the oldest entry is
/// handed back on overflow so its media can be released.
#[derive(Debug)]
pub struct History {
    items: VecDeque<HistoryItem>,
    capacity: usize,
    file_prefix: String,
}

impl History {
    pub const DEFAULT_CAPACITY: usize = 20;

    pub fn new(capacity: usize) -> Self {
        Self::with_prefix(capacity, "echomuse")
    }

    pub fn with_prefix(capacity: usize, file_prefix: &str) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity.min(Self::DEFAULT_CAPACITY) + 1),
            capacity,
            file_prefix: file_prefix.to_string(),
        }
    }

    pub fn push(&mut self, item: HistoryItem) -> Option<HistoryItem> {
        self.items.push_front(item);
        if self.items.len() > self.capacity {
            self.items.pop_back()
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryItem> {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&HistoryItem> {
        self.items.front()
    }

    pub fn get(&self, id: Uuid) -> Option<&HistoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// File name offered when saving an entry.
    pub fn download_name(&self, item: &HistoryItem) -> String {
        format!("{}-{}.wav", self.file_prefix, item.id)
    }

    /// Empties the history, returning the entries so their media can be released.
    pub fn clear(&mut self) -> Vec<HistoryItem> {
        self.items.drain(..).collect()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaStore;
    use crate::wav::{build_wav, AudioFormat};

    fn item(store: &mut MediaStore, text: &str) -> HistoryItem {
        let handle = store.register(build_wav(&[], &AudioFormat::SPEECH).unwrap());
        HistoryItem::new(text, 50, Voice::Puck, handle)
    }

    #[test]
    fn snippet_truncates_long_text() {
        let long = "a".repeat(60);
        assert_eq!(snippet(&long, 50), format!("{}...", "a".repeat(50)));
        assert_eq!(snippet(&"b".repeat(50), 50), "b".repeat(50));
        assert_eq!(snippet("hola", 50), "hola");
    }

    #[test]
    fn snippet_respects_char_boundaries() {
        assert_eq!(snippet("ñandú feliz", 5), "ñandú...");
    }

    #[test]
    fn newest_first() {
        let mut store = MediaStore::new();
        let mut history = History::new(3);
        history.push(item(&mut store, "one"));
        history.push(item(&mut store, "two"));

        let texts: Vec<&str> = history.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, ["two", "one"]);
        assert_eq!(history.latest().unwrap().text, "two");
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let mut store = MediaStore::new();
        let mut history = History::default();
        assert_eq!(history.capacity(), 20);

        for n in 0..20 {
            assert!(history.push(item(&mut store, &n.to_string())).is_none());
        }
        let evicted = history.push(item(&mut store, "20")).unwrap();

        assert_eq!(evicted.text, "0");
        assert_eq!(history.len(), 20);
        assert_eq!(history.latest().unwrap().text, "20");
        assert_eq!(history.iter().last().unwrap().text, "1");
    }

    #[test]
    fn download_name_uses_id() {
        let mut store = MediaStore::new();
        let history = History::default();
        let entry = item(&mut store, "x");
        assert_eq!(
            history.download_name(&entry),
            format!("echomuse-{}.wav", entry.id)
        );
    }

    #[test]
    fn huge_capacity_does_not_preallocate() {
        let mut store = MediaStore::new();
        let mut history = History::new(usize::MAX);
        assert_eq!(history.capacity(), usize::MAX);
        assert!(history.push(item(&mut store, "only")).is_none());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn time_label_is_hours_and_minutes() {
        let mut store = MediaStore::new();
        let label = item(&mut store, "t").time_label();
        assert_eq!(label.len(), 5);
        assert_eq!(&label[2..3], ":");
    }

    #[test]
    fn clear_returns_everything() {
        let mut store = MediaStore::new();
        let mut history = History::new(5);
        let first = item(&mut store, "a");
        let id = first.id;
        history.push(first);
        history.push(item(&mut store, "b"));

        assert!(history.get(id).is_some());
        assert_eq!(history.clear().len(), 2);
        assert!(history.is_empty());
        assert!(history.get(id).is_none());
    }
}
