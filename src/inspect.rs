use hound::WavReader;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::Result;

/// One-line summary of a WAV file's format, as read by `hound`.
pub fn wav_metadata(file_path: &Path) -> Result<String, hound::Error> {
    let reader = WavReader::open(file_path)?;
    let spec = reader.spec();
    let frames = reader.duration();
    let seconds = f64::from(frames) / f64::from(spec.sample_rate.max(1));
    Ok(format!(
        "{} | {} Hz | {}-bit | {} ch | {} frames | {:.3}s",
        file_path.display(),
        spec.sample_rate,
        spec.bits_per_sample,
        spec.channels,
        frames,
        seconds
    ))
}

fn read_metadata_file(metadata_file: &Path) -> io::Result<HashSet<String>> {
    let file = match File::open(metadata_file) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HashSet::new()),
        Err(e) => return Err(e),
    };
    let reader = BufReader::new(file);
    Ok(reader.lines().map_while(|line| line.ok()).collect())
}

fn append_metadata(metadata_file: &Path, line: &str) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(metadata_file)?;
    writeln!(file, "{}", line)
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InspectReport {
    pub written: usize,
    pub skipped: usize,
    pub unreadable: usize,
}

/// Appends metadata for every `.wav` in `wav_directory` to `metadata_file`,
/// skipping lines that are already there.
pub fn inspect_directory(wav_directory: &Path, metadata_file: &Path) -> Result<InspectReport> {
    let existing = read_metadata_file(metadata_file)?;
    let mut report = InspectReport::default();

    let mut paths: Vec<_> = fs::read_dir(wav_directory)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("wav")
        })
        .collect();
    paths.sort();

    for path in paths {
        let metadata = match wav_metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Skipping unreadable {}: {}", path.display(), e);
                report.unreadable += 1;
                continue;
            }
        };

        if existing.contains(&metadata) {
            debug!("Metadata already exists for: {}", path.display());
            report.skipped += 1;
        } else {
            append_metadata(metadata_file, &metadata)?;
            info!("New metadata written for: {}", path.display());
            report.written += 1;
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wav::{build_wav, AudioFormat};

    fn write_wav(dir: &Path, name: &str, pcm_len: usize, format: AudioFormat) {
        let wav = build_wav(&vec![0u8; pcm_len], &format).unwrap();
        fs::write(dir.join(name), wav.bytes()).unwrap();
    }

    #[test]
    fn describes_generated_file() {
        let dir = tempfile::tempdir().unwrap();
        write_wav(dir.path(), "a.wav", 48_000, AudioFormat::SPEECH);

        let line = wav_metadata(&dir.path().join("a.wav")).unwrap();
        assert!(line.contains("24000 Hz | 16-bit | 1 ch | 24000 frames | 1.000s"));
    }

    #[test]
    fn appends_only_new_entries() {
        let dir = tempfile::tempdir().unwrap();
        let wavs = dir.path().join("wavs");
        fs::create_dir(&wavs).unwrap();
        write_wav(&wavs, "a.wav", 4, AudioFormat::SPEECH);
        write_wav(&wavs, "b.wav", 8, AudioFormat::new(44_100, 2, 16));
        fs::write(wavs.join("notes.txt"), "ignored").unwrap();
        fs::write(wavs.join("broken.wav"), "not a wav").unwrap();
        let metadata = dir.path().join("metadata.txt");

        let first = inspect_directory(&wavs, &metadata).unwrap();
        assert_eq!(
            first,
            InspectReport {
                written: 2,
                skipped: 0,
                unreadable: 1
            }
        );

        let second = inspect_directory(&wavs, &metadata).unwrap();
        assert_eq!(second.written, 0);
        assert_eq!(second.skipped, 2);
        assert_eq!(fs::read_to_string(&metadata).unwrap().lines().count(), 2);
    }
}
