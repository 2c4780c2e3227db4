use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::speech::SpeechSource;
use crate::studio::Studio;
use crate::voice::Voice;

#[derive(Debug)]
pub struct BatchOutcome {
    pub line: usize,
    pub result: Result<PathBuf>,
}

/// Non-empty, trimmed lines with their 1-based line numbers.
pub fn read_lines(path: &Path) -> Result<Vec<(usize, String)>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim().to_string()))
        .filter(|(_, line)| !line.is_empty())
        .collect())
}

/// Renders each line to `<output_dir>/<prefix>-<line>.wav` in parallel.
/// One failing line does not stop the others.
pub fn render_lines<S: SpeechSource>(
    studio: &Studio<S>,
    lines: &[(usize, String)],
    voice: Voice,
    output_dir: &Path,
    file_prefix: &str,
    progress: ProgressBar,
) -> Result<Vec<BatchOutcome>> {
    fs::create_dir_all(output_dir)?;
    let start = Instant::now();

    progress.set_length(lines.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut outcomes: Vec<BatchOutcome> = lines
        .par_iter()
        .progress_with(progress)
        .map(|(line, text)| {
            let result = studio.render(text, voice).and_then(|wav| {
                let path = output_dir.join(format!("{}-{:04}.wav", file_prefix, line));
                fs::write(&path, wav.bytes()).map_err(Error::from)?;
                Ok(path)
            });
            if let Err(e) = &result {
                error!("Line {} failed: {}", line, e);
            }
            BatchOutcome {
                line: *line,
                result,
            }
        })
        .collect();
    outcomes.sort_by_key(|outcome| outcome.line);

    let succeeded = outcomes.iter().filter(|o| o.result.is_ok()).count();
    info!(
        "Rendered {}/{} lines in {:.2?}",
        succeeded,
        outcomes.len(),
        start.elapsed()
    );
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::error::UpstreamError;
    use crate::speech::SpeechAudio;

    struct EchoLength;

    impl SpeechSource for EchoLength {
        fn synthesize(&self, text: &str, _voice: Voice) -> Result<SpeechAudio, UpstreamError> {
            if text == "fail" {
                return Err(UpstreamError::NoAudio);
            }
            // three zero bytes per character
            let data = "AAAA".repeat(text.len());
            Ok(SpeechAudio {
                data,
                mime_type: None,
            })
        }
    }

    #[test]
    fn skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.txt");
        fs::write(&path, "first\n\n  \n second \n").unwrap();

        let lines = read_lines(&path).unwrap();
        assert_eq!(lines, vec![(1, "first".to_string()), (4, "second".to_string())]);
    }

    #[test]
    fn renders_each_line_independently() {
        let dir = tempfile::tempdir().unwrap();
        let studio = Studio::new(EchoLength, &AppConfig::default());
        let lines = vec![
            (1, "ab".to_string()),
            (2, "fail".to_string()),
            (3, "abcd".to_string()),
        ];

        let outcomes = render_lines(
            &studio,
            &lines,
            Voice::Puck,
            dir.path(),
            "take",
            ProgressBar::hidden(),
        )
        .unwrap();

        assert_eq!(outcomes.len(), 3);
        let first = outcomes[0].result.as_ref().unwrap();
        assert_eq!(first, &dir.path().join("take-0001.wav"));
        assert_eq!(fs::read(first).unwrap().len(), 44 + 6);
        assert!(outcomes[1].result.is_err());
        assert_eq!(fs::read(dir.path().join("take-0003.wav")).unwrap().len(), 44 + 12);
        assert!(studio.history().is_empty());
    }
}
