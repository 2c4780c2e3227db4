use base64::{engine::general_purpose, Engine as _};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{DecodeError, Result};

/// Decodes a standard (padded) base64 string into raw bytes.
///
/// Malformed input is rejected rather than truncated.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, DecodeError> {
    let bytes = general_purpose::STANDARD.decode(encoded)?;
    debug!(encoded_len = encoded.len(), decoded_len = bytes.len(), "Decoded base64 payload");
    Ok(bytes)
}

/// `.b64` and `.txt` files carry base64 text; anything else is raw PCM.
pub fn is_base64_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("b64") | Some("txt")
    )
}

/// Reads PCM bytes from `path`, decoding base64 text files. Surrounding
/// whitespace in text files is ignored.
pub fn read_pcm_file(path: &Path) -> Result<Vec<u8>> {
    if is_base64_file(path) {
        let encoded = fs::read_to_string(path)?;
        Ok(decode_base64(encoded.trim())?)
    } else {
        let pcm = fs::read(path)?;
        debug!("Read {} raw PCM bytes from {}", pcm.len(), path.display());
        Ok(pcm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn decodes_known_group() {
        assert_eq!(decode_base64("AAAB").unwrap(), vec![0x00, 0x00, 0x01]);
    }

    #[test]
    fn padding_shortens_output() {
        assert_eq!(decode_base64("AQI=").unwrap(), vec![0x01, 0x02]);
        assert_eq!(decode_base64("AQ==").unwrap(), vec![0x01]);
        assert!(decode_base64("").unwrap().is_empty());
    }

    #[test]
    fn round_trips_reference_encoder() {
        let original: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let encoded = general_purpose::STANDARD.encode(&original);
        assert_eq!(decode_base64(&encoded).unwrap(), original);
    }

    #[test]
    fn picks_input_kind_by_extension() {
        assert!(is_base64_file(Path::new("speech.b64")));
        assert!(is_base64_file(Path::new("dir/speech.txt")));
        assert!(!is_base64_file(Path::new("speech.pcm")));
        assert!(!is_base64_file(Path::new("speech")));
    }

    #[test]
    fn reads_text_and_raw_files() {
        let dir = tempfile::tempdir().unwrap();

        let text = dir.path().join("audio.b64");
        fs::write(&text, "  AAAB\n").unwrap();
        assert_eq!(read_pcm_file(&text).unwrap(), vec![0x00, 0x00, 0x01]);

        // raw files are taken verbatim, even when they look like base64
        let raw = dir.path().join("audio.pcm");
        fs::write(&raw, "AAAB\n").unwrap();
        assert_eq!(read_pcm_file(&raw).unwrap(), b"AAAB\n".to_vec());

        let bad = dir.path().join("bad.txt");
        fs::write(&bad, "AA*B").unwrap();
        assert!(matches!(read_pcm_file(&bad), Err(Error::Decode(_))));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(decode_base64("AA*B").is_err());
        assert!(decode_base64("AAA").is_err());
        assert!(decode_base64("AAAB\n").is_err());
    }
}
