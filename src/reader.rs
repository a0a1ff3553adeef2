//! Encoding-aware file reading.
//!
//! Files are decoded as strict UTF-8 first. When that fails, the first
//! kilobyte is sampled to guess an encoding and the whole file is decoded
//! again, still strictly. Nothing is ever replaced with U+FFFD.

use crate::error::{Error, Result};
use crate::file::PROBE_SIZE;
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Reads a file as text, falling back to a detected encoding.
///
/// # Errors
///
/// Returns [`Error::PermissionDenied`], [`Error::NotFound`] or [`Error::Io`]
/// if the file cannot be read, and [`Error::Undecodable`] if neither UTF-8 nor
/// the detected encoding can decode it without loss.
pub fn read_file_safe(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;

    let bytes = match String::from_utf8(bytes) {
        Ok(text) => return Ok(text),
        Err(e) => e.into_bytes(),
    };

    let sample = &bytes[..bytes.len().min(PROBE_SIZE)];
    let encoding = detect_encoding(sample, sample.len() == bytes.len());
    debug!(
        "{} is not valid UTF-8, retrying as {}",
        path.display(),
        encoding.name()
    );

    decode_strict(&bytes, encoding).ok_or_else(|| Error::undecodable(path, encoding.name()))
}

/// Guesses the encoding of a byte sample.
///
/// A byte-order mark wins outright. Otherwise the statistical detector picks
/// the most probable legacy encoding; UTF-8 is not offered as a guess because
/// callers only get here after UTF-8 has already failed. `complete` tells the
/// detector whether `sample` is the whole file.
#[must_use]
pub fn detect_encoding(sample: &[u8], complete: bool) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(sample) {
        return encoding;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(sample, complete);
    detector.guess(None, false)
}

/// Decodes `bytes` with `encoding`, failing on any malformed sequence.
///
/// A leading byte-order mark matching `encoding` is stripped.
#[must_use]
pub fn decode_strict(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    let body = match Encoding::for_bom(bytes) {
        Some((bom_encoding, bom_len)) if bom_encoding == encoding => &bytes[bom_len..],
        _ => bytes,
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(Cow::into_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use encoding_rs::{UTF_16LE, UTF_8, WINDOWS_1252};

    #[test]
    fn test_reads_utf8() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("hello.py");
        file.write_str("print(\"héllo\")\n").unwrap();

        assert_eq!(read_file_safe(file.path()).unwrap(), "print(\"héllo\")\n");
    }

    #[test]
    fn test_falls_back_to_detected_single_byte_encoding() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("latin.txt");
        let text = "Le café est très bon à Paris, même en été. Voilà pourquoi.";
        let (encoded, _, _) = WINDOWS_1252.encode(text);
        file.write_binary(&encoded).unwrap();

        let content = read_file_safe(file.path()).unwrap();
        assert!(content.contains("Paris"));
        assert_eq!(content.chars().count(), text.chars().count());
    }

    #[test]
    fn test_falls_back_to_utf16_with_bom() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("wide.txt");
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "hi there".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        file.write_binary(&bytes).unwrap();

        assert_eq!(read_file_safe(file.path()).unwrap(), "hi there");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let temp = assert_fs::TempDir::new().unwrap();
        let err = read_file_safe(&temp.path().join("gone.rs")).unwrap_err();

        assert!(matches!(err, Error::NotFound { .. }));
        assert!(err.to_string().contains("gone.rs"));
    }

    #[cfg(unix)]
    #[test]
    fn test_permission_denied() {
        use std::os::unix::fs::PermissionsExt;

        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("secret.txt");
        file.write_str("top secret").unwrap();
        fs::set_permissions(file.path(), fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can read the file regardless of its mode.
        if fs::read(file.path()).is_ok() {
            return;
        }

        let err = read_file_safe(file.path()).unwrap_err();
        assert!(matches!(err, Error::PermissionDenied { .. }));
        assert!(err.to_string().contains("secret.txt"));
    }

    #[test]
    fn test_detect_encoding_prefers_bom() {
        assert_eq!(detect_encoding(&[0xFF, 0xFE, b'a', 0], true), UTF_16LE);
        assert_eq!(detect_encoding(&[0xEF, 0xBB, 0xBF, b'a'], true), UTF_8);
    }

    #[test]
    fn test_detect_encoding_never_guesses_utf8_without_bom() {
        assert_ne!(detect_encoding(b"caf\xe9 au lait", true), UTF_8);
    }

    #[test]
    fn test_decode_strict_rejects_malformed_input() {
        assert_eq!(decode_strict(b"ok \xFF", UTF_8), None);
        assert_eq!(decode_strict(b"plain", UTF_8).as_deref(), Some("plain"));
    }

    #[test]
    fn test_decode_strict_strips_matching_bom() {
        let bytes = [0xFF, 0xFE, b'o', 0, b'k', 0];
        assert_eq!(decode_strict(&bytes, UTF_16LE).as_deref(), Some("ok"));
    }
}
