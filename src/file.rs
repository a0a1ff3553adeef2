use crate::error::Error;
use crate::language::language_for_path;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Number of leading bytes inspected by the content probe.
pub(crate) const PROBE_SIZE: usize = 1024;

static BINARY_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "exe", "dll", "so", "dylib", "a", "o", "obj", "png", "jpg", "jpeg", "gif", "bmp", "ico",
        "webp", "mp3", "mp4", "avi", "mkv", "mov", "wav", "flac", "pdf", "doc", "docx", "xls",
        "xlsx", "ppt", "pptx", "zip", "tar", "gz", "bz2", "xz", "7z", "rar", "wasm", "pyc",
        "class",
    ]
    .into_iter()
    .collect()
});

/// A file that made it through filtering and reading, ready to be rendered.
#[derive(Debug, Clone)]
pub struct FileData {
    /// Path to the file as produced by the walk
    pub absolute_path: PathBuf,

    /// Relative path from the root directory, `/` separated
    pub relative_path: String,

    /// Language label for the code fence
    pub language: &'static str,

    /// Decoded text content
    pub content: String,
}

impl FileData {
    /// Creates file data, deriving the language from the path's extension.
    #[must_use]
    pub fn new(absolute_path: PathBuf, relative_path: String, content: String) -> Self {
        let language = language_for_path(&absolute_path);
        Self {
            absolute_path,
            relative_path,
            language,
            content,
        }
    }
}

/// A candidate that could not be read, kept for reporting.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    /// Path of the unreadable file
    pub path: PathBuf,

    /// Why it could not be read
    pub error: Error,
}

/// Outcome of probing a candidate file.
#[derive(Debug)]
pub enum TextProbe {
    /// Treated as text
    Text,
    /// Known binary extension or NUL byte in the probe window
    Binary,
    /// The probe itself failed
    Unreadable(std::io::Error),
}

/// Classifies a file as text or binary.
///
/// # Algorithm
///
/// 1. Known binary extensions are binary without touching the file
/// 2. Otherwise the first 1024 bytes are read
/// 3. A NUL byte anywhere in that prefix means binary
///
/// An IO error while probing is reported as [`TextProbe::Unreadable`]; callers
/// treat it as excluded rather than failing the run.
#[must_use]
pub fn probe(path: &Path) -> TextProbe {
    if has_binary_extension(path) {
        trace!("Binary by extension: {}", path.display());
        return TextProbe::Binary;
    }

    match probe_for_nul(path) {
        Ok(true) => {
            trace!("Binary by content: {}", path.display());
            TextProbe::Binary
        }
        Ok(false) => TextProbe::Text,
        Err(e) => TextProbe::Unreadable(e),
    }
}

/// Returns true if [`probe`] classifies the file as text.
///
/// Binary files and files that cannot be probed both return false.
#[must_use]
pub fn is_text_file(path: &Path) -> bool {
    matches!(probe(path), TextProbe::Text)
}

/// Reads up to [`PROBE_SIZE`] bytes and reports whether a NUL byte occurs.
fn probe_for_nul(path: &Path) -> std::io::Result<bool> {
    let mut buffer = Vec::with_capacity(PROBE_SIZE);
    File::open(path)?
        .take(PROBE_SIZE as u64)
        .read_to_end(&mut buffer)?;

    Ok(memchr::memchr(0, &buffer).is_some())
}

/// Checks if a file extension suggests a binary file.
#[must_use]
pub fn has_binary_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| BINARY_EXTENSIONS.contains(ext.to_ascii_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_file_data_language() {
        let data = FileData::new(
            PathBuf::from("/repo/src/main.rs"),
            "src/main.rs".to_string(),
            "fn main() {}\n".to_string(),
        );

        assert_eq!(data.language, "rust");
        assert_eq!(data.relative_path, "src/main.rs");
    }

    #[test]
    fn test_file_data_unknown_extension() {
        let data = FileData::new(
            PathBuf::from("LICENSE"),
            "LICENSE".to_string(),
            "MIT".to_string(),
        );

        assert_eq!(data.language, "text");
    }

    #[test]
    fn test_text_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("test.txt");
        file.write_str("Hello, world!").unwrap();

        assert!(is_text_file(file.path()));
    }

    #[test]
    fn test_nul_byte_means_binary() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("data.txt");
        file.write_binary(b"abc\0def").unwrap();

        assert!(!is_text_file(file.path()));
    }

    #[test]
    fn test_nul_after_probe_window_is_ignored() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("late.txt");
        let mut bytes = vec![b'a'; PROBE_SIZE];
        bytes.push(0);
        file.write_binary(&bytes).unwrap();

        assert!(is_text_file(file.path()));
    }

    #[test]
    fn test_empty_file_is_text() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("empty.txt");
        file.touch().unwrap();

        assert!(is_text_file(file.path()));
    }

    #[test]
    fn test_binary_extension_skips_probe() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("image.png");
        file.write_str("definitely text").unwrap();

        assert!(!is_text_file(file.path()));
    }

    #[test]
    fn test_missing_file_is_not_text() {
        let temp = assert_fs::TempDir::new().unwrap();
        let path = temp.path().join("vanished.rs");

        assert!(!is_text_file(&path));
        assert!(matches!(probe(&path), TextProbe::Unreadable(_)));
    }

    #[test]
    fn test_probe_outcomes() {
        let temp = assert_fs::TempDir::new().unwrap();
        let text = temp.child("a.rs");
        text.write_str("fn a() {}").unwrap();
        let binary = temp.child("a.bin");
        binary.write_binary(&[0, 1, 2]).unwrap();

        assert!(matches!(probe(text.path()), TextProbe::Text));
        assert!(matches!(probe(binary.path()), TextProbe::Binary));
    }

    #[test]
    fn test_has_binary_extension() {
        assert!(has_binary_extension(Path::new("app.exe")));
        assert!(has_binary_extension(Path::new("image.PNG")));
        assert!(has_binary_extension(Path::new("archive.zip")));
        assert!(!has_binary_extension(Path::new("code.rs")));
        assert!(!has_binary_extension(Path::new("no_extension")));
    }
}
