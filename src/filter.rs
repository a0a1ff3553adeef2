//! Path exclusion rules.
//!
//! An [`ExclusionConfig`] is assembled once from user input and compiled into
//! an [`ExclusionFilter`], which answers accept/reject for each candidate
//! path produced by the walk.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Component, Path};
use std::sync::Arc;

/// Default maximum file size (1 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

const RECOMMENDED_DIRECTORIES: &[&str] = &[
    ".git",
    ".venv",
    "__pycache__",
    ".pytest_cache",
    "node_modules",
    "build",
    "dist",
    "target",
];

const RECOMMENDED_EXTENSIONS: &[&str] = &[
    ".pyc", ".so", ".dll", ".exe", ".bin", ".jpeg", ".mp4", ".dat", ".jpg", ".png", ".gif",
    ".pdf", ".zip", ".gz",
];

/// User supplied rules controlling which paths are skipped.
///
/// Directory and file names are compared verbatim. Extensions are stored
/// lower-cased with a leading dot, whatever form they were given in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionConfig {
    excluded_dirs: BTreeSet<String>,
    excluded_files: BTreeSet<String>,
    excluded_extensions: BTreeSet<String>,
    exclude_hidden: bool,
    max_file_size: u64,
}

impl Default for ExclusionConfig {
    fn default() -> Self {
        Self {
            excluded_dirs: BTreeSet::new(),
            excluded_files: BTreeSet::new(),
            excluded_extensions: BTreeSet::new(),
            exclude_hidden: true,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl ExclusionConfig {
    /// Creates a configuration with no name exclusions, hidden paths excluded
    /// and a 1 MiB size limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration that also skips common VCS, virtualenv and
    /// build output directories plus common artifact extensions.
    #[must_use]
    pub fn recommended() -> Self {
        Self::default()
            .exclude_dirs(RECOMMENDED_DIRECTORIES.iter().copied())
            .exclude_extensions(RECOMMENDED_EXTENSIONS.iter().copied())
    }

    /// Adds directory names to the exclusion set.
    #[must_use]
    pub fn exclude_dirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_dirs.extend(non_empty(names));
        self
    }

    /// Adds file names to the exclusion set.
    #[must_use]
    pub fn exclude_files<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_files.extend(non_empty(names));
        self
    }

    /// Adds extensions to the exclusion set.
    ///
    /// `"PY"`, `"py"` and `".py"` are all stored as `".py"`.
    #[must_use]
    pub fn exclude_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_extensions.extend(
            extensions
                .into_iter()
                .filter_map(|ext| normalize_extension(&Into::<String>::into(ext))),
        );
        self
    }

    /// Sets whether paths with a dot-prefixed component are skipped.
    #[must_use]
    pub const fn exclude_hidden(mut self, enabled: bool) -> Self {
        self.exclude_hidden = enabled;
        self
    }

    /// Sets the largest file size, in bytes, that is still included.
    #[must_use]
    pub const fn max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Excluded directory names.
    #[must_use]
    pub const fn excluded_dirs(&self) -> &BTreeSet<String> {
        &self.excluded_dirs
    }

    /// Excluded file names.
    #[must_use]
    pub const fn excluded_files(&self) -> &BTreeSet<String> {
        &self.excluded_files
    }

    /// Excluded extensions, lower-cased with a leading dot.
    #[must_use]
    pub const fn excluded_extensions(&self) -> &BTreeSet<String> {
        &self.excluded_extensions
    }

    /// Whether hidden paths are skipped.
    #[must_use]
    pub const fn excludes_hidden(&self) -> bool {
        self.exclude_hidden
    }

    /// Largest included file size in bytes.
    #[must_use]
    pub const fn size_limit(&self) -> u64 {
        self.max_file_size
    }
}

fn non_empty<I, S>(names: I) -> impl Iterator<Item = String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names
        .into_iter()
        .map(Into::into)
        .filter(|name| !name.trim().is_empty())
}

fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_lowercase()))
}

/// Reason a candidate path was filtered out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Size could not be determined
    SizeUnknown,
    /// Larger than the configured maximum
    TooLarge {
        /// Actual size in bytes
        size: u64,
        /// Configured maximum in bytes
        limit: u64,
    },
    /// Directory, dangling symlink or special file
    NotAFile,
    /// Some component starts with a dot
    Hidden,
    /// Some component is an excluded directory name
    ExcludedDirectory(String),
    /// File name is excluded
    ExcludedFile(String),
    /// Extension is excluded
    ExcludedExtension(String),
    /// Classified as binary
    Binary,
    /// Content probe failed
    Unreadable,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeUnknown => write!(f, "size unknown"),
            Self::TooLarge { size, limit } => write!(f, "{size} bytes exceeds {limit}"),
            Self::NotAFile => write!(f, "not a regular file"),
            Self::Hidden => write!(f, "hidden"),
            Self::ExcludedDirectory(name) => write!(f, "inside excluded directory '{name}'"),
            Self::ExcludedFile(name) => write!(f, "excluded file '{name}'"),
            Self::ExcludedExtension(ext) => write!(f, "excluded extension '{ext}'"),
            Self::Binary => write!(f, "binary"),
            Self::Unreadable => write!(f, "unreadable"),
        }
    }
}

/// Compiled exclusion rules, cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
    config: Arc<ExclusionConfig>,
}

impl ExclusionFilter {
    /// Creates a filter from configuration.
    #[must_use]
    pub fn new(config: ExclusionConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns the underlying configuration.
    #[must_use]
    pub fn config(&self) -> &ExclusionConfig {
        &self.config
    }

    /// Returns true if the candidate passes every exclusion rule.
    #[must_use]
    pub fn should_process(&self, path: &Path, relative: &Path) -> bool {
        self.evaluate(path, relative).is_none()
    }

    /// Evaluates a candidate against the rules, returning the first rejection.
    ///
    /// `path` is used for filesystem access, `relative` (the path below the
    /// walk root) for the name based rules. Rules run in order: size,
    /// regular-file, hidden, directory, file name, extension.
    #[must_use]
    pub fn evaluate(&self, path: &Path, relative: &Path) -> Option<Rejection> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(_) => return Some(Rejection::SizeUnknown),
        };

        if metadata.len() > self.config.max_file_size {
            return Some(Rejection::TooLarge {
                size: metadata.len(),
                limit: self.config.max_file_size,
            });
        }

        if !metadata.is_file() {
            return Some(Rejection::NotAFile);
        }

        self.evaluate_names(relative)
    }

    /// Applies the name based rules only: hidden, directory, file, extension.
    #[must_use]
    pub fn evaluate_names(&self, relative: &Path) -> Option<Rejection> {
        let names: Vec<_> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        if self.config.exclude_hidden && names.iter().any(|name| name.starts_with('.')) {
            return Some(Rejection::Hidden);
        }

        if let Some(dir) = names
            .iter()
            .find(|name| self.config.excluded_dirs.contains(*name))
        {
            return Some(Rejection::ExcludedDirectory(dir.clone()));
        }

        if let Some(file_name) = names.last() {
            if self.config.excluded_files.contains(file_name) {
                return Some(Rejection::ExcludedFile(file_name.clone()));
            }
        }

        if let Some(ext) = relative
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        {
            if self.config.excluded_extensions.contains(&ext) {
                return Some(Rejection::ExcludedExtension(ext));
            }
        }

        None
    }

    /// Returns true if a directory's whole subtree can be skipped.
    ///
    /// Only the last component is checked; ancestors were already pruned
    /// when they were visited.
    #[must_use]
    pub fn prunes_directory(&self, relative: &Path) -> bool {
        let Some(name) = relative.file_name().map(|n| n.to_string_lossy()) else {
            return false;
        };

        (self.config.exclude_hidden && name.starts_with('.'))
            || self.config.excluded_dirs.contains(&*name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    fn filter(config: ExclusionConfig) -> ExclusionFilter {
        ExclusionFilter::new(config)
    }

    #[test]
    fn test_default_config() {
        let config = ExclusionConfig::default();
        assert!(config.excludes_hidden());
        assert_eq!(config.size_limit(), DEFAULT_MAX_FILE_SIZE);
        assert!(config.excluded_dirs().is_empty());
    }

    #[test]
    fn test_extensions_are_normalized() {
        let config = ExclusionConfig::new().exclude_extensions(["PY", ".Md", " txt ", "", "."]);

        let expected: BTreeSet<String> = [".py", ".md", ".txt"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(config.excluded_extensions(), &expected);
    }

    #[test]
    fn test_exclusions_are_additive() {
        let config = ExclusionConfig::new()
            .exclude_dirs(["target"])
            .exclude_dirs(["node_modules", ""]);

        assert_eq!(config.excluded_dirs().len(), 2);
    }

    #[test]
    fn test_recommended_preset() {
        let config = ExclusionConfig::recommended();
        assert!(config.excluded_dirs().contains("node_modules"));
        assert!(config.excluded_dirs().contains(".git"));
        assert!(config.excluded_extensions().contains(".pyc"));
        assert!(config.excludes_hidden());
    }

    #[test]
    fn test_hidden_rule() {
        let f = filter(ExclusionConfig::default());
        assert_eq!(
            f.evaluate_names(Path::new(".hidden/c.txt")),
            Some(Rejection::Hidden)
        );
        assert_eq!(f.evaluate_names(Path::new("src/.env")), Some(Rejection::Hidden));
        assert_eq!(f.evaluate_names(Path::new("src/main.rs")), None);

        let f = filter(ExclusionConfig::default().exclude_hidden(false));
        assert_eq!(f.evaluate_names(Path::new(".hidden/c.txt")), None);
    }

    #[test]
    fn test_directory_rule_matches_any_component() {
        let f = filter(ExclusionConfig::new().exclude_dirs(["build"]));

        assert_eq!(
            f.evaluate_names(Path::new("a/build/b/c.rs")),
            Some(Rejection::ExcludedDirectory("build".to_string()))
        );
        assert_eq!(f.evaluate_names(Path::new("a/builder/c.rs")), None);
        assert_eq!(f.evaluate_names(Path::new("Build/c.rs")), None);
    }

    #[test]
    fn test_file_rule() {
        let f = filter(ExclusionConfig::new().exclude_files(["Cargo.lock"]));

        assert_eq!(
            f.evaluate_names(Path::new("crate/Cargo.lock")),
            Some(Rejection::ExcludedFile("Cargo.lock".to_string()))
        );
        assert_eq!(f.evaluate_names(Path::new("crate/cargo.lock")), None);
    }

    #[test]
    fn test_extension_rule_is_case_insensitive_on_path() {
        let f = filter(ExclusionConfig::new().exclude_extensions([".log"]));

        assert_eq!(
            f.evaluate_names(Path::new("logs/App.LOG")),
            Some(Rejection::ExcludedExtension(".log".to_string()))
        );
        assert_eq!(f.evaluate_names(Path::new("logs/app.txt")), None);
    }

    #[test]
    fn test_size_rule() {
        let temp = assert_fs::TempDir::new().unwrap();
        let big = temp.child("big.txt");
        big.write_str(&"x".repeat(101)).unwrap();
        let exact = temp.child("exact.txt");
        exact.write_str(&"x".repeat(100)).unwrap();

        let f = filter(ExclusionConfig::new().max_file_size(100));

        assert_eq!(
            f.evaluate(big.path(), Path::new("big.txt")),
            Some(Rejection::TooLarge {
                size: 101,
                limit: 100
            })
        );
        assert!(f.should_process(exact.path(), Path::new("exact.txt")));
    }

    #[test]
    fn test_missing_file_fails_closed() {
        let temp = assert_fs::TempDir::new().unwrap();
        let f = filter(ExclusionConfig::default());

        assert_eq!(
            f.evaluate(&temp.path().join("gone.rs"), Path::new("gone.rs")),
            Some(Rejection::SizeUnknown)
        );
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("sub").create_dir_all().unwrap();
        let f = filter(ExclusionConfig::default());

        assert_eq!(
            f.evaluate(&temp.path().join("sub"), Path::new("sub")),
            Some(Rejection::NotAFile)
        );
    }

    #[test]
    fn test_prunes_directory() {
        let f = filter(ExclusionConfig::new().exclude_dirs(["node_modules"]));

        assert!(f.prunes_directory(Path::new("web/node_modules")));
        assert!(f.prunes_directory(Path::new(".git")));
        assert!(!f.prunes_directory(Path::new("src")));
        assert!(!f.prunes_directory(Path::new("")));
    }

    #[test]
    fn test_rejection_display() {
        let r = Rejection::TooLarge { size: 10, limit: 5 };
        assert_eq!(r.to_string(), "10 bytes exceeds 5");
        assert_eq!(Rejection::Binary.to_string(), "binary");
    }
}
