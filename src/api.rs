//! # Fluent API
//!
//! High-level, ergonomic API for common use cases. Start here if you want a
//! document without assembling a [`Config`] by hand.
//!
//! ## Examples
//!
//! ```no_run
//! use codeweave::api::{weave_dir, Weave};
//!
//! // Render a directory with default rules and keep the text in memory
//! let document = weave_dir("./src")?;
//!
//! // Write the current directory to ./concatenated.md
//! Weave::current_dir().run()?;
//!
//! // Custom configuration
//! Weave::dir("./project")
//!     .output("./project.md")
//!     .recommended_excludes()
//!     .exclude_dirs(["fixtures"])
//!     .exclude_extensions(["lock", "svg"])
//!     .max_file_size(256 * 1024)
//!     .respect_gitignore()
//!     .run()?;
//! # Ok::<(), codeweave::Error>(())
//! ```

use crate::{Config, ExclusionConfig, Pipeline, Result, RunStats};
use std::path::{Path, PathBuf};

/// Entry point for the fluent API.
///
/// Exclusion methods are additive: calling `exclude_dirs` twice keeps both
/// sets of names.
///
/// # Examples
///
/// ```no_run
/// use codeweave::api::Weave;
///
/// let stats = Weave::dir("./src")
///     .output("./src.md")
///     .exclude_files(["Cargo.lock"])
///     .run()?;
/// println!("Processed {} files", stats.files_processed);
/// # Ok::<(), codeweave::Error>(())
/// ```
#[derive(Debug, Clone)]
#[must_use = "call .run() or .render() to produce the document"]
pub struct Weave {
    dir: PathBuf,
    output: Option<PathBuf>,
    exclusions: ExclusionConfig,
    respect_gitignore: bool,
    dry_run: bool,
    backup: bool,
}

impl Default for Weave {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            output: None,
            exclusions: ExclusionConfig::default(),
            respect_gitignore: false,
            dry_run: false,
            backup: false,
        }
    }
}

impl Weave {
    /// Starts from the current directory.
    pub fn current_dir() -> Self {
        Self::default()
    }

    /// Starts from the specified directory.
    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self {
            dir: path.into(),
            ..Self::default()
        }
    }

    /// Sets where [`Weave::run`] writes the document.
    ///
    /// Defaults to `./concatenated.md`.
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Excludes directories by name, at any depth.
    pub fn exclude_dirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusions = self.exclusions.exclude_dirs(names);
        self
    }

    /// Excludes files by exact name.
    pub fn exclude_files<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusions = self.exclusions.exclude_files(names);
        self
    }

    /// Excludes file extensions; `"rs"`, `".rs"` and `".RS"` are equivalent.
    pub fn exclude_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusions = self.exclusions.exclude_extensions(extensions);
        self
    }

    /// Skips files larger than `bytes`.
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.exclusions = self.exclusions.max_file_size(bytes);
        self
    }

    /// Includes hidden files and directories.
    pub fn include_hidden(mut self) -> Self {
        self.exclusions = self.exclusions.exclude_hidden(false);
        self
    }

    /// Adds the common build, cache and artifact exclusions.
    ///
    /// Settings made earlier (hidden handling, size limit, names) are kept.
    pub fn recommended_excludes(mut self) -> Self {
        let recommended = ExclusionConfig::recommended();
        self.exclusions = self
            .exclusions
            .exclude_dirs(recommended.excluded_dirs().iter().cloned())
            .exclude_extensions(recommended.excluded_extensions().iter().cloned());
        self
    }

    /// Honours `.gitignore` and git exclude files.
    pub fn respect_gitignore(mut self) -> Self {
        self.respect_gitignore = true;
        self
    }

    /// Renders without writing anything in [`Weave::run`].
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Keeps a timestamped copy of an existing output file.
    pub fn backup(mut self) -> Self {
        self.backup = true;
        self
    }

    /// Builds the document and returns it without writing.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or rendering fails.
    pub fn render(self) -> Result<String> {
        let pipeline = Pipeline::new(self.build_config()?)?;
        Ok(pipeline.render()?.document)
    }

    /// Builds and writes the document, returning statistics.
    ///
    /// This is a terminal operation that consumes the builder.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory doesn't exist
    /// - Configuration is invalid
    /// - The output cannot be written
    pub fn run(self) -> Result<RunStats> {
        Pipeline::new(self.build_config()?)?.run()
    }

    fn build_config(self) -> Result<Config> {
        let mut builder = Config::builder()
            .root_dir(self.dir)
            .exclusions(self.exclusions)
            .respect_gitignore(self.respect_gitignore)
            .dry_run(self.dry_run)
            .backup_existing(self.backup);

        if let Some(output) = self.output {
            builder = builder.output_path(output);
        }

        builder.build()
    }
}

/// Renders a directory with default rules and returns the document.
///
/// # Examples
///
/// ```no_run
/// use codeweave::api::weave_dir;
///
/// let document = weave_dir("./src")?;
/// assert!(document.starts_with("# Contents of all files"));
/// # Ok::<(), codeweave::Error>(())
/// ```
///
/// # Errors
///
/// Returns an error if the directory doesn't exist or rendering fails.
pub fn weave_dir(path: impl AsRef<Path>) -> Result<String> {
    Weave::dir(path.as_ref()).render()
}
