use crate::error::{Error, Result};
use crate::filter::ExclusionConfig;
use std::path::PathBuf;

const DEFAULT_OUTPUT_PATH: &str = "./concatenated.md";

/// Configuration for a codeweave run.
///
/// Use [`Config::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Root directory to scan for files
    pub root_dir: PathBuf,

    /// Destination of the aggregated document
    pub output_path: PathBuf,

    /// Exclusion rules applied during the walk
    pub exclusions: ExclusionConfig,

    /// Honour `.gitignore` and git exclude files
    pub respect_gitignore: bool,

    /// Dry run mode (no file writes)
    pub dry_run: bool,

    /// Keep a timestamped copy of an existing output file
    pub backup_existing: bool,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use codeweave::{Config, ExclusionConfig};
    ///
    /// let config = Config::builder()
    ///     .root_dir("./src")
    ///     .exclusions(ExclusionConfig::recommended())
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Root directory doesn't exist or is not a directory
    /// - Output path points at an existing directory
    pub fn validate(&self) -> Result<()> {
        if !self.root_dir.exists() {
            return Err(Error::config(format!(
                "Root directory does not exist: {}",
                self.root_dir.display()
            )));
        }

        if !self.root_dir.is_dir() {
            return Err(Error::config(format!(
                "Root path is not a directory: {}",
                self.root_dir.display()
            )));
        }

        if self.output_path.is_dir() {
            return Err(Error::config(format!(
                "Output path is a directory: {}",
                self.output_path.display()
            )));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            exclusions: ExclusionConfig::default(),
            respect_gitignore: false,
            dry_run: false,
            backup_existing: false,
        }
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    root_dir: Option<PathBuf>,
    output_path: Option<PathBuf>,
    exclusions: Option<ExclusionConfig>,
    respect_gitignore: bool,
    dry_run: bool,
    backup_existing: bool,
}

impl ConfigBuilder {
    /// Sets the root directory to scan.
    #[must_use]
    pub fn root_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(path.into());
        self
    }

    /// Sets the destination of the aggregated document.
    #[must_use]
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Sets the exclusion rules.
    #[must_use]
    pub fn exclusions(mut self, exclusions: ExclusionConfig) -> Self {
        self.exclusions = Some(exclusions);
        self
    }

    /// Enables or disables `.gitignore` handling.
    #[must_use]
    pub const fn respect_gitignore(mut self, enabled: bool) -> Self {
        self.respect_gitignore = enabled;
        self
    }

    /// Enables dry run mode (no file writes).
    #[must_use]
    pub const fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Enables or disables backup creation.
    #[must_use]
    pub const fn backup_existing(mut self, enabled: bool) -> Self {
        self.backup_existing = enabled;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Config> {
        let config = Config {
            root_dir: self.root_dir.unwrap_or_else(|| PathBuf::from(".")),
            output_path: self
                .output_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH)),
            exclusions: self.exclusions.unwrap_or_default(),
            respect_gitignore: self.respect_gitignore,
            dry_run: self.dry_run,
            backup_existing: self.backup_existing,
        };

        config.validate()?;
        Ok(config)
    }
}
