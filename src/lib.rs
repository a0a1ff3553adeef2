//! # codeweave
//!
//! Weaves the readable source files of a directory tree into a single
//! Markdown document, one fenced and language-tagged section per file.
//!
//! ## Features
//!
//! - Sorted, lazy directory walk with directory pruning and optional `.gitignore` support
//! - Exclusion by directory name, file name, extension, size and hidden status
//! - Binary detection by extension and NUL-byte probing
//! - UTF-8 reading with byte-order-mark and statistical encoding fallback
//! - Fences that are always wider than any backtick run in the content
//! - Atomic output writes with optional backups
//!
//! ## Quick Start
//!
//! ```no_run
//! use codeweave::{Config, ExclusionConfig, Pipeline};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .root_dir("./src")
//!     .output_path("./src.md")
//!     .exclusions(ExclusionConfig::recommended().exclude_extensions(["lock"]))
//!     .build()?;
//!
//! Pipeline::new(config)?.run()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library follows a pipeline architecture:
//! 1. **Scanner**: Walks the tree and yields accepted text files
//! 2. **Reader**: Decodes each file, falling back to a detected encoding
//! 3. **Renderer**: Turns each file into a fenced section and appends the summary
//! 4. **Writer**: Persists the document atomically

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod error;
mod file;
mod filter;
mod language;
mod pipeline;
mod reader;
mod scanner;
mod template;
mod writer;

pub mod api;

pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use file::{has_binary_extension, is_text_file, probe, FileData, SkippedFile, TextProbe};
pub use filter::{ExclusionConfig, ExclusionFilter, Rejection, DEFAULT_MAX_FILE_SIZE};
pub use language::{language_for_extension, language_for_path, PLAIN_TEXT};
pub use pipeline::{Pipeline, Rendered, RunStats};
pub use reader::{decode_strict, detect_encoding, read_file_safe};
pub use scanner::{accepted_files, AcceptedFile, AcceptedFiles, Scanner};
pub use template::{fence_for, Aggregate, Renderer, MIN_FENCE_WIDTH, TITLE};

/// Runs the complete pipeline with the given configuration.
///
/// This is the main entry point for the library.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - Root directory doesn't exist or is not a directory
/// - The output document cannot be written
///
/// Unreadable files are not errors; they are reported in
/// [`RunStats::skipped`].
///
/// # Examples
///
/// ```no_run
/// use codeweave::{Config, run};
///
/// # fn main() -> anyhow::Result<()> {
/// let config = Config::builder()
///     .root_dir(".")
///     .build()?;
///
/// let stats = run(config)?;
/// println!("{} files", stats.files_processed);
/// # Ok(())
/// # }
/// ```
pub fn run(config: Config) -> Result<RunStats> {
    Pipeline::new(config)?.run()
}
