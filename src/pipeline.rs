use crate::{
    config::Config,
    error::Result,
    file::{FileData, SkippedFile},
    reader::read_file_safe,
    scanner::{AcceptedFile, Scanner},
    template::{Aggregate, Renderer},
    writer::Writer,
};
use indicatif::ProgressBar;
use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tracing::{debug, info, instrument, warn};

/// Statistics collected during a run.
#[derive(Debug, Clone)]
pub struct RunStats {
    /// Files rendered into the document
    pub files_processed: usize,

    /// Files skipped because they could not be read
    pub skipped: Vec<SkippedFile>,

    /// Size of the document in bytes
    pub bytes: usize,

    /// Destination of the document
    pub output_path: PathBuf,

    /// Whether the document was written to disk
    pub written: bool,

    /// Total execution time
    pub duration: Duration,
}

impl RunStats {
    /// Number of unreadable files that were skipped.
    #[must_use]
    pub fn files_skipped(&self) -> usize {
        self.skipped.len()
    }

    /// Prints a human-readable summary to stdout.
    pub fn print_summary(&self) {
        if self.written {
            println!(
                "Success: Processed {} files to {}",
                self.files_processed,
                self.output_path.display()
            );
        } else {
            println!(
                "Dry run: {} files would be written to {}",
                self.files_processed,
                self.output_path.display()
            );
        }

        if !self.skipped.is_empty() {
            println!("Skipped {} unreadable files:", self.skipped.len());
            for skipped in &self.skipped {
                println!("  {}", skipped.error);
            }
        }
    }
}

/// The aggregated document together with the statistics of producing it.
#[derive(Debug, Clone)]
pub struct Rendered {
    /// Full document text
    pub document: String,

    /// Run statistics; `written` is always false here
    pub stats: RunStats,
}

/// Main pipeline orchestrator: scan, read, render, write.
pub struct Pipeline {
    config: Config,
    scanner: Scanner,
    renderer: Renderer,
    writer: Writer,
    progress: ProgressBar,
    output_identity: Option<PathBuf>,
}

impl Pipeline {
    /// Creates a new pipeline with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration validation fails
    /// - Template registration fails
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let scanner = Scanner::new(&config);
        let renderer = Renderer::new()?;
        let writer = Writer::new(&config);
        let output_identity = output_identity(&config.output_path);

        Ok(Self {
            config,
            scanner,
            renderer,
            writer,
            progress: ProgressBar::hidden(),
            output_identity,
        })
    }

    /// Reports progress on the given bar, one tick per accepted file.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Walks the tree and builds the aggregated document without writing it.
    ///
    /// Unreadable files, whether caught by the content probe or by the
    /// reader, are logged, recorded in [`RunStats::skipped`] and left out of
    /// the document; they never abort the run.
    ///
    /// # Errors
    ///
    /// Returns an error only if template rendering fails.
    pub fn render(&self) -> Result<Rendered> {
        let start_time = Instant::now();
        let mut aggregate = Aggregate::new();
        let mut skipped = Vec::new();

        let mut files = self.scanner.files();
        while let Some(file) = files.next() {
            skipped.extend(files.take_unreadable());

            if self.is_output(&file) {
                debug!("Skipping output document {}", file.relative_path);
                continue;
            }

            self.progress.set_message(file.relative_path.clone());

            match read_file_safe(&file.path) {
                Ok(content) => {
                    let data = FileData::new(file.path, file.relative_path, content);
                    let section = self.renderer.render_section(&data)?;
                    aggregate.push_section(&section);
                }
                Err(error) => {
                    warn!("Skipping {}: {}", file.relative_path, error);
                    skipped.push(SkippedFile {
                        path: file.path,
                        error,
                    });
                }
            }

            self.progress.inc(1);
        }
        skipped.extend(files.take_unreadable());

        let files_processed = aggregate.files_processed();
        let document = aggregate.finish(&self.renderer)?;

        let stats = RunStats {
            files_processed,
            skipped,
            bytes: document.len(),
            output_path: self.config.output_path.clone(),
            written: false,
            duration: start_time.elapsed(),
        };

        Ok(Rendered { document, stats })
    }

    /// Executes the complete pipeline and returns statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing the document fails.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use codeweave::{Config, Pipeline};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = Config::builder()
    ///     .root_dir("./src")
    ///     .output_path("./src.md")
    ///     .build()?;
    ///
    /// let stats = Pipeline::new(config)?.run()?;
    /// stats.print_summary();
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self), fields(root_dir = %self.config.root_dir.display()))]
    pub fn run(self) -> Result<RunStats> {
        let start_time = Instant::now();

        info!("Scanning and rendering files...");
        let Rendered {
            document,
            mut stats,
        } = self.render()?;
        self.progress.finish_and_clear();

        info!(
            "Rendered {} files ({} skipped) in {:.2}s",
            stats.files_processed,
            stats.files_skipped(),
            stats.duration.as_secs_f64()
        );

        if self.config.dry_run {
            warn!("Dry run mode enabled - skipping file write");
        } else {
            self.writer.write(&document)?;
            stats.written = true;
        }

        stats.duration = start_time.elapsed();
        Ok(stats)
    }

    /// Returns true if the accepted file is the document this run writes.
    fn is_output(&self, file: &AcceptedFile) -> bool {
        let Some(output) = self.output_identity.as_deref() else {
            return false;
        };

        output.file_name() == file.path.file_name()
            && fs::canonicalize(&file.path).is_ok_and(|path| path == output)
    }
}

/// Canonical location of the output document, even before it exists.
fn output_identity(output_path: &Path) -> Option<PathBuf> {
    let file_name = output_path.file_name()?;
    let parent = output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    fs::canonicalize(parent).ok().map(|dir| dir.join(file_name))
}
