use anyhow::Context;
use clap::Parser;
use codeweave::{Config, DEFAULT_MAX_FILE_SIZE, ExclusionConfig, Pipeline};
use indicatif::{ProgressBar, ProgressStyle};
use std::{path::PathBuf, time::Duration};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "codeweave",
    version,
    author,
    about = "Weave the text files of a directory tree into one Markdown document",
    long_about = "Weave the text files of a directory tree into one Markdown document.\n\n\
    Every readable text file below PATH becomes a section headed by its relative path, \
    wrapped in a code fence tagged with its language. Binary files, hidden paths and \
    anything matching the exclusion options are skipped.\n\n\
    USAGE EXAMPLES:\n  \
      # Weave the current directory into ./concatenated.md\n  \
      codeweave .\n\n  \
      # Skip build output and lock files\n  \
      codeweave ./my-project -E \"target|node_modules\" -F \"Cargo.lock\" -o ./project.md\n\n  \
      # Use the common exclusions and honour .gitignore\n  \
      codeweave ./src --recommended-excludes --gitignore",
    after_help = "Part of the codeweave project."
)]
struct Cli {
    /// Root directory to scan
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Directory names to exclude, separated by '|'
    #[arg(short = 'E', long = "exclude-dirs", value_name = "DIRS", value_delimiter = '|')]
    exclude_dirs: Vec<String>,

    /// File names to exclude, separated by '|'
    #[arg(short = 'F', long = "exclude-files", value_name = "FILES", value_delimiter = '|')]
    exclude_files: Vec<String>,

    /// File extensions to exclude, separated by '|'
    #[arg(short = 'X', long = "exclude-extensions", value_name = "EXTS", value_delimiter = '|')]
    exclude_extensions: Vec<String>,

    /// Output document
    #[arg(short, long, default_value = "./concatenated.md", value_name = "FILE")]
    output: PathBuf,

    /// Skip files larger than this many bytes
    #[arg(long, default_value_t = DEFAULT_MAX_FILE_SIZE, value_name = "BYTES")]
    max_file_size: u64,

    /// Include hidden files and directories
    #[arg(long)]
    include_hidden: bool,

    /// Add common build, cache and binary artifact exclusions
    #[arg(long)]
    recommended_excludes: bool,

    /// Honour .gitignore and git exclude files
    #[arg(long)]
    gitignore: bool,

    /// Dry run (don't write the document)
    #[arg(long)]
    dry_run: bool,

    /// Keep a timestamped backup of an existing output file
    #[arg(long)]
    backup: bool,

    /// Hide the progress spinner
    #[arg(long)]
    no_progress: bool,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn exclusions(&self) -> ExclusionConfig {
        let base = if self.recommended_excludes {
            ExclusionConfig::recommended()
        } else {
            ExclusionConfig::default()
        };

        base.exclude_dirs(self.exclude_dirs.iter().cloned())
            .exclude_files(self.exclude_files.iter().cloned())
            .exclude_extensions(self.exclude_extensions.iter().cloned())
            .exclude_hidden(!self.include_hidden)
            .max_file_size(self.max_file_size)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose, cli.quiet);

    let config = Config::builder()
        .root_dir(&cli.path)
        .output_path(&cli.output)
        .exclusions(cli.exclusions())
        .respect_gitignore(cli.gitignore)
        .dry_run(cli.dry_run)
        .backup_existing(cli.backup)
        .build()
        .context("Failed to build configuration")?;

    let stats = Pipeline::new(config)
        .context("Failed to create pipeline")?
        .with_progress(progress_bar(cli.quiet || cli.no_progress))
        .run()
        .context("Pipeline execution failed")?;

    stats.print_summary();

    Ok(())
}

fn progress_bar(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{elapsed}] {pos} files {wide_msg}") {
        bar.set_style(style);
    }
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn setup_tracing(verbosity: u8, quiet: bool) {
    let filter = match (quiet, verbosity) {
        (true, _) => EnvFilter::new("codeweave=warn"),
        (false, 0) => EnvFilter::new("codeweave=info"),
        (false, 1) => EnvFilter::new("codeweave=debug"),
        _ => EnvFilter::new("codeweave=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
