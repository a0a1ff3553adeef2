use crate::{
    config::Config,
    error::Error,
    file::{probe, SkippedFile, TextProbe},
    filter::{ExclusionConfig, ExclusionFilter, Rejection},
};
use ignore::{Walk, WalkBuilder};
use std::path::{Component, Path, PathBuf};
use tracing::{trace, warn};

/// A path that survived every exclusion rule and the text probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedFile {
    /// Path as produced by the walk (root joined with the relative path)
    pub path: PathBuf,

    /// Path below the root, `/` separated
    pub relative_path: String,
}

/// Walks a directory tree and yields the files worth rendering.
#[derive(Debug, Clone)]
pub struct Scanner {
    root_dir: PathBuf,
    filter: ExclusionFilter,
    respect_gitignore: bool,
}

impl Scanner {
    /// Creates a new scanner from configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self::with_exclusions(&config.root_dir, config.exclusions.clone())
            .respect_gitignore(config.respect_gitignore)
    }

    /// Creates a scanner for `root` with the given exclusion rules.
    #[must_use]
    pub fn with_exclusions(root: impl Into<PathBuf>, exclusions: ExclusionConfig) -> Self {
        Self {
            root_dir: root.into(),
            filter: ExclusionFilter::new(exclusions),
            respect_gitignore: false,
        }
    }

    /// Enables or disables `.gitignore` handling.
    #[must_use]
    pub const fn respect_gitignore(mut self, enabled: bool) -> Self {
        self.respect_gitignore = enabled;
        self
    }

    /// Returns the root directory being scanned.
    #[must_use]
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Starts a new walk and returns its accepted files as a lazy iterator.
    ///
    /// Entries are visited depth-first with siblings sorted by name, so the
    /// order is stable for an unchanged tree. Every call starts a fresh walk.
    #[must_use]
    pub fn files(&self) -> AcceptedFiles {
        let root = self.root_dir.clone();
        let prune = self.filter.clone();
        let gitignore = self.respect_gitignore;

        let walk = WalkBuilder::new(&self.root_dir)
            .standard_filters(false)
            .parents(gitignore)
            .git_ignore(gitignore)
            .git_global(gitignore)
            .git_exclude(gitignore)
            .require_git(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                if entry.depth() == 0 || !is_dir {
                    return true;
                }
                let relative = entry.path().strip_prefix(&root).unwrap_or(entry.path());
                !prune.prunes_directory(relative)
            })
            .build();

        AcceptedFiles {
            walk,
            root: self.root_dir.clone(),
            filter: self.filter.clone(),
            unreadable: Vec::new(),
        }
    }
}

/// Convenience wrapper: lazily yields accepted files below `root`.
#[must_use]
pub fn accepted_files(root: impl Into<PathBuf>, exclusions: ExclusionConfig) -> AcceptedFiles {
    Scanner::with_exclusions(root, exclusions).files()
}

/// Lazy sequence of accepted files.
///
/// Filesystem stat and probe calls happen only as the iterator is advanced.
/// Candidates whose content probe fails are excluded like binaries, but are
/// also logged and collected; see [`AcceptedFiles::take_unreadable`].
pub struct AcceptedFiles {
    walk: Walk,
    root: PathBuf,
    filter: ExclusionFilter,
    unreadable: Vec<SkippedFile>,
}

impl AcceptedFiles {
    /// Drains the candidates that could not be probed so far.
    pub fn take_unreadable(&mut self) -> Vec<SkippedFile> {
        std::mem::take(&mut self.unreadable)
    }

    /// Runs the full filter chain on a single candidate.
    fn check(&mut self, path: &Path) -> Result<AcceptedFile, Rejection> {
        let relative = pathdiff::diff_paths(path, &self.root).unwrap_or_else(|| path.to_path_buf());

        if let Some(rejection) = self.filter.evaluate(path, &relative) {
            return Err(rejection);
        }

        match probe(path) {
            TextProbe::Text => {}
            TextProbe::Binary => return Err(Rejection::Binary),
            TextProbe::Unreadable(e) => {
                let error = Error::io(path, e);
                warn!("Unable to read {}: {}", path.display(), error);
                self.unreadable.push(SkippedFile {
                    path: path.to_path_buf(),
                    error,
                });
                return Err(Rejection::Unreadable);
            }
        }

        Ok(AcceptedFile {
            path: path.to_path_buf(),
            relative_path: to_slash(&relative),
        })
    }
}

impl Iterator for AcceptedFiles {
    type Item = AcceptedFile;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walk.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Walk error: {}", e);
                    continue;
                }
            };

            match self.check(entry.path()) {
                Ok(file) => return Some(file),
                Err(rejection) => {
                    trace!("Skipping {}: {}", entry.path().display(), rejection);
                }
            }
        }
    }
}

fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
