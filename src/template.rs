use crate::{
    error::{Error, Result},
    file::FileData,
};
use serde::Serialize;
use tera::{Context, Tera};
use tracing::debug;

/// First line of every aggregated document.
pub const TITLE: &str = "# Contents of all files\n";

/// Narrowest fence the renderer emits.
pub const MIN_FENCE_WIDTH: usize = 3;

const SECTION_TEMPLATE: &str = "section";
const SUMMARY_TEMPLATE: &str = "summary";

#[derive(Serialize)]
struct SectionView<'a> {
    path: &'a str,
    language: &'a str,
    fence: String,
    content: &'a str,
}

/// Renders per-file sections and the trailing summary.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Creates a renderer with the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns an error if template registration fails.
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_template(SECTION_TEMPLATE, include_str!("../templates/section.tera"))
            .map_err(|e| Error::template(SECTION_TEMPLATE, &e))?;

        tera.add_raw_template(SUMMARY_TEMPLATE, include_str!("../templates/summary.tera"))
            .map_err(|e| Error::template(SUMMARY_TEMPLATE, &e))?;

        Ok(Self { tera })
    }

    /// Renders one file as a titled, fenced section.
    ///
    /// The fence is always wider than any backtick run inside the content,
    /// so embedded code blocks cannot close it early.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_section(&self, file: &FileData) -> Result<String> {
        let view = SectionView {
            path: &file.relative_path,
            language: file.language,
            fence: fence_for(&file.content),
            content: &file.content,
        };

        debug!(
            "Rendering {} as {} with a {}-wide fence",
            file.relative_path,
            file.language,
            view.fence.len()
        );

        let mut context = Context::new();
        context.insert("file", &view);

        self.tera
            .render(SECTION_TEMPLATE, &context)
            .map_err(|e| Error::template(SECTION_TEMPLATE, &e))
    }

    /// Renders the trailing summary line.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_summary(&self, total_files: usize) -> Result<String> {
        let mut context = Context::new();
        context.insert("total_files", &total_files);

        self.tera
            .render(SUMMARY_TEMPLATE, &context)
            .map_err(|e| Error::template(SUMMARY_TEMPLATE, &e))
    }
}

/// Returns a backtick fence strictly wider than any backtick run in `content`
/// and never narrower than [`MIN_FENCE_WIDTH`].
///
/// # Examples
///
/// ```
/// use codeweave::fence_for;
///
/// assert_eq!(fence_for("plain"), "```");
/// assert_eq!(fence_for("```rust\nfn main() {}\n```"), "````");
/// ```
#[must_use]
pub fn fence_for(content: &str) -> String {
    let width = longest_backtick_run(content).max(MIN_FENCE_WIDTH - 1) + 1;
    "`".repeat(width)
}

fn longest_backtick_run(content: &str) -> usize {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<usize> = None;

    for pos in memchr::memchr_iter(b'`', content.as_bytes()) {
        run = if previous.is_some_and(|prev| prev + 1 == pos) {
            run + 1
        } else {
            1
        };
        longest = longest.max(run);
        previous = Some(pos);
    }

    longest
}

/// Append-only aggregated document plus the count of included files.
#[derive(Debug, Clone)]
pub struct Aggregate {
    text: String,
    files_processed: usize,
}

impl Default for Aggregate {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregate {
    /// Starts a document containing only the title line.
    #[must_use]
    pub fn new() -> Self {
        Self {
            text: TITLE.to_string(),
            files_processed: 0,
        }
    }

    /// Appends one rendered section and counts it.
    pub fn push_section(&mut self, section: &str) {
        self.text.push_str(section);
        self.files_processed += 1;
    }

    /// Number of sections appended so far.
    #[must_use]
    pub const fn files_processed(&self) -> usize {
        self.files_processed
    }

    /// Appends the summary line and returns the finished document.
    ///
    /// # Errors
    ///
    /// Returns an error if the summary cannot be rendered.
    pub fn finish(mut self, renderer: &Renderer) -> Result<String> {
        let summary = renderer.render_summary(self.files_processed)?;
        self.text.push_str(&summary);
        Ok(self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn file(relative: &str, content: &str) -> FileData {
        FileData::new(
            PathBuf::from(relative),
            relative.to_string(),
            content.to_string(),
        )
    }

    #[test]
    fn test_fence_widths() {
        let test_cases = vec![
            ("no ticks", 3),
            ("inline `code` here", 3),
            ("double `` ticks", 3),
            ("```python\nx = 1\n```", 4),
            ("````\nnested\n````", 5),
            ("a ` b ``````` c", 8),
        ];

        for (content, expected) in test_cases {
            assert_eq!(fence_for(content).len(), expected, "content {content:?}");
        }
    }

    #[test]
    fn test_fence_is_strictly_wider_than_any_run() {
        for width in 1..12 {
            let content = format!("before\n{}\nafter", "`".repeat(width));
            assert!(fence_for(&content).len() > width);
        }
    }

    #[test]
    fn test_render_section() {
        let renderer = Renderer::new().unwrap();
        let rendered = renderer
            .render_section(&file("a.py", "print(\"hi\")"))
            .unwrap();

        assert_eq!(
            rendered,
            "\n## File Path: a.py\n\n```python\nprint(\"hi\")\n```\n"
        );
    }

    #[test]
    fn test_render_section_widens_fence_for_embedded_block() {
        let renderer = Renderer::new().unwrap();
        let content = "# Notes\n\n```sh\ncargo test\n```\n";
        let rendered = renderer.render_section(&file("notes.md", content)).unwrap();

        assert!(rendered.contains("\n````markdown\n"));
        assert!(rendered.ends_with("\n````\n"));
        assert!(rendered.contains(content));
    }

    #[test]
    fn test_render_section_keeps_content_verbatim() {
        let renderer = Renderer::new().unwrap();
        let content = "<b>{{ not a template }}</b> & {% raw %}";
        let rendered = renderer.render_section(&file("page.html", content)).unwrap();

        assert!(rendered.contains(content));
        assert!(rendered.contains("```html\n"));
    }

    #[test]
    fn test_render_summary() {
        let renderer = Renderer::new().unwrap();
        assert_eq!(
            renderer.render_summary(3).unwrap(),
            "\n---\nTotal files processed: 3\n"
        );
    }

    #[test]
    fn test_aggregate_document() {
        let renderer = Renderer::new().unwrap();
        let mut aggregate = Aggregate::new();
        aggregate.push_section(&renderer.render_section(&file("a.rs", "fn a() {}")).unwrap());
        aggregate.push_section(&renderer.render_section(&file("b.txt", "b")).unwrap());
        assert_eq!(aggregate.files_processed(), 2);

        let document = aggregate.finish(&renderer).unwrap();
        assert_eq!(
            document,
            "# Contents of all files\n\
             \n## File Path: a.rs\n\n```rust\nfn a() {}\n```\n\
             \n## File Path: b.txt\n\n```text\nb\n```\n\
             \n---\nTotal files processed: 2\n"
        );
    }

    #[test]
    fn test_empty_aggregate() {
        let renderer = Renderer::new().unwrap();
        let document = Aggregate::new().finish(&renderer).unwrap();

        assert_eq!(
            document,
            "# Contents of all files\n\n---\nTotal files processed: 0\n"
        );
    }
}
