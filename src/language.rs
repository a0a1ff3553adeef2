//! Extension based language tagging for rendered code fences.

use std::path::Path;

/// Label used for any extension without a known language.
pub const PLAIN_TEXT: &str = "text";

/// Maps a file extension to the language label used on its code fence.
///
/// The extension is matched case-insensitively and may carry a leading dot,
/// so `".PY"`, `".py"` and `"py"` all map to `"python"`.
///
/// # Examples
///
/// ```
/// use codeweave::language_for_extension;
///
/// assert_eq!(language_for_extension(".rs"), "rust");
/// assert_eq!(language_for_extension("unknown"), "text");
/// ```
#[must_use]
pub fn language_for_extension(extension: &str) -> &'static str {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();

    match ext.as_str() {
        "py" => "python",
        "js" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "java" => "java",
        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => "cpp",
        "cs" => "csharp",
        "html" | "htm" => "html",
        "css" => "css",
        "scss" => "scss",
        "sass" => "sass",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "ini" => "ini",
        "md" | "markdown" => "markdown",
        "xml" => "xml",
        "sql" => "sql",
        "sh" | "bash" | "zsh" => "bash",
        "php" => "php",
        "rb" => "ruby",
        "go" => "go",
        "rs" => "rust",
        "swift" => "swift",
        "kt" => "kotlin",
        "scala" => "scala",
        "lua" => "lua",
        _ => PLAIN_TEXT,
    }
}

/// Maps a path to a language label using its extension.
///
/// Paths without an extension (including dotfiles such as `.bashrc`) are
/// plain text.
#[must_use]
pub fn language_for_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(PLAIN_TEXT, language_for_extension)
}
