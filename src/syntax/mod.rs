//! Syntax support: language detection + regex rule registry + highlighting.

pub mod highlighter;
pub mod rules;

pub use highlighter::{Highlighter, StyleClass, StyleSpan};
pub use rules::{registry, RuleSet};

use std::path::Path;

/// Extra lines re-highlighted around a reported changed-line range, so
/// edits near multi-line constructs pick up their boundaries.
pub const RELEX_MARGIN: usize = 3;

/// Expand a buffer-reported changed-line range by the look-around
/// margin, clamped to the document. This is the range a renderer
/// should re-run `highlight_line` over after an edit, instead of
/// rescanning the whole document.
pub fn relex_range(first: usize, last: usize, len_lines: usize) -> (usize, usize) {
    let lo = first.saturating_sub(RELEX_MARGIN);
    let hi = (last + RELEX_MARGIN).min(len_lines.saturating_sub(1));
    (lo, hi)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageId {
    Python,
    CFamily,
    Html,
    Json,
    Fortran,
}

impl LanguageId {
    /// Language is fixed at load time from the file extension; a later
    /// save-as to a different extension does not re-detect.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|s| s.to_str())?
            .to_ascii_lowercase()
            .as_str()
        {
            "py" | "pyi" | "pyw" => Some(Self::Python),
            "c" | "h" | "cc" | "cpp" | "cxx" | "hpp" | "hh" | "java" | "js" | "mjs" => {
                Some(Self::CFamily)
            }
            "html" | "htm" => Some(Self::Html),
            "json" => Some(Self::Json),
            "f" | "f90" | "f95" | "for" => Some(Self::Fortran),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Python => "Python",
            Self::CFamily => "C/C++/Java/JS",
            Self::Html => "HTML",
            Self::Json => "JSON",
            Self::Fortran => "Fortran",
        }
    }
}
