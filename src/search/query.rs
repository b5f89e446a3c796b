//! Search query compilation.
//!
//! A query is compiled to a single regex whatever its flags: literal
//! patterns are escaped first, whole-word wraps the pattern in `\b`
//! anchors, and case-insensitivity goes through the builder rather
//! than rewriting the pattern.

use regex::{Regex, RegexBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    #[default]
    WholeDocument,
    Selection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchDirection {
    #[default]
    Forward,
    Backward,
}

#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub pattern: String,
    pub case_sensitive: bool,
    pub whole_word: bool,
    pub is_regex: bool,
    pub scope: SearchScope,
    pub direction: SearchDirection,
}

impl SearchQuery {
    pub fn literal(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            case_sensitive: false,
            whole_word: false,
            is_regex: false,
            scope: SearchScope::WholeDocument,
            direction: SearchDirection::Forward,
        }
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            is_regex: true,
            ..Self::literal(pattern)
        }
    }

    pub fn compile(&self) -> Result<Regex, SearchError> {
        let mut pattern = if self.is_regex {
            self.pattern.clone()
        } else {
            regex::escape(&self.pattern)
        };
        if self.whole_word {
            pattern = format!(r"\b{}\b", pattern);
        }
        RegexBuilder::new(&pattern)
            .case_insensitive(!self.case_sensitive)
            .multi_line(true)
            .build()
            .map_err(|err| SearchError::InvalidPattern(err.to_string()))
    }
}

pub type Result<T, E = SearchError> = std::result::Result<T, E>;

#[derive(Debug, Clone)]
pub enum SearchError {
    InvalidPattern(String),
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::InvalidPattern(msg) => write!(f, "invalid pattern: {}", msg),
        }
    }
}

impl std::error::Error for SearchError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_is_escaped() {
        let q = SearchQuery::literal("a.b(");
        let re = q.compile().unwrap();
        assert!(re.is_match("a.b("));
        assert!(!re.is_match("axb("));
    }

    #[test]
    fn test_whole_word_anchors() {
        let q = SearchQuery {
            whole_word: true,
            case_sensitive: true,
            ..SearchQuery::literal("cat")
        };
        let re = q.compile().unwrap();
        assert!(re.is_match("a cat sat"));
        assert!(!re.is_match("concatenate"));
    }

    #[test]
    fn test_case_insensitive_by_default() {
        let re = SearchQuery::literal("todo").compile().unwrap();
        assert!(re.is_match("TODO"));
    }

    #[test]
    fn test_invalid_regex() {
        let err = SearchQuery::regex("(").compile().unwrap_err();
        let SearchError::InvalidPattern(msg) = err;
        assert!(!msg.is_empty());
    }
}
