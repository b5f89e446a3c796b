//! Rule-based highlighter producing style spans per line.
//!
//! Application order is "last rule wins" per character: later rules
//! overwrite earlier spans at the character level rather than being
//! rejected as overlaps. Columns are char offsets within the line.

use super::rules::{registry, RuleSet};
use super::LanguageId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleClass {
    Keyword,
    Comment,
    String,
    Number,
    IdentifierSpecial,
    Declaration,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleSpan {
    pub line: usize,
    pub start_col: usize,
    pub end_col: usize,
    pub class: StyleClass,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Highlighter {
    language: Option<LanguageId>,
}

impl Highlighter {
    pub fn new(language: Option<LanguageId>) -> Self {
        Self { language }
    }

    pub fn from_path(path: &std::path::Path) -> Self {
        Self::new(LanguageId::from_path(path))
    }

    pub fn language(&self) -> Option<LanguageId> {
        self.language
    }

    pub fn set_language(&mut self, language: Option<LanguageId>) {
        self.language = language;
    }

    fn rules(&self) -> Option<&'static RuleSet> {
        registry().get(&self.language?)
    }

    /// Highlight one line of text (no trailing newline). Stateless with
    /// respect to other lines; multi-line constructs come from
    /// `highlight_range`. Spans are sorted and non-overlapping.
    pub fn highlight_line(&self, line: usize, text: &str) -> Vec<StyleSpan> {
        let Some(rules) = self.rules() else {
            return Vec::new();
        };
        if text.is_empty() {
            return Vec::new();
        }

        // char boundary byte offsets, for byte offset -> column mapping
        let bounds: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        let byte_to_col = |b: usize| bounds.partition_point(|&x| x < b);

        let mut classes: Vec<Option<StyleClass>> = vec![None; bounds.len()];
        for rule in &rules.line_rules {
            for caps in rule.regex.captures_iter(text) {
                let m = match caps.name("hl") {
                    Some(g) => g,
                    None => caps.get(0).expect("group 0 always present"),
                };
                let start = byte_to_col(m.start());
                let end = byte_to_col(m.end());
                for slot in &mut classes[start..end] {
                    *slot = Some(rule.class);
                }
            }
        }

        coalesce(line, &classes)
    }

    /// Document-wide pass for multi-line constructs (block comments,
    /// triple-quoted strings). `start_offset..end_offset` is the char
    /// range of interest; matches are projected onto the lines they
    /// cover and reported as per-line spans in absolute line numbers.
    pub fn highlight_range(
        &self,
        start_offset: usize,
        end_offset: usize,
        full_text: &str,
    ) -> Vec<StyleSpan> {
        let Some(rules) = self.rules() else {
            return Vec::new();
        };
        if rules.block_rules.is_empty() {
            return Vec::new();
        }

        let bounds: Vec<usize> = full_text.char_indices().map(|(b, _)| b).collect();
        let byte_to_char = |b: usize| bounds.partition_point(|&x| x < b);

        // char offset of every line start
        let mut line_starts = vec![0usize];
        for (i, c) in full_text.chars().enumerate() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }
        let total_chars = bounds.len();
        let line_of = |ch: usize| line_starts.partition_point(|&s| s <= ch) - 1;
        // line end excluding the newline char
        let line_end = |line: usize| {
            line_starts
                .get(line + 1)
                .map(|next| next - 1)
                .unwrap_or(total_chars)
        };

        let mut per_line: Vec<StyleSpan> = Vec::new();
        for rule in &rules.block_rules {
            for m in rule.regex.find_iter(full_text) {
                let s_char = byte_to_char(m.start());
                let e_char = byte_to_char(m.end());
                if e_char <= start_offset || s_char >= end_offset {
                    continue;
                }
                let first = line_of(s_char);
                let last = line_of(e_char.saturating_sub(1).max(s_char));
                for line in first..=last {
                    let ls = line_starts[line];
                    let le = line_end(line);
                    let span_start = s_char.max(ls) - ls;
                    let span_end = e_char.min(le) - ls;
                    if span_end > span_start {
                        overlay_span(
                            &mut per_line,
                            StyleSpan {
                                line,
                                start_col: span_start,
                                end_col: span_end,
                                class: rule.class,
                            },
                        );
                    }
                }
            }
        }
        per_line.sort_by_key(|s| (s.line, s.start_col));
        per_line
    }
}

/// Collapse the per-char class buffer into sorted, non-overlapping spans.
fn coalesce(line: usize, classes: &[Option<StyleClass>]) -> Vec<StyleSpan> {
    let mut spans = Vec::new();
    let mut run: Option<(usize, StyleClass)> = None;
    for (col, slot) in classes.iter().enumerate() {
        match (*slot, run) {
            (Some(class), Some((start, current))) if class != current => {
                spans.push(StyleSpan {
                    line,
                    start_col: start,
                    end_col: col,
                    class: current,
                });
                run = Some((col, class));
            }
            (Some(class), None) => run = Some((col, class)),
            (None, Some((start, current))) => {
                spans.push(StyleSpan {
                    line,
                    start_col: start,
                    end_col: col,
                    class: current,
                });
                run = None;
            }
            _ => {}
        }
    }
    if let Some((start, class)) = run {
        spans.push(StyleSpan {
            line,
            start_col: start,
            end_col: classes.len(),
            class,
        });
    }
    spans
}

/// Insert a span, trimming any previously laid spans it overlaps
/// (later writes win).
fn overlay_span(spans: &mut Vec<StyleSpan>, new: StyleSpan) {
    let mut kept = Vec::with_capacity(spans.len() + 1);
    for &old in spans.iter() {
        if old.line != new.line || old.end_col <= new.start_col || old.start_col >= new.end_col {
            kept.push(old);
            continue;
        }
        if old.start_col < new.start_col {
            kept.push(StyleSpan {
                end_col: new.start_col,
                ..old
            });
        }
        if old.end_col > new.end_col {
            kept.push(StyleSpan {
                start_col: new.end_col,
                ..old
            });
        }
    }
    kept.push(new);
    *spans = kept;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python() -> Highlighter {
        Highlighter::new(Some(LanguageId::Python))
    }

    #[test]
    fn test_unknown_language_passthrough() {
        let hl = Highlighter::new(None);
        assert!(hl.highlight_line(0, "def foo(): pass").is_empty());
    }

    #[test]
    fn test_python_keyword_and_comment() {
        let spans = python().highlight_line(0, "return x  # done");
        assert!(spans.contains(&StyleSpan {
            line: 0,
            start_col: 0,
            end_col: 6,
            class: StyleClass::Keyword,
        }));
        assert!(spans.contains(&StyleSpan {
            line: 0,
            start_col: 10,
            end_col: 16,
            class: StyleClass::Comment,
        }));
    }

    #[test]
    fn test_last_rule_wins_on_overlap() {
        // "def foo" 同时命中 keyword 和 declaration，后者在规则表里靠后
        let spans = python().highlight_line(0, "def foo():");
        assert_eq!(
            spans[0],
            StyleSpan {
                line: 0,
                start_col: 0,
                end_col: 7,
                class: StyleClass::Declaration,
            }
        );
    }

    #[test]
    fn test_spans_sorted_non_overlapping() {
        let spans = python().highlight_line(0, "if x == 1: y = 'a'  # c");
        for pair in spans.windows(2) {
            assert!(pair[0].end_col <= pair[1].start_col);
        }
    }

    #[test]
    fn test_idempotent() {
        let hl = python();
        let text = "class Foo:  # comment with 'str' and 42";
        let first = hl.highlight_line(3, text);
        let second = hl.highlight_line(3, text);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_string_with_escapes() {
        let spans = python().highlight_line(0, r#"x = "a\"b""#);
        assert!(spans.contains(&StyleSpan {
            line: 0,
            start_col: 4,
            end_col: 10,
            class: StyleClass::String,
        }));
    }

    #[test]
    fn test_block_comment_crosses_lines() {
        let hl = Highlighter::new(Some(LanguageId::CFamily));
        let text = "int a; /* first\nsecond */ int b;";
        let spans = hl.highlight_range(0, text.chars().count(), text);
        assert_eq!(
            spans,
            vec![
                StyleSpan {
                    line: 0,
                    start_col: 7,
                    end_col: 15,
                    class: StyleClass::Comment,
                },
                StyleSpan {
                    line: 1,
                    start_col: 0,
                    end_col: 9,
                    class: StyleClass::Comment,
                },
            ]
        );
    }

    #[test]
    fn test_range_filter_skips_outside_matches() {
        let hl = Highlighter::new(Some(LanguageId::Python));
        let text = "a = '''doc'''\nb = 1\nc = '''late'''";
        // 只关心第二行附近，两个三引号串都在范围外
        let spans = hl.highlight_range(14, 19, text);
        assert!(spans.is_empty());
    }

    #[test]
    fn test_html_attribute_group_span() {
        let hl = Highlighter::new(Some(LanguageId::Html));
        let spans = hl.highlight_line(0, r#"<div class="x">"#);
        assert!(spans.contains(&StyleSpan {
            line: 0,
            start_col: 5,
            end_col: 10,
            class: StyleClass::IdentifierSpecial,
        }));
    }
}
