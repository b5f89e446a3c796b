//! Heuristic function/symbol outline.
//!
//! Regex extraction of declaration-like constructs per language. The
//! C-family pattern is a best-effort signature match and will miss or
//! over-match exotic declarations; that is accepted, the outline is a
//! navigation aid, not a parser.

use crate::syntax::LanguageId;
use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub label: String,
    /// 1-based line number
    pub line: usize,
}

fn python_decl() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        RegexBuilder::new(r"^\s*(def|class)\s+([A-Za-z_]\w*)")
            .multi_line(true)
            .build()
            .expect("static pattern")
    })
}

fn c_family_decl() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        RegexBuilder::new(r"^\s*(?:[A-Za-z_][\w<>\[\]\s\*:&]+)?\s+([A-Za-z_]\w*)\s*\([^;]*\)\s*\{?")
            .multi_line(true)
            .build()
            .expect("static pattern")
    })
}

fn fortran_decl() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        RegexBuilder::new(r"^\s*(SUBROUTINE|FUNCTION)\s+([A-Za-z_]\w*)")
            .multi_line(true)
            .case_insensitive(true)
            .build()
            .expect("static pattern")
    })
}

fn line_of(text: &str, byte_offset: usize) -> usize {
    text.as_bytes()[..byte_offset]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
        }
        None => String::new(),
    }
}

/// Extract an outline of declarations in appearance order. Unrecognized
/// languages yield an empty list.
pub fn list_symbols(text: &str, language: Option<LanguageId>) -> Vec<Symbol> {
    let mut symbols = Vec::new();
    match language {
        Some(LanguageId::Python) => {
            for caps in python_decl().captures_iter(text) {
                let m = caps.get(0).expect("group 0 always present");
                symbols.push(Symbol {
                    label: format!("{} {}", &caps[1], &caps[2]),
                    line: line_of(text, m.start()),
                });
            }
        }
        Some(LanguageId::CFamily) => {
            for caps in c_family_decl().captures_iter(text) {
                let m = caps.get(0).expect("group 0 always present");
                symbols.push(Symbol {
                    label: format!("{}()", &caps[1]),
                    line: line_of(text, m.start()),
                });
            }
        }
        Some(LanguageId::Fortran) => {
            for caps in fortran_decl().captures_iter(text) {
                let m = caps.get(0).expect("group 0 always present");
                symbols.push(Symbol {
                    label: format!("{} {}", title_case(&caps[1]), &caps[2]),
                    line: line_of(text, m.start()),
                });
            }
        }
        _ => {}
    }
    symbols
}
