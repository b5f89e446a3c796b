//! Per-language highlight rule sets.
//!
//! Each set is an ordered list of `(pattern, class)` pairs. Order matters:
//! rules are applied sequentially and later rules overwrite earlier ones
//! per character, so e.g. the comment rule sits after the keyword rule.
//! Block rules run in a separate document-wide pass with `(?s)` so block
//! comments and triple-quoted strings can cross line boundaries.

use super::highlighter::StyleClass;
use super::LanguageId;
use regex::Regex;
use rustc_hash::FxHashMap;
use std::sync::OnceLock;
use tracing::warn;

pub struct LineRule {
    pub regex: Regex,
    pub class: StyleClass,
}

pub struct BlockRule {
    pub regex: Regex,
    pub class: StyleClass,
}

pub struct RuleSet {
    pub line_rules: Vec<LineRule>,
    pub block_rules: Vec<BlockRule>,
}

impl RuleSet {
    /// Compile a rule set, dropping (with a warning) any pattern that
    /// fails to compile instead of rejecting the whole set.
    fn compile(
        language: LanguageId,
        line_specs: &[(&str, StyleClass)],
        block_specs: &[(&str, StyleClass)],
    ) -> Self {
        let mut line_rules = Vec::with_capacity(line_specs.len());
        for (pattern, class) in line_specs {
            match Regex::new(pattern) {
                Ok(regex) => line_rules.push(LineRule {
                    regex,
                    class: *class,
                }),
                Err(err) => {
                    warn!(?language, pattern, %err, "dropping malformed highlight rule");
                }
            }
        }
        let mut block_rules = Vec::with_capacity(block_specs.len());
        for (pattern, class) in block_specs {
            match Regex::new(pattern) {
                Ok(regex) => block_rules.push(BlockRule {
                    regex,
                    class: *class,
                }),
                Err(err) => {
                    warn!(?language, pattern, %err, "dropping malformed highlight rule");
                }
            }
        }
        Self {
            line_rules,
            block_rules,
        }
    }
}

const PYTHON_KEYWORDS: &str = r"\b(?:False|True|None|and|as|assert|async|await|break|class|continue|def|del|elif|else|except|finally|for|from|global|if|import|in|is|lambda|nonlocal|not|or|pass|raise|return|try|while|with|yield)\b";

const C_KEYWORDS: &str = r"\b(?:auto|break|case|catch|char|class|const|constexpr|continue|default|delete|do|double|else|enum|explicit|export|extern|float|for|friend|goto|if|inline|int|long|namespace|new|noexcept|nullptr|operator|private|protected|public|register|reinterpret_cast|return|short|signed|sizeof|static|struct|switch|template|this|throw|try|typedef|typename|union|unsigned|using|virtual|void|volatile|while)\b";

fn python_rules() -> RuleSet {
    RuleSet::compile(
        LanguageId::Python,
        &[
            (PYTHON_KEYWORDS, StyleClass::Keyword),
            (r"#.*$", StyleClass::Comment),
            (r#""[^"\\]*(?:\\.[^"\\]*)*""#, StyleClass::String),
            (r"'[^'\\]*(?:\\.[^'\\]*)*'", StyleClass::String),
            (r"\b\d+(?:\.\d+)?\b", StyleClass::Number),
            (r"\b(?:self|cls)\b", StyleClass::IdentifierSpecial),
            (r"\b(?:def|class)\s+\w+", StyleClass::Declaration),
        ],
        &[
            (r#""""(?s:.)*?""""#, StyleClass::String),
            (r"'''(?s:.)*?'''", StyleClass::String),
        ],
    )
}

fn c_family_rules() -> RuleSet {
    RuleSet::compile(
        LanguageId::CFamily,
        &[
            (C_KEYWORDS, StyleClass::Keyword),
            (r"//.*$", StyleClass::Comment),
            (r#""[^"\\]*(?:\\.[^"\\]*)*""#, StyleClass::String),
            (r"'[^'\\]*(?:\\.[^'\\]*)*'", StyleClass::String),
            (r"\b\d+(?:\.\d+)?\b", StyleClass::Number),
            (r"\b(?:class|struct)\s+\w+", StyleClass::Declaration),
        ],
        &[(r"/\*(?s:.)*?\*/", StyleClass::Comment)],
    )
}

fn html_rules() -> RuleSet {
    RuleSet::compile(
        LanguageId::Html,
        &[
            (r"</?[a-zA-Z0-9:_-]+", StyleClass::Keyword),
            // regex has no lookahead; the named group carries the span
            (r"\s(?P<hl>[a-zA-Z:-]+)=", StyleClass::IdentifierSpecial),
            (r#"="[^"]*""#, StyleClass::String),
        ],
        &[(r"<!--(?s:.)*?-->", StyleClass::Comment)],
    )
}

fn json_rules() -> RuleSet {
    RuleSet::compile(
        LanguageId::Json,
        &[
            (r#""[^"]*"\s*:"#, StyleClass::Keyword),
            (r#":\s*(?P<hl>"[^"]*")"#, StyleClass::String),
            (r"\b(?:true|false|null)\b", StyleClass::Keyword),
            (r"-?\b\d+(?:\.\d+)?(?:[eE][+-]?\d+)?\b", StyleClass::Number),
        ],
        &[],
    )
}

/// 语言 → 规则集注册表，进程内编译一次。
/// 新语言通过在这里登记加入，而不是在高亮器里加分支。
pub fn registry() -> &'static FxHashMap<LanguageId, RuleSet> {
    static REGISTRY: OnceLock<FxHashMap<LanguageId, RuleSet>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut map = FxHashMap::default();
        map.insert(LanguageId::Python, python_rules());
        map.insert(LanguageId::CFamily, c_family_rules());
        map.insert(LanguageId::Html, html_rules());
        map.insert(LanguageId::Json, json_rules());
        // Fortran is recognized for the symbol outline only; no rule set.
        map
    })
}
