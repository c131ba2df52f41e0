//! Programming language detection
//!
//! A multi-signal classifier: every language in a static signature table is
//! scored by keyword and pattern hits on a normalized copy of the input, a
//! couple of cross-language adjustments are applied, and the best score wins
//! if it clears the acceptance threshold.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ports::UNKNOWN_LANGUAGE;

/// Score a language must strictly exceed to be reported
pub const ACCEPTANCE_THRESHOLD: u32 = 2;

const KEYWORD_WEIGHT: u32 = 1;
const PATTERN_WEIGHT: u32 = 2;
const TYPE_ANNOTATION_BONUS: u32 = 2;
const VALID_JSON_BONUS: u32 = 5;

/// Languages the detector can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    #[serde(rename = "HTML")]
    Html,
    #[serde(rename = "CSS")]
    Css,
    #[serde(rename = "SQL")]
    Sql,
    Java,
    CSharp,
    #[serde(rename = "PHP")]
    Php,
    Ruby,
    Go,
    Rust,
    #[serde(rename = "JSON")]
    Json,
    Markdown,
    #[serde(rename = "XML")]
    Xml,
    Unknown,
}

impl Language {
    /// Display label, also used as the snippet language
    pub fn label(&self) -> &'static str {
        match self {
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Python => "Python",
            Language::Html => "HTML",
            Language::Css => "CSS",
            Language::Sql => "SQL",
            Language::Java => "Java",
            Language::CSharp => "CSharp",
            Language::Php => "PHP",
            Language::Ruby => "Ruby",
            Language::Go => "Go",
            Language::Rust => "Rust",
            Language::Json => "JSON",
            Language::Markdown => "Markdown",
            Language::Xml => "XML",
            Language::Unknown => UNKNOWN_LANGUAGE,
        }
    }

    pub fn is_known(&self) -> bool {
        *self != Language::Unknown
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Signature table
// ============================================================================

struct SignatureSpec {
    language: Language,
    keywords: &'static [&'static str],
    patterns: &'static [&'static str],
}

/// Canonical table. Its order is the tie-break order: when two languages
/// share the best score, the one listed first wins.
const SIGNATURE_SPECS: &[SignatureSpec] = &[
    SignatureSpec {
        language: Language::JavaScript,
        keywords: &[
            "const", "let", "var", "function", "return", "export", "import", "from", "=>",
        ],
        patterns: &[
            r"console\.log\(",
            r"const\s+\w+\s*=",
            r"function\s+\w+\s*\(",
            r"import\s+.*\s+from\s+",
        ],
    },
    SignatureSpec {
        language: Language::TypeScript,
        keywords: &[
            "interface", "type", "namespace", "readonly", "private", "public", "protected",
        ],
        patterns: &[
            r":\s*string\b",
            r":\s*number\b",
            r":\s*boolean\b",
            r"<[\w\s,]+>",
            r"interface\s+\w+\s*\{",
        ],
    },
    SignatureSpec {
        language: Language::Python,
        keywords: &[
            "def", "class", "import", "from", "as", "with", "self", "if", "elif", "else",
        ],
        patterns: &[
            r"def\s+\w+\s*\(",
            r"class\s+\w+\s*:",
            r"if\s+.*:",
            r"import\s+\w+",
            r"(?m)#.*$",
        ],
    },
    SignatureSpec {
        language: Language::Html,
        keywords: &["div", "span", "class", "href", "src"],
        patterns: &[
            r"(?i)</?[a-z][\s\S]*>",
            r"(?i)<html",
            r"(?i)<div",
            r"(?i)<body",
            r"(?i)<head",
        ],
    },
    SignatureSpec {
        language: Language::Css,
        keywords: &[
            "margin", "padding", "color", "background", "width", "height", "display",
        ],
        patterns: &[r"\{[\s\S]*\}", r";\s*$", r"(?i)#[a-f0-9]{3,6}", r"\.\w+\s*\{"],
    },
    SignatureSpec {
        language: Language::Sql,
        keywords: &[
            "select", "from", "where", "join", "group by", "having", "order by", "insert",
            "update", "delete",
        ],
        patterns: &[
            r"(?i)select\s+.*\s+from",
            r"(?i)create\s+table",
            r"(?i)insert\s+into",
            r"(?i)update\s+.*\s+set",
        ],
    },
    SignatureSpec {
        language: Language::Java,
        keywords: &[
            "public", "private", "protected", "class", "interface", "extends", "implements",
            "void", "static",
        ],
        patterns: &[
            r"public\s+class",
            r"public\s+static\s+void\s+main",
            r"\w+\s+\w+\s*=\s*new\s+\w+",
        ],
    },
    SignatureSpec {
        language: Language::CSharp,
        keywords: &[
            "namespace", "using", "class", "var", "string", "int", "bool", "void", "async",
            "await",
        ],
        patterns: &[r"namespace\s+\w+", r"class\s+\w+", r"using\s+\w+;", r"\w+<\w+>"],
    },
    SignatureSpec {
        language: Language::Php,
        keywords: &[
            "function", "echo", "print", "require", "include", "namespace", "use", "$",
        ],
        patterns: &[
            r"<\?php",
            r"\$\w+\s*=",
            r"function\s+\w+\s*\(.*\)\s*\{",
            r"echo\s+",
        ],
    },
    SignatureSpec {
        language: Language::Ruby,
        keywords: &[
            "def", "end", "class", "module", "require", "include", "attr_accessor", "do",
        ],
        patterns: &[
            r"def\s+\w+",
            r"class\s+\w+",
            r"\w+\.each\s+do",
            r"attr_accessor\s+:\w+",
        ],
    },
    SignatureSpec {
        language: Language::Go,
        keywords: &[
            "func", "package", "import", "var", "const", "struct", "interface", "go", "chan",
            "defer",
        ],
        patterns: &[
            r"func\s+\w+\(",
            r"package\s+\w+",
            r"import\s+\([\s\S]*\)",
            r"type\s+\w+\s+struct",
        ],
    },
    SignatureSpec {
        language: Language::Rust,
        keywords: &[
            "fn", "let", "mut", "struct", "enum", "impl", "trait", "match", "use", "mod",
        ],
        patterns: &[
            r"fn\s+\w+\s*\(",
            r"let\s+mut\s+\w+",
            r"impl\s+\w+\s+for",
            r"use\s+\w+::\w+",
        ],
    },
    SignatureSpec {
        language: Language::Json,
        keywords: &[],
        patterns: &[
            r"^\s*\{[\s\S]*\}\s*$",
            r#""[\w\s]+"\s*:\s*["{\[\d]"#,
            r"\[[\s\S]*\]",
        ],
    },
    SignatureSpec {
        language: Language::Markdown,
        keywords: &[],
        patterns: &[
            r"(?m)^#\s+.*$",
            r"\*\*.*\*\*",
            r"\[.*\]\(.*\)",
            r"```[\s\S]*```",
        ],
    },
];

/// Literal prefixes that decide the language before any scoring
const FAST_PATHS: &[(&str, Language)] = &[
    ("<?xml", Language::Xml),
    ("<!doctype html", Language::Html),
    ("<?php", Language::Php),
];

struct Signature {
    language: Language,
    keywords: &'static [&'static str],
    patterns: Vec<Regex>,
}

static SIGNATURES: Lazy<Vec<Signature>> = Lazy::new(|| {
    SIGNATURE_SPECS
        .iter()
        .map(|entry| Signature {
            language: entry.language,
            keywords: entry.keywords,
            patterns: entry
                .patterns
                .iter()
                .map(|p| Regex::new(p).expect("signature pattern must compile"))
                .collect(),
        })
        .collect()
});

static TYPE_ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(:\s*\w+|<\w+>)").expect("type annotation pattern must compile"));

// ============================================================================
// Detection
// ============================================================================

/// Per-language scores of one detection run, in table order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scores(Vec<(Language, u32)>);

impl Scores {
    pub fn get(&self, language: Language) -> u32 {
        self.0
            .iter()
            .find(|(l, _)| *l == language)
            .map(|(_, s)| *s)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Language, u32)> + '_ {
        self.0.iter().copied()
    }

    fn get_mut(&mut self, language: Language) -> Option<&mut u32> {
        self.0.iter_mut().find(|(l, _)| *l == language).map(|(_, s)| s)
    }

    /// First entry with the strictly highest positive score
    fn best(&self) -> Option<(Language, u32)> {
        let mut best: Option<(Language, u32)> = None;
        for &(language, score) in &self.0 {
            if score > best.map_or(0, |(_, s)| s) {
                best = Some((language, score));
            }
        }
        best
    }
}

/// Returns the best-guess language of `code`, or `Language::Unknown`.
///
/// Pure and deterministic; never fails.
pub fn detect(code: &str) -> Language {
    let normalized = code.trim().to_lowercase();

    if let Some(&(_, language)) = FAST_PATHS
        .iter()
        .find(|(prefix, _)| normalized.starts_with(*prefix))
    {
        return language;
    }

    match score(code, &normalized).best() {
        Some((language, score)) if score > ACCEPTANCE_THRESHOLD => language,
        _ => Language::Unknown,
    }
}

/// Scores every language for `code`. Exposed for diagnostics.
pub fn score_all(code: &str) -> Scores {
    score(code, &code.trim().to_lowercase())
}

fn score(raw: &str, normalized: &str) -> Scores {
    let mut scores = Scores(
        SIGNATURES
            .iter()
            .map(|sig| {
                let keyword_hits = sig
                    .keywords
                    .iter()
                    .filter(|kw| normalized.contains(**kw))
                    .count() as u32;
                let pattern_hits = sig
                    .patterns
                    .iter()
                    .filter(|re| re.is_match(normalized))
                    .count() as u32;
                (
                    sig.language,
                    keyword_hits * KEYWORD_WEIGHT + pattern_hits * PATTERN_WEIGHT,
                )
            })
            .collect(),
    );

    if scores.get(Language::JavaScript) > 0
        && scores.get(Language::TypeScript) > 0
        && TYPE_ANNOTATION.is_match(normalized)
    {
        if let Some(ts) = scores.get_mut(Language::TypeScript) {
            *ts += TYPE_ANNOTATION_BONUS;
        }
    }

    if let Some(json) = scores.get_mut(Language::Json) {
        if *json > 0 {
            // A JSON-looking blob that does not parse can never win as JSON.
            if serde_json::from_str::<serde_json::Value>(raw).is_ok() {
                *json += VALID_JSON_BONUS;
            } else {
                *json = 0;
            }
        }
    }

    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_json() {
        assert_eq!(detect(r#"{"a": 1}"#), Language::Json);
    }

    #[test]
    fn test_malformed_json_is_not_json() {
        let code = r#"{"a": 1,"#;
        assert_eq!(score_all(code).get(Language::Json), 0);
        assert_ne!(detect(code), Language::Json);
    }

    #[test]
    fn test_python_wins_tie_with_ruby() {
        let code = "def foo():\n    return 1";
        let scores = score_all(code);
        assert_eq!(scores.get(Language::Python), scores.get(Language::Ruby));
        assert_eq!(detect(code), Language::Python);
    }

    #[test]
    fn test_short_text_is_unknown() {
        assert_eq!(detect("hi"), Language::Unknown);
        assert_eq!(detect(""), Language::Unknown);
        assert_eq!(detect("   \n "), Language::Unknown);
    }

    #[test]
    fn test_fast_paths() {
        assert_eq!(detect("  <?xml version=\"1.0\"?><a/>"), Language::Xml);
        assert_eq!(detect("<!DOCTYPE html><html></html>"), Language::Html);
        assert_eq!(detect("<?php echo 1;"), Language::Php);
    }

    #[test]
    fn test_rust_snippet() {
        let code = "fn main() {\n    let mut total = 0;\n    for i in 0..3 { total += i; }\n}";
        assert_eq!(detect(code), Language::Rust);
    }

    #[test]
    fn test_sql_snippet() {
        let code = "SELECT id, name FROM users WHERE active = 1 ORDER BY name";
        assert_eq!(detect(code), Language::Sql);
    }

    #[test]
    fn test_typescript_annotation_bonus() {
        let code = "interface User {\n  name: string;\n  age: number;\n}\nconst user: User = load();\nexport function greet(u: User): string { return u.name; }";
        let scores = score_all(code);
        assert!(scores.get(Language::TypeScript) > scores.get(Language::JavaScript));
        assert_eq!(detect(code), Language::TypeScript);
    }

    #[test]
    fn test_go_snippet() {
        let code = "package main\n\nimport (\n\t\"fmt\"\n)\n\nfunc main() {\n\tfmt.Println(\"hi\")\n}";
        assert_eq!(detect(code), Language::Go);
    }

    #[test]
    fn test_detect_is_idempotent() {
        let inputs = [
            "def foo():\n    return 1",
            r#"{"a": [1, 2, 3]}"#,
            "random prose without any code",
            "SELECT * FROM t",
        ];
        for input in inputs {
            assert_eq!(detect(input), detect(input));
        }
    }

    #[test]
    fn test_detect_never_panics_on_odd_input() {
        for input in ["{", "}", "[[[", "\u{0}\u{1}", "#", "```", "<", "$$$$"] {
            let label = detect(input);
            assert!(!label.label().is_empty());
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(Language::CSharp.to_string(), "CSharp");
        assert_eq!(Language::Unknown.to_string(), "Unknown");
        assert!(!Language::Unknown.is_known());
        assert!(Language::Json.is_known());
    }

    #[test]
    fn test_table_order_is_stable() {
        let scores = score_all("anything");
        let order: Vec<Language> = scores.0.iter().map(|(l, _)| *l).collect();
        assert_eq!(order.first(), Some(&Language::JavaScript));
        assert_eq!(order.last(), Some(&Language::Markdown));
        assert_eq!(order.len(), 14);
    }
}
