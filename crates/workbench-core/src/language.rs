//! Language identity and the file name / content language detector.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// The closed set of interpreter languages the workbench can drive.
///
/// Every per-language behaviour (run, debug, format, preamble) is resolved by
/// matching on this enum, so adding a variant forces every table to be
/// extended.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    /// Imperative language (Python).
    Python,
    /// Symbolic/functional language (Scheme).
    Scheme,
    /// Query language (SQL).
    Sql,
}

impl Language {
    /// File extension mapped to this language.
    pub fn extension(&self) -> &'static str {
        match self {
            Language::Python => ".py",
            Language::Scheme => ".scm",
            Language::Sql => ".sql",
        }
    }

    /// Resolves the language for a file.
    ///
    /// A known extension on `file_name` wins outright. Otherwise the
    /// lower-cased `source` is checked for, in order: a `def ` keyword
    /// (Python), a `select` keyword (SQL), a leading `(` or any `;` (Scheme).
    /// Anything else falls back to Python.
    ///
    /// The result is never cached by callers: the name or the text may have
    /// changed since the last call.
    ///
    /// # Examples
    ///
    /// ```
    /// use workbench_core::Language;
    ///
    /// assert_eq!(Language::detect("a.py", "select 1;"), Language::Python);
    /// assert_eq!(Language::detect("a.txt", "(+ 1 2)"), Language::Scheme);
    /// ```
    pub fn detect(file_name: &str, source: &str) -> Language {
        let name = file_name.to_lowercase();
        if name.ends_with(Language::Python.extension()) {
            return Language::Python;
        } else if name.ends_with(Language::Scheme.extension()) {
            return Language::Scheme;
        } else if name.ends_with(Language::Sql.extension()) {
            return Language::Sql;
        }

        let code = source.to_lowercase();
        if code.contains("def ") {
            Language::Python
        } else if code.contains("select") {
            Language::Sql
        } else if code.trim().starts_with('(') || code.contains(';') {
            Language::Scheme
        } else {
            Language::Python
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_extension_wins_over_content() {
        assert_eq!(Language::detect("a.py", "select * from t"), Language::Python);
        assert_eq!(Language::detect("Q.SQL", "def f(): pass"), Language::Sql);
        assert_eq!(Language::detect("lab.scm", ""), Language::Scheme);
    }

    #[test]
    fn test_content_signals() {
        assert_eq!(Language::detect("a.txt", "select * from t"), Language::Sql);
        assert_eq!(Language::detect("a.txt", "SELECT name FROM people"), Language::Sql);
        assert_eq!(Language::detect("a.txt", "(+ 1 2)"), Language::Scheme);
        assert_eq!(Language::detect("a.txt", "  (define x 3)"), Language::Scheme);
        assert_eq!(Language::detect("a.txt", "x ; comment"), Language::Scheme);
        assert_eq!(Language::detect("a.txt", "print(1)"), Language::Python);
    }

    #[test]
    fn test_definition_keyword_beats_query_keyword() {
        let code = "def select_all():\n    return 1";
        assert_eq!(Language::detect("untitled", code), Language::Python);
    }

    #[test]
    fn test_empty_source_defaults_to_python() {
        assert_eq!(Language::detect("untitled", ""), Language::Python);
    }

    #[test]
    fn test_string_round_trip() {
        for language in Language::iter() {
            let parsed = Language::from_str(language.as_ref()).unwrap();
            assert_eq!(parsed, language);
        }
        assert_eq!(Language::Sql.to_string(), "sql");
    }
}
