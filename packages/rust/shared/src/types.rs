//! Core domain types for nbdeploy.

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};

/// File extension of source notebooks.
pub const NOTEBOOK_EXTENSION: &str = "ipynb";

/// File extension of generated documents.
pub const GENERATED_EXTENSION: &str = "html";

// ---------------------------------------------------------------------------
// Year
// ---------------------------------------------------------------------------

/// The filename-prefix key partitioning notebooks and generated documents.
///
/// No format validation is performed: a value that is not a year simply
/// matches no files. Glob metacharacters are escaped when building patterns,
/// so a year only ever matches its own literal prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Year(String);

impl Year {
    /// The current local calendar year, formatted as four digits.
    ///
    /// Evaluated on every call.
    pub fn current() -> Self {
        Self(format!("{:04}", Local::now().year()))
    }

    /// Use the supplied year, or the current one when absent.
    pub fn or_current(year: Option<Year>) -> Self {
        year.unwrap_or_else(Self::current)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File-name pattern of the generated documents for this year
    /// (`{year}-*.html`).
    pub fn generated_pattern(&self) -> String {
        self.file_pattern(GENERATED_EXTENSION)
    }

    /// File-name pattern of the source notebooks for this year
    /// (`{year}-*.ipynb`).
    pub fn notebook_pattern(&self) -> String {
        self.file_pattern(NOTEBOOK_EXTENSION)
    }

    fn file_pattern(&self, extension: &str) -> String {
        format!("{}-*.{extension}", glob::Pattern::escape(&self.0))
    }
}

impl std::fmt::Display for Year {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Year {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Year {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::str::FromStr for Year {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Table of contents
// ---------------------------------------------------------------------------

/// A single anchor link in the aggregate index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocLink {
    /// Link text: the document's file name.
    pub title: String,
    /// Path relative to the index root (`{year}/{file}`).
    pub href: String,
}

/// All links belonging to one year directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocSection {
    /// Directory name, treated as the year key.
    pub year: String,
    pub links: Vec<TocLink>,
}

/// Aggregate index over every generated document, most recent year first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOfContents {
    pub sections: Vec<TocSection>,
}

impl TableOfContents {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Total number of links across all sections.
    pub fn link_count(&self) -> usize {
        self.sections.iter().map(|s| s.links.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_year_is_four_digits() {
        let year = Year::current();
        assert_eq!(year.as_str().len(), 4);
        assert!(year.as_str().chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn defaulted_year_matches_explicit_current_year() {
        let defaulted = Year::or_current(None);
        let explicit = Year::from(Local::now().year().to_string());
        assert_eq!(defaulted.generated_pattern(), explicit.generated_pattern());
        assert_eq!(defaulted.notebook_pattern(), explicit.notebook_pattern());
    }

    #[test]
    fn patterns_follow_year_prefix_convention() {
        let year: Year = "2022".parse().unwrap();
        assert_eq!(year.generated_pattern(), "2022-*.html");
        assert_eq!(year.notebook_pattern(), "2022-*.ipynb");
    }

    #[test]
    fn glob_metacharacters_are_escaped() {
        let year = Year::from("*");
        assert_eq!(year.generated_pattern(), "[*]-*.html");

        let pattern = glob::Pattern::new(&year.generated_pattern()).unwrap();
        assert!(pattern.matches("*-talk.html"));
        assert!(!pattern.matches("2022-talk.html"));
    }

    #[test]
    fn year_serializes_transparently() {
        let year = Year::from("2021");
        let toml_str = toml::to_string(&std::collections::BTreeMap::from([("year", &year)]))
            .expect("serialize");
        assert_eq!(toml_str.trim(), "year = \"2021\"");
    }

    #[test]
    fn toc_link_count() {
        let toc = TableOfContents {
            sections: vec![
                TocSection {
                    year: "2022".into(),
                    links: vec![
                        TocLink {
                            title: "b.html".into(),
                            href: "2022/b.html".into(),
                        },
                        TocLink {
                            title: "a.html".into(),
                            href: "2022/a.html".into(),
                        },
                    ],
                },
                TocSection {
                    year: "2021".into(),
                    links: vec![],
                },
            ],
        };
        assert_eq!(toc.link_count(), 2);
        assert!(!toc.is_empty());
        assert!(TableOfContents::default().is_empty());
    }
}
