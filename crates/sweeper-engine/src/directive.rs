//! Recognises the lines that are candidates for removal.
//!
//! A candidate is a preprocessor inclusion directive such as
//! `#include <vector>` or `  #  include "widget.h"`. Detection is purely
//! lexical and byte-based so files in any 8-bit encoding are handled. Lines
//! that start with a comment are never candidates, even when the comment
//! quotes a directive.

/// Matches preprocessor directives by keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveMatcher {
    keywords: Vec<Vec<u8>>,
}

impl DirectiveMatcher {
    /// Creates a matcher for the given keywords (for example `include`).
    /// Blank keywords are ignored.
    #[must_use]
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|keyword| keyword.as_ref().trim().as_bytes().to_vec())
                .filter(|keyword| !keyword.is_empty())
                .collect(),
        }
    }

    /// Returns true when `line` is an inclusion directive.
    #[must_use]
    pub fn is_candidate(&self, line: &[u8]) -> bool {
        let Some(after_hash) = trim_start(line).strip_prefix(b"#") else {
            return false;
        };
        let directive = trim_start(after_hash);
        self.keywords.iter().any(|keyword| {
            directive.strip_prefix(keyword.as_slice()).is_some_and(ends_keyword)
        })
    }
}

impl Default for DirectiveMatcher {
    fn default() -> Self {
        Self::new(["include"])
    }
}

/// The keyword must be followed by whitespace or the start of a path so
/// that `#includes` or `#include_next` style words are not confused with it.
fn ends_keyword(after: &[u8]) -> bool {
    after
        .first()
        .is_some_and(|byte| byte.is_ascii_whitespace() || matches!(byte, b'<' | b'"'))
}

fn trim_start(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|byte| !matches!(byte, b' ' | b'\t' | b'\x0b' | b'\x0c'))
        .unwrap_or(bytes.len());
    bytes.get(start..).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::angle(b"#include <vector>\n".as_slice(), true)]
    #[case::quoted(b"#include \"widget.h\"\r\n".as_slice(), true)]
    #[case::indented(b"   #include <map>".as_slice(), true)]
    #[case::spaced_hash(b"#  include <map>".as_slice(), true)]
    #[case::tab_separated(b"#include\t<map>".as_slice(), true)]
    #[case::no_space(b"#include<map>".as_slice(), true)]
    #[case::line_comment(b"// #include <map>".as_slice(), false)]
    #[case::block_comment(b"/* #include <map> */".as_slice(), false)]
    #[case::other_directive(b"#pragma once".as_slice(), false)]
    #[case::longer_word(b"#include_next <map>".as_slice(), false)]
    #[case::bare_keyword(b"#include".as_slice(), false)]
    #[case::code(b"int include = 0;".as_slice(), false)]
    #[case::non_utf8_path(b"#include \"\xe9t\xe9.h\"".as_slice(), true)]
    fn detects_include_directives(#[case] line: &[u8], #[case] expected: bool) {
        assert_eq!(DirectiveMatcher::default().is_candidate(line), expected);
    }

    #[test]
    fn extra_keywords_are_recognised() {
        let matcher = DirectiveMatcher::new(["include", "import"]);
        assert!(matcher.is_candidate(b"#import <Foundation/Foundation.h>"));
        assert!(matcher.is_candidate(b"#include <a>"));
    }

    #[test]
    fn blank_keywords_match_nothing() {
        let matcher = DirectiveMatcher::new([" "]);
        assert!(!matcher.is_candidate(b"# <a>"));
    }
}
