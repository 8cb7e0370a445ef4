// jgrep - core/pattern.rs
//
// Pattern compiler (C5): turns the user's search string plus flags into a
// compiled `regex::Regex`.

use crate::util::error::PatternError;
use regex::{Regex, RegexBuilder};

/// Flags the caller has already validated as mutually consistent (§4.4:
/// `useRegex` and `word` are mutually exclusive, enforced by the CLI layer
/// before this function is ever called).
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    pub use_regex: bool,
    pub ignore_case: bool,
    pub word: bool,
}

/// `Compile(pattern, useRegex, ignoreCase, word) → CompiledRegex` (§4.4).
pub fn compile(pattern: &str, opts: CompileOptions) -> Result<Regex, PatternError> {
    let body = if opts.use_regex {
        pattern.to_string()
    } else {
        regex::escape(pattern)
    };

    let body = if opts.word {
        format!(r"\b{body}\b")
    } else {
        body
    };

    RegexBuilder::new(&body)
        .case_insensitive(opts.ignore_case)
        .build()
        .map_err(|source| PatternError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_pattern_is_escaped() {
        let re = compile("a.b", CompileOptions::default()).unwrap();
        assert!(re.is_match("a.b"));
        assert!(!re.is_match("axb"));
    }

    #[test]
    fn regex_mode_honors_metacharacters() {
        let opts = CompileOptions {
            use_regex: true,
            ..Default::default()
        };
        let re = compile("a.b", opts).unwrap();
        assert!(re.is_match("axb"));
    }

    #[test]
    fn word_boundary_wrapping() {
        let opts = CompileOptions {
            word: true,
            ..Default::default()
        };
        let re = compile("cat", opts).unwrap();
        assert!(re.is_match("a cat sat"));
        assert!(!re.is_match("category"));
    }

    #[test]
    fn case_insensitive_flag() {
        let opts = CompileOptions {
            ignore_case: true,
            ..Default::default()
        };
        let re = compile("ERROR", opts).unwrap();
        assert!(re.is_match("error"));
    }

    #[test]
    fn invalid_regex_syntax_surfaces_pattern_error() {
        let opts = CompileOptions {
            use_regex: true,
            ..Default::default()
        };
        let err = compile("(unclosed", opts).unwrap_err();
        match err {
            PatternError::InvalidRegex { pattern, .. } => assert_eq!(pattern, "(unclosed"),
        }
    }
}
