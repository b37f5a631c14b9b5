//! Whole-string regular-expression patterns.
//!
//! A pattern matches only if it matches the entire subject, never a substring of it.

use crate::Error;
use regex::Regex;

/// A compiled pattern that must match its subject from start to end.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `pattern` for whole-string matching.
    pub fn new(pattern: &str) -> Result<Self, Error> {
        Self::compile(pattern, "")
    }

    /// Compile `pattern` so it only matches subjects starting with the literal `prefix`.
    ///
    /// The pattern is grouped, so an alternation in it can't escape the prefix.
    pub fn with_prefix(prefix: &str, pattern: &str) -> Result<Self, Error> {
        Self::compile(pattern, prefix)
    }

    fn compile(pattern: &str, prefix: &str) -> Result<Self, Error> {
        let invalid = |source| Error::InvalidPattern {
            pattern: pattern.to_owned(),
            source,
        };
        // Unbalanced groups like `a)|(b` would otherwise compile once wrapped.
        Regex::new(pattern).map_err(invalid)?;
        let regex = Regex::new(&format!("^{}(?:{pattern})$", regex::escape(prefix))).map_err(invalid)?;
        Ok(Self {
            source: pattern.to_owned(),
            regex,
        })
    }

    /// The pattern as configured, without anchors or prefix.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Return true if the whole of `subject` matches.
    pub fn is_match(&self, subject: &str) -> bool {
        self.regex.is_match(subject)
    }
}

/// An ordered set of compiled patterns.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// Compile all `patterns`, keeping their order. The first invalid one fails the set.
    pub fn compile<I, S>(patterns: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::compile_with_prefix("", patterns)
    }

    /// Like [`compile()`](Self::compile()), with every pattern anchored behind the literal `prefix`.
    pub fn compile_with_prefix<I, S>(prefix: &str, patterns: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| Pattern::with_prefix(prefix, p.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(Self { patterns })
    }

    /// All patterns matching `subject`, in configured order.
    pub fn matching<'a>(&'a self, subject: &'a str) -> impl Iterator<Item = &'a Pattern> + 'a {
        self.patterns.iter().filter(move |p| p.is_match(subject))
    }

    /// Return true if any pattern matches `subject`.
    pub fn is_match(&self, subject: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(subject))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
