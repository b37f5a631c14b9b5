//! Which refs are in scope for protection.
//!
//! Branch patterns are short names like `release/.*`. They are matched against the full ref
//! name behind a literal `refs/heads/` prefix, so they never match tags or other namespaces.

use crate::config::{FilterMode, RuleConfig};
use crate::pattern::PatternSet;
use crate::Error;

/// The namespace branch patterns are anchored to.
pub const HEADS_PREFIX: &str = "refs/heads/";

/// A compiled branch filter.
#[derive(Debug, Clone)]
pub struct BranchFilter {
    mode: FilterMode,
    branches: PatternSet,
}

impl BranchFilter {
    /// Compile the branch filter of `config`.
    ///
    /// Branch patterns are only compiled if the mode needs them.
    pub fn new(config: &RuleConfig) -> Result<Self, Error> {
        let branches = match config.filter_mode {
            FilterMode::All => PatternSet::default(),
            FilterMode::Include | FilterMode::Exclude => {
                PatternSet::compile_with_prefix(HEADS_PREFIX, &config.branch_patterns)?
            }
        };
        Ok(Self {
            mode: config.filter_mode,
            branches,
        })
    }

    /// Return true if `ref_id` is protected under this filter.
    pub fn is_in_scope(&self, ref_id: &str) -> bool {
        match self.mode {
            FilterMode::All => true,
            FilterMode::Include => self.branches.is_match(ref_id),
            FilterMode::Exclude => !self.branches.is_match(ref_id),
        }
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }
}

/// Return true if `ref_id` is in scope for `config`, compiling its branch filter first.
pub fn is_in_scope(config: &RuleConfig, ref_id: &str) -> Result<bool, Error> {
    Ok(BranchFilter::new(config)?.is_in_scope(ref_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFS: &[&str] = &[
        "refs/heads/release/1.0",
        "refs/heads/release/",
        "refs/heads/main",
        "refs/heads/feature/release/x",
        "refs/tags/release/1.0",
        "refs/pull/1/head",
        "release/1.0",
    ];

    fn config(mode: FilterMode) -> RuleConfig {
        RuleConfig::new([".*"]).with_branch_filter(mode, ["release/.*"])
    }

    #[test]
    fn all_covers_every_ref() {
        let filter = BranchFilter::new(&config(FilterMode::All)).unwrap();
        assert!(REFS.iter().all(|r| filter.is_in_scope(r)));
    }

    #[test]
    fn include_covers_matching_branches_only() {
        let filter = BranchFilter::new(&config(FilterMode::Include)).unwrap();
        assert!(filter.is_in_scope("refs/heads/release/1.0"));
        assert!(filter.is_in_scope("refs/heads/release/"));
        assert!(!filter.is_in_scope("refs/heads/main"));
        assert!(!filter.is_in_scope("refs/heads/feature/release/x"));
        assert!(!filter.is_in_scope("refs/tags/release/1.0"), "tags never match branch patterns");
        assert!(!filter.is_in_scope("release/1.0"));
    }

    #[test]
    fn exclude_is_the_complement_of_include() {
        let include = BranchFilter::new(&config(FilterMode::Include)).unwrap();
        let exclude = BranchFilter::new(&config(FilterMode::Exclude)).unwrap();
        for r in REFS {
            assert_eq!(include.is_in_scope(r), !exclude.is_in_scope(r), "{r}");
        }
    }

    #[test]
    fn include_without_patterns_covers_nothing() {
        let config = RuleConfig::new([".*"]).with_branch_filter(FilterMode::Include, Vec::<String>::new());
        assert!(!is_in_scope(&config, "refs/heads/main").unwrap());
    }

    #[test]
    fn invalid_branch_pattern_fails_closed() {
        let config = RuleConfig::new([".*"]).with_branch_filter(FilterMode::Exclude, ["release/("]);
        let err = is_in_scope(&config, "refs/heads/main").unwrap_err();
        assert_eq!(err.kind(), crate::Kind::Configuration);
    }

    #[test]
    fn patterns_are_ignored_when_all_refs_are_covered() {
        let config = RuleConfig::new([".*"]).with_branch_filter(FilterMode::All, ["release/("]);
        assert!(is_in_scope(&config, "refs/heads/main").unwrap());
    }
}
