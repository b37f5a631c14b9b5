//! Matching of changed paths against protected path patterns.

use crate::history::ResolvedCommit;
use crate::pattern::PatternSet;
use crate::violation::Violation;

/// Collect one [`Violation`] per changed path and matching pattern.
///
/// Order follows the input: commits in resolution order, paths in per-commit order, patterns in
/// configured order. A path matching several patterns yields several violations, and nothing is
/// deduplicated.
pub fn collect_violations(resolved: &[ResolvedCommit], patterns: &PatternSet, ref_id: &str) -> Vec<Violation> {
    resolved
        .iter()
        .flat_map(move |resolved| {
            resolved.changes.iter().flat_map(move |change| {
                patterns.matching(&change.path).map(move |pattern| Violation {
                    ref_id: ref_id.to_owned(),
                    commit_id: resolved.commit.id.clone(),
                    path: change.path.clone(),
                    pattern: pattern.as_str().to_owned(),
                })
            })
        })
        .collect()
}
