//! End-to-end evaluation of ref updates against an in-memory history.

use gix_protect_paths::config::{FilterMode, RuleConfig};
use gix_protect_paths::engine::Evaluator;
use gix_protect_paths::history::{ChangeKind, InMemoryHistory};
use gix_protect_paths::permission::{ActingUser, StaticPermissions};
use gix_protect_paths::policy::BranchFilter;
use gix_protect_paths::refs::RefUpdate;
use gix_protect_paths::{Kind, Violation};
use pretty_assertions::assert_eq;

const CONFIG_YAML: &str = "config/.*\\.yaml";

fn history() -> InMemoryHistory {
    let mut history = InMemoryHistory::default();
    history
        .add_commit("c0", &[], &[("README.md", ChangeKind::Added)])
        .add_commit(
            "c1",
            &["c0"],
            &[("config/prod.yaml", ChangeKind::Modified), ("src/app.go", ChangeKind::Modified)],
        )
        .add_commit("c2", &["c0"], &[("src/app.go", ChangeKind::Modified)])
        .add_commit("c3", &["c1"], &[("config/dev.yaml", ChangeKind::Added), ("docs/x.md", ChangeKind::Added)]);
    history
}

fn alice() -> ActingUser {
    ActingUser::new("alice", false).expect("valid user")
}

fn main_update(from: &str, to: &str) -> RefUpdate {
    RefUpdate::new("refs/heads/main", Some(from.to_owned()), to).expect("valid update")
}

fn rendered(violations: &[Violation]) -> Vec<String> {
    violations.iter().map(ToString::to_string).collect()
}

#[test]
fn single_protected_change_is_one_violation() -> anyhow::Result<()> {
    let evaluator = Evaluator::new(history());
    let violations = evaluator.evaluate(&RuleConfig::new([CONFIG_YAML]), &alice(), &main_update("c0", "c1"))?;
    assert_eq!(
        violations,
        vec![Violation {
            ref_id: "refs/heads/main".into(),
            commit_id: "c1".into(),
            path: "config/prod.yaml".into(),
            pattern: CONFIG_YAML.into(),
        }]
    );
    assert_eq!(
        rendered(&violations),
        vec!["refs/heads/main: c1 matches restricted path config/.*\\.yaml"]
    );
    Ok(())
}

#[test]
fn unprotected_changes_pass() -> anyhow::Result<()> {
    let evaluator = Evaluator::new(history());
    let violations = evaluator.evaluate(&RuleConfig::new([CONFIG_YAML]), &alice(), &main_update("c0", "c2"))?;
    assert!(violations.is_empty());
    Ok(())
}

#[test]
fn overlapping_patterns_are_not_deduplicated() -> anyhow::Result<()> {
    let evaluator = Evaluator::new(history());
    let config = RuleConfig::new([CONFIG_YAML, "config/prod\\..*"]);
    let violations = evaluator.evaluate(&config, &alice(), &main_update("c0", "c1"))?;
    assert_eq!(
        rendered(&violations),
        vec![
            "refs/heads/main: c1 matches restricted path config/.*\\.yaml",
            "refs/heads/main: c1 matches restricted path config/prod\\..*",
        ]
    );
    Ok(())
}

#[test]
fn multi_commit_ranges_report_in_history_order() -> anyhow::Result<()> {
    let evaluator = Evaluator::builder().with_page_size(1).history(history()).build();
    let config = RuleConfig::new([CONFIG_YAML, "docs/.*"]);
    let violations = evaluator.evaluate(&config, &alice(), &main_update("c0", "c3"))?;
    let summary: Vec<_> = violations
        .iter()
        .map(|v| (v.commit_id.as_str(), v.path.as_str(), v.pattern.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("c3", "config/dev.yaml", CONFIG_YAML),
            ("c3", "docs/x.md", "docs/.*"),
            ("c1", "config/prod.yaml", CONFIG_YAML),
        ]
    );
    Ok(())
}

#[test]
fn new_branches_are_checked_from_the_root() -> anyhow::Result<()> {
    let evaluator = Evaluator::new(history());
    let update = RefUpdate::new("refs/heads/feature", None, "c1")?;
    let violations = evaluator.evaluate(&RuleConfig::new(["README\\.md", CONFIG_YAML]), &alice(), &update)?;
    let commits: Vec<_> = violations.iter().map(|v| v.commit_id.as_str()).collect();
    assert_eq!(commits, vec!["c1", "c0"]);
    Ok(())
}

#[test]
fn evaluation_is_deterministic() -> anyhow::Result<()> {
    let evaluator = Evaluator::new(history());
    let config = RuleConfig::new([".*"]);
    let first = evaluator.evaluate(&config, &alice(), &main_update("c0", "c3"))?;
    let second = evaluator.evaluate(&config, &alice(), &main_update("c0", "c3"))?;
    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
    Ok(())
}

#[test]
fn empty_patterns_never_report() -> anyhow::Result<()> {
    let evaluator = Evaluator::new(history());
    for (from, to) in [("c0", "c1"), ("c0", "c3"), ("c1", "c3")] {
        assert!(evaluator
            .evaluate(&RuleConfig::default(), &alice(), &main_update(from, to))?
            .is_empty());
    }
    assert_eq!(evaluator.history().calls(), 0);
    Ok(())
}

#[test]
fn admins_are_exempt() -> anyhow::Result<()> {
    let evaluator = Evaluator::new(history());
    let permissions = StaticPermissions::new(["root"]);
    let admin = ActingUser::resolve("root", &permissions)?;
    for config in [RuleConfig::new([".*"]), RuleConfig::new([CONFIG_YAML]).with_excluded_users(["bob"])] {
        assert!(evaluator.evaluate(&config, &admin, &main_update("c0", "c3"))?.is_empty());
    }
    Ok(())
}

#[test]
fn excluded_users_are_exempt() -> anyhow::Result<()> {
    let evaluator = Evaluator::new(history());
    let config = RuleConfig::new([".*"]).with_excluded_users(["deploy-bot"]);
    let bot = ActingUser::new("deploy-bot", false)?;
    assert!(evaluator.evaluate(&config, &bot, &main_update("c0", "c3"))?.is_empty());
    assert!(!evaluator.evaluate(&config, &alice(), &main_update("c0", "c3"))?.is_empty());
    Ok(())
}

#[test]
fn branch_filter_scopes_evaluation() -> anyhow::Result<()> {
    let evaluator = Evaluator::new(history());
    let include = RuleConfig::new([CONFIG_YAML]).with_branch_filter(FilterMode::Include, ["release/.*"]);
    let exclude = RuleConfig::new([CONFIG_YAML]).with_branch_filter(FilterMode::Exclude, ["release/.*"]);
    let release = RefUpdate::new("refs/heads/release/1.0", Some("c0".into()), "c1")?;
    let main = main_update("c0", "c1");

    assert_eq!(evaluator.evaluate(&include, &alice(), &release)?.len(), 1);
    assert!(evaluator.evaluate(&include, &alice(), &main)?.is_empty());
    assert!(evaluator.evaluate(&exclude, &alice(), &release)?.is_empty());
    assert_eq!(evaluator.evaluate(&exclude, &alice(), &main)?.len(), 1);
    Ok(())
}

#[test]
fn include_and_exclude_are_complements() -> anyhow::Result<()> {
    let patterns = ["release/.*", "hotfix-[0-9]+"];
    let include = BranchFilter::new(&RuleConfig::new([".*"]).with_branch_filter(FilterMode::Include, patterns))?;
    let exclude = BranchFilter::new(&RuleConfig::new([".*"]).with_branch_filter(FilterMode::Exclude, patterns))?;
    for ref_id in [
        "refs/heads/release/1.0",
        "refs/heads/main",
        "refs/heads/hotfix-12",
        "refs/heads/hotfix-x",
        "refs/tags/release/1.0",
        "refs/notes/commits",
    ] {
        assert_eq!(include.is_in_scope(ref_id), !exclude.is_in_scope(ref_id), "{ref_id}");
    }
    assert!(include.is_in_scope("refs/heads/release/1.0"));
    assert!(!include.is_in_scope("refs/heads/main"));
    Ok(())
}

#[test]
fn host_failures_abort_without_partial_results() {
    let history = history();
    let evaluator = Evaluator::builder().with_page_size(1).history(&history).build();
    history.fail_after(2);
    let err = evaluator
        .evaluate(&RuleConfig::new([".*"]), &alice(), &main_update("c0", "c3"))
        .unwrap_err();
    assert_eq!(err.kind(), Kind::HostUnavailable);
}

#[test]
fn unknown_commits_are_errors() {
    let evaluator = Evaluator::new(history());
    let err = evaluator
        .evaluate(&RuleConfig::new([".*"]), &alice(), &main_update("c0", "nope"))
        .unwrap_err();
    assert_eq!(err.kind(), Kind::NotFound);
}

#[test]
fn invalid_branch_patterns_fail_closed() {
    let evaluator = Evaluator::new(history());
    let config = RuleConfig::new([".*"]).with_branch_filter(FilterMode::Include, ["release/("]);
    let err = evaluator
        .evaluate(&config, &alice(), &main_update("c0", "c1"))
        .unwrap_err();
    assert_eq!(err.kind(), Kind::Configuration);
}
