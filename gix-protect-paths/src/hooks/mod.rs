//! Callers of the evaluation: a git `pre-receive` hook and a merge check.
//!
//! - `pre_receive`: evaluates every ref update of one push and rejects the whole push if
//!   any of them introduces a violation.
//! - `merge_check`: evaluates the commits a merge would bring into its target ref and vetoes
//!   the merge if any of them introduces a violation.
//!
//! Errors are returned as such. Callers must reject the operation on error.
//!
//! # Examples
//!
//! ```rust
//! use gix_protect_paths::config::RuleConfig;
//! use gix_protect_paths::engine::Evaluator;
//! use gix_protect_paths::history::{ChangeKind, InMemoryHistory};
//! use gix_protect_paths::hooks::{Hook, ProtectPaths};
//! use gix_protect_paths::permission::ActingUser;
//! use gix_protect_paths::refs::RefUpdate;
//!
//! let mut history = InMemoryHistory::default();
//! history.add_commit("c1", &[], &[("config/prod.yaml", ChangeKind::Modified)]);
//!
//! let mut hook = ProtectPaths::new(
//!     Evaluator::new(history),
//!     RuleConfig::new(["config/.*\\.yaml"]),
//!     ActingUser::new("alice", false)?,
//! );
//! let decision = hook.pre_receive(&[RefUpdate::new("refs/heads/main", None, "c1")?])?;
//! assert!(!decision.allowed);
//! assert_eq!(decision.details.last().map(String::as_str), Some("refs/heads/main: c1 matches restricted path config/.*\\.yaml"));
//! # Ok::<(), gix_protect_paths::Error>(())
//! ```

use crate::refs::RefUpdate;
use crate::violation::Violation;
use crate::Error;

pub mod noop;
pub mod protect;

pub use noop::NoopHook;
pub use protect::ProtectPaths;

/// The first line of a rejected push.
pub const PUSH_REJECTED: &str = "Push rejected!";
/// Follows [`PUSH_REJECTED`] in a rejected push.
pub const PUSH_REASON: &str = "There are changes to protected paths.";
/// The summary of a vetoed merge.
pub const MERGE_VETOED: &str = "There are changes to protected paths!";

/// Whether an operation may proceed, and what to tell the user if not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookDecision {
    pub allowed: bool,
    /// Exit code for the hook process.
    pub exit_code: Option<i32>,
    /// Summary of the decision, empty if allowed.
    pub message: String,
    /// Lines printed after the summary.
    pub details: Vec<String>,
    /// The violations behind a denial.
    pub violations: Vec<Violation>,
}

impl HookDecision {
    /// Create a decision that allows the operation.
    pub fn allow() -> Self {
        Self {
            allowed: true,
            exit_code: Some(0),
            message: String::new(),
            details: Vec::new(),
            violations: Vec::new(),
        }
    }

    /// Create a decision that denies the operation.
    pub fn deny(message: impl Into<String>) -> Self {
        Self {
            allowed: false,
            exit_code: Some(1),
            message: message.into(),
            details: Vec::new(),
            violations: Vec::new(),
        }
    }

    /// Add `details` lines.
    pub fn with_details(mut self, details: impl IntoIterator<Item = String>) -> Self {
        self.details.extend(details);
        self
    }

    /// Attach the `violations` behind this decision.
    pub fn with_violations(mut self, violations: Vec<Violation>) -> Self {
        self.violations = violations;
        self
    }

    /// The status the hook process exits with.
    ///
    /// Denials never exit with 0. A missing or out-of-range `exit_code` becomes 0 if allowed
    /// and 1 otherwise.
    pub fn status(&self) -> u8 {
        match self.exit_code.and_then(|code| u8::try_from(code).ok()) {
            Some(code) if (code == 0) == self.allowed => code,
            _ => u8::from(!self.allowed),
        }
    }

    /// The details as a single newline-separated text.
    pub fn detail_text(&self) -> String {
        self.details.join("\n")
    }

    /// Write the message and all details, one per line. Allowed decisions write nothing.
    pub fn write_report(&self, out: &mut impl std::io::Write) -> std::io::Result<()> {
        if self.allowed {
            return Ok(());
        }
        writeln!(out, "{}", self.message)?;
        for line in &self.details {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }
}

/// A merge about to be performed: `source_commit` is merged into `target_ref`, which currently
/// points to `target_commit`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MergeRequest {
    pub target_ref: String,
    pub target_commit: String,
    pub source_commit: String,
}

impl MergeRequest {
    /// The ref update equivalent to performing the merge: everything reachable from the
    /// source but not from the target lands on the target ref.
    pub fn to_ref_update(&self) -> Result<RefUpdate, Error> {
        RefUpdate::new(
            self.target_ref.clone(),
            Some(self.target_commit.clone()),
            self.source_commit.clone(),
        )
    }
}

/// Decides on pushes and merges.
pub trait Hook {
    /// Decide on all ref updates of one push at once.
    fn pre_receive(&mut self, updates: &[RefUpdate]) -> Result<HookDecision, Error>;

    /// Decide on a single merge.
    fn merge_check(&mut self, request: &MergeRequest) -> Result<HookDecision, Error>;
}

impl<T: Hook + ?Sized> Hook for Box<T> {
    fn pre_receive(&mut self, updates: &[RefUpdate]) -> Result<HookDecision, Error> {
        (**self).pre_receive(updates)
    }

    fn merge_check(&mut self, request: &MergeRequest) -> Result<HookDecision, Error> {
        (**self).merge_check(request)
    }
}
