//! Evaluation of ref updates against protected path rules.

use crate::config::RuleConfig;
use crate::history::{ChangesetResolver, CommitHistory, MAX_PAGE_LIMIT};
use crate::interrupt::CancellationFlag;
use crate::matcher::collect_violations;
use crate::pattern::PatternSet;
use crate::permission::ActingUser;
use crate::policy::{should_skip, BranchFilter};
use crate::refs::RefUpdate;
use crate::violation::Violation;
use crate::Error;
use std::sync::Arc;

/// Typestates of the [`EvaluatorBuilder`].
pub mod state {
    /// No commit history was configured yet, so nothing can be built.
    #[derive(Debug, Clone, Copy)]
    pub struct NoHistory;
}

/// Builder for an [`Evaluator`], buildable once a commit history is set.
#[derive(Debug, Clone)]
pub struct EvaluatorBuilder<H = state::NoHistory> {
    history: H,
    page_size: usize,
    cancellation: Option<Arc<CancellationFlag>>,
}

impl<H> EvaluatorBuilder<H> {
    /// Read commits and changes from `history`.
    pub fn history<T: CommitHistory>(self, history: T) -> EvaluatorBuilder<T> {
        EvaluatorBuilder {
            history,
            page_size: self.page_size,
            cancellation: self.cancellation,
        }
    }

    /// Ask the history for at most `page_size` results per call.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Abort with [`Error::Cancelled`] once `flag` is cancelled.
    pub fn with_cancellation(mut self, flag: Arc<CancellationFlag>) -> Self {
        self.cancellation = Some(flag);
        self
    }
}

impl<H: CommitHistory> EvaluatorBuilder<H> {
    /// Finalize the builder. This does no I/O.
    pub fn build(self) -> Evaluator<H> {
        let mut resolver = ChangesetResolver::new(self.history).with_page_size(self.page_size);
        if let Some(flag) = self.cancellation {
            resolver = resolver.with_cancellation(flag);
        }
        Evaluator { resolver }
    }
}

/// Decides which commits of a ref update touch protected paths.
///
/// Evaluation keeps no state between calls. The same inputs against the same history
/// always produce the same violations in the same order.
#[derive(Debug, Clone)]
pub struct Evaluator<H> {
    resolver: ChangesetResolver<H>,
}

impl Evaluator<state::NoHistory> {
    /// Start configuring an evaluator.
    pub fn builder() -> EvaluatorBuilder<state::NoHistory> {
        EvaluatorBuilder {
            history: state::NoHistory,
            page_size: MAX_PAGE_LIMIT,
            cancellation: None,
        }
    }
}

impl<H: CommitHistory> Evaluator<H> {
    /// Create an evaluator with default settings reading from `history`.
    pub fn new(history: H) -> Self {
        Evaluator::builder().history(history).build()
    }

    pub fn history(&self) -> &H {
        self.resolver.history()
    }

    /// Return the violations `update` introduces when performed by `user`.
    ///
    /// Nothing is checked for exempt users, without path patterns, or for refs outside the
    /// branch filter. Otherwise every commit of the update is resolved and each of its changed
    /// paths is matched against every path pattern. `update` and the patterns are checked before
    /// the history is queried, so invalid input fails without I/O.
    pub fn evaluate(&self, config: &RuleConfig, user: &ActingUser, update: &RefUpdate) -> Result<Vec<Violation>, Error> {
        update.check()?;
        if should_skip(config, user) {
            gix_trace::debug!("skipping {} for exempt user '{}'", update.ref_id, user.identifier());
            return Ok(Vec::new());
        }
        if !config.is_active() {
            gix_trace::debug!("no protected paths configured");
            return Ok(Vec::new());
        }
        let patterns = PatternSet::compile(&config.path_patterns)?;
        if !BranchFilter::new(config)?.is_in_scope(&update.ref_id) {
            gix_trace::debug!("{} is outside the {} branch filter", update.ref_id, config.filter_mode);
            return Ok(Vec::new());
        }

        let resolved = self.resolver.resolve(update.from_hash.as_deref(), &update.to_hash)?;
        let violations = collect_violations(&resolved, &patterns, &update.ref_id);
        if !violations.is_empty() {
            gix_trace::info!("{} violation(s) on {}", violations.len(), update.ref_id);
        }
        Ok(violations)
    }

    /// Evaluate all `updates` in order and concatenate their violations.
    ///
    /// The first error aborts the whole evaluation.
    pub fn evaluate_all(
        &self,
        config: &RuleConfig,
        user: &ActingUser,
        updates: &[RefUpdate],
    ) -> Result<Vec<Violation>, Error> {
        let mut out = Vec::new();
        for update in updates {
            out.extend(self.evaluate(config, user, update)?);
        }
        Ok(out)
    }
}
