use super::{Hook, HookDecision, MergeRequest, MERGE_VETOED, PUSH_REASON, PUSH_REJECTED};
use crate::config::RuleConfig;
use crate::engine::Evaluator;
use crate::history::CommitHistory;
use crate::permission::ActingUser;
use crate::refs::RefUpdate;
use crate::Error;

/// Rejects pushes and merges that introduce changes to protected paths.
#[derive(Debug, Clone)]
pub struct ProtectPaths<H> {
    evaluator: Evaluator<H>,
    config: RuleConfig,
    user: ActingUser,
}

impl<H: CommitHistory> ProtectPaths<H> {
    /// Check operations by `user` against `config`, resolving commits with `evaluator`.
    pub fn new(evaluator: Evaluator<H>, config: RuleConfig, user: ActingUser) -> Self {
        Self { evaluator, config, user }
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    pub fn user(&self) -> &ActingUser {
        &self.user
    }
}

impl<H: CommitHistory> Hook for ProtectPaths<H> {
    fn pre_receive(&mut self, updates: &[RefUpdate]) -> Result<HookDecision, Error> {
        let violations = self.evaluator.evaluate_all(&self.config, &self.user, updates)?;
        if violations.is_empty() {
            return Ok(HookDecision::allow());
        }
        let lines: Vec<_> = violations.iter().map(ToString::to_string).collect();
        Ok(HookDecision::deny(PUSH_REJECTED)
            .with_details([PUSH_REASON.to_owned(), String::new()])
            .with_details(lines)
            .with_violations(violations))
    }

    fn merge_check(&mut self, request: &MergeRequest) -> Result<HookDecision, Error> {
        let update = request.to_ref_update()?;
        let violations = self.evaluator.evaluate(&self.config, &self.user, &update)?;
        if violations.is_empty() {
            return Ok(HookDecision::allow());
        }
        let lines: Vec<_> = violations.iter().map(ToString::to_string).collect();
        Ok(HookDecision::deny(MERGE_VETOED)
            .with_details(lines)
            .with_violations(violations))
    }
}
