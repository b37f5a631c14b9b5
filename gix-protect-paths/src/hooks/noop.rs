//! The hook used where protected paths were never configured.

use super::{Hook, HookDecision, MergeRequest};
use crate::refs::RefUpdate;
use crate::Error;

/// A hook that allows every push and merge.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl Hook for NoopHook {
    fn pre_receive(&mut self, _updates: &[RefUpdate]) -> Result<HookDecision, Error> {
        Ok(HookDecision::allow())
    }

    fn merge_check(&mut self, _request: &MergeRequest) -> Result<HookDecision, Error> {
        Ok(HookDecision::allow())
    }
}
