//! Exemptions for administrators and excluded users.

use crate::config::RuleConfig;
use crate::permission::ActingUser;

/// Return true if operations by `user` are exempt from protection.
///
/// Repository administrators and users listed in the excluded users never trigger violations.
pub fn should_skip(config: &RuleConfig, user: &ActingUser) -> bool {
    user.is_repository_admin() || config.is_excluded(user.identifier())
}
