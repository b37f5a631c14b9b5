//! Settings for protected paths, read from a key-value settings store.
//!
//! # Configuration Keys
//!
//! All keys live in the `protectPaths` section when read from git configuration.
//! - `protectPaths.pathPatterns`: Regular expressions of protected paths (mandatory)
//! - `protectPaths.excludedUsers`: Users whose pushes are never checked
//! - `protectPaths.branchFilterType`: One of `ALL`, `INCLUDE`, `EXCLUDE` (default `ALL`)
//! - `protectPaths.branchPatterns`: Branch short-name patterns used by the filter
//! - `protectPaths.admins`: Users treated as repository administrators by [`StaticPermissions`](crate::permission::StaticPermissions)
//!
//! List values may be given as multiple entries of the same key, one per line, or comma-separated.

pub mod rules;
pub mod validate;

pub use rules::{FilterMode, RuleConfig};
pub use validate::{validate, FieldError};

use std::collections::BTreeMap;

/// The git configuration section holding all keys.
pub const SECTION: &str = "protectPaths";

/// Names of the settings understood by this crate.
pub mod keys {
    /// Protected path patterns.
    pub const PATH_PATTERNS: &str = "pathPatterns";
    /// Users exempt from checks.
    pub const EXCLUDED_USERS: &str = "excludedUsers";
    /// The branch filter mode.
    pub const BRANCH_FILTER_TYPE: &str = "branchFilterType";
    /// Branch patterns for the filter mode.
    pub const BRANCH_PATTERNS: &str = "branchPatterns";
    /// Users treated as repository administrators.
    pub const ADMINS: &str = "admins";

    /// All keys, in documentation order.
    pub const ALL: &[&str] = &[PATH_PATTERNS, EXCLUDED_USERS, BRANCH_FILTER_TYPE, BRANCH_PATTERNS, ADMINS];
}

/// Read access to opaque host settings.
pub trait ConfigStore {
    /// All raw values stored for `key`, in the order the store holds them.
    ///
    /// Unset keys yield an empty list.
    fn setting_values(&self, key: &str) -> Vec<String>;

    /// The last value stored for `key`, if any.
    fn setting(&self, key: &str) -> Option<String> {
        self.setting_values(key).pop()
    }

    /// All values of `key` split into list entries with [`split_list`].
    fn setting_list(&self, key: &str) -> Vec<String> {
        self.setting_values(key).iter().flat_map(|v| split_list(v)).collect()
    }
}

impl ConfigStore for gix_config::File<'_> {
    fn setting_values(&self, key: &str) -> Vec<String> {
        let full_key = format!("{SECTION}.{key}");
        self.strings(full_key.as_str())
            .map(|values| values.iter().map(|v| v.to_string()).collect())
            .unwrap_or_default()
    }
}

/// Plain settings as submitted by a settings form, one string per key.
impl ConfigStore for BTreeMap<String, String> {
    fn setting_values(&self, key: &str) -> Vec<String> {
        self.get(key).cloned().into_iter().collect()
    }
}

/// Return true if any of our keys is present in `store`.
///
/// A store without any key means the hook was never set up for this repository.
pub fn is_configured(store: &dyn ConfigStore) -> bool {
    keys::ALL.iter().any(|key| !store.setting_values(key).is_empty())
}

/// Split a list setting on newlines and on top-level commas.
///
/// Commas inside `()` or `{}`, inside character classes and escaped commas belong to the
/// pattern, so `a{1,3}` and `[,;]` stay one entry. Brackets inside a character class like
/// `[(]` are literals and don't open a group. Entries are trimmed and empty entries dropped.
pub fn split_list(value: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut class_depth = 0usize;
    let mut class_open = ClassOpen::No;
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        let opened = std::mem::replace(&mut class_open, ClassOpen::No);
        match c {
            '\\' => {
                current.push(c);
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
                continue;
            }
            '\n' | '\r' => {
                push_entry(&mut out, &mut current);
                depth = 0;
                class_depth = 0;
                continue;
            }
            '[' => {
                class_depth += 1;
                class_open = ClassOpen::Bracket;
            }
            '^' if opened == ClassOpen::Bracket => class_open = ClassOpen::Negated,
            // A `]` right after `[` or `[^` is a literal.
            ']' if class_depth > 0 && opened == ClassOpen::No => class_depth -= 1,
            _ if class_depth > 0 => {}
            '(' | '{' => depth += 1,
            ')' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                push_entry(&mut out, &mut current);
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    push_entry(&mut out, &mut current);
    out
}

/// How far the opening of a character class was read.
#[derive(Clone, Copy, PartialEq, Eq)]
enum ClassOpen {
    No,
    Bracket,
    Negated,
}

fn push_entry(out: &mut Vec<String>, current: &mut String) {
    let entry = current.trim();
    if !entry.is_empty() {
        out.push(entry.to_owned());
    }
    current.clear();
}
