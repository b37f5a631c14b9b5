//! The rule configuration: which paths are protected, on which branches, for whom.

use super::{keys, ConfigStore};
use crate::Error;
use std::collections::BTreeSet;
use std::str::FromStr;

/// Which refs protection applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FilterMode {
    /// Protect every ref.
    #[default]
    All,
    /// Protect only branches matching one of the branch patterns.
    Include,
    /// Protect every ref except branches matching one of the branch patterns.
    Exclude,
}

impl FilterMode {
    /// The spelling used in settings.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::All => "ALL",
            FilterMode::Include => "INCLUDE",
            FilterMode::Exclude => "EXCLUDE",
        }
    }
}

impl FromStr for FilterMode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ALL" => Ok(FilterMode::All),
            "INCLUDE" => Ok(FilterMode::Include),
            "EXCLUDE" => Ok(FilterMode::Exclude),
            _ => Err(Error::configuration(
                keys::BRANCH_FILTER_TYPE,
                format!("unknown branch filter type '{value}'. Valid values are: ALL, INCLUDE, EXCLUDE"),
            )),
        }
    }
}

impl std::fmt::Display for FilterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Protected path patterns, the branch filter and exempt users.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleConfig {
    /// Regular expressions matched against whole repository-relative paths, in configured order.
    pub path_patterns: Vec<String>,
    /// Which refs are in scope.
    pub filter_mode: FilterMode,
    /// Branch short-name patterns, like `release/.*`.
    pub branch_patterns: Vec<String>,
    /// Users whose operations are never checked.
    pub excluded_users: BTreeSet<String>,
}

impl RuleConfig {
    /// Create a configuration protecting `path_patterns` on all refs.
    pub fn new<I, S>(path_patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path_patterns: path_patterns.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Restrict or widen the refs this configuration applies to.
    pub fn with_branch_filter<I, S>(mut self, mode: FilterMode, branch_patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter_mode = mode;
        self.branch_patterns = branch_patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Exempt `users` from all checks.
    pub fn with_excluded_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_users.extend(users.into_iter().map(Into::into));
        self
    }

    /// Load the configuration from a settings store.
    ///
    /// Only the filter type can fail to parse here. Patterns are kept as strings and
    /// compiled when they are used, and a missing `pathPatterns` yields an inactive configuration.
    /// Use [`validate()`](super::validate()) to check settings before activating them.
    pub fn from_store(store: &dyn ConfigStore) -> Result<Self, Error> {
        let filter_mode = match store.setting(keys::BRANCH_FILTER_TYPE) {
            Some(value) if !value.trim().is_empty() => value.parse()?,
            _ => FilterMode::default(),
        };
        Ok(Self {
            path_patterns: store.setting_list(keys::PATH_PATTERNS),
            filter_mode,
            branch_patterns: store.setting_list(keys::BRANCH_PATTERNS),
            excluded_users: store.setting_list(keys::EXCLUDED_USERS).into_iter().collect(),
        })
    }

    /// Return true if at least one path is protected.
    pub fn is_active(&self) -> bool {
        !self.path_patterns.is_empty()
    }

    /// Return true if `user` is exempt from all checks.
    pub fn is_excluded(&self, user: &str) -> bool {
        self.excluded_users.contains(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::store;
    use std::collections::BTreeMap;

    #[test]
    fn filter_mode_parses_case_insensitively() {
        assert_eq!("all".parse::<FilterMode>().unwrap(), FilterMode::All);
        assert_eq!(" Include ".parse::<FilterMode>().unwrap(), FilterMode::Include);
        assert_eq!("EXCLUDE".parse::<FilterMode>().unwrap(), FilterMode::Exclude);
        assert_eq!(FilterMode::Exclude.to_string(), "EXCLUDE");
    }

    #[test]
    fn unknown_filter_mode_is_a_configuration_error() {
        let err = "SOMETIMES".parse::<FilterMode>().unwrap_err();
        assert_eq!(err.kind(), crate::Kind::Configuration);
        assert!(err.to_string().contains("ALL, INCLUDE, EXCLUDE"));
    }

    #[test]
    fn from_store_reads_all_settings() {
        let settings = store(&[
            (keys::PATH_PATTERNS, "config/.*\\.yaml\nsecrets/.*"),
            (keys::EXCLUDED_USERS, "release-bot, alice"),
            (keys::BRANCH_FILTER_TYPE, "include"),
            (keys::BRANCH_PATTERNS, "release/.*,main"),
        ]);
        let config = RuleConfig::from_store(&settings).unwrap();
        assert_eq!(config.path_patterns, vec!["config/.*\\.yaml", "secrets/.*"]);
        assert_eq!(config.filter_mode, FilterMode::Include);
        assert_eq!(config.branch_patterns, vec!["release/.*", "main"]);
        assert!(config.is_excluded("alice"));
        assert!(config.is_excluded("release-bot"));
        assert!(!config.is_excluded("bob"));
        assert!(config.is_active());
    }

    #[test]
    fn character_classes_do_not_swallow_list_separators() {
        let settings = store(&[(keys::PATH_PATTERNS, "docs/[(]draft.*,secrets/.*")]);
        assert!(crate::config::validate(&settings).is_empty());
        let config = RuleConfig::from_store(&settings).unwrap();
        assert_eq!(config.path_patterns, vec!["docs/[(]draft.*", "secrets/.*"]);
    }

    #[test]
    fn from_store_defaults_to_all_refs_and_inactive() {
        let config = RuleConfig::from_store(&BTreeMap::<String, String>::new()).unwrap();
        assert_eq!(config, RuleConfig::default());
        assert_eq!(config.filter_mode, FilterMode::All);
        assert!(!config.is_active());
    }

    #[test]
    fn from_store_rejects_unknown_filter_type() {
        let settings = store(&[(keys::PATH_PATTERNS, "a"), (keys::BRANCH_FILTER_TYPE, "ONLY")]);
        assert!(RuleConfig::from_store(&settings).is_err());
    }

    #[test]
    fn builder_methods_compose() {
        let config = RuleConfig::new(["docs/.*"])
            .with_branch_filter(FilterMode::Exclude, ["wip/.*"])
            .with_excluded_users(["ci"]);
        assert_eq!(config.path_patterns, vec!["docs/.*"]);
        assert_eq!(config.filter_mode, FilterMode::Exclude);
        assert_eq!(config.branch_patterns, vec!["wip/.*"]);
        assert!(config.is_excluded("ci"));
    }
}
