//! Settings validation, run when settings are saved and before a hook is activated.

use super::{keys, ConfigStore, FilterMode};
use crate::pattern::Pattern;

/// A problem with one settings field, suitable for showing next to that field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// The settings key, like `pathPatterns`.
    pub field: &'static str,
    /// Human-readable description of the problem.
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check all settings in `store` and return every problem found, in field order.
///
/// An empty result means the settings can be activated.
pub fn validate(store: &dyn ConfigStore) -> Vec<FieldError> {
    let mut errors = Vec::new();

    let path_patterns = store.setting_list(keys::PATH_PATTERNS);
    if path_patterns.is_empty() {
        errors.push(FieldError::new(keys::PATH_PATTERNS, "Path Patterns is mandatory"));
    }
    check_patterns(keys::PATH_PATTERNS, &path_patterns, &mut errors);

    let mode = match store.setting(keys::BRANCH_FILTER_TYPE) {
        Some(value) if !value.trim().is_empty() => match value.parse::<FilterMode>() {
            Ok(mode) => Some(mode),
            Err(_) => {
                errors.push(FieldError::new(
                    keys::BRANCH_FILTER_TYPE,
                    format!("'{value}' is not one of ALL, INCLUDE, EXCLUDE"),
                ));
                None
            }
        },
        _ => Some(FilterMode::All),
    };

    let branch_patterns = store.setting_list(keys::BRANCH_PATTERNS);
    if mode == Some(FilterMode::Include) && branch_patterns.is_empty() {
        errors.push(FieldError::new(
            keys::BRANCH_PATTERNS,
            "Branch Patterns are required when only including branches",
        ));
    }
    check_patterns(keys::BRANCH_PATTERNS, &branch_patterns, &mut errors);

    errors
}

fn check_patterns(field: &'static str, patterns: &[String], errors: &mut Vec<FieldError>) {
    for pattern in patterns {
        if let Err(err) = Pattern::new(pattern) {
            let detail = std::error::Error::source(&err).map(ToString::to_string).unwrap_or_default();
            errors.push(FieldError::new(
                field,
                format!("'{pattern}' is not a valid regular expression: {detail}"),
            ));
        }
    }
}
