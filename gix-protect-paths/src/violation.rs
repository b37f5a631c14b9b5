/// One commit touching one protected path, attributable to the pattern it matched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Violation {
    /// The ref the commit was pushed or merged to.
    pub ref_id: String,
    pub commit_id: String,
    /// The changed path that matched. Not part of the rendered message.
    pub path: String,
    /// The protected path pattern as configured.
    pub pattern: String,
}

/// Renders `<ref>: <commit> matches restricted path <pattern>`.
impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} matches restricted path {}", self.ref_id, self.commit_id, self.pattern)
    }
}
