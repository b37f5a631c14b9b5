//! Ref updates under evaluation and the pre-receive input they are parsed from.
//!
//! git feeds a `pre-receive` hook one line per updated ref on stdin:
//!   "<old-oid> <new-oid> <refname>"
//! where an all-zero id stands for a ref that doesn't exist on that side.

use crate::Error;
use gix_hash::ObjectId;

/// One branch or ref movement being evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RefUpdate {
    /// The fully qualified ref name, like `refs/heads/main`.
    pub ref_id: String,
    /// The commit the ref pointed to before, or `None` if the range starts at the repository root.
    pub from_hash: Option<String>,
    /// The commit the ref points to after the update.
    pub to_hash: String,
}

impl RefUpdate {
    /// Create a ref update, rejecting empty ref names and commit ids.
    pub fn new(ref_id: impl Into<String>, from_hash: Option<String>, to_hash: impl Into<String>) -> Result<Self, Error> {
        let update = Self {
            ref_id: ref_id.into(),
            from_hash,
            to_hash: to_hash.into(),
        };
        update.check()?;
        Ok(update)
    }

    /// Fail with [`Error::InvalidInput`] if the ref name or a commit id is empty.
    ///
    /// The fields are public, so values built without [`RefUpdate::new()`] are checked again
    /// before evaluation.
    pub fn check(&self) -> Result<(), Error> {
        if self.ref_id.trim().is_empty() {
            return Err(Error::InvalidInput("ref update without a ref name".into()));
        }
        if self.to_hash.trim().is_empty() {
            return Err(Error::InvalidInput(format!(
                "ref update of '{}' without a target commit",
                self.ref_id
            )));
        }
        if self.from_hash.as_deref().is_some_and(|h| h.trim().is_empty()) {
            return Err(Error::InvalidInput(format!(
                "ref update of '{}' with an empty source commit",
                self.ref_id
            )));
        }
        Ok(())
    }

    /// The branch name if this update targets `refs/heads/`.
    pub fn branch_name(&self) -> Option<&str> {
        self.ref_id.strip_prefix("refs/heads/")
    }
}

/// A single command line of pre-receive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandUpdate {
    /// Create a new reference with `new` object.
    Create { new: ObjectId, name: String },
    /// Update an existing reference from `old` to `new`.
    Update { old: ObjectId, new: ObjectId, name: String },
    /// Delete an existing reference which had `old` object.
    Delete { old: ObjectId, name: String },
}

impl CommandUpdate {
    /// The refname targeted by this command.
    pub fn name(&self) -> &str {
        match self {
            CommandUpdate::Create { name, .. } | CommandUpdate::Update { name, .. } | CommandUpdate::Delete { name, .. } => {
                name
            }
        }
    }

    /// The range of commits this command introduces, if any.
    ///
    /// Deletions introduce no commits and yield `None`.
    pub fn to_ref_update(&self) -> Option<RefUpdate> {
        match self {
            CommandUpdate::Create { new, name } => Some(RefUpdate {
                ref_id: name.clone(),
                from_hash: None,
                to_hash: new.to_string(),
            }),
            CommandUpdate::Update { old, new, name } => Some(RefUpdate {
                ref_id: name.clone(),
                from_hash: Some(old.to_string()),
                to_hash: new.to_string(),
            }),
            CommandUpdate::Delete { .. } => None,
        }
    }
}

/// Parse pre-receive input, one command per `\n`, skipping blank lines.
///
/// Invariants enforced:
/// - Create: old is zero, new is non-zero
/// - Delete: new is zero, old is non-zero
/// - Update: old and new are non-zero
/// - Both zero → invalid
pub fn parse_pre_receive(text: &str) -> Result<Vec<CommandUpdate>, Error> {
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(parse_command)
        .collect()
}

/// Turn parsed commands into the ref updates to evaluate, in input order.
pub fn ref_updates(commands: &[CommandUpdate]) -> Vec<RefUpdate> {
    commands.iter().filter_map(CommandUpdate::to_ref_update).collect()
}

fn parse_command(line: &str) -> Result<CommandUpdate, Error> {
    let mut it = line.split_whitespace();
    let old_hex = it.next().ok_or_else(|| Error::InvalidInput("missing <old> oid".into()))?;
    let new_hex = it.next().ok_or_else(|| Error::InvalidInput("missing <new> oid".into()))?;
    let name = it.next().ok_or_else(|| Error::InvalidInput("missing <refname>".into()))?;

    // Refnames can't contain spaces.
    if it.next().is_some() {
        return Err(Error::InvalidInput(format!("unexpected tokens after refname in '{line}'")));
    }

    let old = parse_oid(old_hex)?;
    let new = parse_oid(new_hex)?;
    let name = name.to_owned();
    match (old.is_null(), new.is_null()) {
        (true, true) => Err(Error::InvalidInput(format!("both old and new are zero for '{name}'"))),
        (true, false) => Ok(CommandUpdate::Create { new, name }),
        (false, true) => Ok(CommandUpdate::Delete { old, name }),
        (false, false) => Ok(CommandUpdate::Update { old, new, name }),
    }
}

fn parse_oid(hex: &str) -> Result<ObjectId, Error> {
    ObjectId::from_hex(hex.as_bytes()).map_err(|e| Error::InvalidInput(format!("invalid oid '{hex}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO: &str = "0000000000000000000000000000000000000000";
    const ONE: &str = "1111111111111111111111111111111111111111";
    const TWO: &str = "2222222222222222222222222222222222222222";

    fn oid(hex: &str) -> ObjectId {
        ObjectId::from_hex(hex.as_bytes()).expect("valid hex")
    }

    #[test]
    fn create_update_delete_parsing() {
        let text = format!("{ZERO} {ONE} refs/heads/main\n{ONE} {TWO} refs/heads/dev\r\n\n{TWO} {ZERO} refs/tags/v1\n");
        let commands = parse_pre_receive(&text).unwrap();
        assert_eq!(
            commands,
            vec![
                CommandUpdate::Create {
                    new: oid(ONE),
                    name: "refs/heads/main".into()
                },
                CommandUpdate::Update {
                    old: oid(ONE),
                    new: oid(TWO),
                    name: "refs/heads/dev".into()
                },
                CommandUpdate::Delete {
                    old: oid(TWO),
                    name: "refs/tags/v1".into()
                },
            ]
        );
        assert_eq!(commands[2].name(), "refs/tags/v1");
    }

    #[test]
    fn deletions_produce_no_ref_update() {
        let commands = parse_pre_receive(&format!("{ZERO} {ONE} refs/heads/main\n{TWO} {ZERO} refs/heads/gone\n")).unwrap();
        let updates = ref_updates(&commands);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].ref_id, "refs/heads/main");
        assert_eq!(updates[0].from_hash, None);
        assert_eq!(updates[0].to_hash, ONE);
    }

    #[test]
    fn update_keeps_both_ends_of_the_range() {
        let commands = parse_pre_receive(&format!("{ONE} {TWO} refs/heads/main")).unwrap();
        let update = commands[0].to_ref_update().unwrap();
        assert_eq!(update.from_hash.as_deref(), Some(ONE));
        assert_eq!(update.to_hash, TWO);
        assert_eq!(update.branch_name(), Some("main"));
    }

    #[test]
    fn both_zero_is_invalid() {
        let err = parse_pre_receive(&format!("{ZERO} {ZERO} refs/heads/main\n")).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn malformed_lines_are_invalid() {
        for text in [
            format!("zzzz000000000000000000000000000000000000 {ONE} refs/heads/main"),
            format!("{ZERO} {ONE} refs/heads/main extra-token"),
            format!("{ZERO} {ONE}"),
        ] {
            let err = parse_pre_receive(&text).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "{text}: {err:?}");
        }
    }

    #[test]
    fn ref_update_rejects_empty_parts() {
        assert!(RefUpdate::new("", None, ONE).is_err());
        assert!(RefUpdate::new("refs/heads/main", None, " ").is_err());
        assert!(RefUpdate::new("refs/heads/main", Some(String::new()), ONE).is_err());
        let update = RefUpdate::new("refs/tags/v1", Some(TWO.into()), ONE).unwrap();
        assert_eq!(update.branch_name(), None);
    }
}
