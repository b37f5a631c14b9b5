//! The acting user and the permission service that knows who administers a repository.

use crate::config::{keys, ConfigStore};
use crate::Error;
use std::collections::BTreeSet;

/// Answers permission questions about the repository under evaluation.
pub trait PermissionService {
    /// Return true if `user` has administrative permission on the repository.
    fn has_admin_permission(&self, user: &str) -> Result<bool, Error>;
}

impl<T: PermissionService + ?Sized> PermissionService for &T {
    fn has_admin_permission(&self, user: &str) -> Result<bool, Error> {
        (**self).has_admin_permission(user)
    }
}

/// A fixed set of repository administrators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticPermissions {
    admins: BTreeSet<String>,
}

impl StaticPermissions {
    /// Create permissions granting admin rights to `admins` only.
    pub fn new<I, S>(admins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            admins: admins.into_iter().map(Into::into).collect(),
        }
    }

    /// Read administrators from the `admins` setting.
    pub fn from_store(store: &dyn ConfigStore) -> Self {
        Self::new(store.setting_list(keys::ADMINS))
    }
}

impl PermissionService for StaticPermissions {
    fn has_admin_permission(&self, user: &str) -> Result<bool, Error> {
        Ok(self.admins.contains(user))
    }
}

/// The user performing the push or merge, as seen by the host at call time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser {
    identifier: String,
    is_repository_admin: bool,
}

impl ActingUser {
    /// Create a user. An empty identifier is a caller error.
    pub fn new(identifier: impl Into<String>, is_repository_admin: bool) -> Result<Self, Error> {
        let identifier = identifier.into();
        if identifier.trim().is_empty() {
            return Err(Error::InvalidInput("acting user has no identifier".into()));
        }
        Ok(Self {
            identifier,
            is_repository_admin,
        })
    }

    /// Look up the admin permission of `identifier` and create the user from it.
    pub fn resolve(identifier: impl Into<String>, permissions: &dyn PermissionService) -> Result<Self, Error> {
        let identifier = identifier.into();
        if identifier.trim().is_empty() {
            return Err(Error::InvalidInput("acting user has no identifier".into()));
        }
        let is_repository_admin = permissions.has_admin_permission(&identifier)?;
        Ok(Self {
            identifier,
            is_repository_admin,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn is_repository_admin(&self) -> bool {
        self.is_repository_admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::store;

    struct Unreachable;

    impl PermissionService for Unreachable {
        fn has_admin_permission(&self, _user: &str) -> Result<bool, Error> {
            Err(Error::host("has_admin_permission", "permission service is down"))
        }
    }

    #[test]
    fn resolve_asks_the_permission_service() {
        let permissions = StaticPermissions::new(["root"]);
        let admin = ActingUser::resolve("root", &permissions).unwrap();
        assert!(admin.is_repository_admin());
        let user = ActingUser::resolve("alice", &permissions).unwrap();
        assert!(!user.is_repository_admin());
        assert_eq!(user.identifier(), "alice");
    }

    #[test]
    fn empty_identifiers_are_invalid_input() {
        assert!(matches!(ActingUser::new("", false), Err(Error::InvalidInput(_))));
        assert!(matches!(
            ActingUser::resolve("  ", &StaticPermissions::default()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn permission_failures_propagate() {
        let err = ActingUser::resolve("alice", &Unreachable).unwrap_err();
        assert_eq!(err.kind(), crate::Kind::HostUnavailable);
    }

    #[test]
    fn admins_are_read_from_settings() {
        let permissions = StaticPermissions::from_store(&store(&[(keys::ADMINS, "root, ops")]));
        assert_eq!(permissions, StaticPermissions::new(["ops", "root"]));
        assert!(permissions.has_admin_permission("ops").unwrap());
    }
}
