//! The actor-context record for permission filtering.
//!
//! Identity and authorization live in the host framework; [`Actor`] is the
//! minimal shape this subsystem consumes. The rules match the usual admin
//! conventions: inactive actors fail every check, superusers pass every
//! check, and everyone else is decided by their permission codenames.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// The current actor (user) a request runs as.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// The actor's username.
    pub username: String,
    /// Whether the account is active. Inactive actors have no permissions.
    pub is_active: bool,
    /// Whether the actor may access the admin at all.
    pub is_staff: bool,
    /// Superusers pass every permission check unconditionally.
    pub is_superuser: bool,
    /// Permission codenames in `"app_label.codename"` format
    /// (e.g. `"blog.change_article"`).
    pub permissions: HashSet<String>,
}

impl Actor {
    /// Creates an active staff actor with no permissions.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            is_active: true,
            is_staff: true,
            is_superuser: false,
            permissions: HashSet::new(),
        }
    }

    /// Creates an active superuser.
    pub fn superuser(username: impl Into<String>) -> Self {
        Self {
            is_superuser: true,
            ..Self::new(username)
        }
    }

    /// Adds a permission codename.
    #[must_use]
    pub fn with_permission(mut self, codename: &str) -> Self {
        self.permissions.insert(codename.to_string());
        self
    }

    /// Marks the account inactive.
    #[must_use]
    pub const fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Checks one permission codename.
    pub fn has_perm(&self, perm: &str) -> bool {
        if !self.is_active {
            return false;
        }
        if self.is_superuser {
            return true;
        }
        self.permissions.contains(perm)
    }
}
