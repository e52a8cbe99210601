//! Users, permission grants, and resolved permission sets.
//!
//! Grants store **labels**, not identifiers: a replaced bulb keeps its label
//! and the grant keeps working. The trade-off is that a relabeled device
//! silently leaves the grant — accepted deliberately. Labels are normalised
//! to lowercase at the edges of this module so comparisons never depend on
//! how an administrator typed them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::device::Device;
use crate::error::{LuxhubError, ValidationError};
pub use crate::id::UserId;

/// Privilege level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Bypasses all visibility and write checks.
    Admin,
    /// A named user whose access is defined entirely by grants.
    Named,
    /// The shared fallback identity; grants work the same as for named users.
    Guest,
}

/// An account known to the gateway. Credentials and sessions live elsewhere;
/// the transport hands this core an already-established identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    /// Whether the natural-language endpoint is enabled for this user.
    pub nlp_enabled: bool,
}

impl User {
    /// Whether this user bypasses permission checks.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// What a grant's value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrantKind {
    Device,
    Group,
    Scene,
}

impl std::fmt::Display for GrantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Device => f.write_str("device"),
            Self::Group => f.write_str("group"),
            Self::Scene => f.write_str("scene"),
        }
    }
}

impl std::str::FromStr for GrantKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "device" => Ok(Self::Device),
            "group" => Ok(Self::Group),
            "scene" => Ok(Self::Scene),
            other => Err(ValidationError::UnknownGrantKind(other.to_string())),
        }
    }
}

/// One stored grant: (user, kind, label value). Set semantics — duplicates
/// collapse in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub user_id: UserId,
    pub kind: GrantKind,
    /// A device, group, or scene **label**.
    pub value: String,
}

impl PermissionGrant {
    /// Build a grant, normalising the label to lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`LuxhubError::Validation`] when the value is empty.
    pub fn new(user_id: UserId, kind: GrantKind, value: &str) -> Result<Self, LuxhubError> {
        let value = value.trim().to_lowercase();
        if value.is_empty() {
            return Err(ValidationError::EmptyGrantValue.into());
        }
        Ok(Self {
            user_id,
            kind,
            value,
        })
    }
}

/// The cascade expansion of a user's grants into concrete labels, computed
/// at grant-save time against the snapshot available at that moment.
///
/// Stale by design: the set is not recomputed when the directory later
/// changes, only when grants are saved again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPermissionSet {
    /// Permitted device labels (lowercase).
    pub devices: BTreeSet<String>,
    /// Permitted group labels (lowercase).
    pub groups: BTreeSet<String>,
    /// Permitted scene labels (lowercase), straight from scene grants.
    pub scenes: BTreeSet<String>,
}

impl ResolvedPermissionSet {
    /// Record a permitted device label.
    pub fn allow_device(&mut self, label: &str) {
        self.devices.insert(label.to_lowercase());
    }

    /// Record a permitted group label.
    pub fn allow_group(&mut self, label: &str) {
        self.groups.insert(label.to_lowercase());
    }

    /// Record a permitted scene label.
    pub fn allow_scene(&mut self, label: &str) {
        self.scenes.insert(label.to_lowercase());
    }

    /// No grants resolve to anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.groups.is_empty() && self.scenes.is_empty()
    }

    /// Whether a device is inside this set, by its own label or its
    /// group's label.
    #[must_use]
    pub fn permits_device(&self, device: &Device) -> bool {
        if self.devices.contains(&device.label.to_lowercase()) {
            return true;
        }
        device
            .group
            .as_ref()
            .is_some_and(|g| self.groups.contains(&g.label.to_lowercase()))
    }

    /// Whether a scene label is inside this set.
    #[must_use]
    pub fn permits_scene_label(&self, label: &str) -> bool {
        self.scenes.contains(&label.to_lowercase())
    }
}
