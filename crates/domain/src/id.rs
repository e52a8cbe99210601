//! Typed identifier newtypes.
//!
//! Device and group identifiers are hardware-derived strings assigned by the
//! device cloud (e.g. `d073d5123456`), not UUIDs — they are wrapped verbatim.
//! Scene identifiers are cloud-assigned UUIDs. User identifiers are local
//! storage row ids.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_string_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a cloud-assigned identifier.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Access the raw identifier string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

define_string_id!(
    /// Stable, hardware-derived identifier for a [`Device`](crate::device::Device).
    DeviceId
);

define_string_id!(
    /// Cloud-assigned identifier for a [`Group`](crate::device::Group).
    GroupId
);

/// Cloud-assigned UUID for a [`Scene`](crate::scene::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneId(uuid::Uuid);

impl SceneId {
    /// Generate a new random identifier (test fixtures mostly).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Access the inner UUID.
    #[must_use]
    pub fn as_uuid(self) -> uuid::Uuid {
        self.0
    }
}

impl Default for SceneId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SceneId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s).map(Self)
    }
}

/// Storage row id for a [`User`](crate::user::User).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a storage row id.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Access the raw row id.
    #[must_use]
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_roundtrip_device_id_through_display() {
        let id = DeviceId::new("d073d5123456");
        assert_eq!(id.to_string(), "d073d5123456");
        assert_eq!(id.as_str(), "d073d5123456");
    }

    #[test]
    fn should_serialize_string_ids_transparently() {
        let id = GroupId::new("4f2e1a");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"4f2e1a\"");
        let parsed: GroupId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn should_roundtrip_scene_id_through_display_and_from_str() {
        let id = SceneId::new();
        let text = id.to_string();
        let parsed: SceneId = text.parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn should_return_error_when_parsing_invalid_scene_uuid() {
        let result = SceneId::from_str("not-a-uuid");
        assert!(result.is_err());
    }

    #[test]
    fn should_generate_unique_scene_ids_when_called_twice() {
        assert_ne!(SceneId::new(), SceneId::new());
    }

    #[test]
    fn should_expose_raw_user_row_id() {
        let id = UserId::new(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(id.to_string(), "42");
    }
}
