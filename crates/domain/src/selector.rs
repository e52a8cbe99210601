//! Selector — the closed target-expression variant and its wire grammar.
//!
//! Wire grammar (preserved bit-for-bit for cloud compatibility):
//! `all` | `id:<deviceId>` | `group_id:<groupId>` | `scene_id:<sceneUuid>` |
//! `label:<name>`, with an optional zone suffix `|<start>-<end>` (or a single
//! `|<zone>`) on device selectors. The pipe is percent-encoded as `%7C` in
//! transport.
//!
//! Selectors are parsed once at the boundary and passed around as this enum;
//! nothing downstream re-parses strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SelectorError;
use crate::id::{DeviceId, GroupId, SceneId};

/// Inclusive zone range on a multizone device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneRange {
    pub start: u16,
    pub end: u16,
}

impl ZoneRange {
    /// Build a range, normalising a single zone to `start == end`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::Malformed`] when `start > end`.
    pub fn new(start: u16, end: u16) -> Result<Self, SelectorError> {
        if start > end {
            return Err(SelectorError::Malformed {
                input: format!("{start}-{end}"),
            });
        }
        Ok(Self { start, end })
    }

    /// Number of zones addressed.
    #[must_use]
    pub fn len(&self) -> u16 {
        self.end - self.start + 1
    }

    /// Always at least one zone.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for ZoneRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A parsed target expression.
///
/// Serializes as its wire string (`"id:d073d5123456|0-4"`), not as a
/// tagged enum, so stored and transported selectors stay grammar-exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Every device — reinterpreted per-user at authorization time.
    All,
    /// One device by hardware id.
    Device(DeviceId),
    /// Every device in a group.
    Group(GroupId),
    /// Every device referenced by a scene's target states.
    Scene(SceneId),
    /// A device or group by human-assigned label. Accepted but discouraged
    /// for durability; labels are mutable.
    Label(String),
    /// A zone range on one multizone device.
    Zoned { device: DeviceId, range: ZoneRange },
}

impl Selector {
    /// Parse a wire expression. `%7C` is accepted as an already-encoded pipe.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::Malformed`] when the expression does not
    /// match the grammar.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let malformed = || SelectorError::Malformed {
            input: input.to_string(),
        };

        let decoded = input.replace("%7C", "|").replace("%7c", "|");

        if decoded == "all" {
            return Ok(Self::All);
        }

        if let Some(rest) = decoded.strip_prefix("id:") {
            if rest.is_empty() {
                return Err(malformed());
            }
            return match rest.split_once('|') {
                None => Ok(Self::Device(DeviceId::new(rest))),
                Some((id, zones)) => {
                    if id.is_empty() {
                        return Err(malformed());
                    }
                    let range = parse_zone_suffix(zones).ok_or_else(malformed)?;
                    Ok(Self::Zoned {
                        device: DeviceId::new(id),
                        range,
                    })
                }
            };
        }

        if let Some(rest) = decoded.strip_prefix("group_id:") {
            if rest.is_empty() || rest.contains('|') {
                return Err(malformed());
            }
            return Ok(Self::Group(GroupId::new(rest)));
        }

        if let Some(rest) = decoded.strip_prefix("scene_id:") {
            let id = SceneId::from_str(rest).map_err(|_| malformed())?;
            return Ok(Self::Scene(id));
        }

        if let Some(rest) = decoded.strip_prefix("label:") {
            if rest.is_empty() || rest.contains('|') {
                return Err(malformed());
            }
            return Ok(Self::Label(rest.to_string()));
        }

        Err(malformed())
    }

    /// Wire form with the pipe percent-encoded, suitable for a URL path.
    #[must_use]
    pub fn to_wire(&self) -> String {
        self.to_string().replace('|', "%7C")
    }
}

fn parse_zone_suffix(zones: &str) -> Option<ZoneRange> {
    match zones.split_once('-') {
        Some((start, end)) => {
            let start = start.parse().ok()?;
            let end = end.parse().ok()?;
            ZoneRange::new(start, end).ok()
        }
        None => {
            let zone = zones.parse().ok()?;
            Some(ZoneRange { start: zone, end: zone })
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Device(id) => write!(f, "id:{id}"),
            Self::Group(id) => write!(f, "group_id:{id}"),
            Self::Scene(id) => write!(f, "scene_id:{id}"),
            Self::Label(label) => write!(f, "label:{label}"),
            Self::Zoned { device, range } => write!(f, "id:{device}|{range}"),
        }
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Selector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Selector {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
