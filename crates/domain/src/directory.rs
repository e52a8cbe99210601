//! Directory snapshot — a point-in-time read of the cloud directory.
//!
//! Groups are derived from device membership, never stored independently.
//! Label lookups are case-insensitive; labels are human-assigned and users
//! type them loosely.

use serde::{Deserialize, Serialize};

use crate::device::{Device, Group};
use crate::id::{DeviceId, GroupId, SceneId};
use crate::scene::Scene;
use crate::time::Timestamp;

/// Devices and scenes as observed at one moment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    pub devices: Vec<Device>,
    pub scenes: Vec<Scene>,
    pub fetched_at: Timestamp,
}

impl DirectorySnapshot {
    /// Build a snapshot stamped with `fetched_at`.
    #[must_use]
    pub fn new(devices: Vec<Device>, scenes: Vec<Scene>, fetched_at: Timestamp) -> Self {
        Self {
            devices,
            scenes,
            fetched_at,
        }
    }

    /// Look up a device by hardware id.
    #[must_use]
    pub fn device(&self, id: &DeviceId) -> Option<&Device> {
        self.devices.iter().find(|d| &d.id == id)
    }

    /// Look up a device by label, case-insensitively.
    #[must_use]
    pub fn device_by_label(&self, label: &str) -> Option<&Device> {
        self.devices
            .iter()
            .find(|d| d.label.eq_ignore_ascii_case(label))
    }

    /// Look up a scene by id.
    #[must_use]
    pub fn scene(&self, id: &SceneId) -> Option<&Scene> {
        self.scenes.iter().find(|s| &s.id == id)
    }

    /// Devices belonging to `group`, in directory order.
    #[must_use]
    pub fn devices_in_group(&self, group: &GroupId) -> Vec<&Device> {
        self.devices
            .iter()
            .filter(|d| d.group.as_ref().is_some_and(|g| &g.id == group))
            .collect()
    }

    /// Whether any device belongs to `group`.
    #[must_use]
    pub fn group_exists(&self, group: &GroupId) -> bool {
        self.devices
            .iter()
            .any(|d| d.group.as_ref().is_some_and(|g| &g.id == group))
    }

    /// Derive the group list from device membership, in directory order.
    #[must_use]
    pub fn groups(&self) -> Vec<Group> {
        let mut groups: Vec<Group> = Vec::new();
        for device in &self.devices {
            let Some(group_ref) = &device.group else {
                continue;
            };
            match groups.iter_mut().find(|g| g.id == group_ref.id) {
                Some(group) => group.device_ids.push(device.id.clone()),
                None => groups.push(Group {
                    id: group_ref.id.clone(),
                    label: group_ref.label.clone(),
                    device_ids: vec![device.id.clone()],
                }),
            }
        }
        groups
    }

    /// Find a derived group by label, case-insensitively.
    #[must_use]
    pub fn group_by_label(&self, label: &str) -> Option<Group> {
        self.groups()
            .into_iter()
            .find(|g| g.label.eq_ignore_ascii_case(label))
    }
}
