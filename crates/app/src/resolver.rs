//! Selector resolution — target expression → canonical device set.
//!
//! Resolution is a pure function of the selector and a directory snapshot,
//! so the exact same expansion serves read-time filtering and write-time
//! authorization. Output order is directory order, deduplicated on first
//! occurrence.

use luxhub_domain::directory::DirectorySnapshot;
use luxhub_domain::error::{LuxhubError, SelectorError};
use luxhub_domain::id::DeviceId;
use luxhub_domain::selector::{Selector, ZoneRange};

/// One concrete target: a device, optionally narrowed to a zone range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedTarget {
    pub device: DeviceId,
    pub zones: Option<ZoneRange>,
}

impl ResolvedTarget {
    /// Plain device target.
    #[must_use]
    pub fn device(id: DeviceId) -> Self {
        Self {
            device: id,
            zones: None,
        }
    }

    /// The selector addressing exactly this target.
    #[must_use]
    pub fn selector(&self) -> Selector {
        match self.zones {
            None => Selector::Device(self.device.clone()),
            Some(range) => Selector::Zoned {
                device: self.device.clone(),
                range,
            },
        }
    }
}

/// Expand a selector against a snapshot.
///
/// # Errors
///
/// Returns [`LuxhubError::InvalidSelector`] when a referenced device,
/// group, scene, or label does not exist in the snapshot, or a zone range
/// is out of bounds for the addressed device.
pub fn resolve(
    selector: &Selector,
    snapshot: &DirectorySnapshot,
) -> Result<Vec<ResolvedTarget>, LuxhubError> {
    let mut targets = resolve_inner(selector, snapshot, true)?;
    dedup_in_place(&mut targets);
    Ok(targets)
}

fn resolve_inner(
    selector: &Selector,
    snapshot: &DirectorySnapshot,
    allow_scene: bool,
) -> Result<Vec<ResolvedTarget>, LuxhubError> {
    match selector {
        Selector::All => Ok(snapshot
            .devices
            .iter()
            .map(|d| ResolvedTarget::device(d.id.clone()))
            .collect()),

        Selector::Device(id) => {
            let device = snapshot
                .device(id)
                .ok_or_else(|| SelectorError::UnknownDevice(id.clone()))?;
            Ok(vec![ResolvedTarget::device(device.id.clone())])
        }

        Selector::Group(id) => {
            let members = snapshot.devices_in_group(id);
            if members.is_empty() {
                return Err(SelectorError::UnknownGroup(id.to_string()).into());
            }
            Ok(members
                .into_iter()
                .map(|d| ResolvedTarget::device(d.id.clone()))
                .collect())
        }

        Selector::Scene(id) => {
            if !allow_scene {
                return Err(SelectorError::UnknownScene(id.to_string()).into());
            }
            let scene = snapshot
                .scene(id)
                .ok_or_else(|| SelectorError::UnknownScene(id.to_string()))?;
            let mut targets = Vec::new();
            for state in &scene.states {
                // A scene target pointing at something that has since left
                // the directory contributes nothing rather than failing the
                // whole expansion.
                if let Ok(mut inner) = resolve_inner(&state.selector, snapshot, false) {
                    targets.append(&mut inner);
                }
            }
            Ok(targets)
        }

        Selector::Label(label) => {
            if let Some(device) = snapshot.device_by_label(label) {
                return Ok(vec![ResolvedTarget::device(device.id.clone())]);
            }
            if let Some(group) = snapshot.group_by_label(label) {
                return Ok(group
                    .device_ids
                    .into_iter()
                    .map(ResolvedTarget::device)
                    .collect());
            }
            Err(SelectorError::UnknownLabel(label.clone()).into())
        }

        Selector::Zoned { device, range } => {
            let found = snapshot
                .device(device)
                .ok_or_else(|| SelectorError::UnknownDevice(device.clone()))?;
            let zones = found.zone_count();
            if range.end >= zones {
                return Err(SelectorError::ZoneOutOfBounds {
                    device: device.clone(),
                    start: range.start,
                    end: range.end,
                    zones,
                }
                .into());
            }
            Ok(vec![ResolvedTarget {
                device: found.id.clone(),
                zones: Some(*range),
            }])
        }
    }
}

fn dedup_in_place(targets: &mut Vec<ResolvedTarget>) {
    let mut seen = std::collections::HashSet::new();
    targets.retain(|t| seen.insert(t.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use luxhub_domain::device::{Device, Power};
    use luxhub_domain::id::{GroupId, SceneId};
    use luxhub_domain::scene::{Scene, TargetState};
    use luxhub_domain::time::now;

    fn device(id: &str, label: &str, group: Option<(&str, &str)>) -> Device {
        let mut builder = Device::builder().id(id).label(label).power(Power::Off);
        if let Some((gid, glabel)) = group {
            builder = builder.group(gid, glabel);
        }
        builder.build().unwrap()
    }

    fn beam(id: &str, label: &str, zones: u16) -> Device {
        Device::builder()
            .id(id)
            .label(label)
            .power(Power::Off)
            .zones(zones)
            .build()
            .unwrap()
    }

    fn snapshot() -> DirectorySnapshot {
        let scene = Scene {
            id: SceneId::new(),
            label: "Evening".to_string(),
            states: vec![
                TargetState::for_selector(Selector::Device("d1".into())),
                TargetState::for_selector(Selector::Group(GroupId::new("g2"))),
            ],
        };
        DirectorySnapshot::new(
            vec![
                device("d1", "Desk Lamp", Some(("g1", "Office"))),
                device("d2", "Shelf Light", Some(("g1", "Office"))),
                device("d3", "Bed Lamp", Some(("g2", "Bedroom"))),
                beam("d4", "Beam", 10),
            ],
            vec![scene],
            now(),
        )
    }

    #[test]
    fn should_resolve_all_in_directory_order() {
        let snap = snapshot();
        let targets = resolve(&Selector::All, &snap).unwrap();
        let ids: Vec<&str> = targets.iter().map(|t| t.device.as_str()).collect();
        assert_eq!(ids, ["d1", "d2", "d3", "d4"]);
    }

    #[test]
    fn should_resolve_device_selector() {
        let snap = snapshot();
        let targets = resolve(&Selector::Device("d3".into()), &snap).unwrap();
        assert_eq!(targets, vec![ResolvedTarget::device("d3".into())]);
    }

    #[test]
    fn should_fail_on_unknown_device() {
        let snap = snapshot();
        let result = resolve(&Selector::Device("nope".into()), &snap);
        assert!(matches!(result, Err(LuxhubError::InvalidSelector(_))));
    }

    #[test]
    fn should_resolve_group_members() {
        let snap = snapshot();
        let targets = resolve(&Selector::Group(GroupId::new("g1")), &snap).unwrap();
        let ids: Vec<&str> = targets.iter().map(|t| t.device.as_str()).collect();
        assert_eq!(ids, ["d1", "d2"]);
    }

    #[test]
    fn should_fail_on_unknown_group() {
        let snap = snapshot();
        let result = resolve(&Selector::Group(GroupId::new("g9")), &snap);
        assert!(matches!(result, Err(LuxhubError::InvalidSelector(_))));
    }

    #[test]
    fn should_resolve_scene_to_union_of_target_devices() {
        let snap = snapshot();
        let scene_id = snap.scenes[0].id;
        let targets = resolve(&Selector::Scene(scene_id), &snap).unwrap();
        let ids: Vec<&str> = targets.iter().map(|t| t.device.as_str()).collect();
        assert_eq!(ids, ["d1", "d3"]);
    }

    #[test]
    fn should_fail_on_unknown_scene() {
        let snap = snapshot();
        let result = resolve(&Selector::Scene(SceneId::new()), &snap);
        assert!(matches!(result, Err(LuxhubError::InvalidSelector(_))));
    }

    #[test]
    fn should_resolve_label_to_device_then_group() {
        let snap = snapshot();
        let targets = resolve(&Selector::Label("desk lamp".to_string()), &snap).unwrap();
        assert_eq!(targets.len(), 1);

        let targets = resolve(&Selector::Label("office".to_string()), &snap).unwrap();
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn should_fail_on_unknown_label() {
        let snap = snapshot();
        let result = resolve(&Selector::Label("garage".to_string()), &snap);
        assert!(matches!(result, Err(LuxhubError::InvalidSelector(_))));
    }

    #[test]
    fn should_resolve_zone_range_within_bounds() {
        let snap = snapshot();
        let sel = Selector::parse("id:d4|0-4").unwrap();
        let targets = resolve(&sel, &snap).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].zones.unwrap().len(), 5);
    }

    #[test]
    fn should_fail_on_zone_range_out_of_bounds() {
        let snap = snapshot();
        let sel = Selector::parse("id:d4|8-12").unwrap();
        let result = resolve(&sel, &snap);
        assert!(matches!(result, Err(LuxhubError::InvalidSelector(_))));
    }

    #[test]
    fn should_fail_on_zones_for_single_zone_device() {
        let snap = snapshot();
        let sel = Selector::parse("id:d1|0-1").unwrap();
        assert!(resolve(&sel, &snap).is_err());
    }

    #[test]
    fn should_deduplicate_preserving_first_occurrence() {
        let mut targets = vec![
            ResolvedTarget::device("d1".into()),
            ResolvedTarget::device("d2".into()),
            ResolvedTarget::device("d1".into()),
        ];
        dedup_in_place(&mut targets);
        let ids: Vec<&str> = targets.iter().map(|t| t.device.as_str()).collect();
        assert_eq!(ids, ["d1", "d2"]);
    }

    #[test]
    fn should_rebuild_selector_from_target() {
        let target = ResolvedTarget {
            device: "d4".into(),
            zones: Some(ZoneRange { start: 0, end: 4 }),
        };
        assert_eq!(target.selector().to_string(), "id:d4|0-4");
    }
}
