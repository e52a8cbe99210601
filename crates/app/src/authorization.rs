//! Authorization gate — read-time filtering and write-time enforcement.
//!
//! Everything here is fail-closed: an unresolvable selector or an empty
//! resolved permission set means zero permitted devices, never "all".
//! Admins bypass both directions unconditionally. `all` never bypasses the
//! resolved set — for a non-admin it means "all devices I may see".

use luxhub_domain::device::Device;
use luxhub_domain::directory::DirectorySnapshot;
use luxhub_domain::error::{LuxhubError, PermissionDeniedError};
use luxhub_domain::id::SceneId;
use luxhub_domain::scene::Scene;
use luxhub_domain::user::{ResolvedPermissionSet, User};

use crate::resolver::{self, ResolvedTarget};

/// Write-time verdict: the permitted subset and the denied remainder.
#[derive(Debug, Clone)]
pub struct Authorized {
    pub permitted: Vec<ResolvedTarget>,
    pub denied: Vec<ResolvedTarget>,
}

impl Authorized {
    /// Whether anything at all may be dispatched.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        self.permitted.is_empty()
    }

    /// Whether the whole resolved set survived unchanged.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.denied.is_empty()
    }
}

/// Read-time filtering: the subset of `devices` the user is shown.
#[must_use]
pub fn filter_visible<'a>(
    user: &User,
    resolved: &ResolvedPermissionSet,
    devices: &'a [Device],
) -> Vec<&'a Device> {
    if user.is_admin() {
        return devices.iter().collect();
    }
    devices
        .iter()
        .filter(|d| resolved.permits_device(d))
        .collect()
}

/// Read-time filtering for scenes, by scene label.
#[must_use]
pub fn filter_visible_scenes<'a>(
    user: &User,
    resolved: &ResolvedPermissionSet,
    scenes: &'a [Scene],
) -> Vec<&'a Scene> {
    if user.is_admin() {
        return scenes.iter().collect();
    }
    scenes
        .iter()
        .filter(|s| resolved.permits_scene_label(&s.label))
        .collect()
}

/// Write-time enforcement over an already resolved target set.
///
/// Each device is checked independently against the resolved permission
/// set; the caller decides what to do with a partial verdict. A fully
/// denied verdict is surfaced by [`require_any`].
#[must_use]
pub fn authorize(
    user: &User,
    resolved: &ResolvedPermissionSet,
    targets: Vec<ResolvedTarget>,
    snapshot: &DirectorySnapshot,
) -> Authorized {
    if user.is_admin() {
        return Authorized {
            permitted: targets,
            denied: Vec::new(),
        };
    }

    let (permitted, denied) = targets.into_iter().partition(|target| {
        snapshot
            .device(&target.device)
            .is_some_and(|device| resolved.permits_device(device))
    });
    Authorized { permitted, denied }
}

/// Turn a fully denied verdict into `PermissionDenied`.
///
/// # Errors
///
/// Returns [`LuxhubError::PermissionDenied`] when no target is permitted.
pub fn require_any(
    verdict: Authorized,
    user: &User,
    selector: &str,
) -> Result<Authorized, LuxhubError> {
    if verdict.is_denied() {
        tracing::warn!(user = %user.username, selector, "write denied");
        return Err(PermissionDeniedError {
            username: user.username.clone(),
            selector: selector.to_string(),
        }
        .into());
    }
    Ok(verdict)
}

/// Scene activation is all-or-nothing: the user must be permitted every
/// device the scene addresses, otherwise the activation is rejected
/// outright rather than partially applied.
///
/// # Errors
///
/// Returns [`LuxhubError::InvalidSelector`] when the scene does not exist
/// in the snapshot, or [`LuxhubError::PermissionDenied`] when any addressed
/// device is outside the user's resolved set.
pub fn authorize_scene_activation(
    user: &User,
    resolved: &ResolvedPermissionSet,
    scene: SceneId,
    snapshot: &DirectorySnapshot,
) -> Result<(), LuxhubError> {
    let targets = resolver::resolve(
        &luxhub_domain::selector::Selector::Scene(scene),
        snapshot,
    )?;
    if user.is_admin() {
        return Ok(());
    }

    let verdict = authorize(user, resolved, targets, snapshot);
    if !verdict.is_full() || verdict.permitted.is_empty() {
        tracing::warn!(user = %user.username, scene = %scene, "scene activation denied");
        return Err(PermissionDeniedError {
            username: user.username.clone(),
            selector: format!("scene_id:{scene}"),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use luxhub_domain::device::Power;
    use luxhub_domain::id::UserId;
    use luxhub_domain::scene::TargetState;
    use luxhub_domain::selector::Selector;
    use luxhub_domain::time::now;
    use luxhub_domain::user::Role;

    fn user(role: Role) -> User {
        User {
            id: UserId::new(1),
            username: "frida".to_string(),
            role,
            nlp_enabled: true,
        }
    }

    fn device(id: &str, label: &str, group: Option<(&str, &str)>) -> Device {
        let mut builder = Device::builder().id(id).label(label).power(Power::Off);
        if let Some((gid, glabel)) = group {
            builder = builder.group(gid, glabel);
        }
        builder.build().unwrap()
    }

    /// Ten devices, two of them in the Bedroom group.
    fn snapshot() -> DirectorySnapshot {
        let mut devices = vec![
            device("b1", "Bed Lamp", Some(("g2", "Bedroom"))),
            device("b2", "Bed Strip", Some(("g2", "Bedroom"))),
        ];
        for n in 0..8 {
            devices.push(device(
                &format!("x{n}"),
                &format!("Other {n}"),
                Some(("g1", "Elsewhere")),
            ));
        }
        DirectorySnapshot::new(devices, vec![], now())
    }

    fn bedroom_perms() -> ResolvedPermissionSet {
        let mut set = ResolvedPermissionSet::default();
        set.allow_group("Bedroom");
        set.allow_device("Bed Lamp");
        set.allow_device("Bed Strip");
        set
    }

    #[test]
    fn should_show_admin_everything() {
        let snap = snapshot();
        let visible = filter_visible(&user(Role::Admin), &ResolvedPermissionSet::default(), &snap.devices);
        assert_eq!(visible.len(), 10);
    }

    #[test]
    fn should_show_named_user_only_permitted_devices() {
        let snap = snapshot();
        let visible = filter_visible(&user(Role::Named), &bedroom_perms(), &snap.devices);
        assert_eq!(visible.len(), 2);
    }

    #[test]
    fn should_show_nothing_without_grants() {
        let snap = snapshot();
        let visible = filter_visible(&user(Role::Guest), &ResolvedPermissionSet::default(), &snap.devices);
        assert!(visible.is_empty());
    }

    #[test]
    fn should_scope_all_selector_to_resolved_set() {
        // User with group:Bedroom (2 devices) issuing `all` against a
        // 10-device directory affects exactly those 2 devices.
        let snap = snapshot();
        let targets = resolver::resolve(&Selector::All, &snap).unwrap();
        assert_eq!(targets.len(), 10);

        let verdict = authorize(&user(Role::Named), &bedroom_perms(), targets, &snap);
        let ids: Vec<&str> = verdict.permitted.iter().map(|t| t.device.as_str()).collect();
        assert_eq!(ids, ["b1", "b2"]);
        assert_eq!(verdict.denied.len(), 8);
    }

    #[test]
    fn should_deny_all_when_set_is_empty() {
        let snap = snapshot();
        let targets = resolver::resolve(&Selector::All, &snap).unwrap();
        let verdict = authorize(
            &user(Role::Guest),
            &ResolvedPermissionSet::default(),
            targets,
            &snap,
        );
        assert!(verdict.is_denied());
        let result = require_any(verdict, &user(Role::Guest), "all");
        assert!(matches!(result, Err(LuxhubError::PermissionDenied(_))));
    }

    #[test]
    fn should_bypass_checks_for_admin() {
        let snap = snapshot();
        let targets = resolver::resolve(&Selector::All, &snap).unwrap();
        let verdict = authorize(
            &user(Role::Admin),
            &ResolvedPermissionSet::default(),
            targets,
            &snap,
        );
        assert_eq!(verdict.permitted.len(), 10);
        assert!(verdict.is_full());
    }

    #[test]
    fn should_reject_partial_scene_activation_outright() {
        let mut snap = snapshot();
        let scene = Scene {
            id: luxhub_domain::id::SceneId::new(),
            label: "Whole Flat".to_string(),
            states: vec![
                TargetState::for_selector(Selector::Device("b1".into())),
                TargetState::for_selector(Selector::Device("x0".into())),
            ],
        };
        let scene_id = scene.id;
        snap.scenes.push(scene);

        // Bedroom-only user may not activate a scene that also addresses x0.
        let result = authorize_scene_activation(
            &user(Role::Named),
            &bedroom_perms(),
            scene_id,
            &snap,
        );
        assert!(matches!(result, Err(LuxhubError::PermissionDenied(_))));
    }

    #[test]
    fn should_allow_scene_activation_when_every_device_is_permitted() {
        let mut snap = snapshot();
        let scene = Scene {
            id: luxhub_domain::id::SceneId::new(),
            label: "Bedtime".to_string(),
            states: vec![
                TargetState::for_selector(Selector::Device("b1".into())),
                TargetState::for_selector(Selector::Device("b2".into())),
            ],
        };
        let scene_id = scene.id;
        snap.scenes.push(scene);

        let result = authorize_scene_activation(
            &user(Role::Named),
            &bedroom_perms(),
            scene_id,
            &snap,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn should_filter_scenes_by_label() {
        let scenes = vec![
            Scene {
                id: luxhub_domain::id::SceneId::new(),
                label: "Movie Night".to_string(),
                states: vec![],
            },
            Scene {
                id: luxhub_domain::id::SceneId::new(),
                label: "Morning".to_string(),
                states: vec![],
            },
        ];
        let mut set = ResolvedPermissionSet::default();
        set.allow_scene("movie night");

        let visible = filter_visible_scenes(&user(Role::Named), &set, &scenes);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].label, "Movie Night");

        let visible = filter_visible_scenes(&user(Role::Admin), &set, &scenes);
        assert_eq!(visible.len(), 2);
    }
}
