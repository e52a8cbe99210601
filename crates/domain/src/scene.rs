//! Scene — a named preset with per-device target states.
//!
//! Scenes are owned by the device cloud; there is no server-side "is this
//! scene active" signal, so activation is inferred by the
//! [`matcher`](crate::matcher) from the recorded targets.

use serde::{Deserialize, Serialize};

use crate::device::Power;
use crate::error::{LuxhubError, ValidationError};
use crate::id::SceneId;
use crate::selector::Selector;

/// Desired color components. Absent fields are unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetColor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kelvin: Option<u16>,
}

/// One recorded target: a device (or group) and the state it should hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetState {
    /// The addressed device or group.
    pub selector: Selector,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<Power>,
    /// Desired brightness in [0, 1].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<TargetColor>,
}

impl TargetState {
    /// A target addressing one selector with no constraints.
    #[must_use]
    pub fn for_selector(selector: Selector) -> Self {
        Self {
            selector,
            power: None,
            brightness: None,
            color: None,
        }
    }
}

/// A named preset with an ordered list of target states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: SceneId,
    pub label: String,
    pub states: Vec<TargetState>,
}

impl Scene {
    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`LuxhubError::Validation`] when `label` is empty or any
    /// target brightness is outside [0, 1].
    pub fn validate(&self) -> Result<(), LuxhubError> {
        if self.label.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        for state in &self.states {
            if let Some(brightness) = state.brightness {
                if !(0.0..=1.0).contains(&brightness) {
                    return Err(ValidationError::OutOfUnitRange {
                        field: "brightness",
                        value: brightness,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::DeviceId;

    fn target(id: &str) -> TargetState {
        TargetState::for_selector(Selector::Device(DeviceId::new(id)))
    }

    #[test]
    fn should_validate_scene_with_label() {
        let scene = Scene {
            id: SceneId::new(),
            label: "Movie Night".to_string(),
            states: vec![target("d073d5000001")],
        };
        assert!(scene.validate().is_ok());
    }

    #[test]
    fn should_reject_empty_label() {
        let scene = Scene {
            id: SceneId::new(),
            label: String::new(),
            states: vec![],
        };
        assert!(matches!(
            scene.validate(),
            Err(LuxhubError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_reject_target_brightness_above_one() {
        let mut state = target("d073d5000001");
        state.brightness = Some(1.2);
        let scene = Scene {
            id: SceneId::new(),
            label: "Bad".to_string(),
            states: vec![state],
        };
        assert!(scene.validate().is_err());
    }

    #[test]
    fn should_roundtrip_through_serde_json() {
        let scene = Scene {
            id: SceneId::new(),
            label: "Evening".to_string(),
            states: vec![TargetState {
                selector: Selector::Device(DeviceId::new("d073d5000001")),
                power: Some(Power::On),
                brightness: Some(0.4),
                color: Some(TargetColor {
                    hue: Some(30.0),
                    saturation: Some(0.2),
                    kelvin: None,
                }),
            }],
        };
        let json = serde_json::to_string(&scene).unwrap();
        let parsed: Scene = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, scene);
    }
}
