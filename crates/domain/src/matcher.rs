//! Scene state matcher — compares recorded targets against observed state.
//!
//! There is no cloud-side "scene active" signal, so activation is inferred:
//! each target state is checked against the devices it addresses with four
//! independent tolerance checks, and the scene's score is the fraction of
//! targets with at least one matching device. Everything here is a pure
//! function of its inputs.

use serde::{Deserialize, Serialize};

use crate::device::Device;
use crate::directory::DirectorySnapshot;
use crate::scene::{Scene, TargetState};
use crate::selector::Selector;

/// Per-attribute tolerances and the aggregate activation threshold.
///
/// All values are externally configurable (`luxhub.toml [matcher]`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Brightness deviation on a 0–1 scale.
    pub brightness: f64,
    /// Circular hue deviation in degrees.
    pub hue_degrees: f64,
    /// Saturation deviation on a 0–1 scale.
    pub saturation: f64,
    /// Color-temperature deviation in kelvin.
    pub kelvin: u16,
    /// Fraction of targets that must match for a scene to count as active.
    pub threshold: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            brightness: 0.05,
            hue_degrees: 10.0,
            saturation: 0.10,
            kelvin: 200,
            threshold: 0.70,
        }
    }
}

/// Circular hue distance in degrees, symmetric and bounded in [0, 180].
#[must_use]
pub fn hue_distance(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % 360.0;
    diff.min(360.0 - diff)
}

/// Outcome of matching one scene against one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneMatch {
    /// Targets with at least one matching device.
    pub matched: usize,
    /// Total targets in the scene.
    pub total: usize,
}

impl SceneMatch {
    /// Aggregate score in [0, 1]. An empty scene scores 0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn score(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.matched as f64 / self.total as f64
    }

    /// Whether the score reaches the activation threshold.
    #[must_use]
    pub fn is_active(&self, tolerances: &Tolerances) -> bool {
        self.total > 0 && self.score() >= tolerances.threshold
    }
}

/// Score a scene against a snapshot.
#[must_use]
pub fn match_score(scene: &Scene, snapshot: &DirectorySnapshot, tolerances: &Tolerances) -> SceneMatch {
    let total = scene.states.len();
    let matched = scene
        .states
        .iter()
        .filter(|target| {
            snapshot
                .devices
                .iter()
                .filter(|device| addresses(&target.selector, device))
                .any(|device| device_matches(device, target, tolerances))
        })
        .count();
    SceneMatch { matched, total }
}

/// Boolean per-device match from the four independent tolerance checks.
///
/// Power must match exactly when constrained. An off device matches on
/// power alone; brightness and color are only meaningful while lit.
/// Kelvin is enforced only for white-mode targets (saturation near zero);
/// for saturated targets it is a secondary signal and never fails a match.
#[must_use]
pub fn device_matches(device: &Device, target: &TargetState, tolerances: &Tolerances) -> bool {
    if let Some(power) = target.power {
        if device.power != power {
            return false;
        }
    }
    if !device.power.is_on() {
        return true;
    }

    if let Some(brightness) = target.brightness {
        if (device.brightness - brightness).abs() > tolerances.brightness {
            return false;
        }
    }

    let Some(color) = &target.color else {
        return true;
    };

    if let Some(hue) = color.hue {
        if hue_distance(device.color.hue, hue) > tolerances.hue_degrees {
            return false;
        }
    }
    if let Some(saturation) = color.saturation {
        if (device.color.saturation - saturation).abs() > tolerances.saturation {
            return false;
        }
    }
    if let Some(kelvin) = color.kelvin {
        let white_mode = color.saturation.unwrap_or(device.color.saturation) <= tolerances.saturation;
        if white_mode {
            let observed = f64::from(device.color.kelvin);
            let wanted = f64::from(kelvin);
            if (observed - wanted).abs() > f64::from(tolerances.kelvin) {
                return false;
            }
        }
    }
    true
}

/// Whether a target selector addresses a given device.
///
/// Scene selectors never address devices directly; labels compare
/// case-insensitively against device and group labels.
fn addresses(selector: &Selector, device: &Device) -> bool {
    match selector {
        Selector::All => true,
        Selector::Device(id) => &device.id == id,
        Selector::Zoned { device: id, .. } => &device.id == id,
        Selector::Group(id) => device.group.as_ref().is_some_and(|g| &g.id == id),
        Selector::Label(label) => {
            device.label.eq_ignore_ascii_case(label)
                || device
                    .group
                    .as_ref()
                    .is_some_and(|g| g.label.eq_ignore_ascii_case(label))
        }
        Selector::Scene(_) => false,
    }
}
