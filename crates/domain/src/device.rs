//! Device — a read-only snapshot of a cloud-owned light.
//!
//! Devices are owned and mutated by the device cloud; this crate only ever
//! sees point-in-time snapshots refreshed per poll or request.

use serde::{Deserialize, Serialize};

use crate::error::{LuxhubError, ValidationError};
use crate::id::{DeviceId, GroupId};

/// Observed power state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Power {
    On,
    Off,
}

impl Power {
    /// Whether the device is lit.
    #[must_use]
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

impl std::fmt::Display for Power {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
        }
    }
}

/// Observed HSBK color. Hue in degrees [0, 360), saturation in [0, 1],
/// kelvin in the device's supported temperature range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub hue: f64,
    pub saturation: f64,
    pub kelvin: u16,
}

/// Group membership as reported by the cloud on each device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: GroupId,
    pub label: String,
}

/// What the hardware supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub has_color: bool,
    pub has_variable_color_temp: bool,
    pub has_multizone: bool,
}

/// Zone information for multizone devices (beams, strips).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zones {
    /// Number of individually addressable zones.
    pub count: u16,
}

/// A single light as observed at snapshot time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Stable, hardware-derived identifier.
    pub id: DeviceId,
    /// Human-assigned, mutable label.
    pub label: String,
    /// Group membership, if any.
    pub group: Option<GroupRef>,
    /// Whether the cloud currently has a connection to the device.
    pub connected: bool,
    pub power: Power,
    pub color: Color,
    /// Brightness in [0, 1].
    pub brightness: f64,
    pub capabilities: Capabilities,
    /// Present only for multizone devices.
    pub zones: Option<Zones>,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Zone count, 0 for single-zone devices.
    #[must_use]
    pub fn zone_count(&self) -> u16 {
        self.zones.map_or(0, |z| z.count)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`LuxhubError::Validation`] when `label` is empty or
    /// `brightness` is outside [0, 1].
    pub fn validate(&self) -> Result<(), LuxhubError> {
        if self.label.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if !(0.0..=1.0).contains(&self.brightness) {
            return Err(ValidationError::OutOfUnitRange {
                field: "brightness",
                value: self.brightness,
            }
            .into());
        }
        Ok(())
    }
}

/// A group derived from device membership; never stored independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub label: String,
    pub device_ids: Vec<DeviceId>,
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    label: Option<String>,
    group: Option<GroupRef>,
    connected: Option<bool>,
    power: Option<Power>,
    color: Option<Color>,
    brightness: Option<f64>,
    capabilities: Option<Capabilities>,
    zones: Option<Zones>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<DeviceId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn group(mut self, id: impl Into<GroupId>, label: impl Into<String>) -> Self {
        self.group = Some(GroupRef {
            id: id.into(),
            label: label.into(),
        });
        self
    }

    #[must_use]
    pub fn connected(mut self, connected: bool) -> Self {
        self.connected = Some(connected);
        self
    }

    #[must_use]
    pub fn power(mut self, power: Power) -> Self {
        self.power = Some(power);
        self
    }

    #[must_use]
    pub fn color(mut self, hue: f64, saturation: f64, kelvin: u16) -> Self {
        self.color = Some(Color {
            hue,
            saturation,
            kelvin,
        });
        self
    }

    #[must_use]
    pub fn brightness(mut self, brightness: f64) -> Self {
        self.brightness = Some(brightness);
        self
    }

    #[must_use]
    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    #[must_use]
    pub fn zones(mut self, count: u16) -> Self {
        self.zones = Some(Zones { count });
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// # Errors
    ///
    /// Returns [`LuxhubError::Validation`] if `label` is missing or empty,
    /// or `brightness` is out of range.
    pub fn build(self) -> Result<Device, LuxhubError> {
        let device = Device {
            id: self.id.unwrap_or_else(|| DeviceId::new("")),
            label: self.label.unwrap_or_default(),
            group: self.group,
            connected: self.connected.unwrap_or(true),
            power: self.power.unwrap_or(Power::Off),
            color: self.color.unwrap_or(Color {
                hue: 0.0,
                saturation: 0.0,
                kelvin: 3500,
            }),
            brightness: self.brightness.unwrap_or(1.0),
            capabilities: self.capabilities.unwrap_or_default(),
            zones: self.zones,
        };
        device.validate()?;
        Ok(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_valid_device_when_label_provided() {
        let device = Device::builder()
            .id("d073d5000001")
            .label("Desk Lamp")
            .build()
            .unwrap();
        assert_eq!(device.label, "Desk Lamp");
        assert_eq!(device.power, Power::Off);
        assert!(device.group.is_none());
        assert_eq!(device.zone_count(), 0);
    }

    #[test]
    fn should_return_validation_error_when_label_is_empty() {
        let result = Device::builder().id("d073d5000001").build();
        assert!(matches!(
            result,
            Err(LuxhubError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_reject_out_of_range_brightness() {
        let result = Device::builder()
            .id("d073d5000001")
            .label("Desk Lamp")
            .brightness(1.5)
            .build();
        assert!(matches!(
            result,
            Err(LuxhubError::Validation(ValidationError::OutOfUnitRange { .. }))
        ));
    }

    #[test]
    fn should_report_zone_count_for_multizone_device() {
        let device = Device::builder()
            .id("d073d5000002")
            .label("Beam")
            .zones(10)
            .build()
            .unwrap();
        assert_eq!(device.zone_count(), 10);
    }

    #[test]
    fn should_roundtrip_through_serde_json() {
        let device = Device::builder()
            .id("d073d5000001")
            .label("Desk Lamp")
            .group("g1", "Office")
            .power(Power::On)
            .color(120.0, 1.0, 3500)
            .brightness(0.8)
            .build()
            .unwrap();
        let json = serde_json::to_string(&device).unwrap();
        let parsed: Device = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, device.id);
        assert_eq!(parsed.power, Power::On);
        assert!((parsed.color.hue - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_serialize_power_lowercase() {
        assert_eq!(serde_json::to_string(&Power::On).unwrap(), "\"on\"");
        assert_eq!(serde_json::to_string(&Power::Off).unwrap(), "\"off\"");
    }
}
