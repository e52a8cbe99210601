//! Wire DTOs for the LIFX HTTP API and their domain mappings.

use serde::Deserialize;

use luxhub_domain::device::{Capabilities, Color, Device, GroupRef, Power, Zones};
use luxhub_domain::id::SceneId;
use luxhub_domain::scene::{Scene, TargetColor, TargetState};
use luxhub_domain::selector::Selector;

#[derive(Debug, Deserialize)]
pub struct LightDto {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub connected: bool,
    pub power: Power,
    pub color: ColorDto,
    pub brightness: f64,
    #[serde(default)]
    pub group: Option<GroupDto>,
    #[serde(default)]
    pub product: Option<ProductDto>,
    #[serde(default)]
    pub zones: Option<ZonesDto>,
}

#[derive(Debug, Deserialize)]
pub struct ColorDto {
    pub hue: f64,
    pub saturation: f64,
    pub kelvin: u16,
}

#[derive(Debug, Deserialize)]
pub struct GroupDto {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductDto {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub capabilities: CapabilitiesDto,
}

#[derive(Debug, Default, Deserialize)]
pub struct CapabilitiesDto {
    #[serde(default)]
    pub has_color: bool,
    #[serde(default)]
    pub has_variable_color_temp: bool,
    #[serde(default)]
    pub has_multizone: bool,
}

#[derive(Debug, Deserialize)]
pub struct ZonesDto {
    pub count: u16,
}

impl LightDto {
    /// Map the wire shape into the domain snapshot model.
    #[must_use]
    pub fn into_device(self) -> Device {
        Device {
            id: self.id.into(),
            label: self.label,
            group: self.group.map(|g| GroupRef {
                id: g.id.into(),
                label: g.name,
            }),
            connected: self.connected,
            power: self.power,
            color: Color {
                hue: self.color.hue,
                saturation: self.color.saturation,
                kelvin: self.color.kelvin,
            },
            brightness: self.brightness,
            capabilities: self
                .product
                .map(|p| Capabilities {
                    has_color: p.capabilities.has_color,
                    has_variable_color_temp: p.capabilities.has_variable_color_temp,
                    has_multizone: p.capabilities.has_multizone,
                })
                .unwrap_or_default(),
            zones: self.zones.map(|z| Zones { count: z.count }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SceneDto {
    pub uuid: SceneId,
    pub name: String,
    #[serde(default)]
    pub states: Vec<SceneStateDto>,
}

#[derive(Debug, Deserialize)]
pub struct SceneStateDto {
    pub selector: String,
    #[serde(default)]
    pub power: Option<Power>,
    #[serde(default)]
    pub brightness: Option<f64>,
    #[serde(default)]
    pub color: Option<SceneColorDto>,
}

#[derive(Debug, Deserialize)]
pub struct SceneColorDto {
    #[serde(default)]
    pub hue: Option<f64>,
    #[serde(default)]
    pub saturation: Option<f64>,
    #[serde(default)]
    pub kelvin: Option<u16>,
}

impl SceneDto {
    /// Map the wire shape into the domain scene model.
    ///
    /// Target states whose selector does not parse are dropped with a
    /// warning rather than failing the whole directory fetch.
    #[must_use]
    pub fn into_scene(self) -> Scene {
        let states = self
            .states
            .into_iter()
            .filter_map(|state| match Selector::parse(&state.selector) {
                Ok(selector) => Some(TargetState {
                    selector,
                    power: state.power,
                    brightness: state.brightness,
                    color: state.color.map(|c| TargetColor {
                        hue: c.hue,
                        saturation: c.saturation,
                        kelvin: c.kelvin,
                    }),
                }),
                Err(err) => {
                    tracing::warn!(selector = %state.selector, error = %err, "dropping unparseable scene state");
                    None
                }
            })
            .collect();
        Scene {
            id: self.uuid,
            label: self.name,
            states,
        }
    }
}

/// One entry of a write response's `results` list.
#[derive(Debug, Deserialize)]
pub struct ResultDto {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub status: String,
}

/// Body of a write response (`207 Multi-Status` on state changes).
#[derive(Debug, Default, Deserialize)]
pub struct ResultsDto {
    #[serde(default)]
    pub results: Vec<ResultDto>,
}
