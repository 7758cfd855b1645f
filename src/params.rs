//! # Scene Parameters
//!
//! The declarative parameter set the whole diorama is derived from. Every
//! dimension, color, light falloff and visibility flag lives here, grouped by
//! subject. Values are addressable by dotted path (`"wall.height"`,
//! `"houseLight.decay"`) so the debug panel and tests can read and write them
//! without knowing the struct layout.
//!
//! No range validation happens here: an out-of-range slider value is passed
//! through to the renderer untouched.

use crate::error::ParamError;

/// Display (sRGB-encoded) color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from a packed `0xRRGGBB` value
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Packs the color back into `0xRRGGBB`, clamping each channel
    pub fn to_hex(self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn from_array(rgb: [f32; 3]) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2])
    }
}

/// A single parameter value read from or written to a [`ParameterSet`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Number(f32),
    Color(Color),
    Flag(bool),
}

impl ParamValue {
    fn kind(&self) -> &'static str {
        match self {
            ParamValue::Number(_) => "number",
            ParamValue::Color(_) => "color",
            ParamValue::Flag(_) => "flag",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorParams {
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallParams {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoofParams {
    pub radius: f32,
    pub height: f32,
    pub color: Color,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoorParams {
    pub width: f32,
    pub height: f32,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraveParams {
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientParams {
    pub color: Color,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoonParams {
    pub color: Color,
    pub intensity: f32,
    pub helper: bool,
}

/// Shared shape of the house light and the three ghosts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLightParams {
    pub color: Color,
    pub intensity: f32,
    pub distance: f32,
    pub decay: f32,
    pub helper: bool,
}

impl PointLightParams {
    fn new(color: u32, distance: f32, decay: f32) -> Self {
        Self {
            color: Color::from_hex(color),
            intensity: 1.0,
            distance,
            decay,
            helper: false,
        }
    }
}

/// Every tunable aspect of the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSet {
    pub floor: FloorParams,
    pub wall: WallParams,
    pub roof: RoofParams,
    pub door: DoorParams,
    pub grave: GraveParams,
    pub ambient: AmbientParams,
    pub moon: MoonParams,
    pub house_light: PointLightParams,
    pub ghost1: PointLightParams,
    pub ghost2: PointLightParams,
    pub ghost3: PointLightParams,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            floor: FloorParams { visible: true },
            wall: WallParams {
                width: 5.0,
                height: 4.0,
                depth: 5.0,
                visible: true,
            },
            roof: RoofParams {
                radius: 4.0,
                height: 2.0,
                color: Color::from_hex(0xb35f45),
                visible: true,
            },
            door: DoorParams {
                width: 2.5,
                height: 2.5,
                visible: true,
            },
            grave: GraveParams {
                color: Color::from_hex(0xb2b6b1),
            },
            ambient: AmbientParams {
                color: Color::from_hex(0xb9d5ff),
                intensity: 0.12,
            },
            moon: MoonParams {
                color: Color::from_hex(0xb9d5ff),
                intensity: 0.2,
                helper: false,
            },
            house_light: PointLightParams::new(0xff7d46, 15.0, 2.0),
            ghost1: PointLightParams::new(0xff0000, 12.0, 1.0),
            ghost2: PointLightParams::new(0xff00ff, 8.0, 1.0),
            ghost3: PointLightParams::new(0x0000ff, 8.0, 2.0),
        }
    }
}

/// Mutable view of one addressable field
enum Slot<'a> {
    Number(&'a mut f32),
    Color(&'a mut Color),
    Flag(&'a mut bool),
}

impl ParameterSet {
    /// Every path accepted by [`get`](Self::get) and [`set`](Self::set)
    pub const PATHS: &'static [&'static str] = &[
        "floor.visible",
        "wall.width",
        "wall.height",
        "wall.depth",
        "wall.visible",
        "roof.radius",
        "roof.height",
        "roof.color",
        "roof.visible",
        "door.width",
        "door.height",
        "door.visible",
        "grave.color",
        "ambient.color",
        "ambient.intensity",
        "moon.color",
        "moon.intensity",
        "moon.helper",
        "houseLight.color",
        "houseLight.intensity",
        "houseLight.distance",
        "houseLight.decay",
        "houseLight.helper",
        "ghost1.color",
        "ghost1.intensity",
        "ghost1.distance",
        "ghost1.decay",
        "ghost1.helper",
        "ghost2.color",
        "ghost2.intensity",
        "ghost2.distance",
        "ghost2.decay",
        "ghost2.helper",
        "ghost3.color",
        "ghost3.intensity",
        "ghost3.distance",
        "ghost3.decay",
        "ghost3.helper",
    ];

    /// Reads the value at a dotted path such as `"roof.color"`
    pub fn get(&self, path: &str) -> Result<ParamValue, ParamError> {
        let mut scratch = *self;
        let value = match scratch.slot(path)? {
            Slot::Number(v) => ParamValue::Number(*v),
            Slot::Color(c) => ParamValue::Color(*c),
            Slot::Flag(f) => ParamValue::Flag(*f),
        };
        Ok(value)
    }

    /// Writes the value at a dotted path; the value kind must match the field
    pub fn set(&mut self, path: &str, value: ParamValue) -> Result<(), ParamError> {
        match (self.slot(path)?, value) {
            (Slot::Number(slot), ParamValue::Number(v)) => *slot = v,
            (Slot::Color(slot), ParamValue::Color(c)) => *slot = c,
            (Slot::Flag(slot), ParamValue::Flag(f)) => *slot = f,
            (slot, value) => {
                let expected = match slot {
                    Slot::Number(_) => "number",
                    Slot::Color(_) => "color",
                    Slot::Flag(_) => "flag",
                };
                return Err(ParamError::TypeMismatch {
                    path: path.to_string(),
                    expected,
                    found: value.kind(),
                });
            }
        }
        Ok(())
    }

    fn point_light_mut(&mut self, group: &str) -> Option<&mut PointLightParams> {
        match group {
            "houseLight" => Some(&mut self.house_light),
            "ghost1" => Some(&mut self.ghost1),
            "ghost2" => Some(&mut self.ghost2),
            "ghost3" => Some(&mut self.ghost3),
            _ => None,
        }
    }

    fn slot(&mut self, path: &str) -> Result<Slot<'_>, ParamError> {
        let unknown = || ParamError::UnknownPath(path.to_string());
        let (group, field) = path.split_once('.').ok_or_else(unknown)?;

        let slot = match (group, field) {
            ("floor", "visible") => Slot::Flag(&mut self.floor.visible),
            ("wall", "width") => Slot::Number(&mut self.wall.width),
            ("wall", "height") => Slot::Number(&mut self.wall.height),
            ("wall", "depth") => Slot::Number(&mut self.wall.depth),
            ("wall", "visible") => Slot::Flag(&mut self.wall.visible),
            ("roof", "radius") => Slot::Number(&mut self.roof.radius),
            ("roof", "height") => Slot::Number(&mut self.roof.height),
            ("roof", "color") => Slot::Color(&mut self.roof.color),
            ("roof", "visible") => Slot::Flag(&mut self.roof.visible),
            ("door", "width") => Slot::Number(&mut self.door.width),
            ("door", "height") => Slot::Number(&mut self.door.height),
            ("door", "visible") => Slot::Flag(&mut self.door.visible),
            ("grave", "color") => Slot::Color(&mut self.grave.color),
            ("ambient", "color") => Slot::Color(&mut self.ambient.color),
            ("ambient", "intensity") => Slot::Number(&mut self.ambient.intensity),
            ("moon", "color") => Slot::Color(&mut self.moon.color),
            ("moon", "intensity") => Slot::Number(&mut self.moon.intensity),
            ("moon", "helper") => Slot::Flag(&mut self.moon.helper),
            (group, field) => {
                let light = self.point_light_mut(group).ok_or_else(unknown)?;
                match field {
                    "color" => Slot::Color(&mut light.color),
                    "intensity" => Slot::Number(&mut light.intensity),
                    "distance" => Slot::Number(&mut light.distance),
                    "decay" => Slot::Number(&mut light.decay),
                    "helper" => Slot::Flag(&mut light.helper),
                    _ => return Err(unknown()),
                }
            }
        };
        Ok(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_scene() {
        let params = ParameterSet::default();
        assert_eq!(params.wall.height, 4.0);
        assert_eq!(params.roof.color.to_hex(), 0xb35f45);
        assert_eq!(params.house_light.distance, 15.0);
        assert_eq!(params.ghost3.decay, 2.0);
        assert!(!params.moon.helper);
    }

    #[test]
    fn test_every_listed_path_is_readable() {
        let params = ParameterSet::default();
        for path in ParameterSet::PATHS {
            assert!(params.get(path).is_ok(), "path {} should resolve", path);
        }
    }

    #[test]
    fn test_set_then_get() {
        let mut params = ParameterSet::default();
        params.set("wall.height", ParamValue::Number(6.0)).unwrap();
        params
            .set("ghost2.color", ParamValue::Color(Color::from_hex(0x00ff00)))
            .unwrap();
        params.set("floor.visible", ParamValue::Flag(false)).unwrap();

        assert_eq!(params.wall.height, 6.0);
        assert_eq!(params.get("ghost2.color").unwrap(), ParamValue::Color(Color::from_hex(0x00ff00)));
        assert!(!params.floor.visible);
    }

    #[test]
    fn test_out_of_range_values_pass_through() {
        let mut params = ParameterSet::default();
        params.set("houseLight.decay", ParamValue::Number(-3.0)).unwrap();
        assert_eq!(params.house_light.decay, -3.0);
    }

    #[test]
    fn test_unknown_path_and_type_mismatch() {
        let mut params = ParameterSet::default();
        assert_eq!(
            params.get("chimney.height"),
            Err(ParamError::UnknownPath("chimney.height".to_string()))
        );
        assert_eq!(
            params.get("ghost1.speed"),
            Err(ParamError::UnknownPath("ghost1.speed".to_string()))
        );
        assert!(params.get("wall").is_err());

        let err = params.set("wall.visible", ParamValue::Number(1.0)).unwrap_err();
        assert!(matches!(err, ParamError::TypeMismatch { expected: "flag", found: "number", .. }));
        assert!(params.wall.visible);
    }

    #[test]
    fn test_color_hex_conversion() {
        let color = Color::from_hex(0xff7d46);
        assert_eq!(color.to_hex(), 0xff7d46);
        assert!((color.r - 1.0).abs() < 1e-6);
        assert_eq!(Color::new(2.0, -1.0, 0.0).to_hex(), 0xff0000);
    }
}
