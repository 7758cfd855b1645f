//! # Scene Nodes
//!
//! CPU-side description of everything in the diorama: meshes with their shape
//! and material descriptors, light sources, and debug helpers that mark where
//! a light sits. The renderer turns these descriptors into GPU resources; the
//! nodes themselves never touch wgpu.

use cgmath::{Matrix4, Rad, Vector3};

use crate::assets::TextureId;
use crate::gfx::geometry::{self, GeometryData};
use crate::params::Color;

/// Index of a node inside its [`SceneGraph`](super::SceneGraph)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Position, Euler rotation (radians, applied X then Y then Z) and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = Vector3::new(x, y, z);
        self
    }

    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vector3::new(scale, scale, scale);
        self
    }

    /// Model matrix: T * Rx * Ry * Rz * S
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from_angle_x(Rad(self.rotation.x))
            * Matrix4::from_angle_y(Rad(self.rotation.y))
            * Matrix4::from_angle_z(Rad(self.rotation.z))
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

/// Procedural shape of a mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Cone {
        radius: f32,
        height: f32,
        radial_segments: u32,
    },
    Plane {
        width: f32,
        height: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
}

impl Shape {
    pub fn geometry(&self) -> GeometryData {
        match *self {
            Shape::Box {
                width,
                height,
                depth,
            } => geometry::generate_box(width, height, depth),
            Shape::Cone {
                radius,
                height,
                radial_segments,
            } => geometry::generate_cone(radius, height, radial_segments),
            Shape::Plane {
                width,
                height,
                width_segments,
                height_segments,
            } => geometry::generate_plane(width, height, width_segments, height_segments),
            Shape::Sphere {
                radius,
                width_segments,
                height_segments,
            } => geometry::generate_sphere(radius, width_segments, height_segments),
        }
    }
}

/// Texture maps a material may reference
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MaterialMaps {
    pub color: Option<TextureId>,
    pub normal: Option<TextureId>,
    pub ambient_occlusion: Option<TextureId>,
    pub roughness: Option<TextureId>,
    pub metalness: Option<TextureId>,
    pub alpha: Option<TextureId>,
    pub displacement: Option<TextureId>,
}

impl MaterialMaps {
    pub fn iter(&self) -> impl Iterator<Item = TextureId> {
        [
            self.color,
            self.normal,
            self.ambient_occlusion,
            self.roughness,
            self.metalness,
            self.alpha,
            self.displacement,
        ]
        .into_iter()
        .flatten()
    }
}

/// Standard surface description: base color plus optional maps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialDesc {
    pub color: Color,
    pub maps: MaterialMaps,
    pub roughness: f32,
    pub metalness: f32,
    pub displacement_scale: f32,
    /// UV multiplier shared by every map of the material
    pub uv_repeat: [f32; 2],
    /// Alpha-blended and drawn after opaque geometry
    pub transparent: bool,
    /// Ignores lights and fog shading, used for helpers
    pub unlit: bool,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            maps: MaterialMaps::default(),
            roughness: 1.0,
            metalness: 0.0,
            displacement_scale: 1.0,
            uv_repeat: [1.0, 1.0],
            transparent: false,
            unlit: false,
        }
    }
}

impl MaterialDesc {
    pub fn solid(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }
}

/// Color, strength and falloff of a light source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightDescriptor {
    pub color: Color,
    pub intensity: f32,
    /// Range after which a point light contributes nothing; 0 means unlimited
    pub distance: f32,
    pub decay: f32,
    pub helper: bool,
}

impl LightDescriptor {
    pub fn new(color: Color, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            distance: 0.0,
            decay: 0.0,
            helper: false,
        }
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity;
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance;
    }

    pub fn set_decay(&mut self, decay: f32) {
        self.decay = decay;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Ambient,
    Directional {
        target: Vector3<f32>,
        cast_shadow: bool,
    },
    /// `cast_shadow` records the scene's intent only: the renderer draws a
    /// shadow map for the directional moon and none for point lights
    Point {
        cast_shadow: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Mesh {
        shape: Shape,
        material: MaterialDesc,
        cast_shadow: bool,
        receive_shadow: bool,
    },
    Light {
        light: LightDescriptor,
        kind: LightKind,
    },
    /// Marker drawn at a light's position
    Helper { light: NodeId },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    pub kind: NodeKind,
}

impl SceneNode {
    pub fn mesh(name: &str, shape: Shape, material: MaterialDesc, transform: Transform) -> Self {
        Self {
            name: name.to_string(),
            transform,
            visible: true,
            kind: NodeKind::Mesh {
                shape,
                material,
                cast_shadow: false,
                receive_shadow: false,
            },
        }
    }

    pub fn light(name: &str, light: LightDescriptor, kind: LightKind, transform: Transform) -> Self {
        Self {
            name: name.to_string(),
            transform,
            visible: true,
            kind: NodeKind::Light { light, kind },
        }
    }

    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Sets the shadow flags of a mesh; no effect on other nodes
    pub fn with_shadows(mut self, cast: bool, receive: bool) -> Self {
        if let NodeKind::Mesh {
            cast_shadow,
            receive_shadow,
            ..
        } = &mut self.kind
        {
            *cast_shadow = cast;
            *receive_shadow = receive;
        }
        self
    }

    pub fn light_descriptor(&self) -> Option<&LightDescriptor> {
        match &self.kind {
            NodeKind::Light { light, .. } => Some(light),
            _ => None,
        }
    }

    pub fn light_descriptor_mut(&mut self) -> Option<&mut LightDescriptor> {
        match &mut self.kind {
            NodeKind::Light { light, .. } => Some(light),
            _ => None,
        }
    }

    pub fn casts_shadow(&self) -> bool {
        match self.kind {
            NodeKind::Mesh { cast_shadow, .. } => cast_shadow,
            NodeKind::Light {
                kind: LightKind::Directional { cast_shadow, .. } | LightKind::Point { cast_shadow },
                ..
            } => cast_shadow,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{SquareMatrix, Vector4};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_identity_transform() {
        assert_eq!(Transform::default().matrix(), Matrix4::identity());
    }

    #[test]
    fn test_floor_rotation_lays_plane_flat() {
        let floor = Transform::default().with_rotation(-FRAC_PI_2, 0.0, 0.0);
        let normal = floor.matrix() * Vector4::new(0.0, 0.0, 1.0, 0.0);
        assert!((normal.y - 1.0).abs() < 1e-6);
        assert!(normal.z.abs() < 1e-6);
    }

    #[test]
    fn test_translation_after_scale() {
        let t = Transform::at(1.0, 2.0, 3.0).with_uniform_scale(0.5);
        let p = t.matrix() * Vector4::new(2.0, 0.0, 0.0, 1.0);
        assert_eq!((p.x, p.y, p.z), (2.0, 2.0, 3.0));
    }

    #[test]
    fn test_shadow_flags_only_apply_to_meshes() {
        let grave = SceneNode::mesh(
            "grave",
            Shape::Box {
                width: 0.8,
                height: 1.2,
                depth: 0.3,
            },
            MaterialDesc::default(),
            Transform::default(),
        )
        .with_shadows(true, false);
        assert!(grave.casts_shadow());

        let ambient = SceneNode::light(
            "ambient",
            LightDescriptor::new(Color::WHITE, 0.5),
            LightKind::Ambient,
            Transform::default(),
        )
        .with_shadows(true, true);
        assert!(!ambient.casts_shadow());
        assert!(ambient.light_descriptor().is_some());
    }

    #[test]
    fn test_light_setters() {
        let mut light = LightDescriptor::new(Color::WHITE, 1.0);
        light.set_color(Color::from_hex(0xff0000));
        light.set_intensity(0.3);
        light.set_distance(12.0);
        light.set_decay(2.0);
        assert_eq!(light.color, Color::new(1.0, 0.0, 0.0));
        assert_eq!((light.intensity, light.distance, light.decay), (0.3, 12.0, 2.0));
    }
}
