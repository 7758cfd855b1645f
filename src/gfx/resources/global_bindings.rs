//! Global uniform bindings for camera, lights and fog
//!
//! One uniform block carries everything shared by every draw call in a frame.
//! The main pass sees it together with the moon's shadow map; the shadow pass
//! gets a bind group holding only the uniform, since the shadow map is its
//! render target there.

use cgmath::{Matrix4, Point3, Vector3};

use crate::{
    gfx::{
        camera::{camera_utils::CameraUniform, orbit_camera::OPENGL_TO_WGPU_MATRIX},
        resources::texture_resource::TextureResource,
        scene::{LightKind, NodeKind, SceneGraph},
    },
    params::Color,
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Point lights the shader can evaluate per fragment
pub const MAX_POINT_LIGHTS: usize = 4;

/// Half extent of the moon's orthographic shadow frustum
const MOON_SHADOW_EXTENT: f32 = 20.0;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightUniform {
    /// xyz position, w cutoff distance (0 = unlimited)
    pub position_range: [f32; 4],
    /// rgb premultiplied by intensity, w decay exponent
    pub color_decay: [f32; 4],
}

/// MUST match the `Globals` struct in `scene.wgsl`
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    pub view_proj: [[f32; 4]; 4],
    pub view_position: [f32; 4],
    pub light_view_proj: [[f32; 4]; 4],
    /// rgb premultiplied by intensity
    pub ambient: [f32; 4],
    /// xyz unit vector towards the moon, w = 1 when it casts shadows
    pub moon_direction: [f32; 4],
    pub moon_color: [f32; 4],
    pub fog_color: [f32; 4],
    /// near, far, point light count, 1 when the shader must encode sRGB itself
    pub fog_params: [f32; 4],
    pub point_lights: [PointLightUniform; MAX_POINT_LIGHTS],
}

impl Default for GlobalUBOContent {
    fn default() -> Self {
        Self {
            view_proj: CameraUniform::default().view_proj,
            view_position: [0.0; 4],
            light_view_proj: CameraUniform::default().view_proj,
            ambient: [0.0; 4],
            moon_direction: [0.0, 1.0, 0.0, 0.0],
            moon_color: [0.0; 4],
            fog_color: [0.0; 4],
            fog_params: [1.0, 1000.0, 0.0, 0.0],
            point_lights: [PointLightUniform::default(); MAX_POINT_LIGHTS],
        }
    }
}

pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Converts a display color to linear light
pub fn linear_rgb(color: Color) -> [f32; 3] {
    fn channel(c: f32) -> f32 {
        let c = c.clamp(0.0, 1.0);
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }
    [channel(color.r), channel(color.g), channel(color.b)]
}

fn premultiplied(color: Color, intensity: f32) -> [f32; 4] {
    let [r, g, b] = linear_rgb(color);
    [r * intensity, g * intensity, b * intensity, 1.0]
}

/// Orthographic view-projection of a directional light looking at `target`
pub fn directional_light_view_proj(position: Vector3<f32>, target: Vector3<f32>) -> Matrix4<f32> {
    let view = Matrix4::look_at_rh(
        Point3::new(position.x, position.y, position.z),
        Point3::new(target.x, target.y, target.z),
        Vector3::unit_y(),
    );
    let proj = cgmath::ortho(
        -MOON_SHADOW_EXTENT,
        MOON_SHADOW_EXTENT,
        -MOON_SHADOW_EXTENT,
        MOON_SHADOW_EXTENT,
        0.5,
        100.0,
    );
    OPENGL_TO_WGPU_MATRIX * proj * view
}

/// Collects camera, lights and fog of `graph` into the uniform layout
///
/// Point lights beyond [`MAX_POINT_LIGHTS`] are dropped with a warning; the
/// diorama has exactly four.
pub fn pack_globals(graph: &SceneGraph, camera: &CameraUniform, encode_srgb: bool) -> GlobalUBOContent {
    let mut content = GlobalUBOContent {
        view_proj: camera.view_proj,
        view_position: camera.view_position,
        ..GlobalUBOContent::default()
    };

    let mut point_count = 0usize;
    for (_, node) in graph.nodes() {
        let NodeKind::Light { light, kind } = &node.kind else {
            continue;
        };
        match kind {
            LightKind::Ambient => {
                let [r, g, b, _] = premultiplied(light.color, light.intensity);
                content.ambient[0] += r;
                content.ambient[1] += g;
                content.ambient[2] += b;
            }
            LightKind::Directional {
                target,
                cast_shadow,
            } => {
                let position = node.transform.position;
                let towards = position - *target;
                let length = (towards.x * towards.x + towards.y * towards.y + towards.z * towards.z)
                    .sqrt()
                    .max(f32::EPSILON);
                content.moon_direction = [
                    towards.x / length,
                    towards.y / length,
                    towards.z / length,
                    if *cast_shadow { 1.0 } else { 0.0 },
                ];
                content.moon_color = premultiplied(light.color, light.intensity);
                content.light_view_proj = directional_light_view_proj(position, *target).into();
            }
            LightKind::Point { .. } => {
                if point_count == MAX_POINT_LIGHTS {
                    log::warn!("Ignoring point light `{}`: limit reached", node.name);
                    continue;
                }
                let p = node.transform.position;
                let [r, g, b, _] = premultiplied(light.color, light.intensity);
                content.point_lights[point_count] = PointLightUniform {
                    position_range: [p.x, p.y, p.z, light.distance],
                    color_decay: [r, g, b, light.decay],
                };
                point_count += 1;
            }
        }
    }

    let [fr, fg, fb] = linear_rgb(graph.fog.color);
    content.fog_color = [fr, fg, fb, 1.0];
    content.fog_params = [
        graph.fog.near,
        graph.fog.far,
        point_count as f32,
        if encode_srgb { 1.0 } else { 0.0 },
    ];
    content
}

/// Bind groups at slot 0 of the scene and shadow pipelines
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    shadow_pass_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
    shadow_pass_bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO, shadow_map: &TextureResource) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .next_binding_fragment(binding_types::texture_depth_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Comparison))
            .create(device, "Globals Bind Group Layout");

        let shadow_pass_layout = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::uniform())
            .create(device, "Shadow Globals Bind Group Layout");

        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .texture(&shadow_map.view)
            .sampler(&shadow_map.sampler)
            .create(device, "Globals Bind Group");

        let shadow_pass_bind_group = BindGroupBuilder::new(&shadow_pass_layout)
            .resource(ubo.binding_resource())
            .create(device, "Shadow Globals Bind Group");

        GlobalBindings {
            bind_group_layout,
            shadow_pass_layout,
            bind_group,
            shadow_pass_bind_group,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn shadow_pass_layout(&self) -> &wgpu::BindGroupLayout {
        &self.shadow_pass_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn shadow_pass_bind_group(&self) -> &wgpu::BindGroup {
        &self.shadow_pass_bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetCatalog;
    use crate::gfx::scene::SceneBuilder;
    use crate::params::ParameterSet;

    #[test]
    fn test_uniform_layout_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<PointLightUniform>(), 32);
        assert_eq!(std::mem::size_of::<GlobalUBOContent>() % 16, 0);
        assert_eq!(std::mem::size_of::<GlobalUBOContent>(), 352);
    }

    #[test]
    fn test_linear_conversion_endpoints() {
        assert_eq!(linear_rgb(Color::new(0.0, 1.0, 0.0)), [0.0, 1.0, 0.0]);
        let mid = linear_rgb(Color::new(0.5, 0.5, 0.5))[0];
        assert!((mid - 0.214).abs() < 1e-3);
    }

    #[test]
    fn test_pack_globals_collects_lights_and_fog() {
        let params = ParameterSet::default();
        let assets = AssetCatalog::haunted_house("assets");
        let graph = SceneBuilder::new(&params, &assets).build_seeded(Some(1));

        let content = pack_globals(&graph, &CameraUniform::default(), true);

        assert_eq!(content.fog_params, [5.0, 25.0, 4.0, 1.0]);
        // house light first, then ghosts in order
        assert_eq!(content.point_lights[0].position_range[3], 15.0);
        assert_eq!(content.point_lights[0].color_decay[3], 2.0);
        assert_eq!(content.point_lights[1].position_range[3], 12.0);
        assert_eq!(content.point_lights[3].color_decay[3], 2.0);

        // moon sits at (20, 20, 25) aiming at (0, 20, 0): horizontal direction
        assert!(content.moon_direction[1].abs() < 1e-6);
        assert_eq!(content.moon_direction[3], 1.0);
        assert!(content.ambient[0] > 0.0);
    }

    #[test]
    fn test_shadow_map_follows_moon_only() {
        let params = ParameterSet::default();
        let assets = AssetCatalog::haunted_house("assets");
        let mut graph = SceneBuilder::new(&params, &assets).build_seeded(Some(1));
        let handles = graph.handles().unwrap().clone();
        assert!(graph.node(handles.house_light).unwrap().casts_shadow());

        if let Some(NodeKind::Light {
            kind: LightKind::Directional { cast_shadow, .. },
            ..
        }) = graph.node_mut(handles.moon).map(|node| &mut node.kind)
        {
            *cast_shadow = false;
        }

        // Shadow-casting point lights do not switch the shadow map back on
        let content = pack_globals(&graph, &CameraUniform::default(), true);
        assert_eq!(content.moon_direction[3], 0.0);
        assert_eq!(content.fog_params[2], 4.0);
    }
}
