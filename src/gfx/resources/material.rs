//! Per-object uniforms and material texture bind groups
//!
//! Every drawable node owns an [`ObjectUniform`] (transform plus the scalar
//! material inputs) at group 1. Texture maps live at group 2 and are shared by
//! all nodes referencing the same [`MaterialMaps`]: the graves share the
//! untextured set, the wall and its bricks share theirs, and so on.
//!
//! Maps that have not finished loading are bound as neutral fallbacks, so a
//! mesh renders with its flat color first and picks up its textures as they
//! arrive.

use cgmath::{Matrix, Matrix4, SquareMatrix};

use crate::{
    assets::{AssetCatalog, DecodedTexture, TextureId},
    gfx::{
        resources::{
            global_bindings::linear_rgb,
            texture_resource::{fallback, TextureResource},
        },
        scene::{MaterialDesc, MaterialMaps, Transform},
    },
    params::Color,
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

pub const FLAG_UNLIT: u32 = 1;
pub const FLAG_RECEIVE_SHADOW: u32 = 1 << 1;
pub const FLAG_ALPHA_MAP: u32 = 1 << 2;

/// MUST match the `Object` struct in `scene.wgsl`
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    /// Linear base color, alpha 1
    pub color: [f32; 4],
    /// roughness, metalness, displacement scale, unused
    pub surface: [f32; 4],
    /// u repeat, v repeat, unused, unused
    pub uv: [f32; 4],
    pub flags: [u32; 4],
}

pub type ObjectUBO = UniformBuffer<ObjectUniform>;

impl ObjectUniform {
    pub fn for_mesh(transform: &Transform, material: &MaterialDesc, receive_shadow: bool) -> Self {
        let mut flags = 0;
        if material.unlit {
            flags |= FLAG_UNLIT;
        }
        if receive_shadow {
            flags |= FLAG_RECEIVE_SHADOW;
        }
        if material.maps.alpha.is_some() {
            flags |= FLAG_ALPHA_MAP;
        }

        let model = transform.matrix();
        let [r, g, b] = linear_rgb(material.color);
        Self {
            model: model.into(),
            normal_matrix: normal_matrix(model).into(),
            color: [r, g, b, 1.0],
            surface: [
                material.roughness,
                material.metalness,
                material.displacement_scale,
                0.0,
            ],
            uv: [material.uv_repeat[0], material.uv_repeat[1], 0.0, 0.0],
            flags: [flags, 0, 0, 0],
        }
    }

    /// Flat marker drawn at a light's position in the light's color
    pub fn for_helper(transform: &Transform, color: Color) -> Self {
        Self::for_mesh(
            transform,
            &MaterialDesc {
                unlit: true,
                ..MaterialDesc::solid(color)
            },
            false,
        )
    }
}

/// Inverse transpose of the model matrix, identity when it is singular
pub fn normal_matrix(model: Matrix4<f32>) -> Matrix4<f32> {
    model
        .invert()
        .map(|inverse| inverse.transpose())
        .unwrap_or_else(Matrix4::identity)
}

/// Layout at group 1
pub fn object_bind_group_layout(device: &wgpu::Device) -> BindGroupLayoutWithDesc {
    BindGroupLayoutBuilder::new()
        .next_binding_rendering(binding_types::uniform())
        .create(device, "Object Bind Group Layout")
}

pub fn object_bind_group(
    device: &wgpu::Device,
    layout: &BindGroupLayoutWithDesc,
    ubo: &ObjectUBO,
    label: &str,
) -> wgpu::BindGroup {
    BindGroupBuilder::new(layout)
        .resource(ubo.binding_resource())
        .create(device, label)
}

/// Uploaded material textures and the bind groups built from them
pub struct MaterialTextures {
    layout: BindGroupLayoutWithDesc,
    white: TextureResource,
    white_srgb: TextureResource,
    flat_normal: TextureResource,
    black: TextureResource,
    textures: Vec<Option<TextureResource>>,
    sets: Vec<(MaterialMaps, wgpu::BindGroup)>,
}

impl MaterialTextures {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        // Displacement is read in the vertex stage
        let mut builder = BindGroupLayoutBuilder::new();
        for _ in 0..7 {
            builder = builder.next_binding_rendering(binding_types::texture_2d());
        }
        let layout = builder
            .next_binding_rendering(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Material Textures Bind Group Layout");

        Self {
            layout,
            white: TextureResource::create_solid(device, queue, fallback::WHITE, false, "White"),
            white_srgb: TextureResource::create_solid(
                device,
                queue,
                fallback::WHITE,
                true,
                "White sRGB",
            ),
            flat_normal: TextureResource::create_solid(
                device,
                queue,
                fallback::FLAT_NORMAL,
                false,
                "Flat Normal",
            ),
            black: TextureResource::create_solid(device, queue, fallback::BLACK, false, "Black"),
            textures: Vec::new(),
            sets: Vec::new(),
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout.layout
    }

    /// Uploads a decoded map and drops the bind groups that must pick it up
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        decoded: &DecodedTexture,
        catalog: &AssetCatalog,
    ) {
        let Some(asset) = catalog.get(decoded.id) else {
            log::warn!("Decoded texture {:?} is not in the catalog", decoded.id);
            return;
        };

        let resource = TextureResource::create_material_texture(
            device,
            queue,
            &decoded.rgba,
            decoded.width,
            decoded.height,
            &asset.name,
            asset.srgb,
            (asset.wrap_s, asset.wrap_t),
        );

        let index = decoded.id.index();
        if self.textures.len() <= index {
            self.textures.resize_with(index + 1, || None);
        }
        self.textures[index] = Some(resource);
        self.sets.retain(|(maps, _)| maps.iter().all(|id| id != decoded.id));

        log::debug!(
            "Uploaded texture `{}` ({}x{})",
            asset.name,
            decoded.width,
            decoded.height
        );
    }

    pub fn uploaded_count(&self) -> usize {
        self.textures.iter().filter(|t| t.is_some()).count()
    }

    /// Creates the bind group for `maps` unless it exists
    pub fn prepare(&mut self, device: &wgpu::Device, maps: &MaterialMaps) {
        if self.bind_group(maps).is_none() {
            let bind_group = self.create_bind_group(device, maps);
            self.sets.push((*maps, bind_group));
        }
    }

    pub fn bind_group(&self, maps: &MaterialMaps) -> Option<&wgpu::BindGroup> {
        self.sets
            .iter()
            .find(|(m, _)| m == maps)
            .map(|(_, bind_group)| bind_group)
    }

    fn resolve(&self, id: Option<TextureId>) -> Option<&TextureResource> {
        id.and_then(|id| self.textures.get(id.index()))
            .and_then(Option::as_ref)
    }

    fn create_bind_group(&self, device: &wgpu::Device, maps: &MaterialMaps) -> wgpu::BindGroup {
        let color = self.resolve(maps.color).unwrap_or(&self.white_srgb);
        let normal = self.resolve(maps.normal).unwrap_or(&self.flat_normal);
        let ambient_occlusion = self.resolve(maps.ambient_occlusion).unwrap_or(&self.white);
        let roughness = self.resolve(maps.roughness).unwrap_or(&self.white);
        let metalness = self.resolve(maps.metalness).unwrap_or(&self.white);
        let alpha = self.resolve(maps.alpha).unwrap_or(&self.white);
        let displacement = self.resolve(maps.displacement).unwrap_or(&self.black);

        // All maps of one material share wrap settings; take the first loaded one's
        let sampler = maps
            .iter()
            .find_map(|id| self.resolve(Some(id)))
            .map(|t| &t.sampler)
            .unwrap_or(&self.white.sampler);

        BindGroupBuilder::new(&self.layout)
            .texture(&color.view)
            .texture(&normal.view)
            .texture(&ambient_occlusion.view)
            .texture(&roughness.view)
            .texture(&metalness.view)
            .texture(&alpha.view)
            .texture(&displacement.view)
            .sampler(sampler)
            .create(device, "Material Textures Bind Group")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    #[test]
    fn test_object_uniform_size() {
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 192);
    }

    #[test]
    fn test_mesh_flags() {
        let transform = Transform::default();
        let mut material = MaterialDesc::solid(Color::WHITE);
        let plain = ObjectUniform::for_mesh(&transform, &material, true);
        assert_eq!(plain.flags[0], FLAG_RECEIVE_SHADOW);

        material.unlit = true;
        let unlit = ObjectUniform::for_mesh(&transform, &material, false);
        assert_eq!(unlit.flags[0], FLAG_UNLIT);
    }

    #[test]
    fn test_helper_is_unlit_in_light_color() {
        let helper = ObjectUniform::for_helper(&Transform::at(1.0, 2.0, 3.0), Color::new(1.0, 0.0, 0.0));
        assert_eq!(helper.flags[0] & FLAG_UNLIT, FLAG_UNLIT);
        assert_eq!(helper.color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(helper.model[3], [1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_normal_matrix_undoes_nonuniform_scale() {
        let model = Matrix4::from_nonuniform_scale(2.0, 1.0, 1.0);
        let n = normal_matrix(model) * Vector4::new(1.0, 1.0, 0.0, 0.0);
        assert!((n.x - 0.5).abs() < 1e-6);
        assert!((n.y - 1.0).abs() < 1e-6);

        let singular = Matrix4::from_nonuniform_scale(0.0, 1.0, 1.0);
        assert_eq!(normal_matrix(singular), Matrix4::identity());
    }
}
