//! WGPU-based rendering engine for the haunted house
//!
//! Owns the surface, device and every GPU resource derived from the scene
//! graph. A frame is a depth-only pass from the moon into the shadow map, the
//! main pass (opaque geometry, light helpers, then the alpha-blended door) and
//! an optional UI overlay.

use std::sync::Arc;
use wgpu::TextureFormat;

use crate::{
    assets::{AssetCatalog, DecodedTexture},
    error::RenderError,
    gfx::{
        camera::camera_utils::CameraUniform,
        resources::{
            global_bindings::{pack_globals, GlobalBindings, GlobalUBO},
            material::{
                object_bind_group, object_bind_group_layout, MaterialTextures, ObjectUBO,
                ObjectUniform,
            },
            texture_resource::TextureResource,
        },
        scene::{
            builder::HELPER_SHAPE, DrawMesh, MaterialMaps, Mesh, NodeId, NodeKind, SceneGraph,
            Shape,
        },
    },
    params::Color,
    wgpu_utils::binding_builder::BindGroupLayoutWithDesc,
};

use super::pipeline_manager::{PipelineConfig, PipelineManager};

pub const SHADOW_MAP_SIZE: u32 = 1024;

const SCENE_PIPELINE: &str = "Scene";
const TRANSPARENT_PIPELINE: &str = "Transparent";
const SHADOW_PIPELINE: &str = "Shadow";

/// Draw work submitted for one frame
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    pub draw_calls: u32,
    pub vertices: u32,
}

/// GPU side of one drawable scene node
struct GpuObject {
    node: NodeId,
    mesh: usize,
    maps: MaterialMaps,
    transparent: bool,
    ubo: ObjectUBO,
    bind_group: wgpu::BindGroup,
}

pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    format: TextureFormat,
    depth_texture: TextureResource,
    pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    shadow_map: TextureResource,
    object_layout: BindGroupLayoutWithDesc,
    materials: MaterialTextures,
    meshes: Vec<(Shape, Mesh)>,
    objects: Vec<GpuObject>,
    prepared_nodes: usize,
}

impl RenderEngine {
    /// Creates a render engine for the given window
    ///
    /// Picks a non-sRGB surface format when one is offered; the scene shader
    /// then encodes its linear output itself.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<RenderEngine, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .unwrap_or(TextureFormat::Bgra8Unorm);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: present_mode(vsync),
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");
        let shadow_map = TextureResource::create_shadow_map(&device, SHADOW_MAP_SIZE);

        let global_ubo = GlobalUBO::new(&device);
        let global_bindings = GlobalBindings::new(&device, &global_ubo, &shadow_map);
        let object_layout = object_bind_group_layout(&device);
        let materials = MaterialTextures::new(&device, &queue);

        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let mut pipeline_manager = PipelineManager::new(device.clone());
        pipeline_manager.load_shader("scene", include_str!("scene.wgsl"));
        pipeline_manager.load_shader("shadow", include_str!("shadow.wgsl"));

        let scene_layouts = vec![
            global_bindings.bind_group_layout().clone(),
            object_layout.layout.clone(),
            materials.bind_group_layout().clone(),
        ];

        pipeline_manager.register_pipeline(
            SCENE_PIPELINE,
            PipelineConfig::default_with_shader("scene")
                .with_label("Scene Pipeline")
                .with_bind_group_layouts(scene_layouts.clone())
                .with_depth_stencil(TextureResource::DEPTH_FORMAT)
                .with_color_target(format, wgpu::BlendState::REPLACE),
        );

        // Door: both sides visible, tested against but not written to depth
        pipeline_manager.register_pipeline(
            TRANSPARENT_PIPELINE,
            PipelineConfig::default_with_shader("scene")
                .with_label("Transparent Pipeline")
                .with_bind_group_layouts(scene_layouts)
                .with_cull_mode(None)
                .with_depth_stencil(TextureResource::DEPTH_FORMAT)
                .with_depth_read_only()
                .with_color_target(format, wgpu::BlendState::ALPHA_BLENDING),
        );

        pipeline_manager.register_pipeline(
            SHADOW_PIPELINE,
            PipelineConfig::default_with_shader("shadow")
                .with_label("Shadow Pipeline")
                .with_bind_group_layouts(vec![
                    global_bindings.shadow_pass_layout().clone(),
                    object_layout.layout.clone(),
                ])
                .with_vertex_only()
                .with_cull_mode(None)
                .with_depth_stencil(TextureResource::DEPTH_FORMAT)
                .with_depth_bias(wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                }),
        );

        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            for error in errors {
                log::error!("{}", error);
            }
        }

        Ok(RenderEngine {
            surface,
            device,
            queue,
            config,
            format,
            depth_texture,
            pipeline_manager,
            global_ubo,
            global_bindings,
            shadow_map,
            object_layout,
            materials,
            meshes: Vec::new(),
            objects: Vec::new(),
            prepared_nodes: 0,
        })
    }

    /// Uploads textures decoded since the last call
    pub fn upload_textures(&mut self, decoded: Vec<DecodedTexture>, catalog: &AssetCatalog) {
        for texture in &decoded {
            self.materials
                .upload(&self.device, &self.queue, texture, catalog);
        }
        if !decoded.is_empty() {
            log::info!(
                "{} of {} textures on the GPU",
                self.materials.uploaded_count(),
                catalog.len()
            );
        }
    }

    /// Creates buffers and bind groups for nodes added since the last call
    pub fn prepare(&mut self, graph: &SceneGraph) {
        if self.prepared_nodes == graph.len() {
            return;
        }

        for (id, node) in graph.nodes().skip(self.prepared_nodes) {
            let (shape, maps, transparent) = match &node.kind {
                NodeKind::Mesh {
                    shape, material, ..
                } => (*shape, material.maps, material.transparent),
                NodeKind::Helper { .. } => (HELPER_SHAPE, MaterialMaps::default(), false),
                NodeKind::Light { .. } => continue,
            };

            let mesh = self.mesh_index(shape, &node.name);
            let ubo = ObjectUBO::new(&self.device);
            let bind_group =
                object_bind_group(&self.device, &self.object_layout, &ubo, &node.name);

            self.objects.push(GpuObject {
                node: id,
                mesh,
                maps,
                transparent,
                ubo,
                bind_group,
            });
        }

        self.prepared_nodes = graph.len();
        log::debug!(
            "Prepared {} drawable nodes with {} distinct meshes",
            self.objects.len(),
            self.meshes.len()
        );
    }

    /// Shapes are compared by value so the 50 graves share one mesh
    fn mesh_index(&mut self, shape: Shape, label: &str) -> usize {
        if let Some(index) = self.meshes.iter().position(|(s, _)| *s == shape) {
            return index;
        }
        self.meshes
            .push((shape, Mesh::new(&self.device, label, &shape.geometry())));
        self.meshes.len() - 1
    }

    /// Renders `graph` from `camera`, then the optional UI overlay
    ///
    /// A lost or outdated surface is reconfigured and the frame is skipped.
    pub fn render_frame<F>(
        &mut self,
        graph: &SceneGraph,
        camera: &CameraUniform,
        ui_callback: Option<F>,
    ) -> Result<RenderStats, RenderError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        self.prepare(graph);
        self.update_uniforms(graph, camera);

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(RenderStats::default());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timed out, skipping frame");
                return Ok(RenderStats::default());
            }
            Err(e) => return Err(e.into()),
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let mut stats = RenderStats::default();

        // PASS 1: moon shadow map
        {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Depth Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            shadow_pass.set_pipeline(self.pipeline_manager.pipeline(SHADOW_PIPELINE)?);
            shadow_pass.set_bind_group(0, self.global_bindings.shadow_pass_bind_group(), &[]);

            for object in &self.objects {
                let casts = graph
                    .node(object.node)
                    .is_some_and(|node| node.visible && node.casts_shadow());
                if casts {
                    shadow_pass.set_bind_group(1, &object.bind_group, &[]);
                    shadow_pass.draw_mesh(&self.meshes[object.mesh].1);
                    stats.draw_calls += 1;
                }
            }
        }

        // PASS 2: scene
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color(graph.clear_color)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            for (pipeline, transparent) in [(SCENE_PIPELINE, false), (TRANSPARENT_PIPELINE, true)] {
                render_pass.set_pipeline(self.pipeline_manager.pipeline(pipeline)?);

                for object in self.objects.iter().filter(|o| o.transparent == transparent) {
                    let visible = graph.node(object.node).is_some_and(|node| node.visible);
                    let Some(material) = self.materials.bind_group(&object.maps) else {
                        continue;
                    };
                    if !visible {
                        continue;
                    }

                    let mesh = &self.meshes[object.mesh].1;
                    render_pass.set_bind_group(1, &object.bind_group, &[]);
                    render_pass.set_bind_group(2, material, &[]);
                    render_pass.draw_mesh(mesh);
                    stats.draw_calls += 1;
                    stats.vertices += mesh.vertex_count();
                }
            }
        }

        // PASS 3: UI overlay
        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();

        Ok(stats)
    }

    fn update_uniforms(&mut self, graph: &SceneGraph, camera: &CameraUniform) {
        let globals = pack_globals(graph, camera, !self.format.is_srgb());
        self.global_ubo.update_content(&self.queue, globals);

        for object in &mut self.objects {
            let Some(node) = graph.node(object.node) else {
                continue;
            };
            let uniform = match &node.kind {
                NodeKind::Mesh {
                    material,
                    receive_shadow,
                    ..
                } => ObjectUniform::for_mesh(&node.transform, material, *receive_shadow),
                NodeKind::Helper { light } => {
                    let color = graph
                        .light(*light)
                        .map(|l| l.color)
                        .unwrap_or(Color::WHITE);
                    ObjectUniform::for_helper(&node.transform, color)
                }
                NodeKind::Light { .. } => continue,
            };
            object.ubo.update_content(&self.queue, uniform);
            self.materials.prepare(&self.device, &object.maps);
        }
    }

    /// Clear values are written as-is to a non-sRGB target
    fn clear_color(&self, color: Color) -> wgpu::Color {
        let [r, g, b] = if self.format.is_srgb() {
            crate::gfx::resources::global_bindings::linear_rgb(color)
        } else {
            [color.r, color.g, color.b]
        };
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        }
    }

    /// Resizes the surface and recreates the depth buffer
    ///
    /// Zero-sized requests (minimized window) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_mode_follows_vsync() {
        assert_eq!(present_mode(true), wgpu::PresentMode::AutoVsync);
        assert_eq!(present_mode(false), wgpu::PresentMode::AutoNoVsync);
    }
}
