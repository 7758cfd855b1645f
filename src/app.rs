use anyhow::Context;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, DeviceId, ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    assets::{AssetCatalog, TextureLoader},
    config::AppConfig,
    error::RenderError,
    gfx::{
        camera::{CameraManager, CameraUniform},
        rendering::{RenderEngine, RenderStats},
        scene::{SceneBuilder, SceneGraph},
    },
    motion::MotionModel,
    params::ParameterSet,
    performance::PerformanceMetrics,
    render_loop::{FrameRenderer, FrameStatus, RenderLoop},
    ui::{apply_edit, ControlEdit, DebugPanel, UiManager},
};

/// The haunted house diorama as a desktop application
pub struct HauntedHouseApp {
    event_loop: EventLoop<()>,
    app_state: AppState,
}

/// Everything that only exists once the window is up
struct GpuState {
    window: Arc<Window>,
    render_engine: RenderEngine,
    ui_manager: UiManager,
    loader: TextureLoader,
}

struct AppState {
    config: AppConfig,
    params: ParameterSet,
    assets: AssetCatalog,
    graph: SceneGraph,
    camera: CameraManager,
    render_loop: RenderLoop,
    debug_panel: DebugPanel,
    gpu: Option<GpuState>,
    fatal: Option<anyhow::Error>,
}

impl HauntedHouseApp {
    /// Builds the scene from default parameters; the window opens in [`run`](Self::run)
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;

        let params = ParameterSet::default();
        let assets = AssetCatalog::haunted_house(&config.asset_root);
        let graph = SceneBuilder::new(&params, &assets).build_seeded(config.seed);

        let stats = graph.statistics();
        log::info!(
            "Built scene: {} meshes, {} lights, {} helpers, {} triangles",
            stats.mesh_count,
            stats.light_count,
            stats.helper_count,
            stats.total_triangles
        );

        let (width, height) = config.window_size;
        let camera = CameraManager::haunted_house(width as f32 / height.max(1) as f32);
        let render_loop = RenderLoop::new(MotionModel::from_params(&params));
        let debug_panel = DebugPanel::new(config.debug_panel);

        Ok(Self {
            event_loop,
            app_state: AppState {
                config,
                params,
                assets,
                graph,
                camera,
                render_loop,
                debug_panel,
                gpu: None,
                fatal: None,
            },
        })
    }

    pub fn params(&self) -> &ParameterSet {
        &self.app_state.params
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.app_state.graph
    }

    /// Runs until the window is closed or Escape is pressed
    pub fn run(mut self) -> anyhow::Result<()> {
        self.event_loop.set_control_flow(ControlFlow::Poll);
        self.event_loop
            .run_app(&mut self.app_state)
            .context("event loop terminated abnormally")?;

        match self.app_state.fatal.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<GpuState> {
        let (width, height) = self.config.window_size;
        let window = event_loop
            .create_window(
                WindowAttributes::default()
                    .with_title(self.config.window_title.clone())
                    .with_inner_size(LogicalSize::new(width, height)),
            )
            .context("failed to create window")?;
        let window = Arc::new(window);

        let (width, height) = window.inner_size().into();
        self.camera.camera.resize_projection(width, height);

        let render_engine = pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            self.config.vsync,
        ))
        .context("failed to initialize renderer")?;

        let ui_manager = UiManager::new(
            render_engine.device(),
            render_engine.queue(),
            render_engine.surface_format(),
            &window,
        );

        let loader = TextureLoader::spawn(&self.assets);
        log::info!(
            "Loading {} textures from {:?}",
            loader.pending(),
            self.assets.root()
        );

        Ok(GpuState {
            window,
            render_engine,
            ui_manager,
            loader,
        })
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.render_loop.stop();
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let AppState {
            params,
            assets,
            graph,
            camera,
            render_loop,
            debug_panel,
            gpu,
            fatal,
            ..
        } = self;
        let Some(gpu) = gpu.as_mut() else {
            return;
        };

        let was_loading = !gpu.loader.is_finished();
        let decoded = gpu.loader.poll();
        gpu.render_engine.upload_textures(decoded, assets);
        if was_loading && gpu.loader.is_finished() {
            log::info!("Texture loading finished, {} failed", gpu.loader.failed());
        }

        let mut frame = UiFrame {
            render_engine: &mut gpu.render_engine,
            ui_manager: &mut gpu.ui_manager,
            window: &gpu.window,
            debug_panel,
            params,
            metrics: render_loop.monitor().get_metrics().clone(),
            edits: Vec::new(),
            stats: RenderStats::default(),
        };

        let status = render_loop.tick(graph, camera, &mut frame);
        let UiFrame { edits, stats, .. } = frame;

        match status {
            Ok(FrameStatus::Rendered) => {
                render_loop
                    .monitor_mut()
                    .update_render_stats(stats.draw_calls, stats.vertices);
            }
            Ok(FrameStatus::Stopped) => {
                event_loop.exit();
                return;
            }
            Err(RenderError::Frame(wgpu::SurfaceError::OutOfMemory)) => {
                *fatal = Some(anyhow::anyhow!("GPU ran out of memory"));
                render_loop.stop();
                event_loop.exit();
                return;
            }
            Err(e) => log::error!("Frame failed: {}", e),
        }

        for edit in &edits {
            if let Err(e) = apply_edit(edit, params, graph) {
                log::warn!("Ignoring debug edit: {}", e);
            }
        }
    }
}

/// Renders the scene with the statistics corner and the debug panel on top
///
/// Panel edits are collected here and applied once the frame is submitted.
struct UiFrame<'a> {
    render_engine: &'a mut RenderEngine,
    ui_manager: &'a mut UiManager,
    window: &'a Window,
    debug_panel: &'a DebugPanel,
    params: &'a ParameterSet,
    metrics: PerformanceMetrics,
    edits: Vec<ControlEdit>,
    stats: RenderStats,
}

impl FrameRenderer for UiFrame<'_> {
    fn render(&mut self, graph: &SceneGraph, camera: &CameraUniform) -> Result<(), RenderError> {
        let metrics = &self.metrics;
        let debug_panel = self.debug_panel;
        let params = self.params;
        let edits = &mut self.edits;
        self.ui_manager.update_logic(self.window, |ui| {
            metrics.render_overlay(ui);
            edits.extend(debug_panel.draw(ui, params, graph));
        });

        let ui_manager = &mut *self.ui_manager;
        self.stats = self.render_engine.render_frame(
            graph,
            camera,
            Some(|device: &wgpu::Device,
                  queue: &wgpu::Queue,
                  encoder: &mut wgpu::CommandEncoder,
                  view: &wgpu::TextureView| {
                ui_manager.render(device, queue, encoder, view);
            }),
        )?;
        Ok(())
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match self.init_gpu(event_loop) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                log::error!("{:#}", e);
                self.fatal = Some(e);
                self.shutdown(event_loop);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        // Handle UI input first
        let ui_event: Event<()> = Event::WindowEvent {
            window_id,
            event: event.clone(),
        };
        if gpu.ui_manager.handle_input(&gpu.window, &ui_event) {
            return;
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            }
            | WindowEvent::CloseRequested => {
                self.shutdown(event_loop);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.camera.process_keyboard_event(&event);
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.camera.camera.resize_projection(width, height);
                gpu.render_engine.resize(width, height);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let Some(gpu) = self.gpu.as_ref() else {
            return;
        };

        // Don't process camera events when UI is active
        if gpu.ui_manager.wants_input() {
            self.camera.controller.release_mouse();
            return;
        }

        self.camera.process_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}
