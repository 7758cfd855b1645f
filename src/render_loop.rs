//! # Render Loop
//!
//! One [`RenderLoop::tick`] per redraw: sample the clock, update the camera
//! controls, move the ghosts, render. Returning from `tick` hands control back
//! to the windowing event loop, which schedules the next redraw.
//!
//! Camera and renderer are reached through traits so the frame ordering can be
//! exercised without a GPU.

use std::time::Instant;

use crate::error::RenderError;
use crate::gfx::camera::{CameraManager, CameraUniform};
use crate::gfx::scene::SceneGraph;
use crate::motion::MotionModel;
use crate::performance::PerformanceMonitor;

/// Seconds since the loop started; never reset or paused
#[derive(Debug, Clone, Copy)]
pub struct ElapsedClock {
    start: Instant,
}

impl ElapsedClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Camera side of a frame
pub trait CameraControls {
    /// Advances damped motion by one frame
    fn update(&mut self);
    fn uniform(&self) -> CameraUniform;
}

impl CameraControls for CameraManager {
    fn update(&mut self) {
        self.camera.update();
    }

    fn uniform(&self) -> CameraUniform {
        self.camera.uniform
    }
}

/// Anything that can turn a scene graph into a frame
pub trait FrameRenderer {
    fn render(&mut self, graph: &SceneGraph, camera: &CameraUniform) -> Result<(), RenderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Rendered,
    Stopped,
}

pub struct RenderLoop {
    clock: ElapsedClock,
    motion: MotionModel,
    running: bool,
    frames: u64,
    monitor: PerformanceMonitor,
}

impl RenderLoop {
    /// Starts the clock at zero
    pub fn new(motion: MotionModel) -> Self {
        Self {
            clock: ElapsedClock::start(),
            motion,
            running: true,
            frames: 0,
            monitor: PerformanceMonitor::new(),
        }
    }

    /// Runs one frame at the current elapsed time
    pub fn tick(
        &mut self,
        graph: &mut SceneGraph,
        controls: &mut impl CameraControls,
        renderer: &mut impl FrameRenderer,
    ) -> Result<FrameStatus, RenderError> {
        if !self.running {
            return Ok(FrameStatus::Stopped);
        }
        let elapsed = self.clock.elapsed_secs();
        self.step(elapsed, graph, controls, renderer)
    }

    /// Runs one frame at an explicit elapsed time
    pub fn step(
        &mut self,
        elapsed: f64,
        graph: &mut SceneGraph,
        controls: &mut impl CameraControls,
        renderer: &mut impl FrameRenderer,
    ) -> Result<FrameStatus, RenderError> {
        if !self.running {
            return Ok(FrameStatus::Stopped);
        }

        self.monitor.begin_frame();

        controls.update();
        self.motion.apply(graph, elapsed);
        graph.sync_helpers();

        let result = renderer.render(graph, &controls.uniform());
        self.monitor.end_frame();
        self.frames += 1;

        result.map(|_| FrameStatus::Rendered)
    }

    /// No frame is rendered after this
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Render loop stopped after {} frames", self.frames);
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.clock.elapsed_secs()
    }

    pub fn monitor(&self) -> &PerformanceMonitor {
        &self.monitor
    }

    pub fn monitor_mut(&mut self) -> &mut PerformanceMonitor {
        &mut self.monitor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetCatalog;
    use crate::gfx::scene::SceneBuilder;
    use crate::motion::GhostId;
    use crate::params::ParameterSet;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Journal = Rc<RefCell<Vec<String>>>;

    struct RecordingControls {
        journal: Journal,
    }

    impl CameraControls for RecordingControls {
        fn update(&mut self) {
            self.journal.borrow_mut().push("controls".to_string());
        }

        fn uniform(&self) -> CameraUniform {
            CameraUniform::default()
        }
    }

    struct RecordingRenderer {
        journal: Journal,
        fail: bool,
    }

    impl FrameRenderer for RecordingRenderer {
        fn render(&mut self, graph: &SceneGraph, _camera: &CameraUniform) -> Result<(), RenderError> {
            let ghost = graph.handles().unwrap().ghosts[0];
            let x = graph.position(ghost).unwrap().x;
            self.journal.borrow_mut().push(format!("render ghost1.x={:.3}", x));
            if self.fail {
                Err(RenderError::MissingPipeline("scene".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn fixtures() -> (SceneGraph, RenderLoop, Journal) {
        let params = ParameterSet::default();
        let assets = AssetCatalog::haunted_house("assets");
        let graph = SceneBuilder::new(&params, &assets).build_seeded(Some(5));
        let render_loop = RenderLoop::new(MotionModel::from_params(&params));
        (graph, render_loop, Rc::new(RefCell::new(Vec::new())))
    }

    #[test]
    fn test_frame_order() {
        let (mut graph, mut render_loop, journal) = fixtures();
        let mut controls = RecordingControls {
            journal: journal.clone(),
        };
        let mut renderer = RecordingRenderer {
            journal: journal.clone(),
            fail: false,
        };

        let t = std::f64::consts::FRAC_PI_2;
        let status = render_loop
            .step(t, &mut graph, &mut controls, &mut renderer)
            .unwrap();

        assert_eq!(status, FrameStatus::Rendered);
        let expected_x = MotionModel::from_params(&ParameterSet::default())
            .position_at(GhostId::Ghost1, t)
            .x;
        assert_eq!(
            *journal.borrow(),
            vec![
                "controls".to_string(),
                format!("render ghost1.x={:.3}", expected_x)
            ]
        );
        assert_eq!(render_loop.frame_count(), 1);
    }

    #[test]
    fn test_every_tick_renders_once() {
        let (mut graph, mut render_loop, journal) = fixtures();
        let mut controls = RecordingControls {
            journal: journal.clone(),
        };
        let mut renderer = RecordingRenderer {
            journal: journal.clone(),
            fail: false,
        };

        for _ in 0..5 {
            render_loop
                .tick(&mut graph, &mut controls, &mut renderer)
                .unwrap();
        }
        let renders = journal
            .borrow()
            .iter()
            .filter(|entry| entry.starts_with("render"))
            .count();
        assert_eq!(renders, 5);
        assert_eq!(render_loop.frame_count(), 5);
    }

    #[test]
    fn test_stop_halts_rendering() {
        let (mut graph, mut render_loop, journal) = fixtures();
        let mut controls = RecordingControls {
            journal: journal.clone(),
        };
        let mut renderer = RecordingRenderer {
            journal: journal.clone(),
            fail: false,
        };

        render_loop.stop();
        assert!(!render_loop.is_running());
        let status = render_loop
            .tick(&mut graph, &mut controls, &mut renderer)
            .unwrap();

        assert_eq!(status, FrameStatus::Stopped);
        assert!(journal.borrow().is_empty());
        assert_eq!(render_loop.frame_count(), 0);
    }

    #[test]
    fn test_render_errors_propagate() {
        let (mut graph, mut render_loop, journal) = fixtures();
        let mut controls = RecordingControls {
            journal: journal.clone(),
        };
        let mut renderer = RecordingRenderer {
            journal,
            fail: true,
        };

        let result = render_loop.step(0.0, &mut graph, &mut controls, &mut renderer);
        assert!(matches!(result, Err(RenderError::MissingPipeline(_))));
        assert!(render_loop.is_running());
    }

    #[test]
    fn test_clock_is_monotonic() {
        let clock = ElapsedClock::start();
        let a = clock.elapsed_secs();
        let b = clock.elapsed_secs();
        assert!(a >= 0.0);
        assert!(b >= a);
    }
}
