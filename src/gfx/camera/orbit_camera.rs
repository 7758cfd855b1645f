use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform};
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Fraction of the outstanding rotation/pan applied per update
pub const DEFAULT_DAMPING: f32 = 0.1;

/// Orbit camera around a target point, Y up
///
/// Rotation and pan requests accumulate as pending deltas; every
/// [`OrbitCamera::update`] applies `damping` of what is pending and decays the
/// rest, so the view keeps gliding for a few frames after input stops.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub damping: f32,
    pub uniform: CameraUniform,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_pan: Vector3<f32>,
    home: (f32, f32, f32, Vector3<f32>),
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.eye);
        let target = Point3::from_vec(self.target);
        let view = Matrix4::look_at_rh(eye, target, self.up);
        let proj =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: Vector3::zero(), // Recomputed below
            target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: Deg(75.0).into(),
            znear: 0.1,
            zfar: 1000.0,
            damping: DEFAULT_DAMPING,
            uniform: CameraUniform::default(),
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_pan: Vector3::zero(),
            home: (distance, pitch, yaw, target),
        };
        camera.refresh_eye();
        camera.update_view_proj();
        camera
    }

    /// Camera placed at `eye`, looking at `target`
    pub fn looking_at(eye: Vector3<f32>, target: Vector3<f32>, aspect: f32) -> Self {
        let offset = eye - target;
        let distance = offset.magnitude();
        let pitch = (offset.y / distance).asin();
        let yaw = offset.x.atan2(offset.z);
        Self::new(distance, pitch, yaw, target, aspect)
    }

    pub fn reset_to_default(&mut self) {
        let (distance, pitch, yaw, target) = self.home;
        self.distance = distance;
        self.pitch = pitch;
        self.yaw = yaw;
        self.target = target;
        self.pending_yaw = 0.0;
        self.pending_pitch = 0.0;
        self.pending_pan = Vector3::zero();

        self.refresh_eye();
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.refresh_eye();
    }

    pub fn add_distance(&mut self, delta: f32) {
        let corrected_zoom = f32::log10(self.distance.max(1.0 + f32::EPSILON)) * delta;
        self.set_distance(self.distance + corrected_zoom);
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.pending_pitch += delta;
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.pending_yaw += delta;
    }

    /// Queues a pan relative to the current view direction
    /// delta.0 = horizontal pan (left/right relative to camera view)
    /// delta.1 = vertical pan (up/down relative to camera view)
    pub fn pan(&mut self, delta: (f32, f32)) {
        let forward = (self.target - self.eye).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward).normalize();

        // Same screen motion moves further when zoomed out
        let pan_scale = self.distance * 0.1;

        self.pending_pan += (right * delta.0 + up * delta.1) * pan_scale;
    }

    /// Advances the damped motion by one frame
    pub fn update(&mut self) {
        let step = self.damping.clamp(0.0, 1.0);

        self.yaw = self.clamp_yaw(self.yaw + self.pending_yaw * step);
        self.pitch = (self.pitch + self.pending_pitch * step)
            .clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.target += self.pending_pan * step;

        self.pending_yaw *= 1.0 - step;
        self.pending_pitch *= 1.0 - step;
        self.pending_pan *= 1.0 - step;

        self.refresh_eye();
        self.update_view_proj();
    }

    /// True while queued motion is still being played out
    pub fn is_settling(&self) -> bool {
        self.pending_yaw.abs() > 1e-5
            || self.pending_pitch.abs() > 1e-5
            || self.pending_pan.magnitude2() > 1e-10
    }

    fn clamp_yaw(&self, yaw: f32) -> f32 {
        let mut bounded_yaw = yaw;
        if let Some(min_yaw) = self.bounds.min_yaw {
            bounded_yaw = bounded_yaw.max(min_yaw);
        }
        if let Some(max_yaw) = self.bounds.max_yaw {
            bounded_yaw = bounded_yaw.min(max_yaw);
        }
        bounded_yaw
    }

    fn refresh_eye(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.pitch, self.yaw, self.distance, self.target);
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
        self.update_view_proj();
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view_proj = convert_matrix4_to_array(self.build_view_projection_matrix());
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub min_yaw: Option<f32>,
    pub max_yaw: Option<f32>,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: Some(1.0),
            max_distance: Some(100.0),
            min_pitch: -std::f32::consts::PI / 2.0 + 0.001,
            max_pitch: std::f32::consts::PI / 2.0 - 0.001,
            min_yaw: None,
            max_yaw: None,
        }
    }
}

fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_eq(a: Vector3<f32>, b: Vector3<f32>) {
        assert!((a - b).magnitude() < 1e-4, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_looking_at_recovers_eye() {
        let camera = OrbitCamera::looking_at(Vector3::new(0.0, 4.0, 15.0), Vector3::zero(), 1.5);
        assert_vec_eq(camera.eye, Vector3::new(0.0, 4.0, 15.0));
        assert_eq!(camera.up, Vector3::unit_y());
        assert!((camera.fovy.0 - 75f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_rotation_is_damped() {
        let mut camera = OrbitCamera::new(10.0, 0.0, 0.0, Vector3::zero(), 1.0);
        camera.add_yaw(1.0);

        camera.update();
        assert!((camera.yaw - 0.1).abs() < 1e-6);
        camera.update();
        assert!((camera.yaw - 0.19).abs() < 1e-6);
        assert!(camera.is_settling());

        for _ in 0..500 {
            camera.update();
        }
        assert!((camera.yaw - 1.0).abs() < 1e-4);
        assert!(!camera.is_settling());
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = OrbitCamera::new(10.0, 0.0, 0.0, Vector3::zero(), 1.0);
        camera.add_pitch(100.0);
        for _ in 0..50 {
            camera.update();
        }
        assert!(camera.pitch <= camera.bounds.max_pitch);
    }

    #[test]
    fn test_reset_restores_home() {
        let mut camera = OrbitCamera::looking_at(Vector3::new(0.0, 4.0, 15.0), Vector3::zero(), 1.0);
        camera.add_yaw(2.0);
        camera.pan((1.0, 1.0));
        camera.set_distance(30.0);
        camera.update();

        camera.reset_to_default();
        camera.update();
        assert_vec_eq(camera.eye, Vector3::new(0.0, 4.0, 15.0));
        assert_vec_eq(camera.target, Vector3::zero());
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut camera = OrbitCamera::new(10.0, 0.0, 0.0, Vector3::zero(), 1.0);
        camera.resize_projection(1200, 800);
        assert!((camera.aspect - 1.5).abs() < 1e-6);
        camera.resize_projection(1200, 0);
        assert!((camera.aspect - 1.5).abs() < 1e-6);
    }
}
