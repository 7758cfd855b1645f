//! # Ghost Motion
//!
//! Closed-form paths for the three ghost lights. Positions depend only on
//! elapsed seconds, so any frame can be reproduced from its timestamp.

use std::f64::consts::TAU;

use cgmath::Vector3;

use crate::gfx::scene::SceneGraph;
use crate::params::ParameterSet;

/// The three animated point lights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GhostId {
    Ghost1,
    Ghost2,
    Ghost3,
}

impl GhostId {
    pub const ALL: [GhostId; 3] = [GhostId::Ghost1, GhostId::Ghost2, GhostId::Ghost3];

    pub fn index(self) -> usize {
        match self {
            GhostId::Ghost1 => 0,
            GhostId::Ghost2 => 1,
            GhostId::Ghost3 => 2,
        }
    }

    /// Parameter group name, e.g. `"ghost1"`
    pub fn group(self) -> &'static str {
        match self {
            GhostId::Ghost1 => "ghost1",
            GhostId::Ghost2 => "ghost2",
            GhostId::Ghost3 => "ghost3",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionModel {
    /// Fixed altitude of the third ghost, above the roof apex
    ghost3_height: f32,
}

impl MotionModel {
    pub fn new(ghost3_height: f32) -> Self {
        Self { ghost3_height }
    }

    /// Captures the roof apex height from the parameters
    pub fn from_params(params: &ParameterSet) -> Self {
        Self::new(params.wall.height + params.roof.height)
    }

    pub fn ghost3_height(&self) -> f32 {
        self.ghost3_height
    }

    /// Position of `ghost` at `t` elapsed seconds
    pub fn position_at(&self, ghost: GhostId, t: f64) -> Vector3<f32> {
        match ghost {
            GhostId::Ghost1 => {
                let angle = phase(t, 1.0);
                let bob = phase(t, 3.0);
                Vector3::new(angle.sin() * 8.0, bob.sin().abs() * 2.0, angle.cos() * 8.0)
            }
            GhostId::Ghost2 => {
                let angle = phase(t, 0.5);
                let bob = phase(t, 3.0);
                Vector3::new(
                    (-angle).sin() * 10.0,
                    bob.sin().abs() * 2.0,
                    angle.cos() * 10.0,
                )
            }
            GhostId::Ghost3 => {
                let angle = phase(t, 1.0);
                Vector3::new(angle.sin() * 3.0, self.ghost3_height, angle.cos() * 3.0)
            }
        }
    }

    /// Moves the ghost lights of `graph` to their positions at `t`
    pub fn apply(&self, graph: &mut SceneGraph, t: f64) {
        let Some(ghosts) = graph.handles().map(|h| h.ghosts) else {
            return;
        };
        for ghost in GhostId::ALL {
            graph.set_position(ghosts[ghost.index()], self.position_at(ghost, t));
        }
    }
}

/// `rate·t` wrapped into one turn before narrowing, so the f32 trig keeps
/// its precision however long the clock has run
fn phase(t: f64, rate: f64) -> f32 {
    (t * rate).rem_euclid(TAU) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetCatalog;
    use crate::gfx::scene::SceneBuilder;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    fn horizontal(v: Vector3<f32>) -> f32 {
        (v.x * v.x + v.z * v.z).sqrt()
    }

    fn sample_times() -> impl Iterator<Item = f64> {
        (0..2000).map(|i| i as f64 * 0.037)
    }

    fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a.x - b.x).abs() < 1e-5 && (a.y - b.y).abs() < 1e-5 && (a.z - b.z).abs() < 1e-5
    }

    #[test]
    fn test_ghost_heights_stay_in_band() {
        let model = MotionModel::from_params(&ParameterSet::default());
        for t in sample_times() {
            for ghost in [GhostId::Ghost1, GhostId::Ghost2] {
                let y = model.position_at(ghost, t).y;
                assert!((0.0..=2.0).contains(&y), "{:?} at t={} has y={}", ghost, t, y);
            }
        }
    }

    #[test]
    fn test_orbit_radii() {
        let model = MotionModel::from_params(&ParameterSet::default());
        for t in sample_times() {
            assert!((horizontal(model.position_at(GhostId::Ghost1, t)) - 8.0).abs() < 1e-3);
            assert!((horizontal(model.position_at(GhostId::Ghost2, t)) - 10.0).abs() < 1e-3);
            assert!((horizontal(model.position_at(GhostId::Ghost3, t)) - 3.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_position_is_pure() {
        let model = MotionModel::new(6.0);
        for ghost in GhostId::ALL {
            assert_eq!(model.position_at(ghost, 12.5), model.position_at(ghost, 12.5));
        }
    }

    #[test]
    fn test_ghost3_keypoints() {
        let model = MotionModel::from_params(&ParameterSet::default());
        assert_eq!(model.ghost3_height(), 6.0);

        let start = model.position_at(GhostId::Ghost3, 0.0);
        assert_eq!(start, Vector3::new(0.0, 6.0, 3.0));

        let quarter = model.position_at(GhostId::Ghost3, FRAC_PI_2);
        assert!((quarter.x - 3.0).abs() < 1e-5);
        assert_eq!(quarter.y, 6.0);
        assert!(quarter.z.abs() < 1e-5);
    }

    #[test]
    fn test_ghost1_keypoints() {
        let model = MotionModel::from_params(&ParameterSet::default());
        assert!(close(
            model.position_at(GhostId::Ghost1, 0.0),
            Vector3::new(0.0, 0.0, 8.0)
        ));
        // sin(3·π/2) = -1, so the bob peaks here
        assert!(close(
            model.position_at(GhostId::Ghost1, FRAC_PI_2),
            Vector3::new(8.0, 2.0, 0.0)
        ));
    }

    #[test]
    fn test_ghost2_keypoints() {
        let model = MotionModel::from_params(&ParameterSet::default());
        assert!(close(
            model.position_at(GhostId::Ghost2, 0.0),
            Vector3::new(0.0, 0.0, 10.0)
        ));
        // Half speed and clockwise: a quarter turn towards -x after π seconds
        assert!(close(
            model.position_at(GhostId::Ghost2, PI),
            Vector3::new(-10.0, 0.0, 0.0)
        ));
        let bob = model.position_at(GhostId::Ghost2, PI / 6.0).y;
        assert!((bob - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_positions_stay_precise_after_long_runtime() {
        let model = MotionModel::from_params(&ParameterSet::default());
        // Roughly a day and a half of whole turns
        let day = TAU * 20_000.0;
        for ghost in GhostId::ALL {
            for t in [0.0, FRAC_PI_2, 1.0] {
                let early = model.position_at(ghost, t);
                let late = model.position_at(ghost, day + t);
                assert!(
                    (early - late).x.abs() < 1e-4
                        && (early - late).y.abs() < 1e-4
                        && (early - late).z.abs() < 1e-4,
                    "{:?} drifted from {:?} to {:?}",
                    ghost,
                    early,
                    late
                );
            }
        }
    }

    #[test]
    fn test_apply_moves_only_ghosts() {
        let params = ParameterSet::default();
        let assets = AssetCatalog::haunted_house("assets");
        let mut graph = SceneBuilder::new(&params, &assets).build_seeded(Some(9));
        let before = graph.clone();

        let model = MotionModel::from_params(&params);
        model.apply(&mut graph, 1.25);

        let ghosts = graph.handles().unwrap().ghosts;
        for ghost in GhostId::ALL {
            assert_eq!(
                graph.position(ghosts[ghost.index()]).unwrap(),
                model.position_at(ghost, 1.25)
            );
        }
        for (id, node) in graph.nodes() {
            if !ghosts.contains(&id) {
                assert_eq!(Some(node), before.node(id));
            }
        }
    }
}
