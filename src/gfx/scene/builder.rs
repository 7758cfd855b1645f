//! # Scene Construction
//!
//! Derives the whole diorama from a [`ParameterSet`] and an [`AssetCatalog`].
//! Everything is a pure function of the parameters except the grave scatter,
//! which draws from the random source handed to [`SceneBuilder::build`].

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_8, PI};

use cgmath::Vector3;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::assets::AssetCatalog;
use crate::params::{Color, ParameterSet, PointLightParams};

use super::node::{
    LightDescriptor, LightKind, MaterialDesc, MaterialMaps, NodeId, NodeKind, SceneNode, Shape,
    Transform,
};
use super::scene::{Fog, SceneGraph, SceneHandles};

pub const GRAVE_COUNT: usize = 50;
pub const GRAVE_SIZE: [f32; 3] = [0.8, 1.2, 0.3];
/// Graves sit between this radius and twice it
pub const GRAVE_INNER_RADIUS: f32 = 5.0;
/// Largest grave distance; stays below twice the inner radius after f32 rounding
pub const GRAVE_MAX_RADIUS: f32 = 2.0 * GRAVE_INNER_RADIUS - 1e-4;
pub const FLOOR_SIZE: f32 = 25.0;
pub const DOOR_SEGMENTS: u32 = 200;
pub const DOOR_DISPLACEMENT_SCALE: f32 = 0.1;
pub const ATMOSPHERE_COLOR: u32 = 0x262837;
pub const FOG_NEAR: f32 = 5.0;
pub const FOG_FAR: f32 = 25.0;
pub const BUSH_COLOR: u32 = 0x00ff00;
pub const MOON_POSITION: [f32; 3] = [20.0, 20.0, 25.0];
pub const MOON_TARGET: [f32; 3] = [0.0, 20.0, 0.0];
/// Radius of the marker sphere drawn for a light helper
pub const HELPER_SIZE: f32 = 0.25;
/// Marker mesh drawn for light helpers
pub const HELPER_SHAPE: Shape = Shape::Sphere {
    radius: HELPER_SIZE,
    width_segments: 8,
    height_segments: 6,
};

/// Placement of one grave
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraveSite {
    pub position: Vector3<f32>,
    pub rotation_y: f32,
    pub rotation_z: f32,
}

impl GraveSite {
    /// Draws a grave placement: angle, ring offset, then the two tilts
    pub fn scatter<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let r: f32 = rng.random();
        let u: f32 = rng.random();
        let angle = r * PI * 2.0;
        // 1 + u rounds to 2 for the largest draws
        let radius = (GRAVE_INNER_RADIUS * (1.0 + u)).min(GRAVE_MAX_RADIUS);

        let rotation_y = (rng.random::<f32>() - 0.5) * FRAC_PI_8;
        let rotation_z = (rng.random::<f32>() - 0.5) * FRAC_PI_8;

        Self {
            position: Vector3::new(
                angle.sin() * radius,
                GRAVE_SIZE[1] / 2.0 - 0.1,
                angle.cos() * radius,
            ),
            rotation_y,
            rotation_z,
        }
    }

    pub fn horizontal_distance(&self) -> f32 {
        (self.position.x * self.position.x + self.position.z * self.position.z).sqrt()
    }
}

/// Builds a [`SceneGraph`] from parameters and texture catalog
pub struct SceneBuilder<'a> {
    params: &'a ParameterSet,
    assets: &'a AssetCatalog,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(params: &'a ParameterSet, assets: &'a AssetCatalog) -> Self {
        Self { params, assets }
    }

    /// Builds with a seeded generator, or an entropy-seeded one for `None`
    pub fn build_seeded(&self, seed: Option<u64>) -> SceneGraph {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        self.build(&mut rng)
    }

    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> SceneGraph {
        let p = self.params;
        let atmosphere = Color::from_hex(ATMOSPHERE_COLOR);
        let mut graph = SceneGraph::new(
            Fog {
                color: atmosphere,
                near: FOG_NEAR,
                far: FOG_FAR,
            },
            atmosphere,
        );

        let (ambient, moon, house_light) = self.add_static_lights(&mut graph);

        let wall = graph.add(
            SceneNode::mesh(
                "wall",
                Shape::Box {
                    width: p.wall.width,
                    height: p.wall.height,
                    depth: p.wall.depth,
                },
                self.textured("bricks", &["color", "normal", "ambientOcclusion", "roughness"]),
                Transform::at(0.0, p.wall.height / 2.0, 0.0),
            )
            .with_shadows(true, false)
            .with_visibility(p.wall.visible),
        );

        let roof = graph.add(
            SceneNode::mesh(
                "roof",
                Shape::Cone {
                    radius: p.roof.radius,
                    height: p.roof.height,
                    radial_segments: 4,
                },
                MaterialDesc::solid(p.roof.color),
                Transform::at(0.0, p.wall.height + p.roof.height / 2.0, 0.0)
                    .with_rotation(0.0, FRAC_PI_4, 0.0),
            )
            .with_visibility(p.roof.visible),
        );

        let floor = graph.add(
            SceneNode::mesh(
                "floor",
                Shape::Plane {
                    width: FLOOR_SIZE,
                    height: FLOOR_SIZE,
                    width_segments: 1,
                    height_segments: 1,
                },
                self.textured("grass", &["color", "ambientOcclusion", "normal", "roughness"]),
                Transform::default().with_rotation(-FRAC_PI_2, 0.0, 0.0),
            )
            .with_shadows(false, true)
            .with_visibility(p.floor.visible),
        );

        let mut door_material = self.textured(
            "door",
            &[
                "color",
                "alpha",
                "height",
                "roughness",
                "metalness",
                "normal",
                "ambientOcclusion",
            ],
        );
        door_material.transparent = true;
        door_material.displacement_scale = DOOR_DISPLACEMENT_SCALE;
        let door = graph.add(
            SceneNode::mesh(
                "door",
                Shape::Plane {
                    width: p.door.width,
                    height: p.door.height,
                    width_segments: DOOR_SEGMENTS,
                    height_segments: DOOR_SEGMENTS,
                },
                door_material,
                Transform::at(0.0, p.door.height / 2.0, p.wall.depth / 2.0 + 0.01),
            )
            .with_visibility(p.door.visible),
        );

        let graves = (0..GRAVE_COUNT)
            .map(|i| {
                let site = GraveSite::scatter(&mut *rng);
                let mut transform = Transform::default();
                transform.position = site.position;
                transform.rotation = Vector3::new(0.0, site.rotation_y, site.rotation_z);

                graph.add(
                    SceneNode::mesh(
                        &format!("grave {}", i),
                        Shape::Box {
                            width: GRAVE_SIZE[0],
                            height: GRAVE_SIZE[1],
                            depth: GRAVE_SIZE[2],
                        },
                        MaterialDesc::solid(p.grave.color),
                        transform,
                    )
                    .with_shadows(true, false),
                )
            })
            .collect();

        let bush_shape = Shape::Sphere {
            radius: 0.5,
            width_segments: 32,
            height_segments: 32,
        };
        let bush_material = MaterialDesc::solid(Color::from_hex(BUSH_COLOR));
        let bush_z = p.wall.depth / 2.0 + 0.75;
        let bushes = [
            graph.add(SceneNode::mesh(
                "bush 1",
                bush_shape,
                bush_material,
                Transform::at(p.wall.width * 0.35, 0.0, bush_z),
            )),
            graph.add(SceneNode::mesh(
                "bush 2",
                bush_shape,
                bush_material,
                Transform::at(p.wall.width * 0.2, 0.0, bush_z).with_uniform_scale(0.8),
            )),
        ];

        let ghost3_height = p.wall.height + p.roof.height;
        let ghosts = [
            self.add_point_light(&mut graph, "ghost1", &p.ghost1, Transform::default(), true),
            self.add_point_light(&mut graph, "ghost2", &p.ghost2, Transform::default(), true),
            self.add_point_light(
                &mut graph,
                "ghost3",
                &p.ghost3,
                Transform::at(0.0, ghost3_height, 0.0),
                false,
            ),
        ];

        graph.set_handles(SceneHandles {
            wall,
            roof,
            door,
            floor,
            bushes,
            graves,
            ambient,
            moon,
            house_light,
            ghosts,
        });

        let stats = graph.statistics();
        log::debug!(
            "Built scene: {} meshes, {} lights, {} helpers, {} triangles",
            stats.mesh_count,
            stats.light_count,
            stats.helper_count,
            stats.total_triangles
        );

        graph
    }

    fn add_static_lights(&self, graph: &mut SceneGraph) -> (NodeId, NodeId, NodeId) {
        let p = self.params;

        let ambient = graph.add(SceneNode::light(
            "ambient",
            LightDescriptor::new(p.ambient.color, p.ambient.intensity),
            LightKind::Ambient,
            Transform::default(),
        ));

        let mut moon_light = LightDescriptor::new(p.moon.color, p.moon.intensity);
        moon_light.helper = p.moon.helper;
        let moon = graph.add(SceneNode::light(
            "moon",
            moon_light,
            LightKind::Directional {
                target: Vector3::from(MOON_TARGET),
                cast_shadow: true,
            },
            Transform::at(MOON_POSITION[0], MOON_POSITION[1], MOON_POSITION[2]),
        ));
        if moon_light.helper {
            self.add_helper(graph, "moon", moon);
        }

        let house_light = self.add_point_light(
            graph,
            "houseLight",
            &p.house_light,
            Transform::at(0.0, p.wall.height * 0.75, p.wall.depth / 2.0 + 1.5),
            true,
        );

        (ambient, moon, house_light)
    }

    fn add_point_light(
        &self,
        graph: &mut SceneGraph,
        name: &str,
        params: &PointLightParams,
        transform: Transform,
        cast_shadow: bool,
    ) -> NodeId {
        let light = LightDescriptor {
            color: params.color,
            intensity: params.intensity,
            distance: params.distance,
            decay: params.decay,
            helper: params.helper,
        };
        let id = graph.add(SceneNode::light(
            name,
            light,
            LightKind::Point { cast_shadow },
            transform,
        ));
        if params.helper {
            self.add_helper(graph, name, id);
        }
        id
    }

    fn add_helper(&self, graph: &mut SceneGraph, name: &str, light: NodeId) -> NodeId {
        let transform = graph
            .node(light)
            .map(|node| node.transform)
            .unwrap_or_default();
        graph.add(SceneNode {
            name: format!("{} helper", name),
            transform,
            visible: true,
            kind: NodeKind::Helper { light },
        })
    }

    /// Material whose maps are `<group>/<map>` catalog entries
    ///
    /// Entries missing from the catalog are left unset. The UV repeat comes
    /// from the group's color map.
    fn textured(&self, group: &str, maps: &[&str]) -> MaterialDesc {
        let mut material = MaterialDesc::default();
        let mut slots = MaterialMaps::default();

        for map in maps {
            let id = self.assets.id(&format!("{}/{}", group, map));
            match *map {
                "color" => slots.color = id,
                "normal" => slots.normal = id,
                "ambientOcclusion" => slots.ambient_occlusion = id,
                "roughness" => slots.roughness = id,
                "metalness" => slots.metalness = id,
                "alpha" => slots.alpha = id,
                "height" => slots.displacement = id,
                other => log::warn!("Unknown material map `{}` for {}", other, group),
            }
        }

        if let Some(asset) = slots.color.and_then(|id| self.assets.get(id)) {
            material.uv_repeat = asset.repeat;
        }
        material.maps = slots;
        material
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(params: &ParameterSet) -> SceneGraph {
        let assets = AssetCatalog::haunted_house("assets");
        SceneBuilder::new(params, &assets).build(&mut StdRng::seed_from_u64(7))
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_graves_scatter_in_ring() {
        let graph = build(&ParameterSet::default());
        let handles = graph.handles().unwrap();
        assert_eq!(handles.graves.len(), GRAVE_COUNT);

        for &id in &handles.graves {
            let node = graph.node(id).unwrap();
            let p = node.transform.position;
            let distance = (p.x * p.x + p.z * p.z).sqrt();
            assert!(distance >= 5.0 - 1e-4 && distance < 10.0, "grave at {}", distance);
            assert!(close(p.y, 0.5));
            assert!(node.transform.rotation.y.abs() <= PI / 16.0);
            assert!(node.transform.rotation.z.abs() <= PI / 16.0);
            assert!(node.casts_shadow());
        }
    }

    #[test]
    fn test_grave_sites_stay_in_ring_for_many_draws() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..10_000 {
            let site = GraveSite::scatter(&mut rng);
            let d = site.horizontal_distance();
            assert!(d >= 5.0 - 1e-4 && d < 10.0);
        }
    }

    /// Random source that always yields its largest value
    struct SaturatedRng;

    impl rand::RngCore for SaturatedRng {
        fn next_u32(&mut self) -> u32 {
            u32::MAX
        }

        fn next_u64(&mut self) -> u64 {
            u64::MAX
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(u8::MAX);
        }
    }

    #[test]
    fn test_largest_draw_stays_inside_outer_radius() {
        let site = GraveSite::scatter(&mut SaturatedRng);
        let d = site.horizontal_distance();
        assert!(d >= 5.0 && d < 10.0, "grave at {}", d);
        assert!(site.rotation_y.abs() <= PI / 16.0);
        assert!(site.rotation_z.abs() <= PI / 16.0);
    }

    #[test]
    fn test_same_seed_same_scene() {
        let params = ParameterSet::default();
        let assets = AssetCatalog::haunted_house("assets");
        let builder = SceneBuilder::new(&params, &assets);
        let a = builder.build_seeded(Some(3));
        let b = builder.build_seeded(Some(3));
        let grave = a.handles().unwrap().graves[10];
        assert_eq!(a.node(grave), b.node(grave));
    }

    #[test]
    fn test_default_roof_placement() {
        let graph = build(&ParameterSet::default());
        let roof = graph.node(graph.handles().unwrap().roof).unwrap();
        assert!(close(roof.transform.position.y, 5.0));
        assert!(close(roof.transform.rotation.y, FRAC_PI_4));
        assert!(roof.visible);
    }

    #[test]
    fn test_wall_height_moves_roof_and_house_light() {
        let mut params = ParameterSet::default();
        params.wall.height = 6.0;
        let graph = build(&params);
        let handles = graph.handles().unwrap();

        assert!(close(graph.position(handles.roof).unwrap().y, 7.0));
        assert!(close(graph.position(handles.house_light).unwrap().y, 4.5));
        assert!(close(graph.position(handles.wall).unwrap().y, 3.0));
        assert!(close(graph.position(handles.ghosts[2]).unwrap().y, 8.0));
    }

    #[test]
    fn test_hidden_wall_leaves_others_visible() {
        let mut params = ParameterSet::default();
        params.wall.visible = false;
        let graph = build(&params);
        let handles = graph.handles().unwrap();

        assert!(!graph.node(handles.wall).unwrap().visible);
        for id in [handles.roof, handles.floor, handles.door] {
            assert!(graph.node(id).unwrap().visible);
        }
    }

    #[test]
    fn test_helpers_only_when_flagged() {
        let graph = build(&ParameterSet::default());
        assert_eq!(graph.statistics().helper_count, 0);

        let mut params = ParameterSet::default();
        params.ghost3.helper = true;
        params.moon.helper = true;
        let graph = build(&params);
        let handles = graph.handles().unwrap();
        assert_eq!(graph.statistics().helper_count, 2);
        assert_eq!(graph.helpers_of(handles.ghosts[2]).count(), 1);
        assert_eq!(graph.helpers_of(handles.moon).count(), 1);
        assert_eq!(graph.helpers_of(handles.ghosts[0]).count(), 0);
    }

    #[test]
    fn test_shadow_casters() {
        let graph = build(&ParameterSet::default());
        let handles = graph.handles().unwrap();
        assert!(graph.node(handles.moon).unwrap().casts_shadow());
        assert!(graph.node(handles.house_light).unwrap().casts_shadow());
        assert!(graph.node(handles.ghosts[0]).unwrap().casts_shadow());
        assert!(graph.node(handles.ghosts[1]).unwrap().casts_shadow());
        assert!(!graph.node(handles.ghosts[2]).unwrap().casts_shadow());
        assert!(graph.node(handles.wall).unwrap().casts_shadow());

        match graph.node(handles.floor).unwrap().kind {
            NodeKind::Mesh { receive_shadow, .. } => assert!(receive_shadow),
            _ => panic!("floor is not a mesh"),
        }
    }

    #[test]
    fn test_bushes_and_atmosphere() {
        let graph = build(&ParameterSet::default());
        let handles = graph.handles().unwrap();
        let bush1 = graph.node(handles.bushes[0]).unwrap();
        let bush2 = graph.node(handles.bushes[1]).unwrap();
        assert!(close(bush1.transform.position.x, 1.75));
        assert!(close(bush1.transform.position.z, 3.25));
        assert!(close(bush2.transform.position.x, 1.0));
        assert!(close(bush2.transform.scale.x, 0.8));

        assert_eq!(graph.fog.color.to_hex(), 0x262837);
        assert_eq!((graph.fog.near, graph.fog.far), (5.0, 25.0));
        assert_eq!(graph.clear_color.to_hex(), 0x262837);
    }

    #[test]
    fn test_textured_materials_follow_catalog() {
        let graph = build(&ParameterSet::default());
        let handles = graph.handles().unwrap();

        match &graph.node(handles.floor).unwrap().kind {
            NodeKind::Mesh { material, .. } => {
                assert_eq!(material.uv_repeat, [8.0, 8.0]);
                assert_eq!(material.maps.iter().count(), 4);
            }
            _ => panic!("floor is not a mesh"),
        }
        match &graph.node(handles.door).unwrap().kind {
            NodeKind::Mesh { material, shape, .. } => {
                assert!(material.transparent);
                assert_eq!(material.displacement_scale, 0.1);
                assert_eq!(material.maps.iter().count(), 7);
                assert!(matches!(shape, Shape::Plane { width_segments: 200, .. }));
            }
            _ => panic!("door is not a mesh"),
        }
    }

    #[test]
    fn test_empty_catalog_builds_untextured() {
        let params = ParameterSet::default();
        let assets = AssetCatalog::new("nowhere");
        let graph = SceneBuilder::new(&params, &assets).build(&mut StdRng::seed_from_u64(1));
        let wall = graph.node(graph.handles().unwrap().wall).unwrap();
        match &wall.kind {
            NodeKind::Mesh { material, .. } => assert_eq!(material.maps.iter().count(), 0),
            _ => panic!("wall is not a mesh"),
        }
    }
}
