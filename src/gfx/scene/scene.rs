use cgmath::Vector3;

use crate::params::Color;

use super::node::{LightDescriptor, NodeId, NodeKind, SceneNode};

/// Linear distance fog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

/// Handles to the nodes other components address directly
#[derive(Debug, Clone, PartialEq)]
pub struct SceneHandles {
    pub wall: NodeId,
    pub roof: NodeId,
    pub door: NodeId,
    pub floor: NodeId,
    pub bushes: [NodeId; 2],
    pub graves: Vec<NodeId>,
    pub ambient: NodeId,
    pub moon: NodeId,
    pub house_light: NodeId,
    pub ghosts: [NodeId; 3],
}

/// Flat scene graph of the diorama
///
/// Nodes are only ever appended, so a [`NodeId`] handed out once stays valid
/// for the lifetime of the graph.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    pub fog: Fog,
    pub clear_color: Color,
    handles: Option<SceneHandles>,
}

impl SceneGraph {
    pub fn new(fog: Fog, clear_color: Color) -> Self {
        Self {
            nodes: Vec::new(),
            fog,
            clear_color,
            handles: None,
        }
    }

    pub fn add(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub(crate) fn set_handles(&mut self, handles: SceneHandles) {
        self.handles = Some(handles);
    }

    /// Well-known nodes, present on every graph built by the scene builder
    pub fn handles(&self) -> Option<&SceneHandles> {
        self.handles.as_ref()
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.name == name)
            .map(NodeId)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn light(&self, id: NodeId) -> Option<&LightDescriptor> {
        self.node(id).and_then(SceneNode::light_descriptor)
    }

    pub fn light_mut(&mut self, id: NodeId) -> Option<&mut LightDescriptor> {
        self.node_mut(id).and_then(SceneNode::light_descriptor_mut)
    }

    pub fn set_position(&mut self, id: NodeId, position: Vector3<f32>) {
        if let Some(node) = self.node_mut(id) {
            node.transform.position = position;
        }
    }

    pub fn position(&self, id: NodeId) -> Option<Vector3<f32>> {
        self.node(id).map(|node| node.transform.position)
    }

    /// Moves every helper onto the light it marks
    pub fn sync_helpers(&mut self) {
        for i in 0..self.nodes.len() {
            if let NodeKind::Helper { light } = self.nodes[i].kind {
                if let Some(position) = self.position(light) {
                    self.nodes[i].transform.position = position;
                }
            }
        }
    }

    /// Helpers attached to `light`
    pub fn helpers_of(&self, light: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes().filter_map(move |(id, node)| match node.kind {
            NodeKind::Helper { light: target } if target == light => Some(id),
            _ => None,
        })
    }

    /// Gets statistics about the scene
    pub fn statistics(&self) -> SceneStatistics {
        let mut stats = SceneStatistics::default();
        for node in &self.nodes {
            match &node.kind {
                NodeKind::Mesh { shape, .. } => {
                    stats.mesh_count += 1;
                    stats.total_triangles += shape.geometry().triangle_count();
                }
                NodeKind::Light { .. } => stats.light_count += 1,
                NodeKind::Helper { .. } => stats.helper_count += 1,
            }
        }
        stats
    }
}

/// Scene statistics for debugging and UI display
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SceneStatistics {
    pub mesh_count: usize,
    pub light_count: usize,
    pub helper_count: usize,
    pub total_triangles: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::node::{LightKind, Transform};

    fn empty_graph() -> SceneGraph {
        let color = Color::from_hex(0x262837);
        SceneGraph::new(
            Fog {
                color,
                near: 5.0,
                far: 25.0,
            },
            color,
        )
    }

    #[test]
    fn test_helpers_follow_their_light() {
        let mut graph = empty_graph();
        let light = graph.add(SceneNode::light(
            "ghost",
            LightDescriptor::new(Color::WHITE, 1.0),
            LightKind::Point { cast_shadow: false },
            Transform::default(),
        ));
        let helper = graph.add(SceneNode {
            name: "ghost helper".to_string(),
            transform: Transform::default(),
            visible: true,
            kind: NodeKind::Helper { light },
        });

        graph.set_position(light, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(graph.position(helper), Some(Vector3::new(0.0, 0.0, 0.0)));

        graph.sync_helpers();
        assert_eq!(graph.position(helper), Some(Vector3::new(1.0, 2.0, 3.0)));
        assert_eq!(graph.helpers_of(light).collect::<Vec<_>>(), vec![helper]);
    }

    #[test]
    fn test_lookup_by_name() {
        let mut graph = empty_graph();
        assert!(graph.is_empty());
        let id = graph.add(SceneNode::light(
            "moon",
            LightDescriptor::new(Color::WHITE, 0.2),
            LightKind::Ambient,
            Transform::default(),
        ));
        assert_eq!(graph.find("moon"), Some(id));
        assert_eq!(graph.find("sun"), None);
        assert!(graph.light(id).is_some());
        assert_eq!(graph.statistics().light_count, 1);
    }
}
