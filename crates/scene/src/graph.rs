//! Scene graph.
//!
//! Nodes live in an arena owned by [`SceneGraph`] and are addressed by
//! [`NodeId`]. Every node except the root has exactly one parent, which owns
//! it: removing a node removes its whole subtree. The structure is a tree at
//! all times; [`SceneGraph::reparent`] refuses moves that would close a cycle.
//!
//! Freed slots are reused. Each slot carries a generation, so a handle to a
//! removed node never resolves to the node that later takes its slot.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use stage_core::{Error, Result};
use tracing::debug;

use crate::geometry::{Geometry, GeometryData};
use crate::light::Light;
use crate::material::Material;
use crate::transform::Transform;

/// Handle to a node in a [`SceneGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Arena slot of this node.
    pub fn index(self) -> usize {
        self.index as usize
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Drawable payload: shared geometry plus shared material.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub geometry: Arc<GeometryData>,
    pub material: Arc<Material>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    /// Build the geometry and wrap it with a material.
    pub fn new(geometry: &Geometry, material: Material) -> Self {
        Self::shared(Arc::new(geometry.build()), Arc::new(material))
    }

    /// Mesh reusing already built geometry and material.
    pub fn shared(geometry: Arc<GeometryData>, material: Arc<Material>) -> Self {
        Self {
            geometry,
            material,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    /// Mutable access to the material, cloning it if shared.
    pub fn material_mut(&mut self) -> &mut Material {
        Arc::make_mut(&mut self.material)
    }
}

/// What a node carries besides its transform.
#[derive(Clone, Debug, Default)]
pub enum Payload {
    /// Pivot or group
    #[default]
    Empty,
    Mesh(Mesh),
    Light(Light),
}

/// A single node of the scene graph.
#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub payload: Payload,
    pub visible: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(name: impl Into<String>, transform: Transform, payload: Payload, parent: Option<NodeId>) -> Self {
        Self {
            name: name.into(),
            transform,
            payload,
            visible: true,
            parent,
            children: Vec::new(),
        }
    }

    /// Parent node, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        match &self.payload {
            Payload::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn mesh_mut(&mut self) -> Option<&mut Mesh> {
        match &mut self.payload {
            Payload::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn light(&self) -> Option<&Light> {
        match &self.payload {
            Payload::Light(light) => Some(light),
            _ => None,
        }
    }

    pub fn light_mut(&mut self) -> Option<&mut Light> {
        match &mut self.payload {
            Payload::Light(light) => Some(light),
            _ => None,
        }
    }
}

/// Arena-backed tree of scene nodes.
#[derive(Clone, Debug)]
pub struct SceneGraph {
    slots: Vec<Slot>,
    /// Vacant slot indices, most recently freed last
    free: Vec<u32>,
    root: NodeId,
    live: usize,
    /// Clear color; `None` leaves the renderer default
    pub background: Option<Vec3>,
    camera_rig: Option<NodeId>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a graph holding only the root node.
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node::new("root", Transform::new(), Payload::Empty, None)),
            }],
            free: Vec::new(),
            root: NodeId { index: 0, generation: 0 },
            live: 1,
            background: None,
            camera_rig: None,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether only the root is present.
    pub fn is_empty(&self) -> bool {
        self.live == 1
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn expect_node(&self, id: NodeId) -> Result<&Node> {
        self.node(id)
            .ok_or_else(|| Error::Scene(format!("unknown node {:?}", id)))
    }

    /// Mutable transform of a node.
    pub fn transform_mut(&mut self, id: NodeId) -> Option<&mut Transform> {
        self.node_mut(id).map(|node| &mut node.transform)
    }

    /// Create a node under `parent`.
    pub fn add(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        transform: Transform,
        payload: Payload,
    ) -> Result<NodeId> {
        self.expect_node(parent)?;
        let node = Node::new(name, transform, payload, Some(parent));
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId { index, generation: 0 }
            }
        };
        self.live += 1;
        if let Some(parent) = self.node_mut(parent) {
            parent.children.push(id);
        }
        Ok(id)
    }

    /// Create a pivot/group node.
    pub fn add_empty(&mut self, parent: NodeId, name: impl Into<String>, transform: Transform) -> Result<NodeId> {
        self.add(parent, name, transform, Payload::Empty)
    }

    pub fn add_mesh(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        transform: Transform,
        mesh: Mesh,
    ) -> Result<NodeId> {
        self.add(parent, name, transform, Payload::Mesh(mesh))
    }

    pub fn add_light(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        transform: Transform,
        light: Light,
    ) -> Result<NodeId> {
        self.add(parent, name, transform, Payload::Light(light))
    }

    /// Remove a node and its subtree. The root cannot be removed.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(Error::Scene("cannot remove the root node".into()));
        }
        let parent = self.expect_node(id)?.parent;
        if let Some(parent) = parent.and_then(|p| self.node_mut(p)) {
            parent.children.retain(|child| *child != id);
        }

        let mut stack = vec![id];
        let mut removed = 0usize;
        while let Some(current) = stack.pop() {
            let Some(slot) = self
                .slots
                .get_mut(current.index())
                .filter(|slot| slot.generation == current.generation)
            else {
                continue;
            };
            if let Some(node) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
                self.live -= 1;
                removed += 1;
                stack.extend(node.children);
            }
        }
        debug!("Removed {:?} and {} descendants", id, removed.saturating_sub(1));
        if self.camera_rig.is_some_and(|rig| !self.contains(rig)) {
            self.camera_rig = None;
        }
        Ok(())
    }

    /// Whether `ancestor` lies on the path from `id` to the root (inclusive).
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.node(node_id).and_then(Node::parent);
        }
        false
    }

    /// Move `id` (with its subtree) under `new_parent`.
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId) -> Result<()> {
        if id == self.root {
            return Err(Error::Scene("cannot reparent the root node".into()));
        }
        self.expect_node(new_parent)?;
        let old_parent = self.expect_node(id)?.parent;
        if self.is_ancestor(id, new_parent) {
            return Err(Error::Scene(format!(
                "reparenting {:?} under {:?} would create a cycle",
                id, new_parent
            )));
        }

        if let Some(old) = old_parent.and_then(|p| self.node_mut(p)) {
            old.children.retain(|child| *child != id);
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = Some(new_parent);
        }
        if let Some(parent) = self.node_mut(new_parent) {
            parent.children.push(id);
        }
        Ok(())
    }

    /// First node with the given name, depth-first from the root.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.traverse()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| id)
    }

    /// Child of `id` at `index`.
    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.node(id)?.children.get(index).copied()
    }

    /// Composed world matrix of a node.
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let mut node = self.node(id)?;
        let mut world = node.transform.local_matrix();
        while let Some(parent) = node.parent.and_then(|p| self.node(p)) {
            world = parent.transform.local_matrix() * world;
            node = parent;
        }
        Some(world)
    }

    /// World-space origin of a node.
    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        self.world_matrix(id).map(|m| m.transform_point3(Vec3::ZERO))
    }

    /// Depth-first pre-order traversal from the root.
    pub fn traverse(&self) -> Traverse<'_> {
        Traverse {
            graph: self,
            stack: vec![self.root],
        }
    }

    /// Visible nodes with their world matrices, parents before children.
    ///
    /// Invisible nodes hide their whole subtree.
    pub fn world_matrices(&self) -> Vec<(NodeId, Mat4)> {
        let mut out = Vec::with_capacity(self.live);
        let mut stack = vec![(self.root, Mat4::IDENTITY)];
        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = self.node(id) else { continue };
            if !node.visible {
                continue;
            }
            let world = parent_world * node.transform.local_matrix();
            out.push((id, world));
            stack.extend(node.children.iter().rev().map(|child| (*child, world)));
        }
        out
    }

    /// Number of mesh nodes.
    pub fn mesh_count(&self) -> usize {
        self.traverse()
            .filter(|(_, node)| matches!(node.payload, Payload::Mesh(_)))
            .count()
    }

    /// Number of light nodes.
    pub fn light_count(&self) -> usize {
        self.traverse()
            .filter(|(_, node)| matches!(node.payload, Payload::Light(_)))
            .count()
    }

    /// Create (once) a node that mirrors the camera pose every frame.
    ///
    /// Lights parented to it move with the camera.
    pub fn camera_rig(&mut self) -> Result<NodeId> {
        if let Some(rig) = self.camera_rig {
            return Ok(rig);
        }
        let rig = self.add_empty(self.root, "camera", Transform::new())?;
        self.camera_rig = Some(rig);
        Ok(rig)
    }

    /// The camera rig node, if one was created.
    pub fn camera_rig_id(&self) -> Option<NodeId> {
        self.camera_rig
    }
}

/// Depth-first iterator over `(NodeId, &Node)`.
pub struct Traverse<'a> {
    graph: &'a SceneGraph,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            if let Some(node) = self.graph.node(id) {
                self.stack.extend(node.children.iter().rev());
                return Some((id, node));
            }
        }
        None
    }
}
