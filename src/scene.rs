use crate::math::{add, euler_rotation, multiply_matrix_vector, scale, Vec3};
use tracing::trace;

/// RGB color
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::from_hex(0x000000);
    pub const WHITE: Color = Color::from_hex(0xffffff);

    /// Builds a color from a `0xRRGGBB` literal
    pub const fn from_hex(hex: u32) -> Self {
        Color {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// Linear blend towards `other` by `t` in `[0, 1]`
    pub fn mix(self, other: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t).round() as u8;
        Color {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
        }
    }
}

/// Glow applied on top of a material's base color
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Emissive {
    pub color: Color,
    pub intensity: f64,
}

/// Primitive geometry of a node, in local coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    /// Transform-only node that groups its children
    Group,
    /// Axis-aligned box centred on the origin
    Cuboid { width: f64, height: f64, depth: f64 },
    /// Rectangle in the local XY plane, centred on the origin
    Plane { width: f64, height: f64 },
    /// Square line grid in the local XZ plane
    Grid { size: f64, divisions: u32 },
    /// Flat arrow in the local XZ plane pointing along +Z
    Arrow,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub color: Color,
    pub opacity: f64,
    pub emissive: Option<Emissive>,
}

impl Material {
    pub fn solid(color: Color) -> Self {
        Material {
            color,
            opacity: 1.0,
            emissive: None,
        }
    }

    /// Base color with the emissive glow added on top
    pub fn shaded_color(&self) -> Color {
        match self.emissive {
            Some(emissive) => {
                let glow = |channel: u8| (channel as f64 * emissive.intensity) as u8;
                Color {
                    r: self.color.r.saturating_add(glow(emissive.color.r)),
                    g: self.color.g.saturating_add(glow(emissive.color.g)),
                    b: self.color.b.saturating_add(glow(emissive.color.b)),
                }
            }
            None => self.color,
        }
    }
}

/// Text drawn at a node's position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Label {
    /// Translation key resolved in the active language
    Key(&'static str),
    /// Literal text shown as-is
    Text(&'static str),
}

/// Description of a node handed to a scene graph
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDesc {
    pub name: &'static str,
    pub shape: Shape,
    pub material: Material,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub visible: bool,
    pub label: Option<Label>,
}

impl NodeDesc {
    pub fn new(name: &'static str, shape: Shape) -> Self {
        NodeDesc {
            name,
            shape,
            material: Material::solid(Color::WHITE),
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
            visible: true,
            label: None,
        }
    }

    pub fn group(name: &'static str) -> Self {
        NodeDesc::new(name, Shape::Group)
    }

    pub fn color(mut self, hex: u32) -> Self {
        self.material.color = Color::from_hex(hex);
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.material.opacity = opacity;
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotated(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn labelled(mut self, label: Label) -> Self {
        self.label = Some(label);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Opaque reference to a node owned by a scene graph
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(usize);

/// Renderer-side scene graph the core builds into and animates
pub trait SceneGraph {
    fn add_node(&mut self, parent: Option<NodeHandle>, desc: NodeDesc) -> NodeHandle;
    fn set_position(&mut self, node: NodeHandle, position: Vec3);
    fn set_rotation(&mut self, node: NodeHandle, rotation: Vec3);
    fn set_scale(&mut self, node: NodeHandle, scale: Vec3);
    fn set_visible(&mut self, node: NodeHandle, visible: bool);
    fn set_emissive(&mut self, node: NodeHandle, emissive: Option<Emissive>);
}

/// Node stored in a [`Scene`]
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub desc: NodeDesc,
    pub parent: Option<NodeHandle>,
}

/// In-memory scene graph drawn by the terminal renderer
#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<Node>,
    revision: u64,
}

impl Scene {
    pub fn new() -> Self {
        Scene::default()
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle.0)
    }

    /// Every node with its handle, parents before children
    pub fn nodes(&self) -> impl Iterator<Item = (NodeHandle, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeHandle(index), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Counter bumped by every mutation made through [`SceneGraph`]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// A node is drawn only if it and all of its ancestors are visible
    pub fn is_effectively_visible(&self, handle: NodeHandle) -> bool {
        let mut current = Some(handle);
        while let Some(h) = current {
            match self.node(h) {
                Some(node) if node.desc.visible => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Transforms a point from a node's local space into world space
    pub fn world_point(&self, handle: NodeHandle, local: &Vec3) -> Vec3 {
        let mut point = *local;
        let mut current = Some(handle);
        while let Some(h) = current {
            let Some(node) = self.node(h) else {
                break;
            };
            let rotated = multiply_matrix_vector(
                &euler_rotation(&node.desc.rotation),
                &scale(&point, &node.desc.scale),
            );
            point = add(&node.desc.position, &rotated);
            current = node.parent;
        }
        point
    }

    /// Finds the first node with the given name
    pub fn find(&self, name: &str) -> Option<NodeHandle> {
        self.nodes()
            .find(|(_, node)| node.desc.name == name)
            .map(|(handle, _)| handle)
    }

    fn touch(&mut self, handle: NodeHandle) -> Option<&mut NodeDesc> {
        let node = self.nodes.get_mut(handle.0)?;
        self.revision += 1;
        Some(&mut node.desc)
    }
}

impl SceneGraph for Scene {
    fn add_node(&mut self, parent: Option<NodeHandle>, desc: NodeDesc) -> NodeHandle {
        let handle = NodeHandle(self.nodes.len());
        trace!(name = desc.name, ?parent, "adding node");
        self.nodes.push(Node { desc, parent });
        self.revision += 1;
        handle
    }

    fn set_position(&mut self, node: NodeHandle, position: Vec3) {
        if let Some(desc) = self.touch(node) {
            desc.position = position;
        }
    }

    fn set_rotation(&mut self, node: NodeHandle, rotation: Vec3) {
        if let Some(desc) = self.touch(node) {
            desc.rotation = rotation;
        }
    }

    fn set_scale(&mut self, node: NodeHandle, scale: Vec3) {
        if let Some(desc) = self.touch(node) {
            desc.scale = scale;
        }
    }

    fn set_visible(&mut self, node: NodeHandle, visible: bool) {
        if let Some(desc) = self.touch(node) {
            desc.visible = visible;
        }
    }

    fn set_emissive(&mut self, node: NodeHandle, emissive: Option<Emissive>) {
        if let Some(desc) = self.touch(node) {
            desc.material.emissive = emissive;
        }
    }
}
