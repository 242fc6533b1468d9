use crate::math::{planar_heading, Vec3};
use crate::scene::{Color, Emissive, NodeDesc, NodeHandle, SceneGraph, Shape};
use std::f64::consts::FRAC_PI_4;
use std::fmt;
use tracing::{debug, info};

/// Vertical bobbing amplitude, in metres
pub const FLOAT_AMPLITUDE: f64 = 0.05;
/// Vertical bobbing angular frequency, in radians per second
pub const FLOAT_FREQUENCY: f64 = 2.0;
/// Relative scale pulse amplitude
pub const PULSE_AMPLITUDE: f64 = 0.1;
/// Scale pulse angular frequency, in radians per second
pub const PULSE_FREQUENCY: f64 = 3.0;
/// Phase step between consecutive arrows of a path
pub const PHASE_STEP: f64 = FRAC_PI_4;

const ARROW_COLOR: u32 = 0xe60000;
const HIGHLIGHT: Emissive = Emissive {
    color: Color::from_hex(0xffff00),
    intensity: 0.5,
};

/// The departments a user can be guided to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Destination {
    Checkout,
    Offers,
    Sausage,
}

impl Destination {
    pub const ALL: [Destination; 3] = [
        Destination::Checkout,
        Destination::Offers,
        Destination::Sausage,
    ];

    /// Parses a destination id, returning `None` for unknown ids
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "checkout" => Some(Destination::Checkout),
            "offers" => Some(Destination::Offers),
            "sausage" => Some(Destination::Sausage),
            _ => None,
        }
    }

    /// Id of the destination, which doubles as its translation key
    pub fn id(self) -> &'static str {
        match self {
            Destination::Checkout => "checkout",
            Destination::Offers => "offers",
            Destination::Sausage => "sausage",
        }
    }

    /// Fixed waypoints from the store centre to the department
    pub fn waypoints(self) -> &'static [Vec3] {
        match self {
            Destination::Checkout => &[
                [0.0, 0.1, 0.0],
                [-1.0, 0.1, -1.0],
                [-2.0, 0.1, -2.0],
                [-3.0, 0.1, -3.0],
                [-4.0, 0.1, -4.0],
            ],
            Destination::Offers => &[
                [0.0, 0.1, 0.0],
                [1.0, 0.1, -0.5],
                [2.0, 0.1, -1.5],
                [3.0, 0.1, -2.5],
            ],
            Destination::Sausage => &[
                [0.0, 0.1, 0.0],
                [0.0, 0.1, 1.0],
                [0.0, 0.1, 2.0],
                [0.0, 0.1, 3.0],
            ],
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Heading at a waypoint: towards the next waypoint, or continuing the last
/// bearing at the final one. Single-point paths face zero.
pub fn compute_heading(path: &[Vec3], index: usize) -> f64 {
    if index + 1 < path.len() {
        planar_heading(&path[index], &path[index + 1])
    } else if index > 0 && index < path.len() {
        planar_heading(&path[index - 1], &path[index])
    } else {
        0.0
    }
}

/// Height and uniform scale of an animated marker
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerPose {
    pub height: f64,
    pub scale: f64,
}

impl MarkerPose {
    /// Closed-form pose at `elapsed` seconds
    pub fn at(base_height: f64, phase: f64, elapsed: f64) -> Self {
        MarkerPose {
            height: base_height + FLOAT_AMPLITUDE * (elapsed * FLOAT_FREQUENCY + phase).sin(),
            scale: 1.0 + PULSE_AMPLITUDE * (elapsed * PULSE_FREQUENCY + phase).sin(),
        }
    }
}

/// One animated arrow placed at a waypoint
#[derive(Clone, Debug, PartialEq)]
pub struct ArrowMarker {
    pub node: NodeHandle,
    pub waypoint: Vec3,
    pub heading: f64,
    pub visible: bool,
    pub base_height: f64,
    pub phase: f64,
    pub pose: MarkerPose,
}

/// Arrows guiding to a single destination
#[derive(Clone, Debug, PartialEq)]
pub struct NavigationPath {
    pub destination: Destination,
    pub group: NodeHandle,
    pub markers: Vec<ArrowMarker>,
}

impl NavigationPath {
    /// Creates one hidden arrow per waypoint under a new group node
    pub fn build(
        scene: &mut dyn SceneGraph,
        parent: Option<NodeHandle>,
        destination: Destination,
    ) -> Self {
        let group = scene.add_node(parent, NodeDesc::group("arrows").hidden());
        let waypoints = destination.waypoints();
        let markers = waypoints
            .iter()
            .enumerate()
            .map(|(index, &waypoint)| {
                let heading = compute_heading(waypoints, index);
                let node = scene.add_node(
                    Some(group),
                    NodeDesc::new("arrow", Shape::Arrow)
                        .color(ARROW_COLOR)
                        .at(waypoint)
                        .rotated([0.0, heading, 0.0])
                        .hidden(),
                );
                ArrowMarker {
                    node,
                    waypoint,
                    heading,
                    visible: false,
                    base_height: waypoint[1],
                    phase: index as f64 * PHASE_STEP,
                    pose: MarkerPose {
                        height: waypoint[1],
                        scale: 1.0,
                    },
                }
            })
            .collect();

        NavigationPath {
            destination,
            group,
            markers,
        }
    }

    fn set_visible(&mut self, scene: &mut dyn SceneGraph, visible: bool) {
        scene.set_visible(self.group, visible);
        for marker in &mut self.markers {
            marker.visible = visible;
            scene.set_visible(marker.node, visible);
        }
    }

    pub fn is_visible(&self) -> bool {
        self.markers.iter().any(|marker| marker.visible)
    }
}

/// Department volume that can be highlighted as the current destination
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepartmentNode {
    pub destination: Destination,
    pub node: NodeHandle,
    pub highlighted: bool,
}

/// Every navigation path plus the departments they lead to
#[derive(Clone, Debug, PartialEq)]
pub struct NavigationRig {
    paths: Vec<NavigationPath>,
    departments: Vec<DepartmentNode>,
}

impl NavigationRig {
    /// Builds a hidden path for every destination under `parent`
    pub fn build(
        scene: &mut dyn SceneGraph,
        parent: Option<NodeHandle>,
        departments: Vec<DepartmentNode>,
    ) -> Self {
        let paths = Destination::ALL
            .iter()
            .map(|&destination| NavigationPath::build(scene, parent, destination))
            .collect();
        NavigationRig { paths, departments }
    }

    pub fn path(&self, destination: Destination) -> Option<&NavigationPath> {
        self.paths.iter().find(|path| path.destination == destination)
    }

    pub fn paths(&self) -> &[NavigationPath] {
        &self.paths
    }

    pub fn departments(&self) -> &[DepartmentNode] {
        &self.departments
    }

    /// Destination whose arrows are currently shown
    pub fn visible_destination(&self) -> Option<Destination> {
        self.paths
            .iter()
            .find(|path| path.is_visible())
            .map(|path| path.destination)
    }

    /// Hides every arrow and clears every department highlight
    pub fn hide_all(&mut self, scene: &mut dyn SceneGraph) {
        for path in &mut self.paths {
            path.set_visible(scene, false);
        }
        for department in &mut self.departments {
            department.highlighted = false;
            scene.set_emissive(department.node, None);
        }
    }

    /// Shows only the arrows to `destination` and highlights its department
    pub fn show_destination(&mut self, scene: &mut dyn SceneGraph, destination: Destination) {
        self.hide_all(scene);

        if let Some(path) = self
            .paths
            .iter_mut()
            .find(|path| path.destination == destination)
        {
            path.set_visible(scene, true);
        }
        if let Some(department) = self
            .departments
            .iter_mut()
            .find(|department| department.destination == destination)
        {
            department.highlighted = true;
            scene.set_emissive(department.node, Some(HIGHLIGHT));
        }
        info!(%destination, "showing navigation");
    }

    /// Like [`show_destination`](Self::show_destination) for a raw id.
    /// Unknown ids leave every path hidden.
    pub fn show_destination_id(
        &mut self,
        scene: &mut dyn SceneGraph,
        id: &str,
    ) -> Option<Destination> {
        match Destination::from_id(id) {
            Some(destination) => {
                self.show_destination(scene, destination);
                Some(destination)
            }
            None => {
                debug!(id, "unknown destination");
                self.hide_all(scene);
                None
            }
        }
    }

    /// Floats and pulses every visible arrow for the given clock time
    pub fn tick(&mut self, scene: &mut dyn SceneGraph, elapsed: f64) {
        for path in &mut self.paths {
            for marker in path.markers.iter_mut().filter(|marker| marker.visible) {
                let pose = MarkerPose::at(marker.base_height, marker.phase, elapsed);
                marker.pose = pose;
                scene.set_position(
                    marker.node,
                    [marker.waypoint[0], pose.height, marker.waypoint[2]],
                );
                scene.set_scale(marker.node, [pose.scale; 3]);
            }
        }
    }
}
