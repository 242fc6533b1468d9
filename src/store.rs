use crate::navigation::{DepartmentNode, Destination, NavigationRig};
use crate::scene::{Label, NodeDesc, NodeHandle, SceneGraph, Shape};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_8, PI};
use tracing::info;

const STORE_SIZE: f64 = 12.0;
const WALL_HEIGHT: f64 = 3.0;
const SIGN_HEIGHT: f64 = 2.5;

const BRAND_RED: u32 = 0xe60000;
const BRAND_BLUE: u32 = 0x003da5;
const WALL_COLOR: u32 = 0xf0f0f0;
const FLOOR_COLOR: u32 = 0xf5f5f5;
const GRID_COLOR: u32 = 0xcccccc;
const SHELF_COLOR: u32 = 0x999999;
const ISLAND_COLOR: u32 = 0xaaaaaa;
const PRODUCT_COLORS: [u32; 6] = [0xff0000, 0x00ff00, 0x0000ff, 0xffff00, 0xff00ff, 0x00ffff];

/// Department volumes: destination, footprint (w, h, d), centre and color
const DEPARTMENTS: [(Destination, [f64; 3], [f64; 3], u32); 3] = [
    (Destination::Checkout, [3.0, 1.0, 1.5], [-4.0, 0.5, -4.0], BRAND_RED),
    (Destination::Offers, [4.0, 1.2, 2.0], [3.0, 0.6, -3.0], BRAND_BLUE),
    (Destination::Sausage, [3.0, 1.0, 2.0], [0.0, 0.5, 3.0], BRAND_RED),
];

/// The static store scene plus its navigation arrows
#[derive(Debug)]
pub struct StoreLayout {
    /// Root of the store geometry, hidden until placed
    pub root: NodeHandle,
    pub navigation: NavigationRig,
}

impl StoreLayout {
    /// Builds the store and the navigation arrows under `anchor`
    pub fn build(scene: &mut dyn SceneGraph, anchor: Option<NodeHandle>) -> Self {
        let root = scene.add_node(anchor, NodeDesc::group("store").hidden());

        add_floor(scene, root);
        add_walls(scene, root);
        let departments = add_departments(scene, root);
        add_shelves(scene, root);
        add_products(scene, root);
        add_entrance(scene, root);
        add_branding(scene, root);

        // Arrows hang off the anchor so they can be toggled independently of the store
        let navigation = NavigationRig::build(scene, anchor, departments);
        info!(paths = navigation.paths().len(), "store layout built");

        StoreLayout { root, navigation }
    }
}

fn add_floor(scene: &mut dyn SceneGraph, root: NodeHandle) {
    scene.add_node(
        Some(root),
        NodeDesc::new(
            "floor",
            Shape::Plane {
                width: STORE_SIZE,
                height: STORE_SIZE,
            },
        )
        .color(FLOOR_COLOR)
        .at([0.0, -0.01, 0.0])
        .rotated([FRAC_PI_2, 0.0, 0.0]),
    );
    scene.add_node(
        Some(root),
        NodeDesc::new(
            "floor-grid",
            Shape::Grid {
                size: STORE_SIZE,
                divisions: 12,
            },
        )
        .color(GRID_COLOR)
        .at([0.0, 0.01, 0.0]),
    );
}

fn add_walls(scene: &mut dyn SceneGraph, root: NodeHandle) {
    let half = STORE_SIZE / 2.0;
    let y = WALL_HEIGHT / 2.0;
    let full = Shape::Plane {
        width: STORE_SIZE,
        height: WALL_HEIGHT,
    };
    // Front wall leaves a gap for the entrance
    let front = Shape::Plane {
        width: 4.0,
        height: WALL_HEIGHT,
    };
    let walls = [
        ("back-wall", full, [0.0, y, -half], 0.0),
        ("left-wall", full, [-half, y, 0.0], FRAC_PI_2),
        ("right-wall", full, [half, y, 0.0], -FRAC_PI_2),
        ("front-wall-left", front, [-4.0, y, half], PI),
        ("front-wall-right", front, [4.0, y, half], PI),
    ];
    for (name, shape, position, yaw) in walls {
        scene.add_node(
            Some(root),
            NodeDesc::new(name, shape)
                .color(WALL_COLOR)
                .at(position)
                .rotated([0.0, yaw, 0.0]),
        );
    }

    scene.add_node(
        Some(root),
        NodeDesc::new(
            "wall-logo",
            Shape::Plane {
                width: 2.0,
                height: 2.0,
            },
        )
        .color(BRAND_RED)
        .at([0.0, 2.0, -half + 0.05])
        .labelled(Label::Text("HEMA")),
    );
}

fn add_departments(scene: &mut dyn SceneGraph, root: NodeHandle) -> Vec<DepartmentNode> {
    DEPARTMENTS
        .iter()
        .map(|&(destination, [width, height, depth], position, color)| {
            let node = scene.add_node(
                Some(root),
                NodeDesc::new(
                    "department",
                    Shape::Cuboid {
                        width,
                        height,
                        depth,
                    },
                )
                .color(color)
                .at(position),
            );
            scene.add_node(
                Some(node),
                NodeDesc::new(
                    "department-label",
                    Shape::Plane {
                        width: 3.0,
                        height: 0.75,
                    },
                )
                .color(0xffffff)
                .opacity(0.0)
                .at([0.0, 1.5, 0.0])
                .rotated([-FRAC_PI_8, 0.0, 0.0])
                .labelled(Label::Key(destination.id())),
            );
            DepartmentNode {
                destination,
                node,
                highlighted: false,
            }
        })
        .collect()
}

/// Wall shelf x positions along the back wall, skipping the logo
fn back_shelf_columns() -> impl Iterator<Item = f64> {
    (-5..=5)
        .step_by(2)
        .filter(|x: &i32| x.abs() > 1)
        .map(f64::from)
}

fn add_shelves(scene: &mut dyn SceneGraph, root: NodeHandle) {
    let shelf = Shape::Cuboid {
        width: 1.5,
        height: 1.8,
        depth: 0.8,
    };
    for x in back_shelf_columns() {
        scene.add_node(
            Some(root),
            NodeDesc::new("shelf", shelf)
                .color(SHELF_COLOR)
                .at([x, 0.9, -5.5]),
        );
    }
    for z in (-4..=4).step_by(2).map(f64::from) {
        for x in [-5.5, 5.5] {
            scene.add_node(
                Some(root),
                NodeDesc::new("shelf", shelf)
                    .color(SHELF_COLOR)
                    .at([x, 0.9, z])
                    .rotated([0.0, FRAC_PI_2, 0.0]),
            );
        }
    }
    scene.add_node(
        Some(root),
        NodeDesc::new(
            "island",
            Shape::Cuboid {
                width: 5.0,
                height: 1.2,
                depth: 2.0,
            },
        )
        .color(ISLAND_COLOR)
        .at([0.0, 0.6, 0.0]),
    );
}

fn add_products(scene: &mut dyn SceneGraph, root: NodeHandle) {
    let mut colors = PRODUCT_COLORS.iter().cycle();

    // Island display, 5 x 3 grid
    for column in 0..5 {
        for row in 0..3 {
            let color = colors.next().copied().unwrap_or(PRODUCT_COLORS[0]);
            scene.add_node(
                Some(root),
                NodeDesc::new(
                    "product",
                    Shape::Cuboid {
                        width: 0.5,
                        height: 0.3,
                        depth: 0.4,
                    },
                )
                .color(color)
                .at([-1.5 + column as f64 * 0.75, 1.35, -0.5 + row as f64 * 0.5]),
            );
        }
    }

    for x in back_shelf_columns() {
        for i in 0..3 {
            let color = colors.next().copied().unwrap_or(PRODUCT_COLORS[0]);
            scene.add_node(
                Some(root),
                NodeDesc::new(
                    "product",
                    Shape::Cuboid {
                        width: 0.3,
                        height: 0.3,
                        depth: 0.3,
                    },
                )
                .color(color)
                .at([x + i as f64 * 0.4 - 0.4, 1.9, -5.3]),
            );
        }
    }
}

fn add_entrance(scene: &mut dyn SceneGraph, root: NodeHandle) {
    scene.add_node(
        Some(root),
        NodeDesc::new(
            "entrance-sign",
            Shape::Plane {
                width: 3.0,
                height: 0.8,
            },
        )
        .color(BRAND_RED)
        .at([0.0, SIGN_HEIGHT, 5.9])
        .rotated([0.0, PI, 0.0])
        .labelled(Label::Key("entrance")),
    );
    scene.add_node(
        Some(root),
        NodeDesc::new(
            "entrance-marker",
            Shape::Plane {
                width: 4.0,
                height: 1.0,
            },
        )
        .color(BRAND_RED)
        .opacity(0.7)
        .at([0.0, 0.02, 5.5])
        .rotated([FRAC_PI_2, 0.0, 0.0]),
    );
}

fn add_branding(scene: &mut dyn SceneGraph, root: NodeHandle) {
    scene.add_node(
        Some(root),
        NodeDesc::new(
            "ceiling-sign",
            Shape::Plane {
                width: 3.0,
                height: 1.0,
            },
        )
        .color(BRAND_RED)
        .at([0.0, SIGN_HEIGHT, 0.0])
        .labelled(Label::Text("HEMA")),
    );
    for (destination, _, [x, _, z], _) in DEPARTMENTS {
        scene.add_node(
            Some(root),
            NodeDesc::new(
                "department-sign",
                Shape::Plane {
                    width: 2.5,
                    height: 0.8,
                },
            )
            .color(BRAND_BLUE)
            .at([x, SIGN_HEIGHT, z])
            .labelled(Label::Key(destination.id())),
        );
    }
    scene.add_node(
        Some(root),
        NodeDesc::new(
            "floor-decal",
            Shape::Plane {
                width: 3.0,
                height: 3.0,
            },
        )
        .color(BRAND_RED)
        .opacity(0.7)
        .at([0.0, 0.03, 0.0])
        .rotated([FRAC_PI_2, 0.0, 0.0]),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;

    #[test]
    fn store_starts_hidden_with_every_prop() {
        let mut scene = Scene::new();
        let store = StoreLayout::build(&mut scene, None);

        assert!(!scene.is_effectively_visible(store.root));
        let count = |name: &str| scene.nodes().filter(|(_, n)| n.desc.name == name).count();
        assert_eq!(count("shelf"), 4 + 10);
        assert_eq!(count("product"), 15 + 12);
        assert_eq!(count("department"), 3);
        assert_eq!(count("department-sign"), 3);
        assert_eq!(count("arrow"), 5 + 4 + 4);
    }

    #[test]
    fn departments_line_up_with_path_ends() {
        let mut scene = Scene::new();
        let store = StoreLayout::build(&mut scene, None);
        for department in store.navigation.departments() {
            let centre = scene.node(department.node).unwrap().desc.position;
            let end = *department.destination.waypoints().last().unwrap();
            let distance = ((centre[0] - end[0]).powi(2) + (centre[2] - end[2]).powi(2)).sqrt();
            assert!(
                distance < 1.0,
                "{} ends {distance} from its department",
                department.destination
            );
        }
    }

    #[test]
    fn arrows_do_not_hang_off_the_store_root() {
        let mut scene = Scene::new();
        let store = StoreLayout::build(&mut scene, None);
        scene.set_visible(store.root, true);
        let path = store.navigation.path(Destination::Checkout).unwrap();
        assert!(!scene.is_effectively_visible(path.markers[0].node));
    }
}
