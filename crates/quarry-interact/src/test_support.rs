//! In-memory doubles shared by the unit tests.

use glam::{IVec3, Vec3};
use quarry_voxel::{ContentId, Groups, Node, NodeDef, NodeRegistry, Param2Type};
use rustc_hash::FxHashMap;

use crate::pointed::{ObjectId, PointedTarget};
use crate::ports::{ActiveObject, InteractionKind, NetworkSession, SelectionSink, StatusSink, WorldView};

/// Node world backed by a hash map. Every position inside `loaded` is
/// loaded; missing entries read as air.
pub struct TestWorld {
    pub nodes: FxHashMap<IVec3, Node>,
    pub objects: Vec<ActiveObject>,
    pub formspecs: FxHashMap<IVec3, String>,
    pub loaded: i32,
}

impl TestWorld {
    pub fn new() -> Self {
        Self {
            nodes: FxHashMap::default(),
            objects: Vec::new(),
            formspecs: FxHashMap::default(),
            loaded: 64,
        }
    }

    pub fn put(&mut self, pos: IVec3, content: ContentId) {
        self.nodes.insert(pos, Node::new(content));
    }

    pub fn content(&self, pos: IVec3) -> Option<ContentId> {
        self.node(pos).map(|n| n.content)
    }

    pub fn add_object(&mut self, id: ObjectId, position: Vec3) {
        self.objects.push(ActiveObject {
            id,
            position,
            selection_box: (Vec3::splat(-0.5), Vec3::splat(0.5)),
            pointable: true,
            armor_groups: [("fleshy".to_string(), 100)].into_iter().collect(),
        });
    }
}

impl WorldView for TestWorld {
    fn node(&self, pos: IVec3) -> Option<Node> {
        if pos.abs().max_element() > self.loaded {
            return None;
        }
        Some(self.nodes.get(&pos).copied().unwrap_or_default())
    }

    fn set_node(&mut self, pos: IVec3, node: Node) {
        self.nodes.insert(pos, node);
    }

    fn object(&self, id: ObjectId) -> Option<&ActiveObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    fn objects_near(&self, center: Vec3, radius: f32) -> Vec<&ActiveObject> {
        self.objects
            .iter()
            .filter(|o| o.position.distance(center) <= radius)
            .collect()
    }

    fn node_formspec(&self, pos: IVec3) -> Option<String> {
        self.formspecs.get(&pos).cloned()
    }
}

/// Records every interaction sent.
#[derive(Default)]
pub struct RecordingSession {
    pub sent: Vec<(InteractionKind, PointedTarget)>,
}

impl RecordingSession {
    pub fn kinds(&self) -> Vec<InteractionKind> {
        self.sent.iter().map(|(kind, _)| *kind).collect()
    }

    pub fn count(&self, kind: InteractionKind) -> usize {
        self.sent.iter().filter(|(k, _)| *k == kind).count()
    }
}

impl NetworkSession for RecordingSession {
    fn interact(&mut self, kind: InteractionKind, target: &PointedTarget) {
        self.sent.push((kind, *target));
    }
}

/// Records every status message shown.
#[derive(Default)]
pub struct RecordingStatus {
    pub shown: Vec<(String, f32)>,
}

impl RecordingStatus {
    pub fn last(&self) -> Option<&str> {
        self.shown.last().map(|(text, _)| text.as_str())
    }
}

impl StatusSink for RecordingStatus {
    fn show_status(&mut self, text: String, seconds: f32) {
        self.shown.push((text, seconds));
    }
}

/// Keeps the latest selection.
#[derive(Default)]
pub struct RecordingSelection {
    pub current: PointedTarget,
    pub updates: usize,
}

impl SelectionSink for RecordingSelection {
    fn set_selection(&mut self, target: &PointedTarget) {
        self.current = *target;
        self.updates += 1;
    }
}

/// Content ids of [`test_nodes`].
pub struct TestContent {
    pub stone: ContentId,
    pub water: ContentId,
    pub torch: ContentId,
    pub chest: ContentId,
    pub grass: ContentId,
    pub wool: ContentId,
    pub sign: ContentId,
    pub bedrock: ContentId,
}

/// A small node set covering every placement and dig rule.
pub fn test_nodes() -> (NodeRegistry, TestContent) {
    let mut registry = NodeRegistry::new();
    let mut reg = |def: NodeDef| registry.register(def).unwrap();

    let stone = reg(NodeDef::solid("default:stone").with_group("cracky", 3));
    let water = reg(NodeDef {
        walkable: false,
        pointable: false,
        liquid: true,
        buildable_to: true,
        ..NodeDef::solid("default:water_source")
    });
    let torch = reg(NodeDef {
        walkable: false,
        param_type_2: Param2Type::WallMounted,
        ..NodeDef::solid("default:torch")
            .with_group("dig_immediate", 3)
            .with_group("attached_node", 1)
    });
    let chest = reg(NodeDef {
        rightclickable: true,
        param_type_2: Param2Type::FaceDir,
        ..NodeDef::solid("default:chest").with_group("choppy", 2)
    });
    let grass = reg(NodeDef {
        walkable: false,
        buildable_to: true,
        groups: Groups::from_iter([("snappy".to_string(), 3)]),
        ..NodeDef::solid("default:grass")
    });
    let wool = reg(NodeDef {
        param_type_2: Param2Type::Color,
        ..NodeDef::solid("wool:white").with_group("snappy", 2)
    });
    let sign = reg(NodeDef {
        walkable: false,
        param_type_2: Param2Type::ColoredWallMounted,
        ..NodeDef::solid("default:sign").with_group("attached_node", 1)
    });
    let bedrock = reg(NodeDef::solid("default:bedrock"));

    (
        registry,
        TestContent {
            stone,
            water,
            torch,
            chest,
            grass,
            wool,
            sign,
            bedrock,
        },
    )
}
