//! In-memory world and server link used by the headless client.

use glam::{IVec3, Vec3};
use quarry_interact::{ActiveObject, InteractionKind, NetworkSession, ObjectId, PointedTarget, WorldView};
use quarry_voxel::{CONTENT_AIR, ContentId, Groups, Node, NodeDef, NodeRegistry};
use rustc_hash::FxHashMap;
use tracing::debug;

/// Nodes farther than this from the origin on any axis are not loaded.
const LOADED_RADIUS: i32 = 48;

/// Half the side of the generated floor.
const FLOOR_RADIUS: i32 = 16;

pub struct Content {
    pub stone: ContentId,
    pub chest: ContentId,
}

/// Registers the node types the scripted session uses.
pub fn register_nodes(nodes: &mut NodeRegistry) -> Result<Content, quarry_voxel::RegistryError> {
    let stone = nodes.register(NodeDef::solid("default:stone").with_group("cracky", 3))?;
    let chest = nodes.register(NodeDef {
        rightclickable: true,
        ..NodeDef::solid("default:chest").with_group("choppy", 2)
    })?;
    Ok(Content { stone, chest })
}

/// Sparse voxel store. Unset nodes inside the loaded area are air.
pub struct MemoryWorld {
    nodes: FxHashMap<IVec3, Node>,
    formspecs: FxHashMap<IVec3, String>,
    objects: Vec<ActiveObject>,
}

impl MemoryWorld {
    /// A two-node-thick stone floor with its top at y = 0, one chest and one
    /// wandering object.
    pub fn flat(content: &Content) -> Self {
        let mut nodes = FxHashMap::default();
        for x in -FLOOR_RADIUS..FLOOR_RADIUS {
            for z in -FLOOR_RADIUS..FLOOR_RADIUS {
                nodes.insert(IVec3::new(x, 0, z), Node::new(content.stone));
                nodes.insert(IVec3::new(x, -1, z), Node::new(content.stone));
            }
        }

        let chest = IVec3::new(4, 1, 0);
        nodes.insert(chest, Node::new(content.chest));
        let mut formspecs = FxHashMap::default();
        formspecs.insert(chest, "size[8,9]list[context;main;0,0;8,4;]".to_string());

        let objects = vec![ActiveObject {
            id: 1,
            position: Vec3::new(-3.5, 1.0, 2.5),
            selection_box: (Vec3::new(-0.4, 0.0, -0.4), Vec3::new(0.4, 0.9, 0.4)),
            pointable: true,
            armor_groups: Groups::from_iter([("fleshy".to_string(), 100)]),
        }];

        Self {
            nodes,
            formspecs,
            objects,
        }
    }

    /// Count of non-air nodes.
    pub fn solid_count(&self) -> usize {
        self.nodes.values().filter(|n| n.content != CONTENT_AIR).count()
    }
}

impl WorldView for MemoryWorld {
    fn node(&self, pos: IVec3) -> Option<Node> {
        if pos.abs().max_element() > LOADED_RADIUS {
            return None;
        }
        Some(self.nodes.get(&pos).copied().unwrap_or(Node::air()))
    }

    fn set_node(&mut self, pos: IVec3, node: Node) {
        debug!(?pos, content = node.content.0, "Local node edit");
        if node.content == CONTENT_AIR {
            self.nodes.remove(&pos);
            self.formspecs.remove(&pos);
        } else {
            self.nodes.insert(pos, node);
        }
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

/// Stand-in for the network connection: logs and counts interactions.
#[derive(Default)]
pub struct ServerLink {
    sent: FxHashMap<InteractionKind, u32>,
}

impl ServerLink {
    pub fn sent(&self, kind: InteractionKind) -> u32 {
        self.sent.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.sent.values().sum()
    }
}

impl NetworkSession for ServerLink {
    fn interact(&mut self, kind: InteractionKind, target: &PointedTarget) {
        debug!(?kind, code = kind.code(), ?target, "Sending interact");
        *self.sent.entry(kind).or_insert(0) += 1;
    }
}
