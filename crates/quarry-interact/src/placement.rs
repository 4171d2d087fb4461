//! Optimistic node placement.
//!
//! When an item declares a prediction node, the client places that node
//! locally right away instead of waiting for the server. The server's answer
//! later confirms or overwrites it; nothing here rolls back.

use glam::{IVec3, Vec3};
use quarry_voxel::{ContentId, ItemDef, ItemStack, Node, NodeRegistry, Param2Type};
use thiserror::Error;
use tracing::{debug, error};

use crate::ports::WorldView;

/// Support offsets indexed by wall-mount code.
const WALLMOUNTED_DIRS: [IVec3; 6] = [
    IVec3::new(0, 1, 0),
    IVec3::new(0, -1, 0),
    IVec3::new(1, 0, 0),
    IVec3::new(-1, 0, 0),
    IVec3::new(0, 0, 1),
    IVec3::new(0, 0, -1),
];

/// The column of nodes the local player occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerBody {
    /// Node containing the player's feet.
    pub feet: IVec3,
    /// Height of the hitbox in nodes.
    pub height: u8,
}

impl PlayerBody {
    /// Body standing at world `position` (the feet point).
    pub fn at(position: Vec3, height: u8) -> Self {
        Self {
            feet: position.floor().as_ivec3(),
            height,
        }
    }

    /// Returns `true` if the body overlaps node `pos`.
    pub fn occupies(&self, pos: IVec3) -> bool {
        pos.x == self.feet.x
            && pos.z == self.feet.z
            && pos.y >= self.feet.y
            && pos.y < self.feet.y + i32::from(self.height)
    }
}

/// Settings that let players build inside themselves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlacementOverrides {
    /// `enable_build_where_you_stand` is set.
    pub build_where_you_stand: bool,
    /// `noclip` is set and the player has the `noclip` privilege.
    pub noclip: bool,
}

/// A placement applied ahead of server confirmation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PredictedPlacement {
    /// Where the node goes.
    pub pos: IVec3,
    /// What goes there.
    pub content: ContentId,
    /// Orientation and color byte.
    pub param2: u8,
    /// Palette index folded into `param2`, if any.
    pub color: Option<u8>,
}

/// Why a prediction was declined. Declining is normal; the server still
/// decides what happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementRefusal {
    /// The item places nothing predictable.
    #[error("item has no placement prediction")]
    NoPrediction,
    /// The pointed node reacts to right-clicks itself.
    #[error("pointed node handles right-clicks")]
    RightClickable,
    /// A needed node is not loaded.
    #[error("position {0} is not loaded")]
    NotLoaded(IVec3),
    /// Neither the pointed node nor its neighbor can be built into.
    #[error("no buildable position next to {0}")]
    NotBuildable(IVec3),
    /// The prediction names a node this client does not know.
    #[error("unknown prediction node {0:?}")]
    UnknownNode(String),
    /// An attached node would have nothing to hang on.
    #[error("attached node has no walkable support at {0}")]
    Unsupported(IVec3),
    /// The node would be placed inside the player.
    #[error("placement at {0} would enclose the player")]
    InsidePlayer(IVec3),
}

/// Computes and applies placement predictions.
pub struct PlacementPredictor<'a> {
    nodes: &'a NodeRegistry,
}

impl<'a> PlacementPredictor<'a> {
    /// Creates a predictor reading node properties from `nodes`.
    pub fn new(nodes: &'a NodeRegistry) -> Self {
        Self { nodes }
    }

    /// Works out the placement for `item` used on `under` from the `above` side.
    pub fn predict(
        &self,
        item: &ItemDef,
        stack: &ItemStack,
        under: IVec3,
        above: IVec3,
        player: &PlayerBody,
        overrides: PlacementOverrides,
        world: &dyn WorldView,
    ) -> Result<PredictedPlacement, PlacementRefusal> {
        let Some(prediction) = item
            .node_placement_prediction
            .as_deref()
            .filter(|name| !name.is_empty())
        else {
            return Err(PlacementRefusal::NoPrediction);
        };

        let under_node = world.node(under).ok_or(PlacementRefusal::NotLoaded(under))?;
        let under_def = self.nodes.get(under_node.content);
        if under_def.rightclickable {
            return Err(PlacementRefusal::RightClickable);
        }
        debug!(item = %item.name, node = prediction, "Node placement prediction");

        // Build into the pointed node itself when it allows it.
        let pos = if under_def.buildable_to {
            under
        } else {
            let above_node = world.node(above).ok_or(PlacementRefusal::NotLoaded(above))?;
            if !self.nodes.get(above_node.content).buildable_to {
                return Err(PlacementRefusal::NotBuildable(under));
            }
            above
        };

        let content = self
            .nodes
            .id_by_name(prediction)
            .ok_or_else(|| PlacementRefusal::UnknownNode(prediction.to_string()))?;
        let def = self.nodes.get(content);
        let param_type = def.param_type_2;

        let mut param2 = 0u8;
        if param_type.is_wallmounted() {
            param2 = wallmounted_code(under - above);
        }
        if param_type.is_facedir() {
            param2 = facedir_code(under - player.feet);
        }

        if def.is_attached() {
            let support = if param_type.is_wallmounted() {
                pos + WALLMOUNTED_DIRS[usize::from(param2)]
            } else {
                pos + IVec3::NEG_Y
            };
            let walkable = world
                .node(support)
                .is_some_and(|n| self.nodes.get(n.content).walkable);
            if !walkable {
                return Err(PlacementRefusal::Unsupported(support));
            }
        }

        let color = stack.palette_index().filter(|_| {
            matches!(
                param_type,
                Param2Type::Color
                    | Param2Type::ColoredWallMounted
                    | Param2Type::ColoredFaceDir
            )
        });
        if let Some(index) = color {
            param2 = param_type.with_palette_index(param2, index);
        }

        let overridden = overrides.build_where_you_stand || overrides.noclip;
        if def.walkable && !overridden && player.occupies(pos) {
            return Err(PlacementRefusal::InsidePlayer(pos));
        }

        Ok(PredictedPlacement {
            pos,
            content,
            param2,
            color,
        })
    }

    /// Predicts and, on success, writes the node into `world`.
    ///
    /// Returns the applied placement, or `None` when declined.
    pub fn try_place(
        &self,
        item: &ItemDef,
        stack: &ItemStack,
        under: IVec3,
        above: IVec3,
        player: &PlayerBody,
        overrides: PlacementOverrides,
        world: &mut dyn WorldView,
    ) -> Option<PredictedPlacement> {
        match self.predict(item, stack, under, above, player, overrides, world) {
            Ok(placement) => {
                world.set_node(
                    placement.pos,
                    Node::with_param2(placement.content, placement.param2),
                );
                debug!(pos = ?placement.pos, param2 = placement.param2, "Placed predicted node");
                Some(placement)
            }
            Err(PlacementRefusal::UnknownNode(name)) => {
                error!(item = %item.name, node = %name, "Node placement prediction failed: name not known");
                None
            }
            Err(refusal) => {
                debug!(item = %item.name, %refusal, "Placement not predicted");
                None
            }
        }
    }
}

/// Six-way mount code from `under - above`: 0/1 ceiling/floor, 2/3 ±X, 4/5 ±Z.
fn wallmounted_code(dir: IVec3) -> u8 {
    if dir.y.abs() > dir.x.abs().max(dir.z.abs()) {
        if dir.y < 0 { 1 } else { 0 }
    } else if dir.x.abs() > dir.z.abs() {
        if dir.x < 0 { 3 } else { 2 }
    } else if dir.z < 0 {
        5
    } else {
        4
    }
}

/// Four-way facing code from the node relative to the player's feet.
fn facedir_code(dir: IVec3) -> u8 {
    if dir.x.abs() > dir.z.abs() {
        if dir.x < 0 { 3 } else { 1 }
    } else if dir.z < 0 {
        2
    } else {
        0
    }
}
