//! Collaborator interfaces the interaction core consumes.
//!
//! Rendering, networking, privileges and settings persistence live outside
//! this crate; each is reached through one narrow trait here.

use std::collections::{HashSet, VecDeque};
use std::hash::BuildHasher;

use glam::{IVec3, Vec3};
use quarry_voxel::{CONTENT_AIR, Groups, Node};

use crate::events::ServerEvent;
use crate::pointed::{ObjectId, PointedTarget};

/// A dynamic object visible to the client.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveObject {
    /// Handle used in interactions.
    pub id: ObjectId,
    /// World position of the object's origin.
    pub position: Vec3,
    /// Selection box corners relative to `position`.
    pub selection_box: (Vec3, Vec3),
    /// Whether the pointing ray can stop on it.
    pub pointable: bool,
    /// Armor ratings in percent, used to predict punch damage.
    pub armor_groups: Groups,
}

impl ActiveObject {
    /// World-space selection box corners.
    pub fn world_box(&self) -> (Vec3, Vec3) {
        (
            self.position + self.selection_box.0,
            self.position + self.selection_box.1,
        )
    }
}

/// Frame-scoped view of the voxel and object world.
///
/// Edits made through this trait are local predictions; the server's
/// authoritative state may overwrite them at any time.
pub trait WorldView {
    /// Node at `pos`, or `None` when the area is not loaded.
    fn node(&self, pos: IVec3) -> Option<Node>;

    /// Replaces the node at `pos` locally.
    fn set_node(&mut self, pos: IVec3, node: Node);

    /// Removes the node at `pos` locally.
    fn remove_node(&mut self, pos: IVec3) {
        self.set_node(pos, Node::new(CONTENT_AIR));
    }

    /// Object with handle `id`, if still present.
    fn object(&self, id: ObjectId) -> Option<&ActiveObject>;

    /// Objects whose origin lies within `radius` of `center`.
    fn objects_near(&self, center: Vec3, radius: f32) -> Vec<&ActiveObject>;

    /// Form specification stored in the node metadata at `pos`.
    fn node_formspec(&self, _pos: IVec3) -> Option<String> {
        None
    }
}

/// Kinds of interaction reported to the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    /// Began digging a node.
    StartDig,
    /// Punched an object. Shares the wire code of [`Self::StartDig`].
    PunchObject,
    /// Released or moved away before the dig finished.
    StopDig,
    /// Dig timer ran out.
    FinishDig,
    /// Secondary action on a node or object.
    Place,
    /// Used the held item.
    Use,
    /// Secondary action with nothing pointed.
    ActivateNothing,
}

impl InteractionKind {
    /// Numeric action code sent on the wire.
    pub fn code(self) -> u8 {
        match self {
            Self::StartDig | Self::PunchObject => 0,
            Self::StopDig => 1,
            Self::FinishDig => 2,
            Self::Place => 3,
            Self::Use => 4,
            Self::ActivateNothing => 5,
        }
    }
}

/// Fire-and-forget interaction reports to the server.
pub trait NetworkSession {
    /// Reports an interaction with `target`.
    fn interact(&mut self, kind: InteractionKind, target: &PointedTarget);
}

/// Server-granted privileges of the local player.
pub trait Privileges {
    /// Returns `true` if the player holds privilege `name`.
    fn has_privilege(&self, name: &str) -> bool;
}

impl<S: BuildHasher> Privileges for HashSet<String, S> {
    fn has_privilege(&self, name: &str) -> bool {
        self.contains(name)
    }
}

/// Source of server events, drained once per frame.
pub trait EventQueue {
    /// Takes the next queued event. Ownership passes to the caller.
    fn pop(&mut self) -> Option<ServerEvent>;
}

impl EventQueue for VecDeque<ServerEvent> {
    fn pop(&mut self) -> Option<ServerEvent> {
        self.pop_front()
    }
}

impl EventQueue for crossbeam_channel::Receiver<ServerEvent> {
    fn pop(&mut self) -> Option<ServerEvent> {
        self.try_recv().ok()
    }
}

/// Transient on-screen status line.
pub trait StatusSink {
    /// Replaces the current status with `text` for `seconds`.
    fn show_status(&mut self, text: String, seconds: f32);
}

/// Highlight of the pointed node or object.
pub trait SelectionSink {
    /// Called every frame with the resolved target.
    fn set_selection(&mut self, target: &PointedTarget);
}
