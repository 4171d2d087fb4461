//! Per-voxel node data.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Compact content identifier stored in every node (2 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentId(pub u16);

/// Empty space. Always registered first so zeroed memory reads as air.
pub const CONTENT_AIR: ContentId = ContentId(0);

/// Placeholder for nodes in unloaded areas.
pub const CONTENT_IGNORE: ContentId = ContentId(u16::MAX);

/// Group memberships (`"cracky" => 3`, `"attached_node" => 1`, ...).
pub type Groups = FxHashMap<String, i32>;

/// Rating of `name` in `groups`, 0 when absent.
pub fn group_rating(groups: &Groups, name: &str) -> i32 {
    groups.get(name).copied().unwrap_or(0)
}

/// How a node definition interprets [`Node::param2`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Param2Type {
    /// param2 carries nothing the client cares about.
    #[default]
    None,
    /// Six-direction mount code in the low 3 bits.
    WallMounted,
    /// Four-direction facing code in the low 5 bits.
    FaceDir,
    /// Whole byte is a palette index.
    Color,
    /// Mount code in the low 3 bits, palette index in the high 5.
    ColoredWallMounted,
    /// Facing code in the low 5 bits, palette index in the high 3.
    ColoredFaceDir,
}

impl Param2Type {
    /// Returns `true` for the six-direction mounted variants.
    pub fn is_wallmounted(self) -> bool {
        matches!(self, Self::WallMounted | Self::ColoredWallMounted)
    }

    /// Returns `true` for the four-direction facing variants.
    pub fn is_facedir(self) -> bool {
        matches!(self, Self::FaceDir | Self::ColoredFaceDir)
    }

    /// Folds a palette index into an existing `param2`.
    ///
    /// Returns `param2` unchanged for types without color.
    pub fn with_palette_index(self, param2: u8, index: u8) -> u8 {
        match self {
            Self::Color => index,
            Self::ColoredWallMounted => (index & 0xf8) | (param2 & 0x07),
            Self::ColoredFaceDir => (index & 0xe0) | (param2 & 0x1f),
            _ => param2,
        }
    }
}

/// A single voxel: content plus two auxiliary bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    /// What material fills the voxel.
    pub content: ContentId,
    /// Light storage, unused by interaction code.
    pub param1: u8,
    /// Orientation and/or color, see [`Param2Type`].
    pub param2: u8,
}

impl Node {
    /// A node of `content` with zeroed parameters.
    pub const fn new(content: ContentId) -> Self {
        Self {
            content,
            param1: 0,
            param2: 0,
        }
    }

    /// A node of `content` with the given `param2`.
    pub const fn with_param2(content: ContentId, param2: u8) -> Self {
        Self {
            content,
            param1: 0,
            param2,
        }
    }

    /// An air node.
    pub const fn air() -> Self {
        Self::new(CONTENT_AIR)
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::air()
    }
}
