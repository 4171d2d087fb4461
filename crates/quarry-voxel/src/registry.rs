//! Node definition registry: maps compact [`ContentId`] values to [`NodeDef`]
//! metadata.
//!
//! Built once when the server's definitions arrive. Air is always id 0.
//! Lookups never fail: unknown ids resolve to a shared "unknown" definition
//! that is solid and pointable, so a half-synced world still behaves.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::node::{CONTENT_AIR, ContentId, Groups, Param2Type, group_rating};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Everything the interaction code needs to know about a node type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
    /// Registered name (e.g. "default:stone").
    pub name: String,
    /// Whether players collide with it.
    pub walkable: bool,
    /// Whether the pointing ray can stop on it.
    pub pointable: bool,
    /// Liquids are only pointable with items that allow it.
    pub liquid: bool,
    /// Placing into this node replaces it (air, tall grass).
    pub buildable_to: bool,
    /// Has a server-side right-click handler.
    pub rightclickable: bool,
    /// Meaning of `param2`.
    pub param_type_2: Param2Type,
    /// Group memberships used for digging and attachment.
    pub groups: Groups,
}

impl NodeDef {
    /// A solid, pointable, diggable-by-nothing block named `name`.
    pub fn solid(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            walkable: true,
            pointable: true,
            liquid: false,
            buildable_to: false,
            rightclickable: false,
            param_type_2: Param2Type::None,
            groups: Groups::default(),
        }
    }

    /// Adds a group rating.
    pub fn with_group(mut self, name: &str, rating: i32) -> Self {
        self.groups.insert(name.to_string(), rating);
        self
    }

    /// Returns `true` if the node must rest on a walkable neighbor.
    pub fn is_attached(&self) -> bool {
        group_rating(&self.groups, "attached_node") != 0
    }

    fn air() -> Self {
        Self {
            name: "air".to_string(),
            walkable: false,
            pointable: false,
            liquid: false,
            buildable_to: true,
            rightclickable: false,
            param_type_2: Param2Type::None,
            groups: Groups::default(),
        }
    }

    fn unknown() -> Self {
        Self::solid("unknown")
    }
}

/// Errors that can occur during registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A definition with the same name has already been registered.
    #[error("duplicate definition name: {0}")]
    DuplicateName(String),
    /// Every content id has been assigned.
    #[error("node registry is full (max {} types)", u16::MAX)]
    RegistryFull,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Maps [`ContentId`] → [`NodeDef`] with O(1) lookup both ways.
pub struct NodeRegistry {
    /// Dense array where `index == ContentId.0`.
    defs: Vec<NodeDef>,
    name_to_id: FxHashMap<String, ContentId>,
    unknown: NodeDef,
}

impl NodeRegistry {
    /// Creates a registry with air pre-registered as id 0.
    pub fn new() -> Self {
        let mut name_to_id = FxHashMap::default();
        name_to_id.insert("air".to_string(), CONTENT_AIR);
        Self {
            defs: vec![NodeDef::air()],
            name_to_id,
            unknown: NodeDef::unknown(),
        }
    }

    /// Registers a definition and returns its id.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateName`] if the name is taken,
    /// [`RegistryError::RegistryFull`] once `CONTENT_IGNORE` would be reached.
    pub fn register(&mut self, def: NodeDef) -> Result<ContentId, RegistryError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(RegistryError::DuplicateName(def.name));
        }
        if self.defs.len() >= u16::MAX as usize {
            return Err(RegistryError::RegistryFull);
        }

        let id = ContentId(self.defs.len() as u16);
        tracing::debug!(name = %def.name, id = id.0, "Registered node");
        self.name_to_id.insert(def.name.clone(), id);
        self.defs.push(def);
        Ok(id)
    }

    /// Definition for `id`, or the unknown-node definition.
    pub fn get(&self, id: ContentId) -> &NodeDef {
        self.defs.get(id.0 as usize).unwrap_or(&self.unknown)
    }

    /// Id of a named node, if registered.
    pub fn id_by_name(&self, name: &str) -> Option<ContentId> {
        self.name_to_id.get(name).copied()
    }

    /// Number of registered definitions, air included.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Returns `true` if only air is registered.
    pub fn is_empty(&self) -> bool {
        self.defs.len() <= 1
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
