//! Server-controlled HUD elements keyed by numeric id.

use glam::{IVec2, Vec2, Vec3};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Kind of a HUD element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HudElementType {
    #[default]
    Image,
    Text,
    Statbar,
    Inventory,
    Waypoint,
}

/// One HUD element as described by the server.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HudElement {
    pub kind: HudElementType,
    /// Screen position as a fraction of the window.
    pub pos: Vec2,
    pub name: String,
    pub scale: Vec2,
    pub text: String,
    pub number: u32,
    /// Inventory slot, for statbars and inventory lists.
    pub item: u32,
    pub dir: u32,
    pub align: Vec2,
    /// Pixel offset from `pos`.
    pub offset: Vec2,
    /// Anchor of waypoints.
    pub world_pos: Vec3,
    pub size: IVec2,
}

/// A single-field update of a [`HudElement`].
#[derive(Clone, Debug, PartialEq)]
pub enum HudChange {
    Pos(Vec2),
    Name(String),
    Scale(Vec2),
    Text(String),
    Number(u32),
    Item(u32),
    Dir(u32),
    Align(Vec2),
    Offset(Vec2),
    WorldPos(Vec3),
    Size(IVec2),
}

impl HudChange {
    /// Writes this field into `element`.
    pub fn apply(self, element: &mut HudElement) {
        match self {
            Self::Pos(v) => element.pos = v,
            Self::Name(v) => element.name = v,
            Self::Scale(v) => element.scale = v,
            Self::Text(v) => element.text = v,
            Self::Number(v) => element.number = v,
            Self::Item(v) => element.item = v,
            Self::Dir(v) => element.dir = v,
            Self::Align(v) => element.align = v,
            Self::Offset(v) => element.offset = v,
            Self::WorldPos(v) => element.world_pos = v,
            Self::Size(v) => element.size = v,
        }
    }
}

/// Errors from HUD table operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HudError {
    #[error("HUD element {0} already exists")]
    DuplicateId(u32),
    #[error("no HUD element with id {0}")]
    UnknownId(u32),
}

/// Live HUD elements.
#[derive(Debug, Default)]
pub struct HudTable {
    elements: FxHashMap<u32, HudElement>,
}

impl HudTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `element` under `id`. An existing element is kept and the new
    /// one dropped.
    pub fn add(&mut self, id: u32, element: HudElement) -> Result<(), HudError> {
        if self.elements.contains_key(&id) {
            return Err(HudError::DuplicateId(id));
        }
        self.elements.insert(id, element);
        Ok(())
    }

    /// Removes the element with `id`.
    pub fn remove(&mut self, id: u32) -> Result<HudElement, HudError> {
        self.elements.remove(&id).ok_or(HudError::UnknownId(id))
    }

    /// Applies `change` to the element with `id`.
    pub fn change(&mut self, id: u32, change: HudChange) -> Result<(), HudError> {
        let element = self.elements.get_mut(&id).ok_or(HudError::UnknownId(id))?;
        change.apply(element);
        Ok(())
    }

    pub fn get(&self, id: u32) -> Option<&HudElement> {
        self.elements.get(&id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Drops every element.
    pub fn clear(&mut self) {
        self.elements.clear();
    }
}
