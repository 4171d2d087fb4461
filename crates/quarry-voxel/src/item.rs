//! Item definitions, stacks, and the item registry.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::node::Groups;
use crate::registry::RegistryError;
use crate::tool::{ToolCapabilities, ToolGroupCap};

/// Definition of a wieldable item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    /// Registered name. The empty name is the bare hand.
    pub name: String,
    /// Pointing reach in nodes. `None` defers to the hand.
    pub range: Option<f32>,
    /// Whether the pointing ray stops on liquids.
    pub liquids_pointable: bool,
    /// Has a server-side use handler triggered by the primary button.
    pub usable: bool,
    /// Node the client places optimistically on secondary click.
    pub node_placement_prediction: Option<String>,
    /// Digging and punching abilities. `None` defers to the hand.
    pub tool_capabilities: Option<ToolCapabilities>,
    /// Group memberships (`nohit`, ...).
    pub groups: Groups,
}

impl ItemDef {
    /// A plain item with no special abilities.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            range: None,
            liquids_pointable: false,
            usable: false,
            node_placement_prediction: None,
            tool_capabilities: None,
            groups: Groups::default(),
        }
    }

    /// An item that places `node` when used on a surface.
    pub fn placing(name: impl Into<String>, node: impl Into<String>) -> Self {
        Self {
            node_placement_prediction: Some(node.into()),
            ..Self::new(name)
        }
    }

    /// The default bare hand: short reach, digs soft groups slowly.
    pub fn hand() -> Self {
        let soft = ToolGroupCap {
            times: BTreeMap::from([(1, 3.0), (2, 2.0), (3, 0.7)]),
            uses: 0,
            max_level: 1,
        };
        Self {
            range: Some(4.0),
            tool_capabilities: Some(
                ToolCapabilities {
                    full_punch_interval: 0.9,
                    max_drop_level: 0,
                    ..ToolCapabilities::default()
                }
                .with_group_cap("crumbly", soft.clone())
                .with_group_cap("snappy", soft)
                .with_group_cap(
                    "oddly_breakable_by_hand",
                    ToolGroupCap {
                        times: BTreeMap::from([(1, 3.5), (2, 2.0), (3, 0.7)]),
                        uses: 0,
                        max_level: 3,
                    },
                )
                .with_damage("fleshy", 1),
            ),
            ..Self::new("")
        }
    }
}

/// A stack of items held in an inventory slot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Item name. Empty for an empty slot.
    pub name: String,
    /// Number of items.
    pub count: u16,
    /// Free-form string metadata.
    pub metadata: BTreeMap<String, String>,
}

impl ItemStack {
    /// A stack of `count` items named `name`.
    pub fn new(name: impl Into<String>, count: u16) -> Self {
        Self {
            name: name.into(),
            count,
            metadata: BTreeMap::new(),
        }
    }

    /// Returns `true` for an empty slot.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() || self.count == 0
    }

    /// Palette index stored under `palette_index`, truncated to its low byte.
    pub fn palette_index(&self) -> Option<u8> {
        let raw = self.metadata.get("palette_index")?;
        let value: i32 = raw.trim().parse().ok()?;
        Some(value as u8)
    }
}

/// Name → [`ItemDef`] table with the bare hand always present.
pub struct ItemRegistry {
    items: FxHashMap<String, ItemDef>,
    unknown: ItemDef,
}

impl ItemRegistry {
    /// Registry containing only the default hand.
    pub fn new() -> Self {
        Self::with_hand(ItemDef::hand())
    }

    /// Registry with a custom hand definition. Its name is forced to empty.
    pub fn with_hand(mut hand: ItemDef) -> Self {
        hand.name.clear();
        let mut items = FxHashMap::default();
        items.insert(String::new(), hand);
        Self {
            items,
            unknown: ItemDef::new("unknown"),
        }
    }

    /// Adds an item definition.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateName`] if the name is taken.
    pub fn register(&mut self, def: ItemDef) -> Result<(), RegistryError> {
        if self.items.contains_key(&def.name) {
            return Err(RegistryError::DuplicateName(def.name));
        }
        self.items.insert(def.name.clone(), def);
        Ok(())
    }

    /// Definition for `name`, or a plain "unknown" item.
    pub fn get(&self, name: &str) -> &ItemDef {
        self.items.get(name).unwrap_or(&self.unknown)
    }

    /// The bare hand.
    pub fn hand(&self) -> &ItemDef {
        self.get("")
    }

    /// Capabilities of `stack`'s item, else the hand's, else the defaults.
    pub fn tool_capabilities(&self, stack: &ItemStack) -> ToolCapabilities {
        self.get(&stack.name)
            .tool_capabilities
            .clone()
            .or_else(|| self.hand().tool_capabilities.clone())
            .unwrap_or_default()
    }

    /// Number of registered items, hand included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always `false`: the hand is always registered.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for ItemRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_index_parsing() {
        let mut stack = ItemStack::new("dye:wool", 1);
        assert_eq!(stack.palette_index(), None);

        stack.metadata.insert("palette_index".into(), "42".into());
        assert_eq!(stack.palette_index(), Some(42));

        stack.metadata.insert("palette_index".into(), "255".into());
        assert_eq!(stack.palette_index(), Some(255));

        stack.metadata.insert("palette_index".into(), "red".into());
        assert_eq!(stack.palette_index(), None);
    }

    #[test]
    fn test_palette_index_keeps_low_byte() {
        let mut stack = ItemStack::new("dye:wool", 1);
        stack.metadata.insert("palette_index".into(), "300".into());
        assert_eq!(stack.palette_index(), Some(44));

        stack.metadata.insert("palette_index".into(), "-1".into());
        assert_eq!(stack.palette_index(), Some(255));
    }

    #[test]
    fn test_hand_always_registered() {
        let registry = ItemRegistry::new();
        assert_eq!(registry.hand().name, "");
        assert_eq!(registry.hand().range, Some(4.0));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_item_falls_back() {
        let registry = ItemRegistry::new();
        assert_eq!(registry.get("mod:missing").name, "unknown");
    }

    #[test]
    fn test_tool_capabilities_default_to_hand() {
        let mut registry = ItemRegistry::new();
        registry.register(ItemDef::placing("default:torch", "default:torch")).unwrap();
        let caps = registry.tool_capabilities(&ItemStack::new("default:torch", 5));
        assert!(caps.group_caps.contains_key("crumbly"));
    }

    #[test]
    fn test_duplicate_item_rejected() {
        let mut registry = ItemRegistry::new();
        registry.register(ItemDef::new("a")).unwrap();
        assert!(registry.register(ItemDef::new("a")).is_err());
    }

    #[test]
    fn test_empty_stack() {
        assert!(ItemStack::default().is_empty());
        assert!(!ItemStack::new("default:dirt", 1).is_empty());
    }
}
