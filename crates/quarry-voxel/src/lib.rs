//! Node and item definitions for the Quarry client: content ids, node
//! parameters, registries, and the tool capability math that turns a held
//! item and a node's groups into dig and hit parameters.

pub mod item;
pub mod node;
pub mod registry;
pub mod tool;

pub use item::{ItemDef, ItemRegistry, ItemStack};
pub use node::{CONTENT_AIR, CONTENT_IGNORE, ContentId, Groups, Node, Param2Type, group_rating};
pub use registry::{NodeDef, NodeRegistry, RegistryError};
pub use tool::{DigParams, HitParams, ToolCapabilities, ToolGroupCap, dig_params, hit_params};
