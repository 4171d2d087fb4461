//! Configuration system for the Quarry client.
//!
//! Two layers live here. [`Config`] is the typed engine configuration
//! persisted as `config.ron` and overridable from the command line. [`Settings`]
//! is the string-keyed game settings store that interaction code reads and
//! toggles at runtime, seeded from [`defaults_for`] the active
//! [`PlatformProfile`].

mod cli;
mod config;
mod error;
mod profile;
mod settings;

pub use cli::CliArgs;
pub use config::{ClientConfig, Config, DebugConfig, InteractionConfig, NetworkConfig};
pub use error::ConfigError;
pub use profile::{PlatformProfile, defaults_for};
pub use settings::{Settings, SettingsStore, parse_bool};
