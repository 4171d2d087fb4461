//! String-keyed game settings with typed accessors and RON persistence.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::profile::{PlatformProfile, defaults_for};

const SETTINGS_FILE: &str = "settings.ron";

/// Parses the boolean spellings accepted in settings files.
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// Read/write access to persisted settings.
///
/// Missing or malformed values read as the type's zero value; callers that
/// need a different fallback seed it through [`defaults_for`].
pub trait SettingsStore {
    /// Returns the raw value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: String);

    /// Reads `key` as a boolean.
    fn get_bool(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| parse_bool(&v))
    }

    /// Reads `key` as a float.
    fn get_float(&self, key: &str) -> f32 {
        self.get(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0.0)
    }

    /// Reads `key` as a signed integer. Fractional values are truncated.
    fn get_i32(&self, key: &str) -> i32 {
        self.get(key)
            .and_then(|v| {
                let v = v.trim();
                v.parse::<i32>()
                    .ok()
                    .or_else(|| v.parse::<f32>().ok().map(|f| f as i32))
            })
            .unwrap_or(0)
    }

    /// Reads `key` as a string, empty when missing.
    fn get_string(&self, key: &str) -> String {
        self.get(key).unwrap_or_default()
    }

    /// Stores a boolean.
    fn set_bool(&mut self, key: &str, value: bool) {
        self.set(key, value.to_string());
    }

    /// Stores a float.
    fn set_float(&mut self, key: &str, value: f32) {
        self.set(key, value.to_string());
    }
}

/// In-memory settings map, persisted as `settings.ron`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    values: BTreeMap<String, String>,
}

impl Settings {
    /// Creates an empty settings map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no key is stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copies every value of `other` over this map.
    pub fn overlay(&mut self, other: &Settings) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Loads `settings.ron` from `dir` layered over the defaults for `profile`.
    ///
    /// A missing file is not an error: the defaults are returned as-is.
    pub fn load_layered(dir: &Path, profile: PlatformProfile) -> Result<Self, ConfigError> {
        let mut settings = defaults_for(profile);
        let path = dir.join(SETTINGS_FILE);
        if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(ConfigError::ReadError)?;
            let user: Settings = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!(
                "Loaded {} user settings from {}",
                user.len(),
                path.display()
            );
            settings.overlay(&user);
        }
        Ok(settings)
    }

    /// Writes the full map to `dir/settings.ron`.
    pub fn save(&self, dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(dir).map_err(ConfigError::WriteError)?;
        let serialized = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new())
            .map_err(ConfigError::SerializeError)?;
        std::fs::write(dir.join(SETTINGS_FILE), serialized).map_err(ConfigError::WriteError)
    }
}

impl SettingsStore for Settings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }
}
