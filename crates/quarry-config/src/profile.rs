//! Platform profiles and the default settings each one starts from.
//!
//! Mobile builds historically baked lower frame caps and view ranges into
//! settings initialization. Here that choice is a plain value picked once at
//! startup, so the interaction code never branches on the platform.

use serde::{Deserialize, Serialize};

use crate::settings::{Settings, SettingsStore};

/// Hardware class the client runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum PlatformProfile {
    /// Desktop with keyboard and mouse.
    Desktop,
    /// Phones with less than 2 GB of memory.
    MobileMinimal,
    /// Phones with 2-4 GB of memory.
    MobileLow,
    /// Phones with 4-6 GB of memory.
    MobileMedium,
    /// Everything bigger.
    MobileHigh,
}

impl PlatformProfile {
    /// Returns `true` for touch-driven profiles.
    pub fn is_mobile(self) -> bool {
        !matches!(self, Self::Desktop)
    }
}

/// Frame caps and view range for a profile: `(fps_max, pause_fps_max, viewing_range)`.
fn performance_tier(profile: PlatformProfile) -> (f32, f32, i32) {
    match profile {
        PlatformProfile::Desktop => (60.0, 15.0, 100),
        PlatformProfile::MobileMinimal => (30.0, 5.0, 25),
        PlatformProfile::MobileLow => (35.0, 5.0, 30),
        PlatformProfile::MobileMedium => (35.0, 10.0, 60),
        PlatformProfile::MobileHigh => (60.0, 15.0, 80),
    }
}

/// Builds the default settings map for `profile`.
pub fn defaults_for(profile: PlatformProfile) -> Settings {
    let mut settings = Settings::new();

    settings.set_float("sound_volume", 1.0);
    for key in [
        "free_move",
        "fast_move",
        "noclip",
        "cinematic",
        "continuous_forward",
        "enable_build_where_you_stand",
    ] {
        settings.set_bool(key, false);
    }
    settings.set_float("repeat_rightclick_time", 0.25);
    settings.set_bool("enable_particles", true);
    settings.set_bool("enable_clouds", true);
    settings.set_bool("enable_minimap", true);

    let (fps_max, pause_fps_max, viewing_range) = performance_tier(profile);
    settings.set_float("fps_max", fps_max);
    settings.set_float("pause_fps_max", pause_fps_max);
    settings.set("viewing_range", viewing_range.to_string());

    let mobile = profile.is_mobile();
    settings.set_bool("doubletap_jump", mobile);
    settings.set_bool("touchtarget", mobile);
    if profile == PlatformProfile::MobileMinimal {
        settings.set_bool("enable_clouds", false);
    }

    settings
}
