//! Presentation events sent by the server.
//!
//! Every payload is owned by its variant, so an event is released when the
//! dispatcher drops it, whichever branch handled it.

use glam::{Vec2, Vec3};

use crate::hud::{HudChange, HudElement};

/// A single particle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleSpec {
    pub pos: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    /// Lifetime in seconds.
    pub expiration: f32,
    pub size: f32,
    pub collision_detection: bool,
    pub vertical: bool,
    pub texture: String,
    pub glow: u8,
}

/// A particle spawner emitting randomized particles over time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleSpawnerSpec {
    pub amount: u16,
    /// Seconds the spawner lives; 0 spawns forever.
    pub spawn_time: f32,
    pub min_pos: Vec3,
    pub max_pos: Vec3,
    pub min_velocity: Vec3,
    pub max_velocity: Vec3,
    pub min_acceleration: Vec3,
    pub max_acceleration: Vec3,
    pub min_expiration: f32,
    pub max_expiration: f32,
    pub min_size: f32,
    pub max_size: f32,
    pub collision_detection: bool,
    pub vertical: bool,
    pub texture: String,
    /// Object the spawner follows, if any.
    pub attached_to: Option<u16>,
}

/// Cloud layer parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CloudParams {
    pub density: f32,
    pub color_bright: [u8; 4],
    pub color_ambient: [u8; 4],
    pub height: f32,
    pub thickness: f32,
    pub speed: Vec2,
}

impl Default for CloudParams {
    fn default() -> Self {
        Self {
            density: 0.4,
            color_bright: [229, 240, 240, 255],
            color_ambient: [0, 0, 0, 255],
            height: 120.0,
            thickness: 16.0,
            speed: Vec2::new(0.0, -2.0),
        }
    }
}

/// An event queued by the network layer for the frame loop.
#[derive(Clone, Debug, PartialEq)]
pub enum ServerEvent {
    // --- Player ---
    /// The local player took damage.
    PlayerDamage { amount: u16 },
    /// The server turned the camera.
    ForceMove { yaw: f32, pitch: f32 },
    /// The player died.
    DeathScreen {
        /// Turn the camera towards `camera_target`.
        set_camera_target: bool,
        camera_target: Vec3,
    },

    // --- Forms ---
    /// Show a server form. An empty spec closes the form named `formname`.
    ShowFormspec { formname: String, formspec: String },
    /// Show a form requested by client-side scripts.
    ShowLocalFormspec { formname: String, formspec: String },

    // --- Particles ---
    SpawnParticle(ParticleSpec),
    AddParticleSpawner { id: u32, spawner: ParticleSpawnerSpec },
    DeleteParticleSpawner { id: u32 },

    // --- HUD ---
    HudAdd { id: u32, element: HudElement },
    HudRemove { id: u32 },
    HudChange { id: u32, change: HudChange },

    // --- Environment ---
    SetSky {
        bgcolor: [u8; 4],
        /// `"regular"`, `"skybox"` or `"plain"`.
        kind: String,
        /// Skybox texture names.
        params: Vec<String>,
        clouds: bool,
    },
    OverrideDayNightRatio { do_override: bool, ratio: f32 },
    CloudParams(CloudParams),

    /// Any event kind this client does not handle.
    Unrecognized { kind: u16, payload: Vec<u8> },
}

impl ServerEvent {
    /// Short name for logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::PlayerDamage { .. } => "player_damage",
            Self::ForceMove { .. } => "force_move",
            Self::DeathScreen { .. } => "death_screen",
            Self::ShowFormspec { .. } => "show_formspec",
            Self::ShowLocalFormspec { .. } => "show_local_formspec",
            Self::SpawnParticle(_) => "spawn_particle",
            Self::AddParticleSpawner { .. } => "add_particle_spawner",
            Self::DeleteParticleSpawner { .. } => "delete_particle_spawner",
            Self::HudAdd { .. } => "hud_add",
            Self::HudRemove { .. } => "hud_remove",
            Self::HudChange { .. } => "hud_change",
            Self::SetSky { .. } => "set_sky",
            Self::OverrideDayNightRatio { .. } => "override_day_night_ratio",
            Self::CloudParams(_) => "cloud_params",
            Self::Unrecognized { .. } => "unrecognized",
        }
    }
}
