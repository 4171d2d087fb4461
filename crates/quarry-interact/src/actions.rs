//! Key-driven toggles: movement modes, overlays, view range and volume.
//!
//! At most one action runs per frame. When several keys went down in the
//! same frame the one earliest in [`KeyAction`] order wins.

use quarry_config::SettingsStore;
use tracing::debug;

use crate::ports::{Privileges, StatusSink};

const DOUBLETAP_WINDOW: f32 = 0.15;
const VIEW_RANGE_STEP: i32 = 10;
const VIEW_RANGE_MIN: i32 = 20;
const VIEW_RANGE_MAX: i32 = 4000;
const VOLUME_STEP: f32 = 0.1;
const DEFAULT_PROFILER_PAGES: u32 = 3;

/// Toggle and adjust actions, in priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyAction {
    Autorun,
    FreeMove,
    /// Jump; toggles fly mode on a double tap.
    Jump,
    FastMove,
    NoClip,
    Mute,
    IncreaseVolume,
    DecreaseVolume,
    Cinematic,
    ToggleHud,
    Minimap,
    ToggleChat,
    ToggleFog,
    ToggleUpdateCamera,
    ToggleDebug,
    ToggleProfiler,
    IncreaseViewRange,
    DecreaseViewRange,
    FullViewRange,
}

/// Keys that went down this frame plus the modifiers still held.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyInput {
    pub pressed: Vec<KeyAction>,
    pub sneak_held: bool,
    pub jump_held: bool,
}

impl KeyInput {
    /// Input with `actions` pressed and no modifiers held.
    pub fn pressing(actions: &[KeyAction]) -> Self {
        Self {
            pressed: actions.to_vec(),
            ..Default::default()
        }
    }

    /// Forgets everything, as when a text field takes focus.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Overlay visibility toggled by keys. Not persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewFlags {
    pub show_chat: bool,
    pub show_hud: bool,
    pub show_minimap: bool,
    pub force_fog_off: bool,
    pub show_debug: bool,
    pub show_profiler_graph: bool,
    pub show_wireframe: bool,
    pub disable_camera_update: bool,
    /// Draw everything loaded regardless of the viewing range.
    pub range_all: bool,
}

impl Default for ViewFlags {
    fn default() -> Self {
        Self {
            show_chat: true,
            show_hud: true,
            show_minimap: false,
            force_fog_off: false,
            show_debug: false,
            show_profiler_graph: false,
            show_wireframe: false,
            disable_camera_update: false,
            range_all: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MinimapMode {
    #[default]
    Off,
    Surface,
    Radar,
}

impl MinimapMode {
    fn next(self) -> Self {
        match self {
            Self::Off => Self::Surface,
            Self::Surface => Self::Radar,
            Self::Radar => Self::Off,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MinimapShape {
    #[default]
    Square,
    Round,
}

/// What [`InputActionRouter::process`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouterOutcome {
    /// A text field has focus; input must be cleared.
    Suppressed,
    /// Nothing pressed, or the pressed action had no effect.
    Idle,
    Applied(KeyAction),
}

/// Collaborators of one [`InputActionRouter::process`] call.
pub struct ActionContext<'a> {
    pub settings: &'a mut dyn SettingsStore,
    pub privileges: &'a dyn Privileges,
    pub status: &'a mut dyn StatusSink,
    /// The server lets this player see the minimap.
    pub minimap_allowed: bool,
}

/// Maps pressed keys to toggles, writing persistent ones to settings.
#[derive(Debug)]
pub struct InputActionRouter {
    flags: ViewFlags,
    minimap_mode: MinimapMode,
    minimap_shape: MinimapShape,
    jump_timer: f32,
    reset_jump_timer: bool,
    profiler_page: u32,
    profiler_max_page: u32,
    status_seconds: f32,
}

impl InputActionRouter {
    /// Creates a router whose status messages last `status_seconds`.
    pub fn new(status_seconds: f32) -> Self {
        Self {
            flags: ViewFlags::default(),
            minimap_mode: MinimapMode::Off,
            minimap_shape: MinimapShape::Square,
            // Far outside the double-tap window until jump is first released.
            jump_timer: 1.0,
            reset_jump_timer: false,
            profiler_page: 0,
            profiler_max_page: DEFAULT_PROFILER_PAGES,
            status_seconds,
        }
    }

    #[must_use]
    pub fn flags(&self) -> ViewFlags {
        self.flags
    }

    #[must_use]
    pub fn minimap(&self) -> (MinimapMode, MinimapShape) {
        (self.minimap_mode, self.minimap_shape)
    }

    #[must_use]
    pub fn profiler_page(&self) -> u32 {
        self.profiler_page
    }

    /// Runs the highest-priority pressed action.
    pub fn process(
        &mut self,
        input: &KeyInput,
        text_focus: bool,
        dt: f32,
        ctx: &mut ActionContext<'_>,
    ) -> RouterOutcome {
        if text_focus {
            return RouterOutcome::Suppressed;
        }

        let doubletap = ctx.settings.get_bool("doubletap_jump");
        if doubletap && self.jump_timer <= DOUBLETAP_WINDOW {
            self.jump_timer += dt;
        }

        let outcome = match input.pressed.iter().min() {
            Some(&action) => {
                if self.run(action, input, doubletap, ctx) {
                    debug!(?action, "Key action");
                    RouterOutcome::Applied(action)
                } else {
                    RouterOutcome::Idle
                }
            }
            None => RouterOutcome::Idle,
        };

        if !input.jump_held && self.reset_jump_timer {
            self.reset_jump_timer = false;
            self.jump_timer = 0.0;
        }
        outcome
    }

    fn run(&mut self, action: KeyAction, input: &KeyInput, doubletap: bool, ctx: &mut ActionContext<'_>) -> bool {
        let text = match action {
            KeyAction::Autorun => toggle_setting(ctx, "continuous_forward", "autorun enabled", "autorun disabled", None),
            KeyAction::FreeMove => toggle_setting(ctx, "free_move", "Fly mode enabled", "Fly mode disabled", Some("fly")),
            KeyAction::Jump => {
                let fly = doubletap
                    && self.jump_timer < DOUBLETAP_WINDOW
                    && ctx.privileges.has_privilege("fly");
                self.reset_jump_timer = true;
                if !fly {
                    return false;
                }
                toggle_setting(ctx, "free_move", "Fly mode enabled", "Fly mode disabled", Some("fly"))
            }
            KeyAction::FastMove => toggle_setting(ctx, "fast_move", "Fast move enabled", "Fast move disabled", Some("fast")),
            KeyAction::NoClip => toggle_setting(ctx, "noclip", "noclip enabled", "noclip disabled", Some("noclip")),
            KeyAction::Mute => {
                let volume = if ctx.settings.get_float("sound_volume") < 0.001 {
                    1.0
                } else {
                    0.0
                };
                set_volume(ctx, volume)
            }
            KeyAction::IncreaseVolume => {
                let volume = ctx.settings.get_float("sound_volume") + VOLUME_STEP;
                set_volume(ctx, volume)
            }
            KeyAction::DecreaseVolume => {
                let volume = ctx.settings.get_float("sound_volume") - VOLUME_STEP;
                set_volume(ctx, volume)
            }
            KeyAction::Cinematic => toggle_setting(ctx, "cinematic", "cinematic enabled", "cinematic disabled", None),
            KeyAction::ToggleHud => {
                self.flags.show_hud = !self.flags.show_hud;
                pick(self.flags.show_hud, "HUD shown", "HUD hidden")
            }
            KeyAction::Minimap => match self.toggle_minimap(input.sneak_held, ctx) {
                Some(text) => text,
                None => return input.sneak_held && self.minimap_usable(ctx),
            },
            KeyAction::ToggleChat => {
                self.flags.show_chat = !self.flags.show_chat;
                pick(self.flags.show_chat, "Chat shown", "Chat hidden")
            }
            KeyAction::ToggleFog => {
                self.flags.force_fog_off = !self.flags.force_fog_off;
                pick(self.flags.force_fog_off, "Fog disabled", "Fog enabled")
            }
            KeyAction::ToggleUpdateCamera => {
                self.flags.disable_camera_update = !self.flags.disable_camera_update;
                pick(
                    self.flags.disable_camera_update,
                    "Camera update disabled",
                    "Camera update enabled",
                )
            }
            KeyAction::ToggleDebug => self.cycle_debug(ctx.privileges.has_privilege("debug")),
            KeyAction::ToggleProfiler => {
                self.profiler_page = (self.profiler_page + 1) % (self.profiler_max_page + 1);
                if self.profiler_page == 0 {
                    "Profiler hidden".to_string()
                } else {
                    format!(
                        "Profiler shown (page {} of {})",
                        self.profiler_page, self.profiler_max_page
                    )
                }
            }
            KeyAction::IncreaseViewRange => step_view_range(ctx, VIEW_RANGE_STEP),
            KeyAction::DecreaseViewRange => step_view_range(ctx, -VIEW_RANGE_STEP),
            KeyAction::FullViewRange => {
                self.flags.range_all = !self.flags.range_all;
                pick(self.flags.range_all, "Infinite view range", "Normal view range")
            }
        };
        ctx.status.show_status(text, self.status_seconds);
        true
    }

    fn minimap_usable(&self, ctx: &ActionContext<'_>) -> bool {
        self.flags.show_hud && ctx.settings.get_bool("enable_minimap")
    }

    /// Cycles the minimap mode, or flips its shape while sneaking. Returns
    /// the status text, `None` when nothing is to be shown.
    fn toggle_minimap(&mut self, sneak: bool, ctx: &ActionContext<'_>) -> Option<String> {
        if !self.minimap_usable(ctx) {
            return None;
        }
        if sneak {
            self.minimap_shape = match self.minimap_shape {
                MinimapShape::Square => MinimapShape::Round,
                MinimapShape::Round => MinimapShape::Square,
            };
            return None;
        }

        let mode = if ctx.minimap_allowed {
            self.minimap_mode.next()
        } else {
            MinimapMode::Off
        };
        self.minimap_mode = mode;
        self.flags.show_minimap = mode != MinimapMode::Off;
        let text = match mode {
            MinimapMode::Surface => "Minimap enabled",
            MinimapMode::Radar => "Radar mode enabled",
            MinimapMode::Off if ctx.minimap_allowed => "Minimap disabled",
            MinimapMode::Off => "Minimap disabled by server",
        };
        Some(text.to_string())
    }

    /// Off → debug text → profiler graph → wireframe (with `debug`) → off.
    fn cycle_debug(&mut self, has_debug: bool) -> String {
        let flags = &mut self.flags;
        let text = if !flags.show_debug {
            flags.show_debug = true;
            flags.show_profiler_graph = false;
            flags.show_wireframe = false;
            "Debug info shown"
        } else if !flags.show_profiler_graph && !flags.show_wireframe {
            flags.show_profiler_graph = true;
            "Profiler graph shown"
        } else if !flags.show_wireframe && has_debug {
            flags.show_profiler_graph = false;
            flags.show_wireframe = true;
            "Wireframe shown"
        } else {
            flags.show_debug = false;
            flags.show_profiler_graph = false;
            flags.show_wireframe = false;
            if has_debug {
                "Debug info, profiler graph, and wireframe hidden"
            } else {
                "Debug info and profiler graph hidden"
            }
        };
        text.to_string()
    }
}

impl Default for InputActionRouter {
    fn default() -> Self {
        Self::new(2.0)
    }
}

fn pick(on: bool, enabled: &str, disabled: &str) -> String {
    (if on { enabled } else { disabled }).to_string()
}

/// Flips a boolean setting. The toggle always happens; a missing privilege
/// only adds a note, the server ignores what it does not allow.
fn toggle_setting(
    ctx: &mut ActionContext<'_>,
    key: &str,
    enabled: &str,
    disabled: &str,
    privilege: Option<&str>,
) -> String {
    let value = !ctx.settings.get_bool(key);
    ctx.settings.set_bool(key, value);
    let mut text = pick(value, enabled, disabled);
    if let Some(privilege) = privilege
        && value
        && !ctx.privileges.has_privilege(privilege)
    {
        text.push_str(&format!(" (note: no '{privilege}' privilege)"));
    }
    text
}

fn set_volume(ctx: &mut ActionContext<'_>, volume: f32) -> String {
    let volume = volume.clamp(0.0, 1.0);
    ctx.settings.set_float("sound_volume", volume);
    format!("Volume changed to {}%", (volume * 100.0).round() as i32)
}

fn step_view_range(ctx: &mut ActionContext<'_>, step: i32) -> String {
    let range = ctx.settings.get_i32("viewing_range") + step;
    let (range, text) = if range > VIEW_RANGE_MAX {
        (VIEW_RANGE_MAX, format!("Viewing range is at maximum: {VIEW_RANGE_MAX}"))
    } else if range < VIEW_RANGE_MIN {
        (VIEW_RANGE_MIN, format!("Viewing range is at minimum: {VIEW_RANGE_MIN}"))
    } else {
        (range, format!("Viewing range changed to {range}"))
    };
    ctx.settings.set("viewing_range", range.to_string());
    text
}
