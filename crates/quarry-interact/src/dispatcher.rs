//! Applies queued server events to local presentation state.

use glam::{IVec3, Vec3};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::events::{CloudParams, ParticleSpawnerSpec, ParticleSpec, ServerEvent};
use crate::hud::{HudError, HudTable};
use crate::ports::EventQueue;

const DAMAGE_FLASH_BASE: f32 = 95.0;
const DAMAGE_FLASH_PER_HP: f32 = 3.2;
const DAMAGE_FLASH_MAX: f32 = 127.0;
const DAMAGE_FLASH_DECAY: f32 = 100.0;
const HURT_TILT_TIME: f32 = 1.5;
const HURT_TILT_DECAY: f32 = 5.0;

/// Where an open form came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormSource {
    /// Sent by the server; submissions go back to it.
    Server,
    /// Requested by client-side scripts.
    Local,
    /// Stored in the metadata of the node at this position.
    Node(IVec3),
}

/// The form currently on screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveForm {
    pub name: String,
    pub spec: String,
    pub source: FormSource,
}

/// How the sky is drawn.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum SkyState {
    /// Day-night cycle.
    #[default]
    Regular,
    /// Six textures, in the order the server sent them.
    Skybox(Vec<String>),
    /// A flat color.
    Plain([u8; 4]),
}

/// Everything server events change on the client side.
#[derive(Debug, Default)]
pub struct PresentationState {
    /// Red screen flash intensity, 0-127.
    pub damage_flash: f32,
    pub hurt_tilt_timer: f32,
    pub hurt_tilt_strength: f32,
    pub camera_yaw: f32,
    pub camera_pitch: f32,
    pub death_screen_visible: bool,
    /// Point the death camera turns towards, if the server asked for one.
    pub death_camera_target: Option<Vec3>,
    pub formspec: Option<ActiveForm>,
    pub hud: HudTable,
    pub sky: SkyState,
    pub sky_color: [u8; 4],
    /// Clouds requested by the server; drawn only if enabled locally too.
    pub clouds_enabled: bool,
    pub clouds: CloudParams,
    /// Day-night ratio override in thousandths.
    pub day_night_ratio_override: Option<u32>,
    /// Particles spawned since the renderer last took them.
    pub particles: Vec<ParticleSpec>,
    pub particle_spawners: FxHashMap<u32, ParticleSpawnerSpec>,
}

impl PresentationState {
    pub fn new() -> Self {
        Self {
            clouds_enabled: true,
            ..Default::default()
        }
    }

    /// Fades the damage flash and the hurt camera tilt.
    pub fn advance(&mut self, dt: f32) {
        if self.damage_flash > 0.0 {
            self.damage_flash = (self.damage_flash - DAMAGE_FLASH_DECAY * dt).max(0.0);
        }
        if self.hurt_tilt_timer > 0.0 {
            self.hurt_tilt_timer -= dt * HURT_TILT_DECAY;
            if self.hurt_tilt_timer < 0.0 {
                self.hurt_tilt_timer = 0.0;
                self.hurt_tilt_strength = 0.0;
            }
        }
    }

    /// Hands the spawned particles to the caller.
    pub fn take_particles(&mut self) -> Vec<ParticleSpec> {
        std::mem::take(&mut self.particles)
    }
}

/// Per-frame facts the dispatcher needs from outside.
#[derive(Clone, Copy, Debug)]
pub struct DispatchContext {
    /// Current health; damage is ignored once the player is dead.
    pub hp: u16,
    pub particles_enabled: bool,
    pub clouds_enabled: bool,
}

/// Drains the event queue into a [`PresentationState`].
#[derive(Debug, Default)]
pub struct EventDispatcher {
    handled: u64,
    ignored: u64,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events applied so far.
    pub fn handled(&self) -> u64 {
        self.handled
    }

    /// Events dropped unapplied (unknown kinds, HUD id mismatches).
    pub fn ignored(&self) -> u64 {
        self.ignored
    }

    /// Applies every queued event. Returns how many were taken.
    pub fn drain(
        &mut self,
        queue: &mut dyn EventQueue,
        state: &mut PresentationState,
        ctx: &DispatchContext,
    ) -> usize {
        let mut count = 0;
        while let Some(event) = queue.pop() {
            count += 1;
            if self.apply(event, state, ctx) {
                self.handled += 1;
            } else {
                self.ignored += 1;
            }
        }
        count
    }

    /// Applies one event, consuming it. Returns `false` if it was dropped.
    pub fn apply(&mut self, event: ServerEvent, state: &mut PresentationState, ctx: &DispatchContext) -> bool {
        let kind = event.kind_name();
        match event {
            ServerEvent::PlayerDamage { amount } => {
                if ctx.hp == 0 {
                    return false;
                }
                state.damage_flash = (state.damage_flash
                    + DAMAGE_FLASH_BASE
                    + DAMAGE_FLASH_PER_HP * f32::from(amount))
                .min(DAMAGE_FLASH_MAX);
                state.hurt_tilt_timer = HURT_TILT_TIME;
                // Whole quarters of the damage, 1 to 4.
                state.hurt_tilt_strength = f32::from(amount / 4).clamp(1.0, 4.0);
            }
            ServerEvent::ForceMove { yaw, pitch } => {
                state.camera_yaw = yaw;
                state.camera_pitch = pitch;
            }
            ServerEvent::DeathScreen {
                set_camera_target,
                camera_target,
            } => {
                state.death_screen_visible = true;
                state.death_camera_target = set_camera_target.then_some(camera_target);
                state.damage_flash = 0.0;
                state.hurt_tilt_timer = 0.0;
                state.hurt_tilt_strength = 0.0;
            }
            ServerEvent::ShowFormspec { formname, formspec } => {
                show_server_form(state, formname, formspec);
            }
            ServerEvent::ShowLocalFormspec { formname, formspec } => {
                // Local forms always open, even with an empty spec.
                state.formspec = Some(ActiveForm {
                    name: formname,
                    spec: formspec,
                    source: FormSource::Local,
                });
            }
            ServerEvent::SpawnParticle(particle) => {
                if !ctx.particles_enabled {
                    return false;
                }
                state.particles.push(particle);
            }
            ServerEvent::AddParticleSpawner { id, spawner } => {
                if !ctx.particles_enabled {
                    return false;
                }
                if state.particle_spawners.insert(id, spawner).is_some() {
                    debug!(id, "Replaced particle spawner");
                }
            }
            ServerEvent::DeleteParticleSpawner { id } => {
                state.particle_spawners.remove(&id);
            }
            ServerEvent::HudAdd { id, element } => {
                if let Err(err) = state.hud.add(id, element) {
                    warn!(%err, "Ignoring HUD add");
                    return false;
                }
            }
            ServerEvent::HudRemove { id } => {
                if let Err(HudError::UnknownId(id)) = state.hud.remove(id) {
                    debug!(id, "HUD remove for unknown element");
                    return false;
                }
            }
            ServerEvent::HudChange { id, change } => {
                if let Err(err) = state.hud.change(id, change) {
                    debug!(%err, "Ignoring HUD change");
                    return false;
                }
            }
            ServerEvent::SetSky {
                bgcolor,
                kind: sky_kind,
                params,
                clouds,
            } => {
                if sky_kind == "regular" {
                    // The day-night sky always draws clouds when the player allows them.
                    state.sky = SkyState::Regular;
                    state.clouds_enabled = ctx.clouds_enabled;
                } else {
                    state.sky_color = bgcolor;
                    state.sky = match sky_kind.as_str() {
                        "skybox" if params.len() == 6 => SkyState::Skybox(params),
                        _ => SkyState::Plain(bgcolor),
                    };
                    state.clouds_enabled = clouds && ctx.clouds_enabled;
                }
            }
            ServerEvent::OverrideDayNightRatio { do_override, ratio } => {
                state.day_night_ratio_override =
                    do_override.then(|| (ratio.clamp(0.0, 1.0) * 1000.0) as u32);
            }
            ServerEvent::CloudParams(params) => {
                state.clouds = params;
            }
            ServerEvent::Unrecognized { kind: code, payload } => {
                debug!(code, bytes = payload.len(), "Dropping unrecognized event");
                return false;
            }
        }
        debug!(kind, "Applied server event");
        true
    }
}

fn show_server_form(state: &mut PresentationState, name: String, spec: String) {
    if spec.is_empty() {
        let closes = state
            .formspec
            .as_ref()
            .is_some_and(|form| name.is_empty() || form.name == name);
        if closes {
            state.formspec = None;
        }
        return;
    }
    state.formspec = Some(ActiveForm {
        name,
        spec,
        source: FormSource::Server,
    });
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use glam::Vec3;

    use super::*;
    use crate::hud::{HudChange, HudElement};

    fn ctx() -> DispatchContext {
        DispatchContext {
            hp: 20,
            particles_enabled: true,
            clouds_enabled: true,
        }
    }

    fn drain(events: Vec<ServerEvent>, state: &mut PresentationState) -> usize {
        let mut queue: VecDeque<ServerEvent> = events.into();
        let n = EventDispatcher::new().drain(&mut queue, state, &ctx());
        assert!(queue.is_empty());
        n
    }

    #[test]
    fn test_drains_everything_queued() {
        let mut state = PresentationState::new();
        let n = drain(
            vec![
                ServerEvent::Unrecognized {
                    kind: 99,
                    payload: vec![1, 2, 3],
                },
                ServerEvent::HudAdd {
                    id: 1,
                    element: HudElement::default(),
                },
                ServerEvent::ForceMove { yaw: 90.0, pitch: -10.0 },
            ],
            &mut state,
        );
        assert_eq!(n, 3);
        assert_eq!(state.hud.len(), 1);
        assert_eq!(state.camera_yaw, 90.0);
        assert_eq!(state.camera_pitch, -10.0);
    }

    #[test]
    fn test_damage_flash_and_tilt() {
        let mut state = PresentationState::new();
        drain(vec![ServerEvent::PlayerDamage { amount: 2 }], &mut state);
        assert!((state.damage_flash - 101.4).abs() < 1e-4);
        assert_eq!(state.hurt_tilt_timer, 1.5);
        assert_eq!(state.hurt_tilt_strength, 1.0);

        drain(vec![ServerEvent::PlayerDamage { amount: 20 }], &mut state);
        assert_eq!(state.damage_flash, 127.0);
        assert_eq!(state.hurt_tilt_strength, 4.0);
    }

    #[test]
    fn test_tilt_strength_counts_whole_quarters() {
        let mut state = PresentationState::new();
        drain(vec![ServerEvent::PlayerDamage { amount: 6 }], &mut state);
        assert_eq!(state.hurt_tilt_strength, 1.0);

        drain(vec![ServerEvent::PlayerDamage { amount: 11 }], &mut state);
        assert_eq!(state.hurt_tilt_strength, 2.0);
    }

    #[test]
    fn test_damage_ignored_when_dead() {
        let mut state = PresentationState::new();
        let mut queue = VecDeque::from([ServerEvent::PlayerDamage { amount: 5 }]);
        let mut dispatcher = EventDispatcher::new();
        let dead = DispatchContext { hp: 0, ..ctx() };
        assert_eq!(dispatcher.drain(&mut queue, &mut state, &dead), 1);
        assert_eq!(state.damage_flash, 0.0);
        assert_eq!(dispatcher.ignored(), 1);
    }

    #[test]
    fn test_presentation_decays() {
        let mut state = PresentationState::new();
        state.damage_flash = 100.0;
        state.hurt_tilt_timer = 1.5;
        state.hurt_tilt_strength = 2.0;

        state.advance(0.1);
        assert!((state.damage_flash - 90.0).abs() < 1e-4);
        assert!((state.hurt_tilt_timer - 1.0).abs() < 1e-4);
        assert_eq!(state.hurt_tilt_strength, 2.0);

        state.advance(1.0);
        assert_eq!(state.damage_flash, 0.0);
        assert_eq!(state.hurt_tilt_timer, 0.0);
        assert_eq!(state.hurt_tilt_strength, 0.0);
    }

    #[test]
    fn test_death_screen_clears_damage_visuals() {
        let mut state = PresentationState::new();
        drain(
            vec![
                ServerEvent::PlayerDamage { amount: 3 },
                ServerEvent::DeathScreen {
                    set_camera_target: false,
                    camera_target: Vec3::ZERO,
                },
            ],
            &mut state,
        );
        assert!(state.death_screen_visible);
        assert_eq!(state.damage_flash, 0.0);
        assert_eq!(state.hurt_tilt_timer, 0.0);
        assert_eq!(state.death_camera_target, None);
    }

    #[test]
    fn test_death_screen_turns_camera_to_target() {
        let mut state = PresentationState::new();
        let target = Vec3::new(4.0, 10.0, -2.5);
        drain(
            vec![ServerEvent::DeathScreen {
                set_camera_target: true,
                camera_target: target,
            }],
            &mut state,
        );
        assert_eq!(state.death_camera_target, Some(target));

        drain(
            vec![ServerEvent::DeathScreen {
                set_camera_target: false,
                camera_target: target,
            }],
            &mut state,
        );
        assert_eq!(state.death_camera_target, None);
    }

    #[test]
    fn test_formspec_open_and_close_by_name() {
        let mut state = PresentationState::new();
        drain(
            vec![ServerEvent::ShowFormspec {
                formname: "shop".into(),
                formspec: "size[8,9]".into(),
            }],
            &mut state,
        );
        assert_eq!(state.formspec.as_ref().unwrap().source, FormSource::Server);

        // Closing a different form leaves this one open.
        drain(
            vec![ServerEvent::ShowFormspec {
                formname: "other".into(),
                formspec: String::new(),
            }],
            &mut state,
        );
        assert!(state.formspec.is_some());

        drain(
            vec![ServerEvent::ShowFormspec {
                formname: "shop".into(),
                formspec: String::new(),
            }],
            &mut state,
        );
        assert!(state.formspec.is_none());
    }

    #[test]
    fn test_empty_name_closes_any_form() {
        let mut state = PresentationState::new();
        drain(
            vec![
                ServerEvent::ShowLocalFormspec {
                    formname: "menu".into(),
                    formspec: "size[2,2]".into(),
                },
                ServerEvent::ShowFormspec {
                    formname: String::new(),
                    formspec: String::new(),
                },
            ],
            &mut state,
        );
        assert!(state.formspec.is_none());
    }

    #[test]
    fn test_empty_local_form_does_not_close() {
        let mut state = PresentationState::new();
        drain(
            vec![
                ServerEvent::ShowFormspec {
                    formname: "shop".into(),
                    formspec: "size[8,9]".into(),
                },
                ServerEvent::ShowLocalFormspec {
                    formname: "shop".into(),
                    formspec: String::new(),
                },
            ],
            &mut state,
        );
        let form = state.formspec.as_ref().unwrap();
        assert_eq!(form.source, FormSource::Local);
        assert_eq!(form.name, "shop");
        assert!(form.spec.is_empty());
    }

    #[test]
    fn test_hud_errors_are_tolerated() {
        let mut state = PresentationState::new();
        let mut dispatcher = EventDispatcher::new();
        let mut queue = VecDeque::from([
            ServerEvent::HudRemove { id: 5 },
            ServerEvent::HudChange {
                id: 5,
                change: HudChange::Text("x".into()),
            },
            ServerEvent::HudAdd {
                id: 5,
                element: HudElement::default(),
            },
            ServerEvent::HudAdd {
                id: 5,
                element: HudElement {
                    text: "dup".into(),
                    ..Default::default()
                },
            },
            ServerEvent::HudChange {
                id: 5,
                change: HudChange::Text("ok".into()),
            },
        ]);
        assert_eq!(dispatcher.drain(&mut queue, &mut state, &ctx()), 5);
        assert_eq!(state.hud.len(), 1);
        assert_eq!(state.hud.get(5).unwrap().text, "ok");
        assert_eq!(dispatcher.handled(), 2);
        assert_eq!(dispatcher.ignored(), 3);
    }

    #[test]
    fn test_particles_respect_setting() {
        let mut state = PresentationState::new();
        let mut dispatcher = EventDispatcher::new();
        let off = DispatchContext {
            particles_enabled: false,
            ..ctx()
        };
        let mut queue = VecDeque::from([
            ServerEvent::SpawnParticle(ParticleSpec::default()),
            ServerEvent::AddParticleSpawner {
                id: 1,
                spawner: ParticleSpawnerSpec::default(),
            },
        ]);
        dispatcher.drain(&mut queue, &mut state, &off);
        assert!(state.particles.is_empty());
        assert!(state.particle_spawners.is_empty());

        drain(
            vec![
                ServerEvent::SpawnParticle(ParticleSpec::default()),
                ServerEvent::AddParticleSpawner {
                    id: 1,
                    spawner: ParticleSpawnerSpec::default(),
                },
                ServerEvent::AddParticleSpawner {
                    id: 2,
                    spawner: ParticleSpawnerSpec::default(),
                },
                ServerEvent::DeleteParticleSpawner { id: 1 },
                ServerEvent::DeleteParticleSpawner { id: 42 },
            ],
            &mut state,
        );
        assert_eq!(state.take_particles().len(), 1);
        assert!(state.particles.is_empty());
        assert_eq!(state.particle_spawners.len(), 1);
        assert!(state.particle_spawners.contains_key(&2));
    }

    #[test]
    fn test_sky_kinds() {
        let mut state = PresentationState::new();
        let faces: Vec<String> = (0..6).map(|i| format!("sky{i}.png")).collect();
        drain(
            vec![ServerEvent::SetSky {
                bgcolor: [1, 2, 3, 255],
                kind: "skybox".into(),
                params: faces.clone(),
                clouds: false,
            }],
            &mut state,
        );
        assert_eq!(state.sky, SkyState::Skybox(faces));
        assert!(!state.clouds_enabled);

        // A skybox without six faces falls back to the plain color.
        drain(
            vec![ServerEvent::SetSky {
                bgcolor: [9, 9, 9, 255],
                kind: "skybox".into(),
                params: vec!["one.png".into()],
                clouds: true,
            }],
            &mut state,
        );
        assert_eq!(state.sky, SkyState::Plain([9, 9, 9, 255]));
        assert!(state.clouds_enabled);
    }

    #[test]
    fn test_regular_sky_keeps_clouds_on() {
        let mut state = PresentationState::new();
        drain(
            vec![
                ServerEvent::SetSky {
                    bgcolor: [9, 9, 9, 255],
                    kind: "plain".into(),
                    params: Vec::new(),
                    clouds: false,
                },
                ServerEvent::SetSky {
                    bgcolor: [200, 0, 0, 255],
                    kind: "regular".into(),
                    params: Vec::new(),
                    clouds: false,
                },
            ],
            &mut state,
        );
        assert_eq!(state.sky, SkyState::Regular);
        assert!(state.clouds_enabled);
        // The regular sky does not take the fallback color.
        assert_eq!(state.sky_color, [9, 9, 9, 255]);

        let mut dispatcher = EventDispatcher::new();
        let no_clouds = DispatchContext {
            clouds_enabled: false,
            ..ctx()
        };
        let mut queue = VecDeque::from([ServerEvent::SetSky {
            bgcolor: [0, 0, 0, 255],
            kind: "regular".into(),
            params: Vec::new(),
            clouds: true,
        }]);
        dispatcher.drain(&mut queue, &mut state, &no_clouds);
        assert!(!state.clouds_enabled);
    }

    #[test]
    fn test_day_night_override_and_clouds() {
        let mut state = PresentationState::new();
        let clouds = CloudParams {
            density: 0.8,
            ..CloudParams::default()
        };
        drain(
            vec![
                ServerEvent::OverrideDayNightRatio {
                    do_override: true,
                    ratio: 0.25,
                },
                ServerEvent::CloudParams(clouds),
            ],
            &mut state,
        );
        assert_eq!(state.day_night_ratio_override, Some(250));
        assert_eq!(state.clouds.density, 0.8);

        drain(
            vec![ServerEvent::OverrideDayNightRatio {
                do_override: false,
                ratio: 0.0,
            }],
            &mut state,
        );
        assert_eq!(state.day_night_ratio_override, None);
    }
}
