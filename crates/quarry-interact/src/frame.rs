//! One interaction tick per rendered frame.
//!
//! Order within a tick: timers, key actions, target resolution, dig
//! cancellation, then digging, placing, punching or using, and finally the
//! server event queue. Later steps see what earlier ones changed in the same
//! frame, never the reverse.

use glam::Vec3;
use quarry_config::{InteractionConfig, SettingsStore};
use quarry_voxel::{
    CONTENT_IGNORE, HitParams, ItemDef, ItemRegistry, ItemStack, NodeRegistry, group_rating, hit_params,
};
use tracing::debug;

use crate::actions::{ActionContext, InputActionRouter, KeyInput, RouterOutcome};
use crate::dig::{DigController, DigInput, DigOutcome, NOPLACE_AFTER_DIG};
use crate::dispatcher::{ActiveForm, DispatchContext, EventDispatcher, FormSource, PresentationState};
use crate::placement::{PlacementOverrides, PlacementPredictor, PlayerBody, PredictedPlacement};
use crate::pointed::{ObjectId, PointedTarget, Ray};
use crate::ports::{
    EventQueue, InteractionKind, NetworkSession, Privileges, SelectionSink, StatusSink, WorldView,
};
use crate::resolver::TargetResolver;
use crate::timers::InteractTimers;

/// Settings the tick reads, copied once per frame after key actions ran.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionSettings {
    pub noclip: bool,
    pub build_where_you_stand: bool,
    /// Holding the secondary button repeats placement after this many seconds.
    pub repeat_rightclick_time: f32,
    pub particles: bool,
    pub clouds: bool,
}

impl InteractionSettings {
    pub fn from_store(settings: &dyn SettingsStore) -> Self {
        Self {
            noclip: settings.get_bool("noclip"),
            build_where_you_stand: settings.get_bool("enable_build_where_you_stand"),
            repeat_rightclick_time: settings.get_float("repeat_rightclick_time"),
            particles: settings.get_bool("enable_particles"),
            clouds: settings.get_bool("enable_clouds"),
        }
    }
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            noclip: false,
            build_where_you_stand: false,
            repeat_rightclick_time: 0.25,
            particles: true,
            clouds: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CameraMode {
    #[default]
    FirstPerson,
    ThirdPersonBack,
    /// Looking at the player's face. Nothing can be pointed at.
    ThirdPersonFront,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraView {
    pub position: Vec3,
    pub direction: Vec3,
    pub mode: CameraMode,
}

/// State of a mouse button this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonState {
    pub held: bool,
    /// Went down this frame.
    pub clicked: bool,
    /// Went up this frame.
    pub released: bool,
}

impl ButtonState {
    /// Button pressed this frame and still down.
    pub fn click() -> Self {
        Self {
            held: true,
            clicked: true,
            released: false,
        }
    }

    /// Button held since an earlier frame.
    pub fn hold() -> Self {
        Self {
            held: true,
            ..Self::default()
        }
    }

    /// Button let go this frame.
    pub fn release() -> Self {
        Self {
            released: true,
            ..Self::default()
        }
    }
}

/// Input and player state for one tick.
#[derive(Clone, Debug, Default)]
pub struct FrameInput {
    pub dt: f32,
    pub keys: KeyInput,
    /// Chat or a form text field has focus.
    pub text_focus: bool,
    pub camera: CameraView,
    /// Feet position of the local player.
    pub player_position: Vec3,
    /// Primary button: dig and punch.
    pub dig: ButtonState,
    /// Secondary button: place and activate.
    pub place: ButtonState,
    pub hp: u16,
    pub wielded: ItemStack,
    /// The server shows the minimap to this player.
    pub minimap_allowed: bool,
}

/// Collaborators borrowed for one tick.
pub struct FrameContext<'a> {
    pub world: &'a mut dyn WorldView,
    pub network: &'a mut dyn NetworkSession,
    pub privileges: &'a dyn Privileges,
    pub settings: &'a mut dyn SettingsStore,
    pub events: &'a mut dyn EventQueue,
    pub selection: &'a mut dyn SelectionSink,
    pub status: &'a mut dyn StatusSink,
}

/// What one tick did.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    pub action: RouterOutcome,
    pub pointed: PointedTarget,
    pub pointed_changed: bool,
    pub dig: DigOutcome,
    pub dig_cancelled: bool,
    pub placed: Option<PredictedPlacement>,
    /// Object punched with damage, and the predicted hit.
    pub punched: Option<(ObjectId, HitParams)>,
    pub opened_form: bool,
    pub events: usize,
}

impl FrameReport {
    fn new(action: RouterOutcome, pointed: PointedTarget, pointed_changed: bool) -> Self {
        Self {
            action,
            pointed,
            pointed_changed,
            dig: DigOutcome::Idle,
            dig_cancelled: false,
            placed: None,
            punched: None,
            opened_form: false,
            events: 0,
        }
    }
}

/// Owns the interaction components and runs them in frame order.
pub struct InteractionCore {
    nodes: NodeRegistry,
    items: ItemRegistry,
    router: InputActionRouter,
    dig: DigController,
    dispatcher: EventDispatcher,
    presentation: PresentationState,
    timers: InteractTimers,
    settings: InteractionSettings,
    pointed_old: PointedTarget,
    object_hit_delay: f32,
    default_reach: f32,
    player_height: u8,
    show_entity_selectionbox: bool,
}

impl InteractionCore {
    pub fn new(config: &InteractionConfig, nodes: NodeRegistry, items: ItemRegistry) -> Self {
        Self {
            nodes,
            items,
            router: InputActionRouter::new(config.status_text_seconds),
            dig: DigController::new(config.crack_animation_length),
            dispatcher: EventDispatcher::new(),
            presentation: PresentationState::new(),
            timers: InteractTimers::new(),
            settings: InteractionSettings::default(),
            pointed_old: PointedTarget::Nothing,
            object_hit_delay: config.object_hit_delay,
            default_reach: config.default_reach,
            player_height: config.player_height,
            show_entity_selectionbox: true,
        }
    }

    pub fn nodes(&self) -> &NodeRegistry {
        &self.nodes
    }

    pub fn items(&self) -> &ItemRegistry {
        &self.items
    }

    pub fn router(&self) -> &InputActionRouter {
        &self.router
    }

    pub fn dig(&self) -> &DigController {
        &self.dig
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    pub fn presentation(&self) -> &PresentationState {
        &self.presentation
    }

    pub fn presentation_mut(&mut self) -> &mut PresentationState {
        &mut self.presentation
    }

    pub fn timers(&self) -> &InteractTimers {
        &self.timers
    }

    /// Settings snapshot of the last tick.
    pub fn settings(&self) -> InteractionSettings {
        self.settings
    }

    /// Target resolved by the last tick.
    pub fn pointed(&self) -> PointedTarget {
        self.pointed_old
    }

    /// Whether pointed objects get a selection box. Nodes always do.
    pub fn set_show_entity_selectionbox(&mut self, show: bool) {
        self.show_entity_selectionbox = show;
    }

    /// Ray length for `item`: its own range, else the hand's, else the default.
    fn reach(&self, item: &ItemDef) -> f32 {
        item.range
            .filter(|r| *r >= 0.0)
            .or(self.items.hand().range.filter(|r| *r >= 0.0))
            .unwrap_or(self.default_reach)
    }

    /// Runs one frame.
    pub fn tick(&mut self, mut input: FrameInput, ctx: &mut FrameContext<'_>) -> FrameReport {
        let dt = input.dt;
        self.timers.update(dt);
        self.presentation.advance(dt);

        let action = {
            let mut actions = ActionContext {
                settings: &mut *ctx.settings,
                privileges: ctx.privileges,
                status: &mut *ctx.status,
                minimap_allowed: input.minimap_allowed,
            };
            self.router.process(&input.keys, input.text_focus, dt, &mut actions)
        };
        if action == RouterOutcome::Suppressed {
            input.keys.clear();
            input.dig = ButtonState::default();
            input.place = ButtonState::default();
        }
        self.settings = InteractionSettings::from_store(&*ctx.settings);

        let item = self.items.get(&input.wielded.name);
        let ray = if input.camera.mode == CameraMode::ThirdPersonFront {
            Ray::empty(input.camera.position)
        } else {
            Ray::new(input.camera.position, input.camera.direction, self.reach(item))
        };
        let pointed = TargetResolver::new(&*ctx.world, &self.nodes).resolve(
            &ray,
            item.liquids_pointable,
            !self.dig.ldown_for_dig(),
        );
        let pointed_changed = pointed != self.pointed_old;
        if pointed_changed {
            debug!(?pointed, "Pointing at");
        }
        if matches!(pointed, PointedTarget::Object { .. }) && !self.show_entity_selectionbox {
            ctx.selection.set_selection(&PointedTarget::Nothing);
        } else {
            ctx.selection.set_selection(&pointed);
        }

        let mut report = FrameReport::new(action, pointed, pointed_changed);
        report.dig_cancelled = self.dig.check_cancel(
            &pointed,
            input.dig.held,
            input.dig.released,
            ctx.network,
            &mut self.timers,
        );

        if input.place.held {
            self.timers.repeat_rightclick += dt;
        } else {
            self.timers.repeat_rightclick = 0.0;
        }

        match pointed {
            _ if item.usable && input.dig.held => {
                if input.dig.clicked {
                    ctx.network.interact(InteractionKind::Use, &pointed);
                }
            }
            PointedTarget::Node { .. } => self.pointing_at_node(&pointed, &input, ctx, &mut report),
            PointedTarget::Object { id } => self.pointing_at_object(&pointed, id, &input, ctx, &mut report),
            PointedTarget::Nothing => {
                if !input.dig.held && input.place.clicked {
                    debug!("Right clicked in air");
                    ctx.network.interact(InteractionKind::ActivateNothing, &PointedTarget::Nothing);
                }
            }
        }

        self.pointed_old = pointed;

        let dispatch = DispatchContext {
            hp: input.hp,
            particles_enabled: self.settings.particles,
            clouds_enabled: self.settings.clouds,
        };
        report.events = self
            .dispatcher
            .drain(ctx.events, &mut self.presentation, &dispatch);
        report
    }

    fn pointing_at_node(
        &mut self,
        pointed: &PointedTarget,
        input: &FrameInput,
        ctx: &mut FrameContext<'_>,
        report: &mut FrameReport,
    ) {
        let PointedTarget::Node { under, above, .. } = *pointed else {
            return;
        };
        let item = self.items.get(&input.wielded.name);
        let can_interact = ctx.privileges.has_privilege("interact");

        let digging = self.timers.nodig <= 0.0 && input.dig.held && can_interact;
        if digging {
            let tool = self.items.tool_capabilities(&input.wielded);
            let dig_input = DigInput {
                target: pointed,
                dig_held: input.dig.held,
                can_interact,
                tool: &tool,
                hand: self.items.hand().tool_capabilities.as_ref(),
                dt: input.dt,
            };
            report.dig = self.dig.update(
                &dig_input,
                &self.nodes,
                &mut *ctx.world,
                &mut *ctx.network,
                &mut self.timers,
            );
            self.timers.noplace = NOPLACE_AFTER_DIG;
        }

        let repeat = self.timers.repeat_rightclick >= self.settings.repeat_rightclick_time;
        if !(input.place.clicked || repeat) || digging || self.timers.noplace > 0.0 || !can_interact {
            return;
        }
        self.timers.repeat_rightclick = 0.0;
        debug!(?under, "Ground right-clicked");

        let under_content = ctx.world.node(under).map_or(CONTENT_IGNORE, |n| n.content);
        let rightclickable = self.nodes.get(under_content).rightclickable;

        let formspec = ctx.world.node_formspec(under).filter(|spec| !spec.is_empty());
        if let Some(spec) = formspec
            && !input.keys.sneak_held
        {
            if rightclickable {
                ctx.network.interact(InteractionKind::Place, pointed);
            }
            debug!(?under, "Opening node form");
            self.presentation.formspec = Some(ActiveForm {
                name: String::new(),
                spec,
                source: FormSource::Node(under),
            });
            report.opened_form = true;
            return;
        }

        let overrides = PlacementOverrides {
            build_where_you_stand: self.settings.build_where_you_stand,
            noclip: self.settings.noclip && ctx.privileges.has_privilege("noclip"),
        };
        let player = PlayerBody::at(input.player_position, self.player_height);
        report.placed = PlacementPredictor::new(&self.nodes).try_place(
            item,
            &input.wielded,
            under,
            above,
            &player,
            overrides,
            &mut *ctx.world,
        );

        let no_prediction = item
            .node_placement_prediction
            .as_deref()
            .is_none_or(str::is_empty);
        if report.placed.is_some() || no_prediction || rightclickable {
            ctx.network.interact(InteractionKind::Place, pointed);
        }
    }

    fn pointing_at_object(
        &mut self,
        pointed: &PointedTarget,
        id: ObjectId,
        input: &FrameInput,
        ctx: &mut FrameContext<'_>,
        report: &mut FrameReport,
    ) {
        let item = self.items.get(&input.wielded.name);
        let nohit = group_rating(&item.groups, "nohit") != 0;

        if input.dig.held && !nohit {
            if self.timers.object_hit > 0.0 {
                return;
            }
            self.timers.object_hit = self.object_hit_delay;

            let caps = self.items.tool_capabilities(&input.wielded);
            let hit = ctx
                .world
                .object(id)
                .map(|object| hit_params(&object.armor_groups, &caps, self.timers.time_from_last_punch));
            self.timers.time_from_last_punch = 0.0;
            if let Some(hit) = hit {
                debug!(id, hp = hit.hp, "Punched object");
                report.punched = Some((id, hit));
            }
            ctx.network.interact(InteractionKind::PunchObject, pointed);
        } else if input.place.clicked || (input.dig.clicked && nohit) {
            debug!(id, "Right-clicked object");
            ctx.network.interact(InteractionKind::Place, pointed);
        }
    }
}
