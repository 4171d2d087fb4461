//! Timed digging: turns a held dig button on a node into crack progress and,
//! when the timer runs out, a finished dig.
//!
//! States are `Idle → Digging → {Completed, Cancelled} → Idle`. At most one
//! [`DigSession`] exists at a time. Cancellation is detected by inspecting
//! the next frame's input and target in [`DigController::check_cancel`].

use glam::IVec3;
use quarry_voxel::{CONTENT_IGNORE, NodeRegistry, ToolCapabilities, dig_params};
use tracing::{debug, info};

use crate::pointed::PointedTarget;
use crate::ports::{InteractionKind, NetworkSession, WorldView};
use crate::timers::InteractTimers;

/// Crack stages a dig passes through unless configured otherwise.
pub const DEFAULT_CRACK_ANIMATION_LENGTH: u16 = 5;

/// Dig time given to nodes nothing can dig. Keeps the session alive forever.
const UNDIGGABLE_TIME: f32 = 10_000_000.0;

/// Digs at least this long show no crack.
const HIDDEN_CRACK_TIME: f32 = 100_000.0;

const MAX_NODIG_DELAY: f32 = 0.3;
const INSTANT_NODIG_DELAY: f32 = 0.15;

/// Placement lockout after digging.
pub const NOPLACE_AFTER_DIG: f32 = 1.0;

/// An in-progress dig.
#[derive(Clone, Debug, PartialEq)]
pub struct DigSession {
    /// Node being dug.
    pub target: IVec3,
    /// Target as pointed during the last dig frame.
    pub pointed: PointedTarget,
    /// Seconds of digging so far.
    pub elapsed: f32,
    /// Seconds the dig takes in total.
    pub required: f32,
    /// Dig completes on its first frame.
    pub instant: bool,
    /// Current crack stage.
    pub stage: u16,
    /// Group that decided the dig time.
    pub main_group: String,
}

/// One frame's dig request.
pub struct DigInput<'a> {
    /// Resolved target this frame.
    pub target: &'a PointedTarget,
    /// Dig button held.
    pub dig_held: bool,
    /// Player holds the `interact` privilege.
    pub can_interact: bool,
    /// Capabilities of the held item.
    pub tool: &'a ToolCapabilities,
    /// Hand capabilities, tried when the held item cannot dig the node.
    pub hand: Option<&'a ToolCapabilities>,
    /// Frame time in seconds.
    pub dt: f32,
}

/// What a dig frame did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigOutcome {
    /// No dig this frame.
    Idle,
    /// A new dig began.
    Started {
        /// Crack stage after the first frame.
        stage: u16,
    },
    /// A dig progressed.
    Digging {
        /// Current crack stage.
        stage: u16,
    },
    /// The dig finished and the node was removed locally.
    Completed {
        /// The dug node.
        node: IVec3,
    },
    /// The dig was abandoned.
    Cancelled,
}

impl DigOutcome {
    /// Returns `true` when a dig ran this frame.
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Idle | Self::Cancelled)
    }
}

/// Drives [`DigSession`]s.
pub struct DigController {
    session: Option<DigSession>,
    crack_length: u16,
    crack: Option<(IVec3, u16)>,
    ldown_for_dig: bool,
    last_dig_instant: bool,
}

impl DigController {
    /// Creates a controller with `crack_length` crack stages (at least one).
    pub fn new(crack_length: u16) -> Self {
        Self {
            session: None,
            crack_length: crack_length.max(1),
            crack: None,
            ldown_for_dig: false,
            last_dig_instant: false,
        }
    }

    /// The active dig, if any.
    pub fn session(&self) -> Option<&DigSession> {
        self.session.as_ref()
    }

    /// Returns `true` while a dig is in progress.
    pub fn is_digging(&self) -> bool {
        self.session.is_some()
    }

    /// Crack to draw: node and stage. `None` when hidden.
    pub fn crack(&self) -> Option<(IVec3, u16)> {
        self.crack
    }

    /// Returns `true` while the button that started a dig is still held.
    /// Objects are not pointable meanwhile.
    pub fn ldown_for_dig(&self) -> bool {
        self.ldown_for_dig
    }

    /// Cancels the active dig when the button is up or the target moved to a
    /// different node. Returns `true` if a dig was cancelled.
    ///
    /// Moving to another face of the same node keeps the dig.
    pub fn check_cancel(
        &mut self,
        pointed: &PointedTarget,
        dig_held: bool,
        dig_released: bool,
        network: &mut dyn NetworkSession,
        timers: &mut InteractTimers,
    ) -> bool {
        let mut cancelled = false;

        if let Some(session) = &self.session {
            let stop = if dig_released || !dig_held {
                debug!("Dig button released (stopped digging)");
                true
            } else if *pointed != session.pointed && !pointed.same_node(&session.pointed) {
                debug!("Pointing away from node (stopped digging)");
                true
            } else {
                false
            };

            if stop {
                network.interact(InteractionKind::StopDig, &session.pointed);
                self.crack = None;
                self.session = None;
                cancelled = true;
            }
        } else if self.last_dig_instant && dig_released {
            // Clicking digs instant nodes as fast as the player can click.
            timers.nodig = 0.0;
            self.last_dig_instant = false;
        }

        if self.session.is_none() && self.ldown_for_dig && !dig_held {
            self.ldown_for_dig = false;
        }

        cancelled
    }

    /// Runs one dig frame against the node in `input.target`.
    ///
    /// Returns [`DigOutcome::Idle`] unless the button is held on a node, the
    /// player may interact and the no-dig delay has expired.
    pub fn update(
        &mut self,
        input: &DigInput<'_>,
        nodes: &NodeRegistry,
        world: &mut dyn WorldView,
        network: &mut dyn NetworkSession,
        timers: &mut InteractTimers,
    ) -> DigOutcome {
        let Some(pos) = input.target.under() else {
            return DigOutcome::Idle;
        };
        if !input.dig_held || !input.can_interact || timers.nodig > 0.0 {
            return DigOutcome::Idle;
        }

        let content = world.node(pos).map_or(CONTENT_IGNORE, |n| n.content);
        let groups = &nodes.get(content).groups;
        let mut params = dig_params(groups, input.tool);
        if !params.diggable
            && let Some(hand) = input.hand
        {
            params = dig_params(groups, hand);
        }
        let required = if params.diggable {
            params.time
        } else {
            UNDIGGABLE_TIME
        };

        let started = self.session.is_none();
        if started {
            let instant = required == 0.0;
            debug!(?pos, required, instant, group = %params.main_group, "Started digging");
            network.interact(InteractionKind::StartDig, input.target);
            self.last_dig_instant = instant;
            self.ldown_for_dig = true;
            self.session = Some(DigSession {
                target: pos,
                pointed: *input.target,
                elapsed: 0.0,
                required,
                instant,
                stage: 0,
                main_group: params.main_group.clone(),
            });
        }
        let Some(session) = self.session.as_mut() else {
            return DigOutcome::Idle;
        };

        session.required = required;
        session.pointed = *input.target;
        if required < HIDDEN_CRACK_TIME {
            session.elapsed += input.dt;
        } else {
            session.elapsed = 0.0;
        }

        let len = self.crack_length;
        session.stage = if session.instant || session.required <= 0.0 {
            len
        } else {
            let ratio = session.elapsed / session.required;
            ((len as f32 * ratio).floor() as u16).min(len)
        };
        let stage = session.stage;

        if required >= HIDDEN_CRACK_TIME {
            self.crack = None;
            return if started {
                DigOutcome::Started { stage: 0 }
            } else {
                DigOutcome::Digging { stage: 0 }
            };
        }

        if stage < len {
            self.crack = Some((pos, stage));
            return if started {
                DigOutcome::Started { stage }
            } else {
                DigOutcome::Digging { stage }
            };
        }

        // Completed.
        let instant = session.instant;
        info!(?pos, group = %session.main_group, "Digging completed");
        timers.noplace = NOPLACE_AFTER_DIG;
        network.interact(InteractionKind::FinishDig, input.target);
        self.crack = None;
        self.session = None;

        let delay = required / len as f32;
        timers.nodig = if delay > MAX_NODIG_DELAY {
            MAX_NODIG_DELAY
        } else if instant {
            INSTANT_NODIG_DELAY
        } else {
            delay
        };

        if world.node(pos).is_some() {
            world.remove_node(pos);
        }

        DigOutcome::Completed { node: pos }
    }
}

impl Default for DigController {
    fn default() -> Self {
        Self::new(DEFAULT_CRACK_ANIMATION_LENGTH)
    }
}
