//! Client interaction core: what the player points at, digging, optimistic
//! placement, server event dispatch, and key-driven toggles.
//!
//! Everything here runs once per rendered frame on a single thread. The
//! outside world is reached only through the traits in [`ports`], so every
//! component can be driven by in-memory doubles.

pub mod actions;
pub mod clock;
pub mod dig;
pub mod dispatcher;
pub mod events;
pub mod frame;
pub mod hud;
pub mod placement;
pub mod pointed;
pub mod ports;
pub mod resolver;
pub mod status;
pub mod timers;

pub use actions::{ActionContext, InputActionRouter, KeyAction, KeyInput, MinimapMode, MinimapShape, RouterOutcome, ViewFlags};
pub use clock::{FocusState, FrameClock, FrameLimits, FrameTiming, MAX_FRAME_TIME, frame_budget};
pub use dig::{DigController, DigInput, DigOutcome, DigSession};
pub use dispatcher::{ActiveForm, DispatchContext, EventDispatcher, FormSource, PresentationState, SkyState};
pub use events::{CloudParams, ParticleSpawnerSpec, ParticleSpec, ServerEvent};
pub use frame::{ButtonState, CameraMode, CameraView, FrameContext, FrameInput, FrameReport, InteractionCore, InteractionSettings};
pub use hud::{HudChange, HudElement, HudElementType, HudError, HudTable};
pub use placement::{PlacementOverrides, PlacementPredictor, PlacementRefusal, PlayerBody, PredictedPlacement};
pub use pointed::{ObjectId, PointedTarget, Ray};
pub use ports::{ActiveObject, EventQueue, InteractionKind, NetworkSession, Privileges, SelectionSink, StatusSink, WorldView};
pub use resolver::TargetResolver;
pub use status::{StatusMessage, StatusText};
pub use timers::InteractTimers;

#[cfg(test)]
mod test_support;
