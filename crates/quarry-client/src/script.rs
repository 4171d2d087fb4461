//! Scripted player input: dig a block, put it back, flip a few toggles.

use glam::Vec3;
use quarry_interact::{ButtonState, CameraMode, CameraView, DigOutcome, FrameInput, FrameReport, KeyAction, KeyInput};
use quarry_voxel::ItemStack;

pub const PICK: &str = "default:pick_stone";
pub const STONE: &str = "default:stone";

/// Seconds to wait after digging before placing.
const PLACE_DELAY: f32 = 1.2;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Dig { started: bool },
    Release,
    Wait { remaining: f32 },
    Place,
    Toggle,
    Idle,
}

pub struct Script {
    phase: Phase,
}

impl Script {
    pub fn new() -> Self {
        Self {
            phase: Phase::Dig { started: false },
        }
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// Input for the next frame, given the previous frame's report.
    pub fn next_input(&mut self, dt: f32, last: Option<&FrameReport>) -> FrameInput {
        if let Phase::Dig { started: true } = self.phase
            && let Some(report) = last
            && matches!(report.dig, DigOutcome::Completed { .. })
        {
            self.phase = Phase::Release;
        }

        let mut input = base_input(dt);
        self.phase = match self.phase {
            Phase::Dig { started } => {
                input.wielded = ItemStack::new(PICK, 1);
                input.dig = if started {
                    ButtonState::hold()
                } else {
                    ButtonState::click()
                };
                Phase::Dig { started: true }
            }
            Phase::Release => {
                input.wielded = ItemStack::new(PICK, 1);
                input.dig = ButtonState::release();
                Phase::Wait {
                    remaining: PLACE_DELAY,
                }
            }
            Phase::Wait { remaining } if remaining - dt <= 0.0 => Phase::Place,
            Phase::Wait { remaining } => Phase::Wait {
                remaining: remaining - dt,
            },
            Phase::Place => {
                input.place = ButtonState::click();
                Phase::Toggle
            }
            Phase::Toggle => {
                input.keys = KeyInput::pressing(&[KeyAction::FastMove]);
                Phase::Idle
            }
            Phase::Idle => Phase::Idle,
        };
        input
    }
}

/// Standing next to the origin, looking straight down at it.
fn base_input(dt: f32) -> FrameInput {
    FrameInput {
        dt,
        camera: CameraView {
            position: Vec3::new(0.5, 2.6, 0.5),
            direction: Vec3::NEG_Y,
            mode: CameraMode::FirstPerson,
        },
        player_position: Vec3::new(1.5, 1.0, 0.5),
        hp: 20,
        wielded: ItemStack::new(STONE, 8),
        minimap_allowed: true,
        ..FrameInput::default()
    }
}
