//! Frame pacing: caps the loop at `fps_max`, or `pause_fps_max` while a menu
//! pauses the game, by sleeping away whatever the frame did not use.

use std::thread;
use std::time::{Duration, Instant};

use quarry_config::SettingsStore;
use tracing::warn;

/// Longest frame time handed to the interaction core, in seconds. Longer
/// stalls are clamped so timers do not jump.
pub const MAX_FRAME_TIME: f32 = 0.25;

/// Budget of a paused, unfocused window on throttled platforms.
const BACKGROUND_FRAME_TIME: Duration = Duration::from_secs(1);

/// Frame rate caps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameLimits {
    pub fps_max: f32,
    pub pause_fps_max: f32,
}

impl FrameLimits {
    /// Reads `fps_max` and `pause_fps_max`.
    pub fn from_settings(settings: &dyn SettingsStore) -> Self {
        Self {
            fps_max: settings.get_float("fps_max"),
            pause_fps_max: settings.get_float("pause_fps_max"),
        }
    }
}

impl Default for FrameLimits {
    fn default() -> Self {
        Self {
            fps_max: 60.0,
            pause_fps_max: 15.0,
        }
    }
}

/// Whether the game is paused by a menu and whether its window has focus.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FocusState {
    pub paused: bool,
    pub focused: bool,
}

/// Minimum duration of one frame. Zero means uncapped.
///
/// With `throttle_background` set, a paused game in an unfocused window runs
/// at one frame per second.
pub fn frame_budget(limits: FrameLimits, focus: FocusState, throttle_background: bool) -> Duration {
    if throttle_background && focus.paused && !focus.focused {
        return BACKGROUND_FRAME_TIME;
    }
    let fps = if focus.paused {
        limits.pause_fps_max
    } else {
        limits.fps_max
    };
    if fps <= 0.0 || !fps.is_finite() {
        return Duration::ZERO;
    }
    // A cap too small to express as a duration never lets the frame end early.
    Duration::try_from_secs_f32(1.0 / fps).unwrap_or(Duration::MAX)
}

/// Timing of one paced frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTiming {
    /// Time spent working since the previous frame ended.
    pub busy: Duration,
    /// Time slept to honor the cap.
    pub sleep: Duration,
    /// Clamped frame time in seconds, for the next tick.
    pub dt: f32,
}

/// Measures frames and sleeps to cap their rate.
pub struct FrameClock {
    last_time: Instant,
    frame_count: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last_time: Instant::now(),
            frame_count: 0,
        }
    }

    /// Ends a frame: sleeps out the rest of the budget and returns the time
    /// since the previous call.
    pub fn limit(&mut self, limits: FrameLimits, focus: FocusState, throttle_background: bool) -> FrameTiming {
        let busy = self.last_time.elapsed();
        let sleep = sleep_time(busy, frame_budget(limits, focus, throttle_background));
        if !sleep.is_zero() {
            thread::sleep(sleep);
        }

        let now = Instant::now();
        let elapsed = now.duration_since(self.last_time).as_secs_f32();
        self.last_time = now;
        self.frame_count += 1;

        FrameTiming {
            busy,
            sleep,
            dt: clamp_frame_time(elapsed),
        }
    }

    /// Frames limited so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

fn sleep_time(busy: Duration, budget: Duration) -> Duration {
    budget.saturating_sub(busy)
}

fn clamp_frame_time(seconds: f32) -> f32 {
    if seconds > MAX_FRAME_TIME {
        warn!(
            "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
            seconds * 1000.0,
            MAX_FRAME_TIME * 1000.0
        );
        MAX_FRAME_TIME
    } else {
        seconds
    }
}
