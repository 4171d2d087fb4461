//! Cooldowns between interactions.

/// Per-frame interaction cooldowns.
///
/// Delays count down while non-negative; an action is allowed once its delay
/// is zero or below.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InteractTimers {
    /// Delay before the next dig may start.
    pub nodig: f32,
    /// Delay before the next placement may happen.
    pub noplace: f32,
    /// Delay before the next damaging punch on an object.
    pub object_hit: f32,
    /// Seconds since the last damaging punch. Counts up.
    pub time_from_last_punch: f32,
    /// How long the secondary button has been held.
    pub repeat_rightclick: f32,
}

/// Time since the last punch at startup, long enough for a full-strength
/// first punch.
const INITIAL_PUNCH_AGE: f32 = 10.0;

impl InteractTimers {
    /// Timers at session start: no delays pending.
    pub fn new() -> Self {
        Self {
            time_from_last_punch: INITIAL_PUNCH_AGE,
            ..Self::default()
        }
    }

    /// Advances every timer by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        for delay in [&mut self.nodig, &mut self.object_hit, &mut self.noplace] {
            if *delay >= 0.0 {
                *delay -= dt;
            }
        }
        self.time_from_last_punch += dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delays_count_down() {
        let mut timers = InteractTimers {
            nodig: 0.25,
            noplace: 1.0,
            ..Default::default()
        };
        timers.update(0.5);
        assert_eq!(timers.nodig, -0.25);
        assert_eq!(timers.noplace, 0.5);
        assert_eq!(timers.time_from_last_punch, 0.5);
    }

    #[test]
    fn test_expired_delays_stop() {
        let mut timers = InteractTimers {
            nodig: -0.5,
            ..Default::default()
        };
        timers.update(1.0);
        assert_eq!(timers.nodig, -0.5);
        // object_hit started at 0 and took one step.
        assert_eq!(timers.object_hit, -1.0);
        timers.update(1.0);
        assert_eq!(timers.object_hit, -1.0);
    }

    #[test]
    fn test_first_punch_is_full_strength() {
        let timers = InteractTimers::new();
        assert_eq!(timers.time_from_last_punch, 10.0);
        assert_eq!(timers.nodig, 0.0);
    }
}
