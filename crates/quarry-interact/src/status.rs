//! The transient status line shown after toggles.

use crate::ports::StatusSink;

/// One status message and how long it has been visible.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub elapsed: f32,
    pub duration: f32,
}

impl StatusMessage {
    /// Opacity in `[0, 1]`, fading quadratically over the duration.
    pub fn alpha(&self) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        1.0 - t * t
    }

    pub fn expired(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Holds at most one [`StatusMessage`]; each new one replaces the last.
#[derive(Debug, Default)]
pub struct StatusText {
    current: Option<StatusMessage>,
}

impl StatusText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&StatusMessage> {
        self.current.as_ref()
    }

    /// Ages the message and drops it once expired.
    pub fn advance(&mut self, dt: f32) {
        if let Some(message) = &mut self.current {
            message.elapsed += dt;
            if message.expired() {
                self.current = None;
            }
        }
    }
}

impl StatusSink for StatusText {
    fn show_status(&mut self, text: String, seconds: f32) {
        self.current = Some(StatusMessage {
            text,
            elapsed: 0.0,
            duration: seconds,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_message_replaces_old() {
        let mut status = StatusText::new();
        status.show_status("Fly mode enabled".into(), 2.0);
        status.advance(1.0);
        status.show_status("Fast move enabled".into(), 2.0);

        let current = status.current().unwrap();
        assert_eq!(current.text, "Fast move enabled");
        assert_eq!(current.elapsed, 0.0);
    }

    #[test]
    fn test_fades_then_expires() {
        let mut status = StatusText::new();
        status.show_status("HUD hidden".into(), 2.0);
        assert_eq!(status.current().unwrap().alpha(), 1.0);

        status.advance(1.0);
        assert_eq!(status.current().unwrap().alpha(), 0.75);

        status.advance(1.0);
        assert!(status.current().is_none());
    }
}
