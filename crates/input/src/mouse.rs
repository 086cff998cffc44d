use crate::action::Action;

/// Right-button drag look.
///
/// The last cursor position is tracked on every move, dragging or not, so
/// pressing the button never produces a jump from a stale position.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseLook {
    last: Option<(f64, f64)>,
    dragging: bool,
    sensitivity: f32,
}

impl MouseLook {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            last: None,
            dragging: false,
            sensitivity,
        }
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        if dragging != self.dragging {
            tracing::debug!(dragging, "mouse look");
        }
        self.dragging = dragging;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Feed a cursor position in window pixels. Returns a look action when
    /// dragging and the cursor actually moved.
    pub fn cursor_moved(&mut self, x: f64, y: f64) -> Option<Action> {
        let previous = self.last.replace((x, y))?;
        if !self.dragging {
            return None;
        }
        let dx = (x - previous.0) as f32;
        let dy = (y - previous.1) as f32;
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        Some(Action::Look {
            pitch: dy * self.sensitivity,
            yaw: dx * self.sensitivity,
        })
    }

    /// Forget the last position, e.g. when the cursor leaves the window.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_move_only_records_position() {
        let mut look = MouseLook::new(0.005);
        look.set_dragging(true);
        assert_eq!(look.cursor_moved(100.0, 100.0), None);
    }

    #[test]
    fn drag_produces_scaled_pitch_and_yaw() {
        let mut look = MouseLook::new(0.5);
        look.cursor_moved(10.0, 10.0);
        look.set_dragging(true);
        assert_eq!(
            look.cursor_moved(14.0, 8.0),
            Some(Action::Look {
                pitch: -1.0,
                yaw: 2.0
            })
        );
    }

    #[test]
    fn position_tracked_while_not_dragging() {
        let mut look = MouseLook::new(1.0);
        look.cursor_moved(0.0, 0.0);
        assert_eq!(look.cursor_moved(50.0, 50.0), None);
        look.set_dragging(true);
        // delta is measured from (50, 50), not from the origin
        assert_eq!(
            look.cursor_moved(51.0, 50.0),
            Some(Action::Look {
                pitch: 0.0,
                yaw: 1.0
            })
        );
    }

    #[test]
    fn reset_forgets_last_position() {
        let mut look = MouseLook::new(1.0);
        look.set_dragging(true);
        look.cursor_moved(5.0, 5.0);
        look.reset();
        assert_eq!(look.cursor_moved(500.0, 500.0), None);
        assert!(look.is_dragging());
    }
}
