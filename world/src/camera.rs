//! World-space camera focus and player-follow behaviour.

use harvest_defence_core::{Position, Viewport};

/// Distance the player may stray from the focus before the camera trails.
const FOLLOW_MARGIN: i32 = 5;

/// Holds the world-space focus the view is centred on.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Camera {
    focus: Position,
    extent: u32,
}

impl Camera {
    pub(crate) fn new(focus: Position, extent: u32) -> Self {
        Self { focus, extent }
    }

    /// Shifts the focus by the provided delta.
    pub(crate) fn move_focus(&mut self, dx: i32, dy: i32) {
        self.focus = self.focus.offset(dx, dy);
    }

    /// Trails a player step: once the player leaves the follow box, the
    /// camera repeats the step that pushed them out.
    pub(crate) fn follow(&mut self, player: Position, step: (i32, i32)) {
        let x_exceeded = (self.focus.x() - player.x()).abs() >= FOLLOW_MARGIN;
        let y_exceeded = (self.focus.y() - player.y()).abs() >= FOLLOW_MARGIN;

        if x_exceeded || y_exceeded {
            self.move_focus(step.0, step.1);
        }
    }

    /// Current view rectangle for visibility and alert partitioning.
    pub(crate) fn viewport(&self) -> Viewport {
        Viewport::new(self.focus, self.extent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_holds_still_inside_the_follow_box() {
        let mut camera = Camera::new(Position::new(10, 10), 40);
        camera.follow(Position::new(13, 10), (1, 0));
        assert_eq!(camera.viewport().focus(), Position::new(10, 10));
    }

    #[test]
    fn camera_trails_once_the_margin_is_reached() {
        let mut camera = Camera::new(Position::new(10, 10), 40);
        camera.follow(Position::new(15, 10), (1, 0));
        assert_eq!(camera.viewport().focus(), Position::new(11, 10));
    }

    #[test]
    fn vertical_strays_also_drag_the_camera() {
        let mut camera = Camera::new(Position::new(0, 0), 40);
        camera.follow(Position::new(0, -5), (0, -1));
        assert_eq!(camera.viewport().focus(), Position::new(0, -1));
    }
}
