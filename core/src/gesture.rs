use serde::{Deserialize, Serialize};

use crate::transform::TransformDelta;

pub const MOVE_SENSITIVITY: f32 = 0.005;
pub const ROTATE_SENSITIVITY: f32 = 0.4;
pub const SCALE_DRAG_SENSITIVITY: f32 = 0.005;
pub const SCALE_DRAG_FACTOR_MIN: f32 = 0.01;
pub const PINCH_MIN_DISTANCE_PX: f32 = 8.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureMode {
    #[default]
    None,
    Move,
    Rotate,
    Scale,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerPoint {
    pub x: f32,
    pub y: f32,
}

impl PointerPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Orientation of the viewing camera, used to make Move drags feel
/// camera-relative instead of screen-absolute.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraPose {
    pub yaw_deg: f32,
    pub pitch_deg: f32,
}

impl CameraPose {
    pub fn right(&self) -> [f32; 3] {
        let yaw = self.yaw_deg.to_radians();
        [yaw.cos(), 0.0, -yaw.sin()]
    }

    pub fn up(&self) -> [f32; 3] {
        let yaw = self.yaw_deg.to_radians();
        let pitch = self.pitch_deg.to_radians();
        [
            yaw.sin() * pitch.sin(),
            pitch.cos(),
            yaw.cos() * pitch.sin(),
        ]
    }
}

/// Per-interaction drag state. Created on pointer-down, dropped on
/// pointer-up/cancel or when the interaction mode changes.
#[derive(Clone, Copy, Debug)]
struct GestureSession {
    last: PointerPoint,
    last_pinch_distance: Option<f32>,
}

#[derive(Debug, Default)]
pub struct GestureController {
    mode: GestureMode,
    session: Option<GestureSession>,
}

impl GestureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> GestureMode {
        self.mode
    }

    /// Switching modes discards any in-progress gesture so a drag started
    /// in one mode can never leak deltas into another.
    pub fn set_mode(&mut self, mode: GestureMode) {
        if self.mode != mode {
            self.session = None;
        }
        self.mode = mode;
    }

    pub fn gesture_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn pointer_down(&mut self, point: PointerPoint) {
        if self.mode == GestureMode::None {
            return;
        }
        self.session = Some(GestureSession {
            last: point,
            last_pinch_distance: None,
        });
    }

    pub fn pointer_up(&mut self) {
        self.session = None;
    }

    pub fn pointer_move(
        &mut self,
        point: PointerPoint,
        camera: &CameraPose,
    ) -> Option<TransformDelta> {
        let session = self.session.as_mut()?;
        let dx = point.x - session.last.x;
        let dy = point.y - session.last.y;
        session.last = point;
        // A single-pointer move right after a pinch would otherwise jump.
        session.last_pinch_distance = None;

        match self.mode {
            GestureMode::None => None,
            GestureMode::Move => {
                let right = camera.right();
                let up = camera.up();
                let mut translate = [0.0f32; 3];
                for axis in 0..3 {
                    translate[axis] =
                        (right[axis] * dx - up[axis] * dy) * MOVE_SENSITIVITY;
                }
                Some(TransformDelta::translate(translate))
            }
            GestureMode::Rotate => Some(TransformDelta::rotate_deg([
                dy * ROTATE_SENSITIVITY,
                dx * ROTATE_SENSITIVITY,
                0.0,
            ])),
            GestureMode::Scale => {
                let factor = (1.0 - dy * SCALE_DRAG_SENSITIVITY).max(SCALE_DRAG_FACTOR_MIN);
                Some(TransformDelta::scale_factor(factor))
            }
        }
    }

    /// Two-pointer pinch path; only meaningful in Scale mode. The first
    /// sample seeds the reference distance and produces no delta.
    pub fn pinch_move(&mut self, a: PointerPoint, b: PointerPoint) -> Option<TransformDelta> {
        if self.mode != GestureMode::Scale {
            return None;
        }
        let session = self.session.as_mut()?;
        let distance = a.distance(b);
        if distance < PINCH_MIN_DISTANCE_PX {
            return None;
        }
        let delta = session
            .last_pinch_distance
            .map(|previous| TransformDelta::scale_factor(distance / previous));
        session.last_pinch_distance = Some(distance);
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facing_forward() -> CameraPose {
        CameraPose::default()
    }

    #[test]
    fn no_delta_without_pointer_down() {
        let mut controller = GestureController::new();
        controller.set_mode(GestureMode::Move);
        let delta = controller.pointer_move(PointerPoint::new(10.0, 10.0), &facing_forward());
        assert!(delta.is_none());
    }

    #[test]
    fn move_is_camera_relative() {
        let mut controller = GestureController::new();
        controller.set_mode(GestureMode::Move);
        controller.pointer_down(PointerPoint::new(0.0, 0.0));

        // Camera turned 90 degrees: screen-right is world -z.
        let camera = CameraPose {
            yaw_deg: 90.0,
            pitch_deg: 0.0,
        };
        let delta = controller
            .pointer_move(PointerPoint::new(10.0, 0.0), &camera)
            .expect("delta");
        assert!(delta.translate[0].abs() < 1e-6);
        assert!(delta.translate[2] < 0.0);
    }

    #[test]
    fn drag_up_moves_object_up() {
        let mut controller = GestureController::new();
        controller.set_mode(GestureMode::Move);
        controller.pointer_down(PointerPoint::new(0.0, 100.0));
        let delta = controller
            .pointer_move(PointerPoint::new(0.0, 80.0), &facing_forward())
            .expect("delta");
        assert!(delta.translate[1] > 0.0);
    }

    #[test]
    fn rotate_maps_axes_to_yaw_and_pitch() {
        let mut controller = GestureController::new();
        controller.set_mode(GestureMode::Rotate);
        controller.pointer_down(PointerPoint::new(0.0, 0.0));
        let delta = controller
            .pointer_move(PointerPoint::new(10.0, 5.0), &facing_forward())
            .expect("delta");
        assert_eq!(delta.rotate_deg[1], 10.0 * ROTATE_SENSITIVITY);
        assert_eq!(delta.rotate_deg[0], 5.0 * ROTATE_SENSITIVITY);
        assert_eq!(delta.rotate_deg[2], 0.0);
    }

    #[test]
    fn set_mode_discards_active_session() {
        let mut controller = GestureController::new();
        controller.set_mode(GestureMode::Move);
        controller.pointer_down(PointerPoint::new(0.0, 0.0));
        controller.set_mode(GestureMode::Rotate);
        assert!(!controller.gesture_active());
        let delta = controller.pointer_move(PointerPoint::new(5.0, 5.0), &facing_forward());
        assert!(delta.is_none());
    }

    #[test]
    fn pinch_needs_a_reference_sample() {
        let mut controller = GestureController::new();
        controller.set_mode(GestureMode::Scale);
        controller.pointer_down(PointerPoint::new(0.0, 0.0));
        let first = controller.pinch_move(PointerPoint::new(0.0, 0.0), PointerPoint::new(100.0, 0.0));
        assert!(first.is_none());
        let second = controller
            .pinch_move(PointerPoint::new(0.0, 0.0), PointerPoint::new(200.0, 0.0))
            .expect("delta");
        assert!((second.scale_factor - 2.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_pinch_distance_is_ignored() {
        let mut controller = GestureController::new();
        controller.set_mode(GestureMode::Scale);
        controller.pointer_down(PointerPoint::new(0.0, 0.0));
        let delta = controller.pinch_move(PointerPoint::new(0.0, 0.0), PointerPoint::new(1.0, 0.0));
        assert!(delta.is_none());
        assert!(controller.gesture_active());
    }

    #[test]
    fn pinch_outside_scale_mode_is_ignored() {
        let mut controller = GestureController::new();
        controller.set_mode(GestureMode::Move);
        controller.pointer_down(PointerPoint::new(0.0, 0.0));
        let delta = controller.pinch_move(PointerPoint::new(0.0, 0.0), PointerPoint::new(90.0, 0.0));
        assert!(delta.is_none());
    }

    #[test]
    fn scale_drag_up_grows_the_object() {
        let mut controller = GestureController::new();
        controller.set_mode(GestureMode::Scale);
        controller.pointer_down(PointerPoint::new(0.0, 100.0));
        let delta = controller
            .pointer_move(PointerPoint::new(0.0, 60.0), &facing_forward())
            .expect("delta");
        assert!(delta.scale_factor > 1.0);
    }
}
