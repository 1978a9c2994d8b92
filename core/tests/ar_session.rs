use ukabe_core::camera::{AttemptError, CameraMachine, CameraPhase, CameraStep, ConstraintTier};
use ukabe_core::gesture::{CameraPose, GestureController, GestureMode, PointerPoint};
use ukabe_core::tracking::{TrackingEffect, TrackingMachine, TrackingMode, GRACE_PERIOD_MS};
use ukabe_core::transform::{PlacedTransform, SCALE_MAX, SCALE_MIN};

/// Mirrors the scene layer: replays tracking effects into two visibility
/// flags so tests can assert what the user would actually see.
#[derive(Default)]
struct SceneProbe {
    anchored_visible: bool,
    fallback_visible: bool,
    orientation_attached: bool,
}

impl SceneProbe {
    fn replay(&mut self, effects: &[TrackingEffect]) {
        for effect in effects {
            match effect {
                TrackingEffect::ShowAnchored => self.anchored_visible = true,
                TrackingEffect::HideAnchored => self.anchored_visible = false,
                TrackingEffect::ShowFallback => self.fallback_visible = true,
                TrackingEffect::HideFallback => self.fallback_visible = false,
                TrackingEffect::AttachOrientation => self.orientation_attached = true,
                TrackingEffect::DetachOrientation => self.orientation_attached = false,
            }
        }
        assert!(
            !(self.anchored_visible && self.fallback_visible),
            "anchored and fallback content visible at once"
        );
    }
}

#[test]
fn tracking_walkthrough_found_lost_silence() {
    let mut machine = TrackingMachine::new();
    let mut scene = SceneProbe::default();

    scene.replay(&machine.start(0.0));
    assert_eq!(machine.mode(), TrackingMode::Searching);

    scene.replay(&machine.marker_found(500.0));
    assert_eq!(machine.mode(), TrackingMode::Tracked);
    assert!(scene.anchored_visible);

    scene.replay(&machine.marker_lost(1_000.0));
    assert_eq!(machine.mode(), TrackingMode::Searching);
    assert!(!scene.anchored_visible);
    assert!(!scene.fallback_visible, "fallback must wait out the grace");

    scene.replay(&machine.tick(1_000.0 + GRACE_PERIOD_MS - 50.0));
    assert!(!scene.fallback_visible);

    scene.replay(&machine.tick(1_000.0 + GRACE_PERIOD_MS));
    assert_eq!(machine.mode(), TrackingMode::FallbackFloating);
    assert!(scene.fallback_visible);
    assert!(scene.orientation_attached);
}

#[test]
fn tracking_blip_never_shows_fallback() {
    let mut machine = TrackingMachine::new();
    let mut scene = SceneProbe::default();

    scene.replay(&machine.start(0.0));
    scene.replay(&machine.marker_found(500.0));
    scene.replay(&machine.marker_lost(1_000.0));
    scene.replay(&machine.marker_found(1_800.0));
    assert_eq!(machine.mode(), TrackingMode::Tracked);
    assert!(scene.anchored_visible);
    assert!(!scene.fallback_visible);

    // Ticks past the stale deadline change nothing.
    scene.replay(&machine.tick(1_000.0 + GRACE_PERIOD_MS + 1.0));
    assert_eq!(machine.mode(), TrackingMode::Tracked);
    assert!(!scene.fallback_visible);
}

#[test]
fn acquisition_ideal_rejected_minimal_accepted() {
    let mut machine = CameraMachine::new();
    let ticket = machine.begin();
    assert_eq!(ticket.tier, ConstraintTier::Ideal);

    let mut minimal_retries = 0;
    let step = machine.on_failure(ticket.generation, AttemptError::Other);
    let CameraStep::Retry(retry) = step else {
        panic!("expected retry, got {:?}", step);
    };
    if retry.tier == ConstraintTier::Minimal {
        minimal_retries += 1;
    }
    assert!(machine.on_success(retry.generation));

    assert_eq!(machine.phase(), CameraPhase::Active);
    assert_eq!(minimal_retries, 1);
}

#[test]
fn acquisition_never_loops_silently() {
    // Whatever mix of transient errors comes back, the machine lands in a
    // terminal phase within the attempt budget.
    let errors = [AttemptError::Timeout, AttemptError::NoDevice, AttemptError::Other];
    for error in errors {
        let mut machine = CameraMachine::new();
        let mut ticket = machine.begin();
        let mut steps = 0;
        loop {
            steps += 1;
            assert!(steps < 32, "acquisition loop did not terminate");
            match machine.on_failure(ticket.generation, error) {
                CameraStep::Retry(next) => ticket = next,
                CameraStep::Degraded(phase) => {
                    assert_eq!(phase, CameraPhase::Failed);
                    break;
                }
                CameraStep::Stale => panic!("unexpected stale step"),
            }
        }
        assert_eq!(machine.phase(), CameraPhase::Failed);
    }
}

#[test]
fn gesture_history_cannot_escape_scale_bounds() {
    let mut controller = GestureController::new();
    let mut transform = PlacedTransform::default();
    let camera = CameraPose::default();

    controller.set_mode(GestureMode::Scale);
    controller.pointer_down(PointerPoint::new(0.0, 0.0));
    // A long erratic drag: huge swings in both directions.
    for step in 0..200 {
        let y = if step % 2 == 0 { 5_000.0 } else { -5_000.0 };
        if let Some(delta) = controller.pointer_move(PointerPoint::new(0.0, y), &camera) {
            transform.apply(&delta);
        }
        assert!(transform.scale >= SCALE_MIN && transform.scale <= SCALE_MAX);
    }
    controller.pointer_up();

    transform.reset();
    assert_eq!(transform, PlacedTransform::default());
}
