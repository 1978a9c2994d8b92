use serde::{Deserialize, Serialize};

pub const GRACE_PERIOD_MS: f64 = 3000.0;
pub const SEARCH_FALLBACK_TIMEOUT_MS: f64 = 5000.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingMode {
    #[default]
    Searching,
    Tracked,
    FallbackFloating,
}

/// Side effects the runtime replays onto the scene. The machine itself
/// never touches the scene graph, which keeps it testable off-wasm.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackingEffect {
    ShowAnchored,
    HideAnchored,
    ShowFallback,
    HideFallback,
    AttachOrientation,
    DetachOrientation,
}

/// Marker/surface tracking lifecycle. Marker tracking on phones is flaky
/// (lighting, occlusion, motion blur), so a lost marker first runs a grace
/// window where nothing is shown; only after the window elapses does the
/// substitute object appear in orientation-driven floating mode.
#[derive(Debug, Default)]
pub struct TrackingMachine {
    mode: TrackingMode,
    grace_deadline_ms: Option<f64>,
    search_deadline_ms: Option<f64>,
    last_found_ms: Option<f64>,
}

impl TrackingMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> TrackingMode {
        self.mode
    }

    pub fn last_found_ms(&self) -> Option<f64> {
        self.last_found_ms
    }

    /// Arms the never-found timeout. Called once the camera feed is live
    /// and the provider starts scanning frames.
    pub fn start(&mut self, now_ms: f64) -> Vec<TrackingEffect> {
        self.mode = TrackingMode::Searching;
        self.grace_deadline_ms = None;
        self.search_deadline_ms = Some(now_ms + SEARCH_FALLBACK_TIMEOUT_MS);
        self.last_found_ms = None;
        vec![TrackingEffect::HideAnchored, TrackingEffect::HideFallback]
    }

    pub fn marker_found(&mut self, now_ms: f64) -> Vec<TrackingEffect> {
        let previous = self.mode;
        self.mode = TrackingMode::Tracked;
        self.grace_deadline_ms = None;
        self.search_deadline_ms = None;
        self.last_found_ms = Some(now_ms);

        let mut effects = Vec::new();
        if previous == TrackingMode::FallbackFloating {
            effects.push(TrackingEffect::HideFallback);
            effects.push(TrackingEffect::DetachOrientation);
        }
        effects.push(TrackingEffect::ShowAnchored);
        effects
    }

    pub fn marker_lost(&mut self, now_ms: f64) -> Vec<TrackingEffect> {
        if self.mode != TrackingMode::Tracked {
            return Vec::new();
        }
        self.mode = TrackingMode::Searching;
        self.grace_deadline_ms = Some(now_ms + GRACE_PERIOD_MS);
        vec![TrackingEffect::HideAnchored]
    }

    /// Periodic driver. Transitions Searching → FallbackFloating once the
    /// grace window (or the initial never-found window) has elapsed.
    pub fn tick(&mut self, now_ms: f64) -> Vec<TrackingEffect> {
        if self.mode != TrackingMode::Searching {
            return Vec::new();
        }
        let grace_elapsed = self
            .grace_deadline_ms
            .is_some_and(|deadline| now_ms >= deadline);
        let search_elapsed = self
            .search_deadline_ms
            .is_some_and(|deadline| now_ms >= deadline);
        if !grace_elapsed && !search_elapsed {
            return Vec::new();
        }
        self.enter_fallback()
    }

    /// Immediate fallback, used when the camera degrades and no frames
    /// will ever arrive; waiting out the search window would be pointless.
    pub fn force_fallback(&mut self) -> Vec<TrackingEffect> {
        if self.mode == TrackingMode::FallbackFloating {
            return Vec::new();
        }
        let was_tracked = self.mode == TrackingMode::Tracked;
        let mut effects = self.enter_fallback();
        if was_tracked {
            effects.insert(0, TrackingEffect::HideAnchored);
        }
        effects
    }

    fn enter_fallback(&mut self) -> Vec<TrackingEffect> {
        self.mode = TrackingMode::FallbackFloating;
        self.grace_deadline_ms = None;
        self.search_deadline_ms = None;
        vec![
            TrackingEffect::ShowFallback,
            TrackingEffect::AttachOrientation,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lost_marker_hides_object_but_not_yet_fallback() {
        let mut machine = TrackingMachine::new();
        machine.start(0.0);
        machine.marker_found(100.0);
        let effects = machine.marker_lost(200.0);
        assert_eq!(effects, vec![TrackingEffect::HideAnchored]);
        assert_eq!(machine.mode(), TrackingMode::Searching);

        // Still inside the grace window: nothing changes.
        assert!(machine.tick(200.0 + GRACE_PERIOD_MS - 1.0).is_empty());
        assert_eq!(machine.mode(), TrackingMode::Searching);
    }

    #[test]
    fn fallback_appears_only_after_grace_elapses() {
        let mut machine = TrackingMachine::new();
        machine.start(0.0);
        machine.marker_found(100.0);
        machine.marker_lost(200.0);
        let effects = machine.tick(200.0 + GRACE_PERIOD_MS);
        assert_eq!(machine.mode(), TrackingMode::FallbackFloating);
        assert!(effects.contains(&TrackingEffect::ShowFallback));
        assert!(effects.contains(&TrackingEffect::AttachOrientation));
    }

    #[test]
    fn brief_blip_returns_to_tracked_without_fallback() {
        let mut machine = TrackingMachine::new();
        machine.start(0.0);
        machine.marker_found(100.0);
        machine.marker_lost(200.0);
        let effects = machine.marker_found(700.0);
        assert_eq!(machine.mode(), TrackingMode::Tracked);
        assert_eq!(effects, vec![TrackingEffect::ShowAnchored]);
        // Old grace deadline must be dead.
        assert!(machine.tick(200.0 + GRACE_PERIOD_MS + 1.0).is_empty());
        assert_eq!(machine.mode(), TrackingMode::Tracked);
    }

    #[test]
    fn never_found_times_out_into_fallback() {
        let mut machine = TrackingMachine::new();
        machine.start(1_000.0);
        assert!(machine.tick(1_000.0 + SEARCH_FALLBACK_TIMEOUT_MS - 1.0).is_empty());
        let effects = machine.tick(1_000.0 + SEARCH_FALLBACK_TIMEOUT_MS);
        assert_eq!(machine.mode(), TrackingMode::FallbackFloating);
        assert!(effects.contains(&TrackingEffect::ShowFallback));
    }

    #[test]
    fn refound_from_fallback_swaps_content_and_detaches_orientation() {
        let mut machine = TrackingMachine::new();
        machine.start(0.0);
        machine.tick(SEARCH_FALLBACK_TIMEOUT_MS);
        let effects = machine.marker_found(10_000.0);
        assert_eq!(machine.mode(), TrackingMode::Tracked);
        assert_eq!(
            effects,
            vec![
                TrackingEffect::HideFallback,
                TrackingEffect::DetachOrientation,
                TrackingEffect::ShowAnchored,
            ]
        );
    }

    #[test]
    fn marker_lost_outside_tracked_is_a_no_op() {
        let mut machine = TrackingMachine::new();
        machine.start(0.0);
        assert!(machine.marker_lost(50.0).is_empty());
        machine.tick(SEARCH_FALLBACK_TIMEOUT_MS);
        assert!(machine.marker_lost(10_000.0).is_empty());
        assert_eq!(machine.mode(), TrackingMode::FallbackFloating);
    }

    #[test]
    fn force_fallback_is_immediate_and_idempotent() {
        let mut machine = TrackingMachine::new();
        machine.start(0.0);
        let effects = machine.force_fallback();
        assert_eq!(machine.mode(), TrackingMode::FallbackFloating);
        assert!(effects.contains(&TrackingEffect::ShowFallback));
        assert!(machine.force_fallback().is_empty());
    }
}
