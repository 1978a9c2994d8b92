use serde::{Deserialize, Serialize};

pub const MAX_ATTEMPTS: u32 = 3;
pub const HEALTH_CHECK_INTERVAL_MS: u32 = 15_000;
pub const CAMERA_LOAD_TIMEOUT_MS: u32 = 10_000;

pub const IDEAL_WIDTH: u32 = 1280;
pub const IDEAL_HEIGHT: u32 = 720;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintTier {
    /// Rear-facing camera at the target resolution.
    #[default]
    Ideal,
    /// Bare `video: true`, accepted by anything with a camera.
    Minimal,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraPhase {
    #[default]
    Uninitialized,
    Requesting,
    Active,
    /// Permission refused. Terminal until an explicit user retry.
    Denied,
    /// Attempt budget exhausted on non-permission errors.
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttemptError {
    Denied,
    NoDevice,
    Timeout,
    Other,
}

/// One outstanding getUserMedia request. The generation stamp lets the
/// machine drop completions from requests it has already moved past, so a
/// late response can never regress newer state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestTicket {
    pub generation: u64,
    pub tier: ConstraintTier,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraStep {
    /// Issue another acquisition request.
    Retry(RequestTicket),
    /// Give up for now and degrade to the non-camera presentation; the
    /// phase says whether this was a denial or an exhausted budget.
    Degraded(CameraPhase),
    /// Completion belonged to a superseded request; ignore it.
    Stale,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SinkHealth {
    pub has_stream: bool,
    pub track_live: bool,
    pub paused: bool,
}

impl SinkHealth {
    pub fn is_live(&self) -> bool {
        self.has_stream && self.track_live && !self.paused
    }
}

#[derive(Debug, Default)]
pub struct CameraMachine {
    phase: CameraPhase,
    tier: ConstraintTier,
    attempts: u32,
    generation: u64,
}

impl CameraMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> CameraPhase {
        self.phase
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_stale(&self, generation: u64) -> bool {
        generation != self.generation
    }

    /// Starts (or, after Denied/Failed, user-restarts) acquisition from a
    /// clean attempt budget.
    pub fn begin(&mut self) -> RequestTicket {
        self.attempts = 0;
        self.issue(ConstraintTier::Ideal)
    }

    /// Returns true when the success was fresh and the session is now
    /// Active; false for stale completions.
    pub fn on_success(&mut self, generation: u64) -> bool {
        if self.is_stale(generation) || self.phase != CameraPhase::Requesting {
            return false;
        }
        self.phase = CameraPhase::Active;
        self.attempts = 0;
        true
    }

    pub fn on_failure(&mut self, generation: u64, error: AttemptError) -> CameraStep {
        if self.is_stale(generation) || self.phase != CameraPhase::Requesting {
            return CameraStep::Stale;
        }
        if error == AttemptError::Denied {
            self.phase = CameraPhase::Denied;
            return CameraStep::Degraded(CameraPhase::Denied);
        }
        if self.tier == ConstraintTier::Ideal {
            // The target resolution or facing mode may simply not exist on
            // this device; fall through to the minimal tier before this
            // counts as a failed attempt.
            return CameraStep::Retry(self.issue(ConstraintTier::Minimal));
        }
        self.attempts += 1;
        if self.attempts >= MAX_ATTEMPTS {
            self.phase = CameraPhase::Failed;
            return CameraStep::Degraded(CameraPhase::Failed);
        }
        CameraStep::Retry(self.issue(ConstraintTier::Ideal))
    }

    /// Health-check verdict for an Active session. A stalled sink re-enters
    /// acquisition with a fresh attempt budget; anything else is left alone.
    pub fn on_health(&mut self, sink: SinkHealth) -> Option<RequestTicket> {
        if self.phase != CameraPhase::Active || sink.is_live() {
            return None;
        }
        self.attempts = 0;
        Some(self.issue(ConstraintTier::Ideal))
    }

    fn issue(&mut self, tier: ConstraintTier) -> RequestTicket {
        self.generation += 1;
        self.tier = tier;
        self.phase = CameraPhase::Requesting;
        RequestTicket {
            generation: self.generation,
            tier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fail_whole_attempt(machine: &mut CameraMachine, ticket: RequestTicket) -> CameraStep {
        let step = machine.on_failure(ticket.generation, AttemptError::Other);
        match step {
            CameraStep::Retry(minimal) => {
                assert_eq!(minimal.tier, ConstraintTier::Minimal);
                machine.on_failure(minimal.generation, AttemptError::Other)
            }
            other => other,
        }
    }

    #[test]
    fn ideal_rejection_retries_minimal_exactly_once() {
        let mut machine = CameraMachine::new();
        let ticket = machine.begin();
        assert_eq!(ticket.tier, ConstraintTier::Ideal);

        let step = machine.on_failure(ticket.generation, AttemptError::Other);
        let CameraStep::Retry(minimal) = step else {
            panic!("expected minimal retry, got {:?}", step);
        };
        assert_eq!(minimal.tier, ConstraintTier::Minimal);

        assert!(machine.on_success(minimal.generation));
        assert_eq!(machine.phase(), CameraPhase::Active);
    }

    #[test]
    fn budget_exhaustion_ends_failed_not_looping() {
        let mut machine = CameraMachine::new();
        let mut ticket = machine.begin();
        for attempt in 0..MAX_ATTEMPTS {
            match fail_whole_attempt(&mut machine, ticket) {
                CameraStep::Retry(next) => {
                    assert!(attempt + 1 < MAX_ATTEMPTS);
                    assert_eq!(next.tier, ConstraintTier::Ideal);
                    ticket = next;
                }
                CameraStep::Degraded(phase) => {
                    assert_eq!(attempt + 1, MAX_ATTEMPTS);
                    assert_eq!(phase, CameraPhase::Failed);
                }
                CameraStep::Stale => panic!("unexpected stale"),
            }
        }
        assert_eq!(machine.phase(), CameraPhase::Failed);
    }

    #[test]
    fn denial_is_terminal_until_user_retry() {
        let mut machine = CameraMachine::new();
        let ticket = machine.begin();
        let step = machine.on_failure(ticket.generation, AttemptError::Denied);
        assert_eq!(step, CameraStep::Degraded(CameraPhase::Denied));
        assert_eq!(machine.phase(), CameraPhase::Denied);

        // Explicit retry resets the budget and starts over at ideal.
        let retry = machine.begin();
        assert_eq!(retry.tier, ConstraintTier::Ideal);
        assert_eq!(machine.phase(), CameraPhase::Requesting);
        assert_eq!(machine.attempts(), 0);
    }

    #[test]
    fn stale_completions_are_ignored() {
        let mut machine = CameraMachine::new();
        let first = machine.begin();
        let second = machine.begin();
        assert!(!machine.on_success(first.generation));
        assert_eq!(machine.phase(), CameraPhase::Requesting);
        assert_eq!(
            machine.on_failure(first.generation, AttemptError::Other),
            CameraStep::Stale
        );
        assert!(machine.on_success(second.generation));
        assert_eq!(machine.phase(), CameraPhase::Active);
    }

    #[test]
    fn health_check_reacquires_only_stalled_active_sinks() {
        let mut machine = CameraMachine::new();
        let ticket = machine.begin();
        assert!(machine.on_success(ticket.generation));

        let live = SinkHealth {
            has_stream: true,
            track_live: true,
            paused: false,
        };
        assert!(machine.on_health(live).is_none());
        assert_eq!(machine.phase(), CameraPhase::Active);

        let stalled = SinkHealth {
            has_stream: true,
            track_live: false,
            paused: false,
        };
        let reissue = machine.on_health(stalled).expect("reacquire");
        assert_eq!(reissue.tier, ConstraintTier::Ideal);
        assert_eq!(machine.phase(), CameraPhase::Requesting);
    }

    #[test]
    fn health_check_is_inert_outside_active() {
        let mut machine = CameraMachine::new();
        assert!(machine.on_health(SinkHealth::default()).is_none());
        machine.begin();
        assert!(machine.on_health(SinkHealth::default()).is_none());
    }
}
