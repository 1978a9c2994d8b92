use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo::events::EventListener;
use gloo::timers::callback::Interval;
use gloo::timers::future::TimeoutFuture;
use js_sys::{Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{HtmlVideoElement, MediaStream, MediaStreamConstraints, MediaStreamTrack, MediaStreamTrackState};

use ukabe_core::camera::{
    AttemptError, CameraMachine, CameraPhase, CameraStep, ConstraintTier, RequestTicket,
    SinkHealth, CAMERA_LOAD_TIMEOUT_MS, HEALTH_CHECK_INTERVAL_MS, IDEAL_HEIGHT, IDEAL_WIDTH,
};
use ukabe_core::SceneEvent;

use crate::events::SceneHooks;

/// Owns the live camera feed: runs the acquisition machine against
/// MediaDevices, keeps the stream attached to the video sink, and
/// re-validates the sink periodically and on visibility regain.
pub(crate) struct CameraRuntime {
    machine: RefCell<CameraMachine>,
    video: HtmlVideoElement,
    stream: RefCell<Option<MediaStream>>,
    hooks: SceneHooks,
    on_status: Rc<dyn Fn(CameraPhase)>,
    health_interval: RefCell<Option<Interval>>,
    visibility_listener: RefCell<Option<EventListener>>,
    disposed: Cell<bool>,
}

impl CameraRuntime {
    pub(crate) fn new(
        video: HtmlVideoElement,
        hooks: SceneHooks,
        on_status: Rc<dyn Fn(CameraPhase)>,
    ) -> Rc<Self> {
        Rc::new(Self {
            machine: RefCell::new(CameraMachine::new()),
            video,
            stream: RefCell::new(None),
            hooks,
            on_status,
            health_interval: RefCell::new(None),
            visibility_listener: RefCell::new(None),
            disposed: Cell::new(false),
        })
    }

    pub(crate) fn init(self: &Rc<Self>) {
        let ticket = self.machine.borrow_mut().begin();
        (self.on_status)(CameraPhase::Requesting);
        self.execute(ticket);

        let runtime = self.clone();
        *self.health_interval.borrow_mut() =
            Some(Interval::new(HEALTH_CHECK_INTERVAL_MS, move || {
                runtime.health_check();
            }));

        if let Some(document) = web_sys::window().and_then(|window| window.document()) {
            let runtime = self.clone();
            let target = document.clone();
            *self.visibility_listener.borrow_mut() = Some(EventListener::new(
                &document,
                "visibilitychange",
                move |_| {
                    if !target.hidden() {
                        runtime.health_check();
                    }
                },
            ));
        }
    }

    /// Explicit user retry after Denied/Failed; resets the attempt budget.
    pub(crate) fn retry(self: &Rc<Self>) {
        if self.disposed.get() {
            return;
        }
        gloo::console::log!("camera: user retry");
        let ticket = self.machine.borrow_mut().begin();
        (self.on_status)(CameraPhase::Requesting);
        self.execute(ticket);
    }

    pub(crate) fn health_check(self: &Rc<Self>) {
        if self.disposed.get() {
            return;
        }
        let sink = self.sink_health();
        let reissue = self.machine.borrow_mut().on_health(sink);
        if let Some(ticket) = reissue {
            gloo::console::warn!("camera: stream stalled, reacquiring");
            (self.on_status)(CameraPhase::Requesting);
            self.execute(ticket);
        }
    }

    pub(crate) fn dispose(&self) {
        self.disposed.set(true);
        self.health_interval.borrow_mut().take();
        self.visibility_listener.borrow_mut().take();
        self.clear_sink();
    }

    fn execute(self: &Rc<Self>, ticket: RequestTicket) {
        if self.disposed.get() {
            return;
        }
        gloo::console::log!("camera: requesting stream", tier_label(ticket.tier));

        let runtime = self.clone();
        spawn_local(async move {
            TimeoutFuture::new(CAMERA_LOAD_TIMEOUT_MS).await;
            // The machine drops this as stale if the request already settled.
            runtime.finish_failure(ticket, AttemptError::Timeout);
        });

        let runtime = self.clone();
        spawn_local(async move {
            match acquire_stream(ticket.tier).await {
                Ok(stream) => runtime.finish_success(ticket, stream),
                Err(error) => runtime.finish_failure(ticket, error),
            }
        });
    }

    fn finish_success(&self, ticket: RequestTicket, stream: MediaStream) {
        if self.disposed.get() || !self.machine.borrow_mut().on_success(ticket.generation) {
            // Late response from a superseded request; release the hardware.
            stop_tracks(&stream);
            return;
        }
        self.video.set_src_object(Some(&stream));
        let _ = self.video.play();
        if let Some(previous) = self.stream.borrow_mut().replace(stream) {
            stop_tracks(&previous);
        }
        gloo::console::log!("camera: stream active");
        (self.on_status)(CameraPhase::Active);
        self.hooks.emit(SceneEvent::CameraActive);
    }

    fn finish_failure(self: &Rc<Self>, ticket: RequestTicket, error: AttemptError) {
        if self.disposed.get() {
            return;
        }
        let step = self.machine.borrow_mut().on_failure(ticket.generation, error);
        match step {
            CameraStep::Retry(next) => {
                gloo::console::warn!("camera: attempt failed, retrying", tier_label(next.tier));
                self.execute(next);
            }
            CameraStep::Degraded(phase) => {
                gloo::console::warn!("camera: acquisition gave up", phase_label(phase));
                self.clear_sink();
                (self.on_status)(phase);
                self.hooks.emit(SceneEvent::CameraDegraded);
            }
            CameraStep::Stale => {}
        }
    }

    fn sink_health(&self) -> SinkHealth {
        let stream = self.stream.borrow();
        let track_live = stream.as_ref().is_some_and(|stream| {
            stream
                .get_video_tracks()
                .get(0)
                .dyn_into::<MediaStreamTrack>()
                .map(|track| track.ready_state() == MediaStreamTrackState::Live)
                .unwrap_or(false)
        });
        SinkHealth {
            has_stream: stream.is_some(),
            track_live,
            paused: self.video.paused(),
        }
    }

    fn clear_sink(&self) {
        if let Some(stream) = self.stream.borrow_mut().take() {
            stop_tracks(&stream);
        }
        self.video.set_src_object(None);
    }
}

async fn acquire_stream(tier: ConstraintTier) -> Result<MediaStream, AttemptError> {
    let window = web_sys::window().ok_or(AttemptError::Other)?;
    let devices = window
        .navigator()
        .media_devices()
        .map_err(|_| AttemptError::Other)?;
    let promise = devices
        .get_user_media_with_constraints(&constraints_for(tier))
        .map_err(|_| AttemptError::Other)?;
    match JsFuture::from(promise).await {
        Ok(value) => value
            .dyn_into::<MediaStream>()
            .map_err(|_| AttemptError::Other),
        Err(rejection) => Err(classify_rejection(&rejection)),
    }
}

fn constraints_for(tier: ConstraintTier) -> MediaStreamConstraints {
    let constraints = MediaStreamConstraints::new();
    match tier {
        ConstraintTier::Minimal => constraints.set_video(&JsValue::TRUE),
        ConstraintTier::Ideal => constraints.set_video(&ideal_video_constraints()),
    }
    constraints
}

fn ideal_video_constraints() -> JsValue {
    let video = Object::new();
    let facing = Object::new();
    let _ = Reflect::set(&facing, &"ideal".into(), &"environment".into());
    let _ = Reflect::set(&video, &"facingMode".into(), &facing);
    for (key, pixels) in [("width", IDEAL_WIDTH), ("height", IDEAL_HEIGHT)] {
        let bound = Object::new();
        let _ = Reflect::set(&bound, &"ideal".into(), &JsValue::from_f64(pixels as f64));
        let _ = Reflect::set(&video, &key.into(), &bound);
    }
    video.into()
}

fn classify_rejection(rejection: &JsValue) -> AttemptError {
    let name = Reflect::get(rejection, &"name".into())
        .ok()
        .and_then(|value| value.as_string())
        .unwrap_or_default();
    match name.as_str() {
        "NotAllowedError" | "SecurityError" | "PermissionDeniedError" => AttemptError::Denied,
        "NotFoundError" | "OverconstrainedError" | "DevicesNotFoundError" => AttemptError::NoDevice,
        _ => AttemptError::Other,
    }
}

fn stop_tracks(stream: &MediaStream) {
    for value in stream.get_tracks().iter() {
        if let Ok(track) = value.dyn_into::<MediaStreamTrack>() {
            track.stop();
        }
    }
}

fn tier_label(tier: ConstraintTier) -> &'static str {
    match tier {
        ConstraintTier::Ideal => "ideal",
        ConstraintTier::Minimal => "minimal",
    }
}

fn phase_label(phase: CameraPhase) -> &'static str {
    match phase {
        CameraPhase::Uninitialized => "uninitialized",
        CameraPhase::Requesting => "requesting",
        CameraPhase::Active => "active",
        CameraPhase::Denied => "denied",
        CameraPhase::Failed => "failed",
    }
}
