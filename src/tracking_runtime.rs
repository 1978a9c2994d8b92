use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo::events::EventListener;
use gloo::render::{request_animation_frame, AnimationFrame};
use gloo::timers::callback::Interval;
use js_sys::{Date, Function, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{DeviceOrientationEvent, Element};

use ukabe_core::orientation::{floating_pose, OrientationAngles};
use ukabe_core::tracking::{TrackingEffect, TrackingMachine};
use ukabe_core::SceneEvent;

use crate::events::SceneHooks;
use crate::scene::{SceneGraph, SceneNode};

pub(crate) const TRACKING_TICK_MS: u32 = 250;

const MARKER_FOUND_EVENT: &str = "markerFound";
const MARKER_LOST_EVENT: &str = "markerLost";

/// Bridges the tracking provider's marker events into the tracking
/// machine, replays the machine's effects onto the scene, and runs the
/// orientation-driven floating presentation while fallback mode is on.
pub(crate) struct TrackingRuntime {
    machine: RefCell<TrackingMachine>,
    scene: Rc<dyn SceneGraph>,
    hooks: SceneHooks,
    marker_listeners: RefCell<Vec<EventListener>>,
    tick_interval: RefCell<Option<Interval>>,
    orientation_listener: RefCell<Option<EventListener>>,
    float_frame: RefCell<Option<AnimationFrame>>,
    latest_orientation: Cell<OrientationAngles>,
    on_orientation: RefCell<Option<Rc<dyn Fn(OrientationAngles)>>>,
    placed: Cell<bool>,
    disposed: Cell<bool>,
}

impl TrackingRuntime {
    pub(crate) fn new(scene: Rc<dyn SceneGraph>, hooks: SceneHooks) -> Rc<Self> {
        Rc::new(Self {
            machine: RefCell::new(TrackingMachine::new()),
            scene,
            hooks,
            marker_listeners: RefCell::new(Vec::new()),
            tick_interval: RefCell::new(None),
            orientation_listener: RefCell::new(None),
            float_frame: RefCell::new(None),
            latest_orientation: Cell::new(OrientationAngles::default()),
            on_orientation: RefCell::new(None),
            placed: Cell::new(false),
            disposed: Cell::new(false),
        })
    }

    pub(crate) fn init(self: &Rc<Self>, marker: Option<Element>) {
        self.scene.set_visible(SceneNode::Anchored, false);
        self.scene.set_visible(SceneNode::Fallback, false);

        let Some(marker) = marker else {
            gloo::console::warn!("tracking: marker entity missing, marker events disabled");
            return;
        };
        let mut listeners = self.marker_listeners.borrow_mut();
        let runtime = self.clone();
        listeners.push(EventListener::new(&marker, MARKER_FOUND_EVENT, move |_| {
            runtime.marker_found();
        }));
        let runtime = self.clone();
        listeners.push(EventListener::new(&marker, MARKER_LOST_EVENT, move |_| {
            runtime.marker_lost();
        }));
    }

    /// Feeds the gesture layer with camera orientation so Move drags stay
    /// camera-relative while floating mode is active.
    pub(crate) fn set_orientation_hook(&self, hook: Rc<dyn Fn(OrientationAngles)>) {
        *self.on_orientation.borrow_mut() = Some(hook);
    }

    /// Camera feed is live: the provider starts scanning frames and the
    /// never-found timeout arms.
    pub(crate) fn on_camera_active(self: &Rc<Self>) {
        let effects = self.machine.borrow_mut().start(Date::now());
        self.replay(&effects);

        let runtime = self.clone();
        *self.tick_interval.borrow_mut() = Some(Interval::new(TRACKING_TICK_MS, move || {
            let effects = runtime.machine.borrow_mut().tick(Date::now());
            runtime.replay(&effects);
        }));
    }

    /// No frames will ever arrive; skip the search window entirely.
    pub(crate) fn on_camera_degraded(self: &Rc<Self>) {
        let effects = self.machine.borrow_mut().force_fallback();
        self.replay(&effects);
    }

    pub(crate) fn dispose(&self) {
        self.disposed.set(true);
        self.marker_listeners.borrow_mut().clear();
        self.tick_interval.borrow_mut().take();
        self.orientation_listener.borrow_mut().take();
        self.float_frame.borrow_mut().take();
    }

    fn marker_found(self: &Rc<Self>) {
        let effects = self.machine.borrow_mut().marker_found(Date::now());
        self.replay(&effects);
        self.hooks.emit(SceneEvent::MarkerFound);
        if !self.placed.get() {
            self.placed.set(true);
            self.hooks.emit(SceneEvent::ModelPlaced);
        }
    }

    fn marker_lost(self: &Rc<Self>) {
        let effects = self.machine.borrow_mut().marker_lost(Date::now());
        self.replay(&effects);
        self.hooks.emit(SceneEvent::MarkerLost);
    }

    fn replay(self: &Rc<Self>, effects: &[TrackingEffect]) {
        for effect in effects {
            match effect {
                TrackingEffect::ShowAnchored => self.scene.set_visible(SceneNode::Anchored, true),
                TrackingEffect::HideAnchored => self.scene.set_visible(SceneNode::Anchored, false),
                TrackingEffect::ShowFallback => {
                    gloo::console::log!("tracking: fallback after grace");
                    self.scene.set_visible(SceneNode::Fallback, true);
                }
                TrackingEffect::HideFallback => self.scene.set_visible(SceneNode::Fallback, false),
                TrackingEffect::AttachOrientation => self.attach_orientation(),
                TrackingEffect::DetachOrientation => self.detach_orientation(),
            }
        }
    }

    fn attach_orientation(self: &Rc<Self>) {
        if self.orientation_listener.borrow().is_some() {
            return;
        }
        let Some(window) = web_sys::window() else {
            return;
        };
        request_orientation_permission();

        let runtime = self.clone();
        *self.orientation_listener.borrow_mut() = Some(EventListener::new(
            &window,
            "deviceorientation",
            move |event| {
                let Some(event) = event.dyn_ref::<DeviceOrientationEvent>() else {
                    return;
                };
                let angles = OrientationAngles {
                    alpha: event.alpha().unwrap_or(0.0) as f32,
                    beta: event.beta().unwrap_or(0.0) as f32,
                    gamma: event.gamma().unwrap_or(0.0) as f32,
                };
                runtime.latest_orientation.set(angles);
                if let Some(hook) = runtime.on_orientation.borrow().as_ref() {
                    hook(angles);
                }
            },
        ));
        self.schedule_float_frame();
    }

    fn detach_orientation(&self) {
        self.orientation_listener.borrow_mut().take();
        self.float_frame.borrow_mut().take();
    }

    fn schedule_float_frame(self: &Rc<Self>) {
        let runtime = self.clone();
        *self.float_frame.borrow_mut() = Some(request_animation_frame(move |_| {
            if runtime.disposed.get() || runtime.orientation_listener.borrow().is_none() {
                return;
            }
            let pose = floating_pose(runtime.latest_orientation.get(), Date::now());
            runtime.scene.set_position(SceneNode::Fallback, pose.position);
            runtime
                .scene
                .set_rotation_deg(SceneNode::Fallback, pose.rotation_deg);
            runtime.schedule_float_frame();
        }));
    }
}

/// iOS gates orientation events behind a promise-returning static; its
/// absence elsewhere is expected variation, not a failure.
fn request_orientation_permission() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Ok(constructor) = Reflect::get(&window, &"DeviceOrientationEvent".into()) else {
        return;
    };
    let Ok(request) = Reflect::get(&constructor, &"requestPermission".into()) else {
        return;
    };
    let Ok(request) = request.dyn_into::<Function>() else {
        gloo::console::log!("tracking: orientation permission API absent, skipping");
        return;
    };
    let Ok(value) = request.call0(&constructor) else {
        return;
    };
    let Ok(promise) = value.dyn_into::<js_sys::Promise>() else {
        return;
    };
    spawn_local(async move {
        match JsFuture::from(promise).await {
            Ok(state) => {
                if state.as_string().as_deref() != Some("granted") {
                    gloo::console::warn!("tracking: orientation permission not granted");
                }
            }
            Err(_) => gloo::console::warn!("tracking: orientation permission request failed"),
        }
    });
}
