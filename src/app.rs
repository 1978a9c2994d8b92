use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlVideoElement};

use ukabe_core::camera::CameraPhase;
use ukabe_core::catalog::model_or_default;
use ukabe_core::SceneEvent;

use crate::camera_runtime::CameraRuntime;
use crate::events::SceneHooks;
use crate::gesture_runtime::GestureRuntime;
use crate::prefs::{load_prefs, save_prefs};
use crate::scene::{DomScene, SceneGraph, MARKER_ANCHOR_ID};
use crate::tracking_runtime::TrackingRuntime;
use crate::ui::{UiCallbacks, UiOverlay};

pub(crate) const VIDEO_SINK_ID: &str = "ar-video";
pub(crate) const INTERACTION_OVERLAY_ID: &str = "interaction-overlay";

/// Application root. Every service is constructed and wired here and dies
/// here; nothing reaches for ambient globals.
pub(crate) struct AppServices {
    camera: Option<Rc<CameraRuntime>>,
    tracking: Rc<TrackingRuntime>,
    gesture: Rc<GestureRuntime>,
    ui: Option<Rc<UiOverlay>>,
    unload_listener: RefCell<Option<EventListener>>,
}

pub(crate) fn boot_app(document: &Document) -> Option<Rc<AppServices>> {
    let scene = Rc::new(DomScene::attach(document)?);
    let scene: Rc<dyn SceneGraph> = scene;
    let hooks = SceneHooks::new();
    let prefs = Rc::new(RefCell::new(load_prefs()));

    let gesture = GestureRuntime::new(scene.clone(), hooks.clone());
    let tracking = TrackingRuntime::new(scene.clone(), hooks.clone());

    let video = document
        .get_element_by_id(VIDEO_SINK_ID)
        .and_then(|element| element.dyn_into::<HtmlVideoElement>().ok());
    if video.is_none() {
        gloo::console::warn!("camera: video sink missing, running without camera");
    }

    // The UI comes up after the camera runtime, so status updates go
    // through a slot that is filled once the overlay is mounted.
    let ui_slot: Rc<RefCell<Option<Rc<UiOverlay>>>> = Rc::new(RefCell::new(None));
    let on_status: Rc<dyn Fn(CameraPhase)> = {
        let ui_slot = ui_slot.clone();
        Rc::new(move |phase| {
            if let Some(ui) = ui_slot.borrow().as_ref() {
                ui.show_camera_status(phase);
            }
        })
    };
    let camera = video.map(|video| CameraRuntime::new(video, hooks.clone(), on_status));

    let initial = prefs.borrow().clone();
    let model = model_or_default(&initial.model_slug);
    let ui = UiOverlay::mount(
        document,
        UiCallbacks {
            on_retry: {
                let camera = camera.clone();
                Rc::new(move || {
                    if let Some(camera) = camera.as_ref() {
                        camera.retry();
                    }
                })
            },
            on_mode: {
                let gesture = gesture.clone();
                let prefs = prefs.clone();
                Rc::new(move |mode| {
                    gesture.set_mode(mode);
                    let mut prefs = prefs.borrow_mut();
                    prefs.gesture_mode = mode;
                    save_prefs(&prefs);
                })
            },
            on_reset: {
                let gesture = gesture.clone();
                let ui_slot = ui_slot.clone();
                Rc::new(move || {
                    gesture.reset();
                    if let Some(ui) = ui_slot.borrow().as_ref() {
                        ui.set_scale_display(gesture.transform().scale);
                    }
                })
            },
            on_scale: {
                let gesture = gesture.clone();
                Rc::new(move |scale| gesture.set_scale(scale))
            },
            on_model: {
                let scene = scene.clone();
                let gesture = gesture.clone();
                let prefs = prefs.clone();
                let ui_slot = ui_slot.clone();
                Rc::new(move |entry| {
                    scene.set_model_src(entry.src);
                    gesture.set_scale(entry.base_scale);
                    if let Some(ui) = ui_slot.borrow().as_ref() {
                        ui.set_scale_display(entry.base_scale);
                    }
                    let mut prefs = prefs.borrow_mut();
                    prefs.model_slug = entry.slug.to_string();
                    save_prefs(&prefs);
                })
            },
        },
        initial.gesture_mode,
        model.slug,
    );
    *ui_slot.borrow_mut() = ui;

    scene.set_model_src(model.src);
    gesture.set_mode(initial.gesture_mode);
    gesture.set_scale(model.base_scale);
    if let Some(ui) = ui_slot.borrow().as_ref() {
        ui.set_scale_display(model.base_scale);
    }

    {
        let tracking = tracking.clone();
        hooks.subscribe(Rc::new(move |event| match event {
            SceneEvent::CameraActive => tracking.on_camera_active(),
            SceneEvent::CameraDegraded => tracking.on_camera_degraded(),
            _ => {}
        }));
    }
    {
        let gesture = gesture.clone();
        tracking.set_orientation_hook(Rc::new(move |angles| gesture.on_orientation(angles)));
    }
    hooks.subscribe(Rc::new(|event| {
        gloo::console::log!("event:", format!("{event:?}"));
    }));

    gesture.init(document.get_element_by_id(INTERACTION_OVERLAY_ID));
    tracking.init(document.get_element_by_id(MARKER_ANCHOR_ID));
    match camera.as_ref() {
        Some(camera) => camera.init(),
        None => hooks.emit(SceneEvent::CameraDegraded),
    }

    let ui = ui_slot.borrow().clone();
    let services = Rc::new(AppServices {
        camera,
        tracking,
        gesture,
        ui,
        unload_listener: RefCell::new(None),
    });
    services.install_unload();
    Some(services)
}

impl AppServices {
    pub(crate) fn dispose(&self) {
        if let Some(camera) = self.camera.as_ref() {
            camera.dispose();
        }
        self.tracking.dispose();
        self.gesture.dispose();
        if let Some(ui) = self.ui.as_ref() {
            ui.dispose();
        }
    }

    fn install_unload(self: &Rc<Self>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let services = self.clone();
        *self.unload_listener.borrow_mut() = Some(EventListener::new(&window, "pagehide", move |_| {
            services.dispose();
        }));
    }
}
