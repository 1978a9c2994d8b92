use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{Element, MouseEvent, Touch, TouchEvent};

use ukabe_core::gesture::{CameraPose, GestureController, GestureMode, PointerPoint};
use ukabe_core::orientation::OrientationAngles;
use ukabe_core::transform::{PlacedTransform, TransformDelta};
use ukabe_core::SceneEvent;

use crate::events::SceneHooks;
use crate::scene::SceneGraph;

/// Translates raw pointer/touch input on the interaction overlay into
/// transform updates on the placed object. All geometry lives in the core
/// controller; this layer only unpacks DOM events.
pub(crate) struct GestureRuntime {
    controller: RefCell<GestureController>,
    transform: RefCell<PlacedTransform>,
    camera_pose: Cell<CameraPose>,
    scene: Rc<dyn SceneGraph>,
    hooks: SceneHooks,
    listeners: RefCell<Vec<EventListener>>,
}

impl GestureRuntime {
    pub(crate) fn new(scene: Rc<dyn SceneGraph>, hooks: SceneHooks) -> Rc<Self> {
        Rc::new(Self {
            controller: RefCell::new(GestureController::new()),
            transform: RefCell::new(PlacedTransform::default()),
            camera_pose: Cell::new(CameraPose::default()),
            scene,
            hooks,
            listeners: RefCell::new(Vec::new()),
        })
    }

    pub(crate) fn init(self: &Rc<Self>, overlay: Option<Element>) {
        let Some(overlay) = overlay else {
            gloo::console::warn!("gesture: interaction overlay missing, transforms disabled");
            return;
        };
        self.scene.apply_transform(&self.transform.borrow());

        let mut listeners = self.listeners.borrow_mut();

        let runtime = self.clone();
        listeners.push(EventListener::new(&overlay, "mousedown", move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            runtime
                .controller
                .borrow_mut()
                .pointer_down(mouse_point(event));
        }));

        let runtime = self.clone();
        listeners.push(EventListener::new(&overlay, "mousemove", move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let delta = runtime
                .controller
                .borrow_mut()
                .pointer_move(mouse_point(event), &runtime.camera_pose.get());
            if let Some(delta) = delta {
                runtime.apply(&delta);
            }
        }));

        for done in ["mouseup", "mouseleave"] {
            let runtime = self.clone();
            listeners.push(EventListener::new(&overlay, done, move |_| {
                runtime.controller.borrow_mut().pointer_up();
            }));
        }

        let runtime = self.clone();
        listeners.push(EventListener::new_with_options(
            &overlay,
            "touchstart",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(event) = event.dyn_ref::<TouchEvent>() else {
                    return;
                };
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    runtime
                        .controller
                        .borrow_mut()
                        .pointer_down(touch_point(&touch));
                }
            },
        ));

        let runtime = self.clone();
        listeners.push(EventListener::new_with_options(
            &overlay,
            "touchmove",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(event) = event.dyn_ref::<TouchEvent>() else {
                    return;
                };
                event.prevent_default();
                runtime.touch_move(event);
            },
        ));

        for done in ["touchend", "touchcancel"] {
            let runtime = self.clone();
            listeners.push(EventListener::new(&overlay, done, move |event| {
                let Some(event) = event.dyn_ref::<TouchEvent>() else {
                    return;
                };
                match event.touches().get(0) {
                    // A finger remains: re-anchor so the next move does not jump.
                    Some(touch) => runtime
                        .controller
                        .borrow_mut()
                        .pointer_down(touch_point(&touch)),
                    None => runtime.controller.borrow_mut().pointer_up(),
                }
            }));
        }
    }

    pub(crate) fn set_mode(&self, mode: GestureMode) {
        self.controller.borrow_mut().set_mode(mode);
    }

    pub(crate) fn transform(&self) -> PlacedTransform {
        *self.transform.borrow()
    }

    pub(crate) fn reset(&self) {
        {
            let mut transform = self.transform.borrow_mut();
            transform.reset();
            self.scene.apply_transform(&transform);
        }
        self.hooks.emit(SceneEvent::ModelReset);
    }

    /// Slider path: absolute values through the same clamps as gestures.
    pub(crate) fn set_scale(&self, scale: f32) {
        let mut transform = self.transform.borrow_mut();
        transform.set_scale(scale);
        self.scene.apply_transform(&transform);
    }

    pub(crate) fn on_orientation(&self, angles: OrientationAngles) {
        self.camera_pose.set(CameraPose {
            yaw_deg: -angles.alpha,
            pitch_deg: 0.0,
        });
    }

    pub(crate) fn dispose(&self) {
        self.listeners.borrow_mut().clear();
        self.controller.borrow_mut().pointer_up();
    }

    fn touch_move(self: &Rc<Self>, event: &TouchEvent) {
        let touches = event.touches();
        let delta = match (touches.get(0), touches.get(1)) {
            (Some(a), Some(b)) => self
                .controller
                .borrow_mut()
                .pinch_move(touch_point(&a), touch_point(&b)),
            (Some(touch), None) => self
                .controller
                .borrow_mut()
                .pointer_move(touch_point(&touch), &self.camera_pose.get()),
            _ => None,
        };
        if let Some(delta) = delta {
            self.apply(&delta);
        }
    }

    fn apply(&self, delta: &TransformDelta) {
        let mut transform = self.transform.borrow_mut();
        transform.apply(delta);
        self.scene.apply_transform(&transform);
    }
}

fn mouse_point(event: &MouseEvent) -> PointerPoint {
    PointerPoint::new(event.client_x() as f32, event.client_y() as f32)
}

fn touch_point(touch: &Touch) -> PointerPoint {
    PointerPoint::new(touch.client_x() as f32, touch.client_y() as f32)
}
