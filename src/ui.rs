use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlInputElement, HtmlSelectElement};

use ukabe_core::camera::CameraPhase;
use ukabe_core::catalog::{model_or_default, ModelCatalogEntry, MODEL_CATALOG};
use ukabe_core::gesture::GestureMode;
use ukabe_core::transform::{SCALE_MAX, SCALE_MIN};

use crate::scene::fmt_f32;

const UI_ROOT_ID: &str = "ui-root";
const BANNER_DENIED_TEXT: &str = "カメラへのアクセスが拒否されました";
const BANNER_FAILED_TEXT: &str = "カメラを起動できませんでした";
const BANNER_RETRY_LABEL: &str = "再試行";
const RESET_LABEL: &str = "リセット";
const SCALE_SLIDER_STEP: f32 = 0.1;

const MODE_LABELS: &[(GestureMode, &str)] = &[
    (GestureMode::Move, "移動"),
    (GestureMode::Rotate, "回転"),
    (GestureMode::Scale, "拡縮"),
];

pub(crate) struct UiCallbacks {
    pub(crate) on_retry: Rc<dyn Fn()>,
    pub(crate) on_mode: Rc<dyn Fn(GestureMode)>,
    pub(crate) on_reset: Rc<dyn Fn()>,
    pub(crate) on_scale: Rc<dyn Fn(f32)>,
    pub(crate) on_model: Rc<dyn Fn(&'static ModelCatalogEntry)>,
}

/// Viewer chrome: a persistent non-blocking banner with a retry action,
/// mode buttons, a scale slider, a reset button and the model picker. The
/// app stays interactive even when the camera is fully disabled.
pub(crate) struct UiOverlay {
    banner: Element,
    banner_text: Element,
    mode_buttons: Vec<(GestureMode, Element)>,
    scale_input: HtmlInputElement,
    listeners: RefCell<Vec<EventListener>>,
}

impl UiOverlay {
    pub(crate) fn mount(
        document: &Document,
        callbacks: UiCallbacks,
        initial_mode: GestureMode,
        initial_model_slug: &str,
    ) -> Option<Rc<Self>> {
        let root = match document.get_element_by_id(UI_ROOT_ID) {
            Some(root) => root,
            None => {
                gloo::console::warn!("ui: overlay root missing, controls disabled");
                return None;
            }
        };
        root.set_class_name("viewer-ui");

        let banner = create(document, "div", "camera-banner");
        let banner_text = create(document, "span", "camera-banner-text");
        let retry_button = create(document, "button", "camera-banner-retry");
        retry_button.set_text_content(Some(BANNER_RETRY_LABEL));
        let _ = banner.append_child(&banner_text);
        let _ = banner.append_child(&retry_button);
        let _ = banner.set_attribute("style", "display: none;");
        let _ = root.append_child(&banner);

        let controls = create(document, "div", "viewer-controls");
        let mut mode_buttons = Vec::with_capacity(MODE_LABELS.len());
        for (mode, label) in MODE_LABELS {
            let button = create(document, "button", "mode-button");
            button.set_text_content(Some(label));
            let _ = controls.append_child(&button);
            mode_buttons.push((*mode, button));
        }

        let reset_button = create(document, "button", "reset-button");
        reset_button.set_text_content(Some(RESET_LABEL));
        let _ = controls.append_child(&reset_button);

        let scale_input: HtmlInputElement = create(document, "input", "scale-slider")
            .dyn_into()
            .expect("scale slider is an input");
        let _ = scale_input.set_attribute("type", "range");
        let _ = scale_input.set_attribute("min", &fmt_f32(SCALE_MIN));
        let _ = scale_input.set_attribute("max", &fmt_f32(SCALE_MAX));
        let _ = scale_input.set_attribute("step", &fmt_f32(SCALE_SLIDER_STEP));
        let _ = controls.append_child(&scale_input);

        let model_select: HtmlSelectElement = create(document, "select", "model-select")
            .dyn_into()
            .expect("model picker is a select");
        for entry in MODEL_CATALOG {
            let option = create(document, "option", "");
            let _ = option.set_attribute("value", entry.slug);
            option.set_text_content(Some(entry.label));
            let _ = model_select.append_child(&option);
        }
        model_select.set_value(initial_model_slug);
        let _ = controls.append_child(&model_select);
        let _ = root.append_child(&controls);

        let overlay = Rc::new(Self {
            banner,
            banner_text,
            mode_buttons,
            scale_input,
            listeners: RefCell::new(Vec::new()),
        });
        overlay.wire(callbacks, retry_button, reset_button, model_select);
        overlay.set_active_mode(initial_mode);
        Some(overlay)
    }

    pub(crate) fn show_camera_status(&self, phase: CameraPhase) {
        match phase {
            CameraPhase::Denied => self.show_banner(BANNER_DENIED_TEXT),
            CameraPhase::Failed => self.show_banner(BANNER_FAILED_TEXT),
            _ => self.hide_banner(),
        }
    }

    pub(crate) fn set_active_mode(&self, active: GestureMode) {
        for (mode, button) in &self.mode_buttons {
            let class = if *mode == active {
                "mode-button active"
            } else {
                "mode-button"
            };
            button.set_class_name(class);
        }
    }

    pub(crate) fn set_scale_display(&self, scale: f32) {
        self.scale_input.set_value(&fmt_f32(scale));
    }

    pub(crate) fn dispose(&self) {
        self.listeners.borrow_mut().clear();
    }

    fn wire(
        self: &Rc<Self>,
        callbacks: UiCallbacks,
        retry_button: Element,
        reset_button: Element,
        model_select: HtmlSelectElement,
    ) {
        let mut listeners = self.listeners.borrow_mut();

        let on_retry = callbacks.on_retry;
        listeners.push(EventListener::new(&retry_button, "click", move |_| {
            on_retry();
        }));

        for (mode, button) in &self.mode_buttons {
            let mode = *mode;
            let overlay = self.clone();
            let on_mode = callbacks.on_mode.clone();
            listeners.push(EventListener::new(button, "click", move |_| {
                overlay.set_active_mode(mode);
                on_mode(mode);
            }));
        }

        let on_reset = callbacks.on_reset;
        listeners.push(EventListener::new(&reset_button, "click", move |_| {
            on_reset();
        }));

        let input = self.scale_input.clone();
        let on_scale = callbacks.on_scale;
        listeners.push(EventListener::new(&self.scale_input, "input", move |_| {
            let value = input.value_as_number();
            if value.is_finite() {
                on_scale(value as f32);
            }
        }));

        let select = model_select.clone();
        let on_model = callbacks.on_model;
        listeners.push(EventListener::new(&model_select, "change", move |_| {
            on_model(model_or_default(&select.value()));
        }));
    }

    fn show_banner(&self, text: &str) {
        self.banner_text.set_text_content(Some(text));
        let _ = self.banner.remove_attribute("style");
    }

    fn hide_banner(&self) {
        let _ = self.banner.set_attribute("style", "display: none;");
    }
}

fn create(document: &Document, tag: &str, class: &str) -> Element {
    let element = document.create_element(tag).expect("create ui element");
    if !class.is_empty() {
        element.set_class_name(class);
    }
    element
}
