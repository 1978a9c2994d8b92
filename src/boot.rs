use std::cell::Cell;

use js_sys::{Array, Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};

thread_local! {
    static READY_SENT: Cell<bool> = Cell::new(false);
}

/// Calls into the host page's `__UKABE_BOOT` object, which drives the
/// loading screen before the wasm module takes over. All failures are
/// swallowed: a page without the bridge just gets no progress reporting.
fn call_host(method: &str, args: &[&str]) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Ok(boot) = Reflect::get(&window, &JsValue::from_str("__UKABE_BOOT")) else {
        return;
    };
    if boot.is_null() || boot.is_undefined() {
        return;
    }
    let Ok(value) = Reflect::get(&boot, &JsValue::from_str(method)) else {
        return;
    };
    let Ok(func) = value.dyn_into::<Function>() else {
        return;
    };
    let list = Array::new();
    for arg in args {
        list.push(&JsValue::from_str(arg));
    }
    let _ = func.apply(&boot, &list);
}

pub(crate) fn set_phase(label: &str, detail: &str) {
    call_host("setPhase", &[label, detail]);
}

pub(crate) fn fail(code: &str, message: &str) {
    call_host("fail", &[code, message]);
}

pub(crate) fn ready() {
    let already_sent = READY_SENT.with(|flag| flag.replace(true));
    if !already_sent {
        call_host("ready", &[]);
    }
}
