use std::cell::RefCell;
use std::rc::Rc;

mod app;
mod boot;
mod camera_runtime;
mod events;
mod gesture_runtime;
mod prefs;
mod scene;
mod tracking_runtime;
mod ui;

use app::AppServices;

thread_local! {
    static APP: RefCell<Option<Rc<AppServices>>> = RefCell::new(None);
}

fn main() {
    boot::set_phase("init", "starting viewer");
    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        boot::fail("no-document", "document unavailable");
        return;
    };
    match app::boot_app(&document) {
        Some(services) => {
            APP.with(|slot| *slot.borrow_mut() = Some(services));
            boot::ready();
        }
        None => boot::fail("scene-missing", "scene entities unavailable"),
    }
}
