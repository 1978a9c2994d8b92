use gloo::storage::{LocalStorage, Storage};
use serde::{Deserialize, Serialize};

use ukabe_core::catalog::DEFAULT_MODEL_SLUG;
use ukabe_core::gesture::GestureMode;

const PREFS_KEY: &str = "ukabe.prefs.v1";
const PREFS_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct ViewerPrefs {
    pub(crate) version: u32,
    pub(crate) model_slug: String,
    pub(crate) gesture_mode: GestureMode,
}

impl Default for ViewerPrefs {
    fn default() -> Self {
        Self {
            version: PREFS_VERSION,
            model_slug: DEFAULT_MODEL_SLUG.to_string(),
            gesture_mode: GestureMode::Move,
        }
    }
}

pub(crate) fn load_prefs() -> ViewerPrefs {
    match LocalStorage::get::<ViewerPrefs>(PREFS_KEY) {
        Ok(prefs) if prefs.version == PREFS_VERSION => prefs,
        Ok(_) => {
            gloo::console::log!("prefs: version mismatch, using defaults");
            ViewerPrefs::default()
        }
        Err(_) => ViewerPrefs::default(),
    }
}

pub(crate) fn save_prefs(prefs: &ViewerPrefs) {
    if LocalStorage::set(PREFS_KEY, prefs).is_err() {
        gloo::console::warn!("prefs: save failed");
    }
}
