use serde::{Deserialize, Serialize};

/// The closed set of signals exchanged between the camera, tracking and
/// gesture layers. Replaces the stringly-named DOM custom events of the
/// original viewer so every signal and payload is enumerable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneEvent {
    /// A live camera stream is attached to the video sink.
    CameraActive,
    /// Acquisition gave up (denied or budget exhausted); the session runs
    /// in the non-camera presentation until the user retries.
    CameraDegraded,
    MarkerFound,
    MarkerLost,
    /// The object has been placed and is under user transform control.
    ModelPlaced,
    ModelReset,
}
