pub mod camera;
pub mod catalog;
pub mod events;
pub mod gesture;
pub mod orientation;
pub mod tracking;
pub mod transform;

pub use camera::{
    AttemptError, CameraMachine, CameraPhase, CameraStep, ConstraintTier, RequestTicket,
    SinkHealth, CAMERA_LOAD_TIMEOUT_MS, HEALTH_CHECK_INTERVAL_MS, MAX_ATTEMPTS,
};
pub use catalog::{
    default_model, model_by_slug, model_or_default, ModelCatalogEntry, DEFAULT_MODEL_SLUG,
    MODEL_CATALOG,
};
pub use events::SceneEvent;
pub use gesture::{CameraPose, GestureController, GestureMode, PointerPoint};
pub use orientation::{floating_pose, FloatingPose, OrientationAngles};
pub use tracking::{
    TrackingEffect, TrackingMachine, TrackingMode, GRACE_PERIOD_MS, SEARCH_FALLBACK_TIMEOUT_MS,
};
pub use transform::{PlacedTransform, TransformDelta, SCALE_MAX, SCALE_MIN};
