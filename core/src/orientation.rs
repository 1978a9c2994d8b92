pub const FLOAT_TILT_MAX_DEG: f32 = 25.0;
pub const FLOAT_TILT_RESPONSE: f32 = 0.25;
pub const FLOAT_BOB_AMPLITUDE: f32 = 0.05;
pub const FLOAT_BOB_PERIOD_MS: f64 = 4000.0;
pub const FLOAT_DISTANCE_Z: f32 = -1.5;

/// Device orientation sample, degrees, as delivered by the sensor API.
/// Any missing angle arrives as 0.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrientationAngles {
    pub alpha: f32,
    pub beta: f32,
    pub gamma: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloatingPose {
    pub position: [f32; 3],
    pub rotation_deg: [f32; 3],
}

pub fn clamp_tilt(value: f32) -> f32 {
    value.clamp(-FLOAT_TILT_MAX_DEG, FLOAT_TILT_MAX_DEG)
}

/// Pose for the substitute object while no ground-truth tracking exists:
/// yaw follows the compass heading, tilt follows a damped beta/gamma, and
/// a slow vertical bob keeps the object from looking frozen.
pub fn floating_pose(angles: OrientationAngles, now_ms: f64) -> FloatingPose {
    let bob_phase = (now_ms % FLOAT_BOB_PERIOD_MS) / FLOAT_BOB_PERIOD_MS;
    let bob = FLOAT_BOB_AMPLITUDE * (bob_phase * std::f64::consts::TAU).sin() as f32;
    FloatingPose {
        position: [0.0, bob, FLOAT_DISTANCE_Z],
        rotation_deg: [
            clamp_tilt(angles.beta * FLOAT_TILT_RESPONSE),
            -angles.alpha,
            clamp_tilt(angles.gamma * FLOAT_TILT_RESPONSE),
        ],
    }
}
