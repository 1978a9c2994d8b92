pub const SCALE_MIN: f32 = 0.1;
pub const SCALE_MAX: f32 = 5.0;

pub const DEFAULT_POSITION: [f32; 3] = [0.0, 0.0, -2.0];
pub const DEFAULT_ROTATION_DEG: [f32; 3] = [0.0, 0.0, 0.0];
pub const DEFAULT_SCALE: f32 = 1.0;

pub fn clamp_scale(value: f32) -> f32 {
    value.clamp(SCALE_MIN, SCALE_MAX)
}

/// Transform of the placed object. Scale is uniform and always kept inside
/// [SCALE_MIN, SCALE_MAX]. Rotation is in degrees and deliberately not
/// wrapped to [0, 360): values accumulate across a long session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedTransform {
    pub position: [f32; 3],
    pub rotation_deg: [f32; 3],
    pub scale: f32,
}

impl Default for PlacedTransform {
    fn default() -> Self {
        Self {
            position: DEFAULT_POSITION,
            rotation_deg: DEFAULT_ROTATION_DEG,
            scale: DEFAULT_SCALE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformDelta {
    pub translate: [f32; 3],
    pub rotate_deg: [f32; 3],
    pub scale_factor: f32,
}

impl Default for TransformDelta {
    fn default() -> Self {
        Self {
            translate: [0.0; 3],
            rotate_deg: [0.0; 3],
            scale_factor: 1.0,
        }
    }
}

impl TransformDelta {
    pub fn translate(translate: [f32; 3]) -> Self {
        Self {
            translate,
            ..Self::default()
        }
    }

    pub fn rotate_deg(rotate_deg: [f32; 3]) -> Self {
        Self {
            rotate_deg,
            ..Self::default()
        }
    }

    pub fn scale_factor(scale_factor: f32) -> Self {
        Self {
            scale_factor,
            ..Self::default()
        }
    }

    pub fn is_identity(&self) -> bool {
        self.translate == [0.0; 3] && self.rotate_deg == [0.0; 3] && self.scale_factor == 1.0
    }
}

impl PlacedTransform {
    pub fn apply(&mut self, delta: &TransformDelta) {
        for axis in 0..3 {
            self.position[axis] += delta.translate[axis];
            self.rotation_deg[axis] += delta.rotate_deg[axis];
        }
        self.scale = clamp_scale(self.scale * delta.scale_factor);
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = clamp_scale(scale);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
