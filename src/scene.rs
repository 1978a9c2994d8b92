use web_sys::{Document, Element};

use ukabe_core::transform::PlacedTransform;

pub(crate) const ANCHORED_MODEL_ID: &str = "anchored-model";
pub(crate) const FALLBACK_MODEL_ID: &str = "fallback-model";
pub(crate) const MARKER_ANCHOR_ID: &str = "marker-anchor";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SceneNode {
    Anchored,
    Fallback,
}

/// Seam to the declarative rendering engine. Entities are driven entirely
/// through string attributes: positions and scales as "x y z" tuples,
/// rotations as degree tuples.
pub(crate) trait SceneGraph {
    fn set_visible(&self, node: SceneNode, visible: bool);
    fn set_position(&self, node: SceneNode, position: [f32; 3]);
    fn set_rotation_deg(&self, node: SceneNode, rotation_deg: [f32; 3]);
    fn set_scale(&self, node: SceneNode, scale: f32);
    fn set_model_src(&self, src: &str);

    /// The placed transform drives the anchored entity only; the fallback
    /// substitute is posed by device orientation while it is on screen.
    fn apply_transform(&self, transform: &PlacedTransform) {
        self.set_position(SceneNode::Anchored, transform.position);
        self.set_rotation_deg(SceneNode::Anchored, transform.rotation_deg);
        self.set_scale(SceneNode::Anchored, transform.scale);
    }
}

pub(crate) fn fmt_f32(value: f32) -> String {
    format!("{:.3}", value)
}

pub(crate) fn fmt_tuple(values: [f32; 3]) -> String {
    format!(
        "{} {} {}",
        fmt_f32(values[0]),
        fmt_f32(values[1]),
        fmt_f32(values[2])
    )
}

pub(crate) struct DomScene {
    anchored: Element,
    fallback: Element,
}

impl DomScene {
    pub(crate) fn attach(document: &Document) -> Option<Self> {
        let anchored = document.get_element_by_id(ANCHORED_MODEL_ID);
        let fallback = document.get_element_by_id(FALLBACK_MODEL_ID);
        match (anchored, fallback) {
            (Some(anchored), Some(fallback)) => Some(Self { anchored, fallback }),
            _ => {
                gloo::console::warn!("scene: model entities missing, scene updates disabled");
                None
            }
        }
    }

    fn element(&self, node: SceneNode) -> &Element {
        match node {
            SceneNode::Anchored => &self.anchored,
            SceneNode::Fallback => &self.fallback,
        }
    }
}

impl SceneGraph for DomScene {
    fn set_visible(&self, node: SceneNode, visible: bool) {
        let value = if visible { "true" } else { "false" };
        let _ = self.element(node).set_attribute("visible", value);
    }

    fn set_position(&self, node: SceneNode, position: [f32; 3]) {
        let _ = self
            .element(node)
            .set_attribute("position", &fmt_tuple(position));
    }

    fn set_rotation_deg(&self, node: SceneNode, rotation_deg: [f32; 3]) {
        let _ = self
            .element(node)
            .set_attribute("rotation", &fmt_tuple(rotation_deg));
    }

    fn set_scale(&self, node: SceneNode, scale: f32) {
        let value = fmt_tuple([scale, scale, scale]);
        let _ = self.element(node).set_attribute("scale", &value);
    }

    fn set_model_src(&self, src: &str) {
        for node in [SceneNode::Anchored, SceneNode::Fallback] {
            let _ = self.element(node).set_attribute("gltf-model", src);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuples_are_fixed_precision_space_separated() {
        assert_eq!(fmt_tuple([0.0, -1.5, 2.0]), "0.000 -1.500 2.000");
        assert_eq!(fmt_tuple([0.12345, 0.0, 0.0]), "0.123 0.000 0.000");
    }
}
