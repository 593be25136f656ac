use std::collections::HashMap;

use crate::geometry::Rect;
use crate::placement::CandidateName;

/// A detected region for the current frame.
///
/// `id` is stable across frames for the same tracked entity and doubles as
/// the stabilization memory key. Anchors are rebuilt by the host every frame;
/// the engine retains nothing of them beyond their id.
#[derive(Debug, Clone)]
pub struct Anchor {
    pub id: String,
    pub rect: Rect,
    pub label: Option<String>,
}

impl Anchor {
    pub fn new(id: impl Into<String>, rect: Rect) -> Self {
        Self {
            id: id.into(),
            rect,
            label: None,
        }
    }

    pub fn with_label(id: impl Into<String>, rect: Rect, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rect,
            label: Some(label.into()),
        }
    }
}

/// Static definition of one callout attached to an anchor.
///
/// Created once per anchor id by a [`MarkerPolicy`] and dropped when the
/// anchor's memory expires.
#[derive(Debug, Clone)]
pub struct MarkerSpec {
    pub id: String,
    pub width: f32,
    pub height: f32,
    /// Higher-priority markers are placed first and become obstacles for the rest.
    pub priority: i32,
    pub color: String,
    pub content: String,
    /// Per-candidate score bonus, keyed by candidate name.
    pub preferred_positions: HashMap<CandidateName, f32>,
}

/// A marker resolved to its drawable rectangle for this frame.
#[derive(Debug, Clone)]
pub struct PlacedMarker {
    pub anchor_id: String,
    pub marker_id: String,
    /// Final position (integer-rounded) and the size from the `MarkerSpec`.
    pub rect: Rect,
    pub color: String,
    pub content: String,
}

/// Decides which markers a newly seen anchor carries.
///
/// Invoked exactly once per anchor id, the first frame that id appears;
/// the result is cached until the anchor's memory expires.
pub trait MarkerPolicy {
    fn markers_for(&self, anchor: &Anchor) -> Vec<MarkerSpec>;
}

/// Reference policy: one high-priority title callout preferring the space
/// above the anchor, plus a lower-priority detail panel preferring the right.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMarkerPolicy;

impl MarkerPolicy for DefaultMarkerPolicy {
    fn markers_for(&self, anchor: &Anchor) -> Vec<MarkerSpec> {
        let title = anchor
            .label
            .clone()
            .unwrap_or_else(|| anchor.id.clone());
        vec![
            MarkerSpec {
                id: "primary".to_string(),
                width: 120.0,
                height: 48.0,
                priority: 10,
                color: "#4F8EF7".to_string(),
                content: title,
                preferred_positions: HashMap::from([(CandidateName::Top, 100.0)]),
            },
            MarkerSpec {
                id: "secondary".to_string(),
                width: 160.0,
                height: 90.0,
                priority: 5,
                color: "#8C9BAB".to_string(),
                content: String::new(),
                preferred_positions: HashMap::from([(CandidateName::Right, 60.0)]),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_attaches_two_markers() {
        let anchor = Anchor::new("left-0", Rect::new(0.0, 0.0, 50.0, 50.0));
        let specs = DefaultMarkerPolicy.markers_for(&anchor);
        assert_eq!(specs.len(), 2);
        assert!(
            specs[0].priority > specs[1].priority,
            "primary should outrank secondary"
        );
    }

    #[test]
    fn default_policy_uses_label_as_title() {
        let anchor = Anchor::with_label("left-0", Rect::new(0.0, 0.0, 50.0, 50.0), "Left");
        let specs = DefaultMarkerPolicy.markers_for(&anchor);
        assert_eq!(specs[0].content, "Left");
    }

    #[test]
    fn default_policy_falls_back_to_anchor_id() {
        let anchor = Anchor::new("right-1", Rect::new(0.0, 0.0, 50.0, 50.0));
        let specs = DefaultMarkerPolicy.markers_for(&anchor);
        assert_eq!(specs[0].content, "right-1");
    }
}
