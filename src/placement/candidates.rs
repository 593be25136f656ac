use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// The eight named offsets considered for a marker, in generation order.
///
/// Generation order is the tie-break order: when two candidates score
/// equally, the earlier one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CandidateName {
    Right,
    Left,
    Top,
    Bottom,
    TopRight,
    TopLeft,
    BottomRight,
    BottomLeft,
}

pub const CANDIDATE_COUNT: usize = 8;

#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub name: CandidateName,
    pub rect: Rect,
}

/// Compute the fixed candidate set for a marker of `width` x `height` around
/// `anchor`. Edge candidates are centered on the facing anchor edge; corner
/// candidates sit flush against the matching anchor corner plus `margin`.
///
/// Pure function of its inputs: candidate shape depends only on the anchor
/// rectangle and the marker dimensions, so scoring stays fully decoupled.
pub fn generate_candidates(
    anchor: &Rect,
    width: f32,
    height: f32,
    margin: f32,
) -> [Candidate; CANDIDATE_COUNT] {
    let (center_x, center_y) = anchor.center();
    let left_x = anchor.x - margin - width;
    let right_x = anchor.right() + margin;
    let top_y = anchor.y - margin - height;
    let bottom_y = anchor.bottom() + margin;
    let mid_x = center_x - width * 0.5;
    let mid_y = center_y - height * 0.5;

    let at = |name, x, y| Candidate {
        name,
        rect: Rect::new(x, y, width, height),
    };

    [
        at(CandidateName::Right, right_x, mid_y),
        at(CandidateName::Left, left_x, mid_y),
        at(CandidateName::Top, mid_x, top_y),
        at(CandidateName::Bottom, mid_x, bottom_y),
        at(CandidateName::TopRight, right_x, top_y),
        at(CandidateName::TopLeft, left_x, top_y),
        at(CandidateName::BottomRight, right_x, bottom_y),
        at(CandidateName::BottomLeft, left_x, bottom_y),
    ]
}
