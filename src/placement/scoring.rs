use crate::config::PlacementConfig;
use crate::geometry::{intersection_area, point_distance, Rect, Viewport};
use crate::marker::MarkerSpec;

use super::candidates::Candidate;
use super::ObstacleSet;

/// Everything a single candidate is scored against.
///
/// `siblings` holds positions already assigned to other markers of the same
/// anchor this frame; `obstacles.placed` holds markers of anchors processed
/// earlier, so the two groups never overlap.
pub struct ScoreContext<'a> {
    pub viewport: Viewport,
    pub obstacles: &'a ObstacleSet,
    pub anchor_id: &'a str,
    pub anchor_rect: Rect,
    pub siblings: &'a [Rect],
    /// Smoothed position from the previous frame for this marker's key, if any.
    pub previous: Option<(f32, f32)>,
}

/// Score one candidate; higher is better.
///
/// A candidate extending past the viewport is rejected outright with the
/// out-of-bounds sentinel before any other term is evaluated, so no bonus
/// can rescue it.
pub fn score_candidate(
    candidate: &Candidate,
    spec: &MarkerSpec,
    ctx: &ScoreContext<'_>,
    config: &PlacementConfig,
) -> f32 {
    let rect = candidate.rect;
    if !ctx.viewport.contains(&rect) {
        return config.out_of_bounds_score;
    }

    let mut score = spec
        .preferred_positions
        .get(&candidate.name)
        .copied()
        .unwrap_or(0.0);

    for face in &ctx.obstacles.faces {
        score -= intersection_area(&rect, face) * config.face_overlap_weight;
    }
    for (id, other) in &ctx.obstacles.anchors {
        // Self-exclusion is by anchor id, not by rectangle equality.
        if id == ctx.anchor_id {
            continue;
        }
        score -= intersection_area(&rect, other) * config.anchor_overlap_weight;
    }
    for sibling in ctx.siblings {
        score -= intersection_area(&rect, sibling) * config.sibling_overlap_weight;
    }
    for placed in &ctx.obstacles.placed {
        score -= intersection_area(&rect, placed) * config.marker_overlap_weight;
    }

    score -= point_distance(rect.center(), ctx.anchor_rect.center()) * config.distance_weight;

    if let Some(previous) = ctx.previous {
        if point_distance((rect.x, rect.y), previous) <= config.previous_position_radius {
            score += config.previous_position_bonus;
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::super::candidates::CandidateName;
    use super::*;

    fn spec() -> MarkerSpec {
        MarkerSpec {
            id: "primary".to_string(),
            width: 40.0,
            height: 20.0,
            priority: 10,
            color: "#4F8EF7".to_string(),
            content: String::new(),
            preferred_positions: HashMap::new(),
        }
    }

    fn candidate(name: CandidateName, rect: Rect) -> Candidate {
        Candidate { name, rect }
    }

    fn empty_obstacles() -> ObstacleSet {
        ObstacleSet {
            faces: Vec::new(),
            anchors: Vec::new(),
            placed: Vec::new(),
        }
    }

    fn context<'a>(obstacles: &'a ObstacleSet, siblings: &'a [Rect]) -> ScoreContext<'a> {
        ScoreContext {
            viewport: Viewport::new(640.0, 480.0),
            obstacles,
            anchor_id: "a",
            anchor_rect: Rect::new(100.0, 100.0, 50.0, 50.0),
            siblings,
            previous: None,
        }
    }

    #[test]
    fn out_of_bounds_returns_sentinel_despite_bonus() {
        let obstacles = empty_obstacles();
        let mut ctx = context(&obstacles, &[]);
        // Previous position right on top of the candidate: bonus would apply
        // if the hard constraint did not short-circuit first.
        ctx.previous = Some((-10.0, 45.0));
        let config = PlacementConfig::default();
        let c = candidate(CandidateName::Left, Rect::new(-10.0, 45.0, 40.0, 20.0));
        let score = score_candidate(&c, &spec(), &ctx, &config);
        assert_eq!(score, config.out_of_bounds_score);
    }

    #[test]
    fn face_overlap_outweighs_anchor_overlap() {
        let config = PlacementConfig::default();
        let overlapping = Rect::new(200.0, 100.0, 40.0, 20.0);
        let c = candidate(CandidateName::Right, overlapping);

        let faces = ObstacleSet {
            faces: vec![overlapping],
            anchors: Vec::new(),
            placed: Vec::new(),
        };
        let anchors = ObstacleSet {
            faces: Vec::new(),
            anchors: vec![("b".to_string(), overlapping)],
            placed: Vec::new(),
        };
        let face_score = score_candidate(&c, &spec(), &context(&faces, &[]), &config);
        let anchor_score = score_candidate(&c, &spec(), &context(&anchors, &[]), &config);
        assert!(
            face_score < anchor_score,
            "covering a face must cost more than covering another anchor"
        );
    }

    #[test]
    fn own_anchor_is_excluded_by_id() {
        let config = PlacementConfig::default();
        let c = candidate(CandidateName::Right, Rect::new(120.0, 110.0, 40.0, 20.0));
        let obstacles = ObstacleSet {
            faces: Vec::new(),
            anchors: vec![("a".to_string(), Rect::new(100.0, 100.0, 50.0, 50.0))],
            placed: Vec::new(),
        };
        let ctx = context(&obstacles, &[]);
        let score = score_candidate(&c, &spec(), &ctx, &config);
        // Only the distance pull applies; the overlap with the own anchor is free.
        let expected = -point_distance(c.rect.center(), ctx.anchor_rect.center()) * 0.1;
        assert!((score - expected).abs() < 1e-3, "got {score}, expected {expected}");
    }

    #[test]
    fn sibling_overlap_costs_double_the_marker_weight() {
        let config = PlacementConfig::default();
        let overlapping = Rect::new(200.0, 100.0, 40.0, 20.0);
        let c = candidate(CandidateName::Right, overlapping);

        let empty = empty_obstacles();
        let siblings = [overlapping];
        let sibling_score = score_candidate(&c, &spec(), &context(&empty, &siblings), &config);

        let placed = ObstacleSet {
            faces: Vec::new(),
            anchors: Vec::new(),
            placed: vec![overlapping],
        };
        let placed_score = score_candidate(&c, &spec(), &context(&placed, &[]), &config);
        assert!(
            sibling_score < placed_score,
            "a same-anchor sibling should repel harder than a foreign marker"
        );
    }

    #[test]
    fn previous_position_bonus_applies_within_radius() {
        let config = PlacementConfig::default();
        let c = candidate(CandidateName::Right, Rect::new(200.0, 100.0, 40.0, 20.0));
        let obstacles = empty_obstacles();

        let mut near = context(&obstacles, &[]);
        near.previous = Some((230.0, 140.0)); // 50 px away exactly
        let mut far = context(&obstacles, &[]);
        far.previous = Some((200.0, 151.0)); // 51 px away

        let near_score = score_candidate(&c, &spec(), &near, &config);
        let far_score = score_candidate(&c, &spec(), &far, &config);
        assert!((near_score - far_score - 150.0).abs() < 1e-3);
    }

    #[test]
    fn preference_bonus_added_for_matching_name() {
        let config = PlacementConfig::default();
        let mut preferring = spec();
        preferring
            .preferred_positions
            .insert(CandidateName::Right, 80.0);
        let c = candidate(CandidateName::Right, Rect::new(200.0, 100.0, 40.0, 20.0));
        let obstacles = empty_obstacles();
        let ctx = context(&obstacles, &[]);
        let with_pref = score_candidate(&c, &preferring, &ctx, &config);
        let without = score_candidate(&c, &spec(), &ctx, &config);
        assert!((with_pref - without - 80.0).abs() < 1e-3);
    }
}
