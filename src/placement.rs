// Per-frame placement pass: candidate generation, scoring, selection,
// smoothing and memory expiry, in that order. All functions here work with
// pure geometry; acquisition and drawing belong to the host.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::config::PlacementConfig;
use crate::geometry::{Rect, Viewport};
use crate::marker::{Anchor, DefaultMarkerPolicy, MarkerPolicy, MarkerSpec, PlacedMarker};

mod candidates;
mod scoring;
mod selection;
mod stabilize;

pub use candidates::{generate_candidates, Candidate, CandidateName, CANDIDATE_COUNT};
pub use scoring::{score_candidate, ScoreContext};
pub use selection::select_best;
pub use stabilize::Stabilizer;

/// Everything the host hands the engine for one frame.
///
/// Timestamps come from the host clock so replayed or simulated frame
/// streams behave identically to live ones.
#[derive(Debug, Clone)]
pub struct FrameInput {
    pub timestamp_ms: f64,
    pub viewport: Viewport,
    /// Regions that must never be covered. Purely geometric, no identity.
    pub faces: Vec<Rect>,
    pub anchors: Vec<Anchor>,
}

/// The per-frame obstacle collection candidates are scored against.
/// Rebuilt from empty every frame.
#[derive(Debug, Clone, Default)]
pub struct ObstacleSet {
    pub faces: Vec<Rect>,
    /// Anchor rectangles with their ids; the anchor being placed is skipped
    /// by id during scoring.
    pub anchors: Vec<(String, Rect)>,
    /// Markers already placed this frame for anchors processed earlier.
    pub placed: Vec<Rect>,
}

impl ObstacleSet {
    fn from_frame(frame: &FrameInput) -> Self {
        Self {
            faces: frame.faces.clone(),
            anchors: frame
                .anchors
                .iter()
                .map(|anchor| (anchor.id.clone(), anchor.rect))
                .collect(),
            placed: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct RegisteredAnchor {
    specs: Vec<MarkerSpec>,
    last_seen_ms: f64,
}

/// Owns all cross-frame placement state: the per-anchor marker registry and
/// the smoothing/memory layer. One instance per session. The frame pass is
/// single-threaded; a host running it off several threads must serialize
/// access, since the read-then-write smoothing update is not atomic.
pub struct PlacementEngine {
    config: PlacementConfig,
    policy: Box<dyn MarkerPolicy + Send>,
    registry: HashMap<String, RegisteredAnchor>,
    stabilizer: Stabilizer,
}

impl PlacementEngine {
    pub fn new(config: PlacementConfig) -> Self {
        Self::with_policy(config, Box::new(DefaultMarkerPolicy))
    }

    pub fn with_policy(config: PlacementConfig, policy: Box<dyn MarkerPolicy + Send>) -> Self {
        Self {
            config,
            policy,
            registry: HashMap::new(),
            stabilizer: Stabilizer::new(),
        }
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Forget all registered markers and smoothing state. Called on session
    /// (re)start so a fresh run never inherits a previous session's lerp
    /// state.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.stabilizer.clear();
    }

    /// Run one full placement pass and return the markers to draw.
    ///
    /// Markers with no viable position this frame are absent from the result;
    /// that absence is expected behavior, not an error. Viewport bounds are
    /// re-read every call, so resizes take effect without a reset.
    pub fn place_frame(&mut self, frame: &FrameInput) -> Vec<PlacedMarker> {
        let now_ms = frame.timestamp_ms;
        let mut obstacles = ObstacleSet::from_frame(frame);
        let mut placed = Vec::new();
        let mut observed_keys: HashSet<String> = HashSet::new();

        for anchor in &frame.anchors {
            if !self.registry.contains_key(&anchor.id) {
                let specs = self.policy.markers_for(anchor);
                debug!(anchor = %anchor.id, markers = specs.len(), "registering new anchor");
                self.registry.insert(
                    anchor.id.clone(),
                    RegisteredAnchor {
                        specs,
                        last_seen_ms: now_ms,
                    },
                );
            }
            let Some(entry) = self.registry.get_mut(&anchor.id) else {
                continue;
            };
            entry.last_seen_ms = now_ms;
            let mut specs = entry.specs.clone();

            // High-priority markers claim space first and become obstacles
            // for the rest; the sort is stable, so equal priorities keep
            // registration order.
            specs.sort_by(|a, b| b.priority.cmp(&a.priority));
            let multi_marker = specs.len() > 1;
            let mut siblings: Vec<Rect> = Vec::new();

            for spec in &specs {
                let key = stabilization_key(&anchor.id, &spec.id, multi_marker);
                let candidates =
                    generate_candidates(&anchor.rect, spec.width, spec.height, self.config.margin);
                let ctx = ScoreContext {
                    viewport: frame.viewport,
                    obstacles: &obstacles,
                    anchor_id: &anchor.id,
                    anchor_rect: anchor.rect,
                    siblings: &siblings,
                    previous: self.stabilizer.previous_position(&key),
                };
                let scored: Vec<(Candidate, f32)> = candidates
                    .iter()
                    .map(|candidate| {
                        (
                            *candidate,
                            score_candidate(candidate, spec, &ctx, &self.config),
                        )
                    })
                    .collect();
                let Some(best) = select_best(&scored, self.config.viability_threshold) else {
                    continue;
                };

                let (x, y) = self.stabilizer.stabilize(
                    &key,
                    (best.rect.x, best.rect.y),
                    now_ms,
                    self.config.smoothing_factor,
                );
                observed_keys.insert(key);

                let rect = Rect::new(x, y, spec.width, spec.height);
                siblings.push(rect);
                placed.push(PlacedMarker {
                    anchor_id: anchor.id.clone(),
                    marker_id: spec.id.clone(),
                    rect,
                    color: spec.color.clone(),
                    content: spec.content.clone(),
                });
            }

            obstacles.placed.extend(siblings);
        }

        // Expiry runs after placement so keys refreshed this frame are never
        // swept, and uses elapsed time so a brief dropout inside the timeout
        // window keeps its smoothing state.
        self.stabilizer.expire(
            now_ms,
            self.config.position_memory_timeout_ms,
            &observed_keys,
        );
        let timeout_ms = self.config.position_memory_timeout_ms;
        let stabilizer = &self.stabilizer;
        self.registry.retain(|anchor_id, entry| {
            let stale = now_ms - entry.last_seen_ms > timeout_ms;
            if stale && !stabilizer.has_keys_for(anchor_id) {
                debug!(anchor = %anchor_id, "dropping marker registry for expired anchor");
                false
            } else {
                true
            }
        });

        placed
    }
}

/// Memory key for one marker: the bare anchor id when the anchor carries a
/// single marker, `anchor/marker` otherwise.
fn stabilization_key(anchor_id: &str, marker_id: &str, multi_marker: bool) -> String {
    if multi_marker {
        format!("{anchor_id}/{marker_id}")
    } else {
        anchor_id.to_string()
    }
}
