use std::collections::{HashMap, HashSet};

use tracing::debug;

/// Smoothed position and the timestamp it was last refreshed.
#[derive(Debug, Clone, Copy)]
struct PositionMemory {
    x: f32,
    y: f32,
    last_seen_ms: f64,
}

/// Exponential-smoothing state. `current` trails `target` and never
/// overshoots; the target is refreshed every frame the key is placed.
#[derive(Debug, Clone, Copy)]
struct TransitionState {
    target_x: f32,
    target_y: f32,
    current_x: f32,
    current_y: f32,
}

/// Per-key temporal smoothing and last-seen bookkeeping.
///
/// Both maps share one lifecycle: an entry pair is created on the first
/// placement for a key, refreshed every frame the key is placed, and removed
/// together by [`Stabilizer::expire`]. Positions are smoothed in floating
/// point; only the value handed back for drawing is rounded.
#[derive(Debug, Default)]
pub struct Stabilizer {
    memory: HashMap<String, PositionMemory>,
    transitions: HashMap<String, TransitionState>,
}

impl Stabilizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The rounded position last written for `key`, if the key is tracked.
    pub fn previous_position(&self, key: &str) -> Option<(f32, f32)> {
        self.memory.get(key).map(|m| (m.x, m.y))
    }

    /// Advance `key` toward `target` and return the rounded position to draw.
    ///
    /// The first call for a key returns the target unchanged: seeding
    /// current = target avoids a visible lerp-in from nowhere.
    pub fn stabilize(
        &mut self,
        key: &str,
        target: (f32, f32),
        now_ms: f64,
        smoothing_factor: f32,
    ) -> (f32, f32) {
        let Some(transition) = self.transitions.get_mut(key) else {
            debug!(key, x = target.0, y = target.1, "tracking new stabilization key");
            self.transitions.insert(
                key.to_string(),
                TransitionState {
                    target_x: target.0,
                    target_y: target.1,
                    current_x: target.0,
                    current_y: target.1,
                },
            );
            let rounded = (target.0.round(), target.1.round());
            self.memory.insert(
                key.to_string(),
                PositionMemory {
                    x: rounded.0,
                    y: rounded.1,
                    last_seen_ms: now_ms,
                },
            );
            return rounded;
        };

        transition.target_x = target.0;
        transition.target_y = target.1;
        transition.current_x += (transition.target_x - transition.current_x) * smoothing_factor;
        transition.current_y += (transition.target_y - transition.current_y) * smoothing_factor;
        let rounded = (transition.current_x.round(), transition.current_y.round());

        if let Some(memory) = self.memory.get_mut(key) {
            memory.x = rounded.0;
            memory.y = rounded.1;
            memory.last_seen_ms = now_ms;
        }
        rounded
    }

    /// Drop every key absent from `observed` whose memory is older than
    /// `timeout_ms`. Runs once per frame, after placement; the comparison is
    /// strict, so a key exactly at the timeout boundary survives one more
    /// sweep.
    pub fn expire(&mut self, now_ms: f64, timeout_ms: f64, observed: &HashSet<String>) {
        let stale: Vec<String> = self
            .memory
            .iter()
            .filter(|(key, memory)| {
                !observed.contains(*key) && now_ms - memory.last_seen_ms > timeout_ms
            })
            .map(|(key, _)| key.clone())
            .collect();
        for key in stale {
            debug!(key = %key, "expiring stabilization key");
            self.memory.remove(&key);
            self.transitions.remove(&key);
        }
    }

    /// True when any tracked key belongs to `anchor_id` (the bare id or an
    /// `id/marker` compound).
    pub fn has_keys_for(&self, anchor_id: &str) -> bool {
        self.memory.keys().any(|key| {
            key == anchor_id
                || key
                    .strip_prefix(anchor_id)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    pub fn clear(&mut self) {
        self.memory.clear();
        self.transitions.clear();
    }

    pub fn tracked_keys(&self) -> usize {
        self.memory.len()
    }
}
