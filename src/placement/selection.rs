use super::candidates::Candidate;

/// Pick the best-scoring candidate, or `None` when even the best score falls
/// strictly below `viability_threshold`.
///
/// Ties keep the earliest candidate in generation order. The absence result
/// is the caller's signal to skip drawing this marker for the frame; it is
/// applied uniformly whether an anchor carries one marker or several.
pub fn select_best(scored: &[(Candidate, f32)], viability_threshold: f32) -> Option<Candidate> {
    let mut best: Option<(Candidate, f32)> = None;
    for (candidate, score) in scored {
        match best {
            Some((_, best_score)) if *score <= best_score => {}
            _ => best = Some((*candidate, *score)),
        }
    }
    match best {
        Some((candidate, score)) if score >= viability_threshold => Some(candidate),
        _ => None,
    }
}
