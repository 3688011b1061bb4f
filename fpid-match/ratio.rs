use fpid_core::{KnnMatch, MatchPair};

/// Lowe's ratio test: the best neighbour must be closer than `ratio` times
/// the second. Matches without a second neighbour are rejected.
#[inline]
pub fn passes_ratio_test(m: &KnnMatch, ratio: f32) -> bool {
    match m.second {
        Some(second) => (m.best.distance as f32) < ratio * second.distance as f32,
        None => false,
    }
}

/// Best pairs of the matches that pass the ratio test, in query order
pub fn accepted_matches(matches: &[KnnMatch], ratio: f32) -> Vec<MatchPair> {
    matches
        .iter()
        .filter(|m| passes_ratio_test(m, ratio))
        .map(|m| m.best)
        .collect()
}

/// Score of a (query, candidate) pair
pub fn count_accepted(matches: &[KnnMatch], ratio: f32) -> usize {
    matches.iter().filter(|m| passes_ratio_test(m, ratio)).count()
}
