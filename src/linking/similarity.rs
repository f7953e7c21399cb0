//! Cosine similarity and threshold ranking.

use serde::Serialize;

/// Cosine similarity of two vectors, accumulated in `f64`.
///
/// Returns `None` when either vector is empty, the dimensions differ, or
/// either norm is zero. Callers treat `None` as "not comparable", never as 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    let score = dot / (norm_a.sqrt() * norm_b.sqrt());
    score.is_finite().then(|| score.clamp(-1.0, 1.0))
}

/// A candidate that cleared the threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedMatch {
    pub id: String,
    pub score: f64,
}

/// Score `query` against every candidate and keep the best `limit` at or above `threshold`.
///
/// Results are sorted by descending score; equal scores keep input order.
/// Candidates that cannot be compared are skipped.
pub fn rank<'a, I>(query: &[f32], candidates: I, threshold: f64, limit: usize) -> Vec<RankedMatch>
where
    I: IntoIterator<Item = (&'a str, &'a [f32])>,
{
    let mut matches: Vec<RankedMatch> = candidates
        .into_iter()
        .filter_map(|(id, vector)| {
            let score = cosine_similarity(query, vector)?;
            (score >= threshold).then(|| RankedMatch {
                id: id.to_string(),
                score,
            })
        })
        .collect();

    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    matches.truncate(limit);
    matches
}
