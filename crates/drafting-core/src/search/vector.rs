//! Vector ranking of stored templates
//!
//! Scores every template that has an embedding against the query vector,
//! sorts descending and keeps store order for ties.

use shared_types::Template;

use super::Candidate;

/// Cosine similarity of two vectors.
///
/// Zero-magnitude inputs score exactly 0.0. Vectors of different length are
/// dotted over their common prefix, while each norm covers its full vector.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| *x as f64 * *y as f64)
        .sum();
    let norm_a = norm(a);
    let norm_b = norm(b);

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot / (norm_a * norm_b);
    similarity.clamp(-1.0, 1.0) as f32
}

fn norm(v: &[f32]) -> f64 {
    v.iter().map(|x| *x as f64 * *x as f64).sum::<f64>().sqrt()
}

fn round3(score: f32) -> f32 {
    ((score as f64 * 1000.0).round() / 1000.0) as f32
}

/// Score and sort every template that carries an embedding
pub fn rank_candidates(query_embedding: &[f32], templates: &[Template]) -> Vec<Candidate> {
    let mut scored: Vec<Candidate> = templates
        .iter()
        .filter_map(|t| {
            let embedding = t.embedding.as_ref()?;
            Some(Candidate {
                id: t.id,
                title: t.title.clone(),
                tags: t.tags.clone(),
                score: round3(cosine_similarity(query_embedding, embedding)),
            })
        })
        .collect();

    // Stable sort keeps store order among equal scores
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    if let Some(top) = scored.first() {
        tracing::debug!(
            "Ranked {} candidates, top '{}' at {:.3}",
            scored.len(),
            top.title,
            top.score
        );
    }

    scored
}

/// The top `size` ranked candidates
pub fn shortlist(query_embedding: &[f32], templates: &[Template], size: usize) -> Vec<Candidate> {
    let mut ranked = rank_candidates(query_embedding, templates);
    ranked.truncate(size);
    ranked
}
