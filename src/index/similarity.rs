//! Vector similarity for embeddings.

/// Cosine similarity between two vectors, in [-1, 1].
///
/// A zero-norm vector has no direction; similarity against it is 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Retrieval score: cosine similarity clamped to [0, 1].
///
/// Negative similarity means "unrelated", not "worth ranking below
/// unrelated"; clamping keeps scores in the range the answer layer expects.
pub fn relevance_score(a: &[f32], b: &[f32]) -> f32 {
    cosine_similarity(a, b).clamp(0.0, 1.0)
}
