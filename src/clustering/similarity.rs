use tracing::warn;

use crate::TARGET_PIPELINE;

/// Calculate cosine similarity directly between two vectors
///
/// Near-zero-magnitude or mismatched vectors get similarity 0.0, so they
/// never qualify as neighbors of anything.
///
/// # Arguments
/// * `vec1` - First vector
/// * `vec2` - Second vector
///
/// # Returns
/// * `f32` - The cosine similarity
pub fn cosine_similarity(vec1: &[f32], vec2: &[f32]) -> f32 {
    if vec1.len() != vec2.len() {
        warn!(
            target: TARGET_PIPELINE,
            "Vector dimensions don't match: {} vs {}",
            vec1.len(),
            vec2.len()
        );
        return 0.0;
    }

    let mag1: f32 = vec1.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag2: f32 = vec2.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag1 < 0.001 || mag2 < 0.001 {
        return 0.0;
    }

    let dot_product: f32 = vec1.iter().zip(vec2.iter()).map(|(a, b)| a * b).sum();
    dot_product / (mag1 * mag2)
}

/// Cosine distance, the metric the clustering engine groups on.
pub fn cosine_distance(vec1: &[f32], vec2: &[f32]) -> f32 {
    1.0 - cosine_similarity(vec1, vec2)
}
