//! Long-text chunking for embedding providers with a token limit.
//!
//! Chunks are embedded independently, L2-normalized, combined by a
//! token-count-weighted average, and the result re-normalized.

/// Rough token estimate: one token per four characters.
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4).max(1)
}

/// Split `text` on whitespace into chunks of at most `token_limit` tokens.
pub fn split_chunks(text: &str, token_limit: usize) -> Vec<String> {
    if estimate_tokens(text) <= token_limit {
        return vec![text.to_string()];
    }

    let char_limit = token_limit * 4;
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + word.len() + 1 > char_limit {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    if chunks.is_empty() {
        chunks.push(text.to_string());
    }
    chunks
}

/// Combine per-chunk embeddings into one vector.
///
/// Each chunk vector is normalized, weighted by its token count, summed,
/// and the sum re-normalized.
pub fn combine_weighted(chunks: &[String], embeddings: &[Vec<f32>]) -> Vec<f32> {
    debug_assert_eq!(chunks.len(), embeddings.len());
    let dims = embeddings.first().map(Vec::len).unwrap_or(0);
    let mut combined = vec![0.0f32; dims];

    for (text, vec) in chunks.iter().zip(embeddings) {
        let weight = estimate_tokens(text) as f32;
        let norm = l2_norm(vec);
        if norm <= f32::EPSILON {
            continue;
        }
        for (acc, v) in combined.iter_mut().zip(vec) {
            *acc += weight * v / norm;
        }
    }

    normalize(&mut combined);
    combined
}

pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

pub fn normalize(v: &mut [f32]) {
    let norm = l2_norm(v);
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
