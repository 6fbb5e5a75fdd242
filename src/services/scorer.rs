use thiserror::Error;

use crate::{
    models::{ClothingItem, ItemId},
    services::{color_rules::ColorRules, embedding_cache::WardrobeEmbeddings},
};

/// Error types for scoring
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("no embedding cached for item {item_id}")]
    MissingEmbedding { item_id: ItemId },
}

/// Outcome of scoring one (shirt, pants, shoes) triple
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    /// Pass/fail verdict of the color rules
    Accepted(bool),
    /// Mean pairwise cosine similarity, in `[-1, 1]`
    Similarity(f32),
}

impl Score {
    pub fn is_accepted(&self) -> bool {
        match self {
            Score::Accepted(accepted) => *accepted,
            Score::Similarity(_) => true,
        }
    }

    /// Rankable value; a rejected triple has none
    pub fn value(&self) -> Option<f32> {
        match self {
            Score::Accepted(true) => Some(1.0),
            Score::Accepted(false) => None,
            Score::Similarity(similarity) => Some(*similarity),
        }
    }
}

/// How the selector walks the candidate space for a scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPolicy {
    /// Shuffle buckets and stop at the first accepted triple
    FirstAccepted,
    /// Evaluate every triple and keep the maximum
    BestScore,
}

/// Outfit compatibility scorer, fixed at construction
#[derive(Debug, Clone)]
pub enum Scorer {
    Rules(ColorRules),
    Embedding(WardrobeEmbeddings),
}

impl Scorer {
    pub fn search_policy(&self) -> SearchPolicy {
        match self {
            Scorer::Rules(_) => SearchPolicy::FirstAccepted,
            Scorer::Embedding(_) => SearchPolicy::BestScore,
        }
    }

    pub fn score(
        &self,
        shirt: &ClothingItem,
        pants: &ClothingItem,
        shoes: &ClothingItem,
    ) -> Result<Score, ScoreError> {
        match self {
            Scorer::Rules(rules) => Ok(Score::Accepted(rules.accepts(shirt, pants, shoes))),
            Scorer::Embedding(embeddings) => {
                let shirt_vec = embedding_for(embeddings, shirt)?;
                let pants_vec = embedding_for(embeddings, pants)?;
                let shoes_vec = embedding_for(embeddings, shoes)?;

                // Pants are the pivot; shirt-shoes similarity is not part of the score.
                let shirt_pants = cosine_similarity(shirt_vec, pants_vec);
                let pants_shoes = cosine_similarity(pants_vec, shoes_vec);

                Ok(Score::Similarity((shirt_pants + pants_shoes) / 2.0))
            }
        }
    }
}

fn embedding_for<'e>(
    embeddings: &'e WardrobeEmbeddings,
    item: &ClothingItem,
) -> Result<&'e [f32], ScoreError> {
    embeddings
        .get(item.id)
        .ok_or(ScoreError::MissingEmbedding { item_id: item.id })
}

/// Cosine similarity in `[-1, 1]`, accumulated in f64.
///
/// Returns 0.0 for zero vectors or mismatched dimensions.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let mut dot: f64 = 0.0;
    let mut norm_a: f64 = 0.0;
    let mut norm_b: f64 = 0.0;

    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0) as f32
}
