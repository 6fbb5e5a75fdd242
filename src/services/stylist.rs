use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;

use crate::{
    db::WardrobeStore,
    error::{AppError, AppResult},
    models::{ClothingItem, ItemId, NewClothingItem, Outfit, UserId},
    services::{
        color_rules::ColorRules,
        embedding_cache::EmbeddingCache,
        filter::{filter_wardrobe, OutfitContext},
        scorer::Scorer,
        selector::select_from,
    },
};

/// Scoring engine chosen at startup
pub enum ScoringEngine {
    ColorRules(ColorRules),
    Embedding(Arc<EmbeddingCache>),
}

impl ScoringEngine {
    fn name(&self) -> &'static str {
        match self {
            ScoringEngine::ColorRules(_) => "rules",
            ScoringEngine::Embedding(_) => "embedding",
        }
    }
}

/// Outcome of a suggestion request
#[derive(Debug, Clone, PartialEq)]
pub enum Suggestion {
    Found(Outfit),
    /// The wardrobe has items but no acceptable outfit for the context
    NoMatch,
    /// Unknown user or a wardrobe without items
    EmptyWardrobe,
}

impl Suggestion {
    pub fn into_outfit(self) -> Option<Outfit> {
        match self {
            Suggestion::Found(outfit) => Some(outfit),
            Suggestion::NoMatch | Suggestion::EmptyWardrobe => None,
        }
    }
}

/// Wardrobe-facing service: suggestions plus wardrobe mutations that keep
/// the embedding cache consistent
pub struct Stylist {
    store: Arc<dyn WardrobeStore>,
    engine: ScoringEngine,
    shuffle_seed: Option<u64>,
}

impl Stylist {
    pub fn new(store: Arc<dyn WardrobeStore>, engine: ScoringEngine, shuffle_seed: Option<u64>) -> Self {
        Self {
            store,
            engine,
            shuffle_seed,
        }
    }

    /// Suggests an outfit for `user_id` in the given context.
    ///
    /// `Ok(None)` means the wardrobe has no acceptable outfit. An unreachable
    /// encoder is an error, never an empty suggestion.
    pub async fn get_suggestion(&self, user_id: UserId, context: &OutfitContext) -> AppResult<Option<Outfit>> {
        Ok(self.suggest(user_id, context).await?.into_outfit())
    }

    /// Like [`Stylist::get_suggestion`], but tells an empty wardrobe apart
    /// from a wardrobe without a matching outfit
    pub async fn suggest(&self, user_id: UserId, context: &OutfitContext) -> AppResult<Suggestion> {
        let wardrobe = self.store.get_wardrobe(user_id).await?;
        if wardrobe.is_empty() {
            tracing::info!(user_id, "Empty wardrobe, no suggestion");
            return Ok(Suggestion::EmptyWardrobe);
        }

        let filtered = filter_wardrobe(&wardrobe, context);
        if !filtered.is_viable() {
            tracing::info!(user_id, occasion = %context.occasion, "No items for every required role");
            return Ok(Suggestion::NoMatch);
        }

        let scorer = match &self.engine {
            ScoringEngine::ColorRules(rules) => Scorer::Rules(rules.clone()),
            // Embeddings cover the whole wardrobe so the cache survives context changes.
            ScoringEngine::Embedding(cache) => Scorer::Embedding(cache.get_or_build(user_id, &wardrobe).await?),
        };

        let mut rng = match self.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let outfit = select_from(&filtered, &scorer, &mut rng)?;

        tracing::info!(
            user_id,
            engine = self.engine.name(),
            candidates = filtered.candidate_count(),
            found = outfit.is_some(),
            "Outfit selection finished"
        );

        Ok(outfit.map_or(Suggestion::NoMatch, Suggestion::Found))
    }

    pub async fn wardrobe(&self, user_id: UserId) -> AppResult<Vec<ClothingItem>> {
        self.store.get_wardrobe(user_id).await
    }

    /// Stores a new item and invalidates the user's embeddings
    pub async fn add_item(&self, user_id: UserId, item: NewClothingItem) -> AppResult<ClothingItem> {
        item.validate().map_err(AppError::InvalidInput)?;

        let stored = self.store.add_item(user_id, item).await?;
        self.invalidate(user_id).await?;

        tracing::info!(user_id, item_id = stored.id, "Wardrobe item added");
        Ok(stored)
    }

    /// Deletes an item; returns `false` when the user does not own it
    pub async fn remove_item(&self, user_id: UserId, item_id: ItemId) -> AppResult<bool> {
        let deleted = self.store.delete_item(user_id, item_id).await?;
        if deleted {
            self.invalidate(user_id).await?;
            tracing::info!(user_id, item_id, "Wardrobe item deleted");
        }

        Ok(deleted)
    }

    async fn invalidate(&self, user_id: UserId) -> AppResult<()> {
        if let ScoringEngine::Embedding(cache) = &self.engine {
            cache.invalidate(user_id).await?;
        }
        Ok(())
    }
}
