/// Per-user style embedding cache
///
/// Embeddings are built for a whole wardrobe snapshot in one batched encoder
/// call and persisted per user. A persisted record is only ever reused for the
/// exact snapshot it was built from; any mismatch triggers a full rebuild.
/// Wardrobe mutations must call [`EmbeddingCache::invalidate`].
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::{
    config::EncoderInput,
    db::{Cache, CacheKey},
    models::{ClothingItem, ItemId, UserId},
    services::providers::{EncoderError, StyleEmbedding, StyleEncoder},
};

/// Error types for the embedding cache
#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Encoder(#[from] EncoderError),

    #[error("embedding store error: {0}")]
    Backend(String),
}

/// Persisted embedding record for one wardrobe snapshot
///
/// `vectors[i]` belongs to `item_ids[i]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedEmbeddings {
    pub item_ids: Vec<ItemId>,
    pub vectors: Vec<StyleEmbedding>,
    pub dimension: usize,
    /// Records from before the input mode existed were text-encoded
    #[serde(default)]
    pub input: EncoderInput,
    pub built_at: DateTime<Utc>,
}

impl CachedEmbeddings {
    /// Whether this record was built from exactly this wardrobe
    pub fn matches(&self, wardrobe: &[ClothingItem]) -> bool {
        self.item_ids.len() == wardrobe.len()
            && self.vectors.len() == wardrobe.len()
            && self.item_ids.iter().zip(wardrobe).all(|(id, item)| *id == item.id)
    }
}

/// Item identity → embedding association for one request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WardrobeEmbeddings {
    by_item: HashMap<ItemId, StyleEmbedding>,
}

impl WardrobeEmbeddings {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (ItemId, StyleEmbedding)>,
    {
        Self {
            by_item: pairs.into_iter().collect(),
        }
    }

    pub fn get(&self, item_id: ItemId) -> Option<&[f32]> {
        self.by_item.get(&item_id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.by_item.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_item.is_empty()
    }
}

impl From<CachedEmbeddings> for WardrobeEmbeddings {
    fn from(record: CachedEmbeddings) -> Self {
        Self::from_pairs(record.item_ids.into_iter().zip(record.vectors))
    }
}

/// Trait for embedding record storage backends
#[async_trait::async_trait]
pub trait EmbeddingStore: Send + Sync {
    async fn load(&self, user_id: UserId) -> Result<Option<CachedEmbeddings>, CacheError>;

    async fn save(&self, user_id: UserId, record: &CachedEmbeddings) -> Result<(), CacheError>;

    async fn delete(&self, user_id: UserId) -> Result<(), CacheError>;

    /// Backend name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Process-local embedding store
#[derive(Default)]
pub struct InMemoryEmbeddingStore {
    records: RwLock<HashMap<UserId, CachedEmbeddings>>,
}

impl InMemoryEmbeddingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl EmbeddingStore for InMemoryEmbeddingStore {
    async fn load(&self, user_id: UserId) -> Result<Option<CachedEmbeddings>, CacheError> {
        Ok(self.records.read().await.get(&user_id).cloned())
    }

    async fn save(&self, user_id: UserId, record: &CachedEmbeddings) -> Result<(), CacheError> {
        self.records.write().await.insert(user_id, record.clone());
        Ok(())
    }

    async fn delete(&self, user_id: UserId) -> Result<(), CacheError> {
        self.records.write().await.remove(&user_id);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Redis-backed embedding store
#[derive(Clone)]
pub struct RedisEmbeddingStore {
    cache: Cache,
    ttl: u64,
}

impl RedisEmbeddingStore {
    pub fn new(cache: Cache, ttl: u64) -> Self {
        Self { cache, ttl }
    }
}

#[async_trait::async_trait]
impl EmbeddingStore for RedisEmbeddingStore {
    async fn load(&self, user_id: UserId) -> Result<Option<CachedEmbeddings>, CacheError> {
        self.cache
            .get_from_cache(&CacheKey::Embeddings(user_id))
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn save(&self, user_id: UserId, record: &CachedEmbeddings) -> Result<(), CacheError> {
        // Awaited rather than queued so a later invalidation cannot be overtaken.
        self.cache
            .set_in_cache(&CacheKey::Embeddings(user_id), record, self.ttl)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn delete(&self, user_id: UserId) -> Result<(), CacheError> {
        self.cache
            .delete_from_cache(&CacheKey::Embeddings(user_id))
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

/// Embedding cache service with a per-user build lock
pub struct EmbeddingCache {
    store: Arc<dyn EmbeddingStore>,
    encoder: Arc<dyn StyleEncoder>,
    input: EncoderInput,
    build_locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl EmbeddingCache {
    pub fn new(store: Arc<dyn EmbeddingStore>, encoder: Arc<dyn StyleEncoder>) -> Self {
        Self {
            store,
            encoder,
            input: EncoderInput::default(),
            build_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Selects what the encoder receives per item
    pub fn with_input(mut self, input: EncoderInput) -> Self {
        self.input = input;
        self
    }

    /// Returns embeddings for every item of `wardrobe`, building them on a miss.
    ///
    /// Concurrent callers for the same user wait on a single rebuild.
    pub async fn get_or_build(
        &self,
        user_id: UserId,
        wardrobe: &[ClothingItem],
    ) -> Result<WardrobeEmbeddings, CacheError> {
        if let Some(record) = self.load_valid(user_id, wardrobe).await {
            tracing::debug!(user_id, items = wardrobe.len(), "Embedding cache hit");
            return Ok(record.into());
        }

        let lock = self.build_lock(user_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.rebuild(user_id, wardrobe).await
        };
        self.release_build_lock(user_id, lock).await;

        result
    }

    /// Drops the persisted embeddings of a user
    pub async fn invalidate(&self, user_id: UserId) -> Result<(), CacheError> {
        self.store.delete(user_id).await?;
        tracing::debug!(user_id, store = self.store.name(), "Embedding cache invalidated");
        Ok(())
    }

    /// Miss path, run while holding the user's build lock
    async fn rebuild(&self, user_id: UserId, wardrobe: &[ClothingItem]) -> Result<WardrobeEmbeddings, CacheError> {
        // Another request may have finished the build while we waited.
        if let Some(record) = self.load_valid(user_id, wardrobe).await {
            tracing::debug!(user_id, "Embedding cache filled by concurrent build");
            return Ok(record.into());
        }

        let record = self.build(wardrobe).await?;

        if let Err(e) = self.store.save(user_id, &record).await {
            tracing::warn!(
                user_id,
                store = self.store.name(),
                error = %e,
                "Failed to persist embeddings, serving freshly built ones"
            );
        }

        tracing::info!(
            user_id,
            items = record.item_ids.len(),
            dimension = record.dimension,
            input = ?record.input,
            encoder = self.encoder.name(),
            "Embedding cache rebuilt"
        );

        Ok(record.into())
    }

    /// Loads the persisted record if it still matches the wardrobe and input mode.
    /// Unreadable records count as stale.
    async fn load_valid(&self, user_id: UserId, wardrobe: &[ClothingItem]) -> Option<CachedEmbeddings> {
        match self.store.load(user_id).await {
            Ok(Some(record)) if record.input == self.input && record.matches(wardrobe) => Some(record),
            Ok(Some(record)) => {
                tracing::debug!(
                    user_id,
                    cached = record.item_ids.len(),
                    current = wardrobe.len(),
                    "Stale embedding cache"
                );
                None
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(user_id, store = self.store.name(), error = %e, "Embedding cache load failed");
                None
            }
        }
    }

    async fn build_lock(&self, user_id: UserId) -> Arc<Mutex<()>> {
        let mut locks = self.build_locks.lock().await;
        locks.entry(user_id).or_default().clone()
    }

    /// Drops the user's lock entry once no other request holds or awaits it.
    /// Clones are only taken under the map lock, so the count is stable here.
    async fn release_build_lock(&self, user_id: UserId, lock: Arc<Mutex<()>>) {
        let mut locks = self.build_locks.lock().await;
        // One reference in the map, one held by this call
        if Arc::strong_count(&lock) <= 2 {
            locks.remove(&user_id);
        }
    }

    /// Per-item encoder inputs in wardrobe order
    fn encoder_inputs(&self, wardrobe: &[ClothingItem]) -> Result<Vec<String>, EncoderError> {
        match self.input {
            EncoderInput::Text => Ok(wardrobe.iter().map(ClothingItem::description).collect()),
            EncoderInput::Image => wardrobe
                .iter()
                .map(|item| {
                    item.image_path
                        .as_deref()
                        .map(str::trim)
                        .filter(|path| !path.is_empty())
                        .map(str::to_string)
                        .ok_or(EncoderError::MissingImage { item_id: item.id })
                })
                .collect(),
        }
    }

    /// Encodes the whole wardrobe in one call and validates the result
    async fn build(&self, wardrobe: &[ClothingItem]) -> Result<CachedEmbeddings, CacheError> {
        let inputs = self.encoder_inputs(wardrobe)?;
        let vectors = self.encoder.encode(&inputs).await?;

        if vectors.len() != wardrobe.len() {
            return Err(EncoderError::CountMismatch {
                expected: wardrobe.len(),
                got: vectors.len(),
            }
            .into());
        }

        let dimension = vectors.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension || v.is_empty()) {
            return Err(EncoderError::DimensionMismatch {
                expected: dimension,
                got: bad.len(),
            }
            .into());
        }

        if let Some(index) = vectors.iter().position(|v| v.iter().any(|x| !x.is_finite())) {
            return Err(EncoderError::NonFinite { index }.into());
        }

        Ok(CachedEmbeddings {
            item_ids: wardrobe.iter().map(|item| item.id).collect(),
            vectors,
            dimension,
            input: self.input,
            built_at: Utc::now(),
        })
    }
}
