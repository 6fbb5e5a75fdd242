pub mod memory;
pub mod postgres;
pub mod redis;

pub use memory::InMemoryWardrobeStore;
pub use postgres::{create_pool, PgWardrobeStore};
pub use redis::create_redis_client;
pub use redis::Cache;
pub use redis::CacheKey;

use crate::{
    error::AppResult,
    models::{ClothingItem, ItemId, NewClothingItem, UserId},
};

/// Trait for wardrobe storage
///
/// Items come back in a stable order (insertion order) and are assumed to be
/// well-formed. An unknown user and an empty wardrobe both yield an empty list.
#[async_trait::async_trait]
pub trait WardrobeStore: Send + Sync {
    async fn get_wardrobe(&self, user_id: UserId) -> AppResult<Vec<ClothingItem>>;

    async fn add_item(&self, user_id: UserId, item: NewClothingItem) -> AppResult<ClothingItem>;

    /// Returns `false` when the user has no item with this id
    async fn delete_item(&self, user_id: UserId, item_id: ItemId) -> AppResult<bool>;
}
