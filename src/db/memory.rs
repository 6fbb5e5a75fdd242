use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::{
    db::WardrobeStore,
    error::{AppError, AppResult},
    models::{ClothingItem, ItemId, NewClothingItem, UserId},
};

/// In-process wardrobe storage, used for tests and local runs without Postgres
#[derive(Default)]
pub struct InMemoryWardrobeStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: ItemId,
    wardrobes: HashMap<UserId, Vec<ClothingItem>>,
}

impl InMemoryWardrobeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl WardrobeStore for InMemoryWardrobeStore {
    async fn get_wardrobe(&self, user_id: UserId) -> AppResult<Vec<ClothingItem>> {
        let inner = self.inner.read().await;
        Ok(inner.wardrobes.get(&user_id).cloned().unwrap_or_default())
    }

    async fn add_item(&self, user_id: UserId, item: NewClothingItem) -> AppResult<ClothingItem> {
        item.validate().map_err(AppError::InvalidInput)?;

        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let item = item.into_item(inner.next_id);
        inner.wardrobes.entry(user_id).or_default().push(item.clone());
        Ok(item)
    }

    async fn delete_item(&self, user_id: UserId, item_id: ItemId) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(items) = inner.wardrobes.get_mut(&user_id) else {
            return Ok(false);
        };

        let before = items.len();
        items.retain(|item| item.id != item_id);
        Ok(items.len() < before)
    }
}
