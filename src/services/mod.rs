pub mod color_rules;
pub mod embedding_cache;
pub mod filter;
pub mod providers;
pub mod scorer;
pub mod selector;
pub mod stylist;

pub use color_rules::ColorRules;
pub use embedding_cache::{EmbeddingCache, EmbeddingStore, InMemoryEmbeddingStore, RedisEmbeddingStore};
pub use filter::{filter_wardrobe, OutfitContext};
pub use scorer::{Score, Scorer};
pub use selector::select_outfit;
pub use stylist::{ScoringEngine, Stylist, Suggestion};
