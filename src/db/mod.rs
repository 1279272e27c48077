pub mod redis;
pub mod sqlite;
pub mod store;

pub use self::redis::create_redis_client;
pub use self::redis::Cache;
pub use self::redis::CacheKey;
pub use sqlite::{create_memory_pool, create_pool};
pub use store::VectorStore;
