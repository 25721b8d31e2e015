pub mod cache_trait;
pub mod memory;
pub mod file;
pub mod json_map;
pub mod cached;

pub use cache_trait::{key_for_save, DefinitionCache};
pub use memory::MemoryCache;
pub use file::FileCache;
pub use json_map::JsonMapCache;
pub use cached::CachedDefiner;
