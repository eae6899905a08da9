//! Latch Asset Pipeline
//!
//! Raw asset loading and a keyed, load-once cache shared by engine services.

mod asset;
mod cache;
mod loader;

pub use asset::SimpleAsset;
pub use cache::ResourceCache;
pub use loader::{AssetError, AssetLoader, FileAssetLoader, MemoryAssetLoader};
