//! Latch Engine Core
//!
//! Contains the entity lifecycle layer:
//! - Entity id allocation and deferred destruction
//! - Data-authored blueprints and blueprint trees
//! - System registry and the entity factory that drives it
//! - Stable name hashing for on-disk identifiers

pub mod config;
pub mod ecs;
pub mod hash;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
