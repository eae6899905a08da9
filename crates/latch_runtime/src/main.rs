//! Latch Engine Runtime
//!
//! Minimal binary that links engine crates, builds the entity factory and
//! spawns the configured blueprints

mod systems;

use anyhow::{anyhow, Context, Result};
use latch_asset::FileAssetLoader;
use latch_core::ecs::{Entity, EntityFactory};
use latch_services::Settings;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Latch Engine v{}", latch_core::VERSION);

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(&path).with_context(|| format!("loading settings from {path}"))?,
        None => Settings::default(),
    };

    let loader = Arc::new(FileAssetLoader::new(&settings.assets.root));
    let mut factory = EntityFactory::new(loader)
        .with_naming(settings.assets.naming.clone())
        .with_json_decoder();
    systems::register(&mut factory);
    factory.initialize()?;

    for name in &settings.spawn {
        let entity = factory.create_from_name(name);
        if entity.is_null() {
            tracing::warn!("skipping blueprint '{name}'");
        }
    }
    tracing::info!(alive = factory.entity_to_blueprint_map().len(), "blueprints spawned");

    // Tear down from a worker thread the same way gameplay code would.
    let alive: Vec<Entity> = factory.entity_to_blueprint_map().keys().copied().collect();
    let remote = factory.remote();
    std::thread::spawn(move || {
        for entity in alive {
            remote.queue_for_destruction(entity);
        }
    })
    .join()
    .map_err(|_| anyhow!("destruction worker panicked"))?;

    let destroyed = factory.destroy_queued_entities();
    tracing::info!(
        destroyed,
        created = factory.counters().get("entities_created"),
        skipped_components = factory.counters().get("components_skipped"),
        "runtime shut down"
    );

    Ok(())
}
