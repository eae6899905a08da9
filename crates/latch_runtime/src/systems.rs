//! Stock systems the runtime registers at boot

use latch_core::ecs::{ComponentDef, DefType, Entity, EntityFactory, System, SystemTypeId};
use serde::Deserialize;
use std::collections::HashMap;

pub const TRANSFORM_DEF: DefType = DefType::of("TransformDef");
pub const LABEL_DEF: DefType = DefType::of("LabelDef");

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TransformDef {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Stores a local position per entity.
#[derive(Default)]
pub struct TransformSystem {
    transforms: HashMap<Entity, TransformDef>,
}

impl TransformSystem {
    pub fn get(&self, entity: Entity) -> Option<&TransformDef> {
        self.transforms.get(&entity)
    }
}

impl System for TransformSystem {
    fn create_component(&mut self, entity: Entity, def: &ComponentDef) {
        let transform = if def.data().is_null() {
            Ok(TransformDef::default())
        } else {
            def.read::<TransformDef>()
        };
        match transform {
            Ok(transform) => {
                self.transforms.insert(entity, transform);
            }
            Err(err) => tracing::warn!(%entity, "skipping TransformDef: {err}"),
        }
    }

    fn post_create_component(&mut self, entity: Entity, _def: &ComponentDef) {
        if let Some(transform) = self.get(entity) {
            tracing::debug!(%entity, x = transform.x, y = transform.y, z = transform.z, "placed");
        }
    }

    fn destroy(&mut self, entity: Entity) {
        self.transforms.remove(&entity);
    }

    fn name(&self) -> &str {
        "TransformSystem"
    }
}

/// Human-readable labels, announced once the entity is fully built.
#[derive(Default)]
pub struct LabelSystem {
    labels: HashMap<Entity, String>,
}

impl System for LabelSystem {
    fn create_component(&mut self, entity: Entity, def: &ComponentDef) {
        let label = def.read::<String>().unwrap_or_else(|_| format!("entity-{entity}"));
        self.labels.insert(entity, label);
    }

    fn post_create_component(&mut self, entity: Entity, _def: &ComponentDef) {
        if let Some(label) = self.labels.get(&entity) {
            tracing::info!(%entity, label = label.as_str(), "entity ready");
        }
    }

    fn destroy(&mut self, entity: Entity) {
        if let Some(label) = self.labels.remove(&entity) {
            tracing::info!(%entity, label = label.as_str(), "entity destroyed");
        }
    }

    fn dependencies(&self) -> Vec<SystemTypeId> {
        vec![SystemTypeId::of::<TransformSystem>()]
    }

    fn name(&self) -> &str {
        "LabelSystem"
    }
}

/// Register the stock systems and their definition routes.
pub fn register(factory: &mut EntityFactory) {
    factory.add_system_of(TransformSystem::default());
    factory.register_def(SystemTypeId::of::<TransformSystem>(), TRANSFORM_DEF);

    factory.add_system_of(LabelSystem::default());
    factory.register_def(SystemTypeId::of::<LabelSystem>(), LABEL_DEF);
}

#[cfg(test)]
mod tests {
    use super::*;
    use latch_asset::MemoryAssetLoader;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn transform_reads_payload_or_defaults() {
        let mut system = TransformSystem::default();
        let a = Entity::from_raw(1);
        let b = Entity::from_raw(2);

        system.create_component(a, &ComponentDef::new(TRANSFORM_DEF, json!({ "x": 2.0, "z": -1.0 })));
        system.create_component(b, &ComponentDef::new(TRANSFORM_DEF, json!(null)));

        assert_eq!(system.get(a), Some(&TransformDef { x: 2.0, y: 0.0, z: -1.0 }));
        assert_eq!(system.get(b), Some(&TransformDef::default()));

        system.destroy(a);
        system.destroy(a);
        assert!(system.get(a).is_none());
    }

    #[test]
    fn stock_systems_initialize_cleanly() {
        let mut factory = EntityFactory::new(Arc::new(MemoryAssetLoader::new())).with_json_decoder();
        register(&mut factory);
        assert_eq!(factory.system_count(), 2);
        assert!(factory.initialize().is_ok());

        let entity = factory.create_from_data(
            br#"{ "components": [ { "def": "TransformDef" }, { "def": "LabelDef", "data": "lamp" } ] }"#,
            "inline",
        );
        assert!(factory.is_alive(entity));
    }
}
