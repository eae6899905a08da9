// factory.rs - Entity creation and destruction
//
// The factory mints entity ids, resolves named blueprints through the asset
// cache, and walks blueprint trees dispatching each component definition to
// the system that owns it. Construction is two-phase per node:
//
//   create pass -> children (fully constructed) -> post-create pass
//
// so a parent's post-create hook can see its finished children.
//
// Everything except `create()` and `queue_for_destruction()` must run on the
// thread that owns the entity graph. Those two go through the shared
// `EntityLedger` and are also reachable via `RemoteFactory`.

use crate::config::BlueprintNaming;
use crate::ecs::{
    decode_json, Blueprint, BlueprintError, BlueprintTree, DefType, Entity, EntityLedger,
    Finalizer, RegistryError, System, SystemRegistry, SystemTypeId,
};
use crate::hash::{hash, HashValue};
use latch_asset::{AssetLoader, ResourceCache, SimpleAsset};
use latch_metrics::Counter;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Converts raw blueprint bytes into a tree.
pub type BlueprintDecoder = dyn Fn(&[u8]) -> Result<BlueprintTree, BlueprintError> + Send + Sync;

/// Creates one child entity of `parent` from `child`, returning the child id.
pub type CreateChildFn = dyn Fn(&mut EntityFactory, Entity, &BlueprintTree) -> Entity + Send + Sync;

#[derive(Debug, Error)]
pub enum CreateError {
    #[error("cannot create null entity")]
    NullEntity,

    #[error("entity {entity} is already alive")]
    AlreadyAlive { entity: Entity },

    #[error("no such blueprint: {name}")]
    BlueprintNotFound { name: String },

    #[error("cannot create entity from empty data: {name}")]
    EmptyData { name: String },

    #[error("failed to decode blueprint '{name}': {source}")]
    Decode {
        name: String,
        #[source]
        source: BlueprintError,
    },
}

/// Orchestrates entity construction across all registered systems.
pub struct EntityFactory {
    ledger: Arc<EntityLedger>,
    systems: SystemRegistry,
    asset_loader: Arc<dyn AssetLoader>,
    blueprints: ResourceCache<HashValue, SimpleAsset>,
    naming: BlueprintNaming,
    entity_to_blueprint: HashMap<Entity, String>,
    types: Vec<DefType>,
    decoder: Option<Box<BlueprintDecoder>>,
    create_child_fn: Arc<CreateChildFn>,
    finalizer: Option<Box<Finalizer>>,
    counters: Counter,
}

impl EntityFactory {
    /// Create a factory that loads named blueprints through `asset_loader`.
    ///
    /// No decoder is installed; see [`with_json_decoder`](Self::with_json_decoder).
    pub fn new(asset_loader: Arc<dyn AssetLoader>) -> Self {
        Self {
            ledger: Arc::new(EntityLedger::new()),
            systems: SystemRegistry::new(),
            asset_loader,
            blueprints: ResourceCache::new(),
            naming: BlueprintNaming::default(),
            entity_to_blueprint: HashMap::new(),
            types: Vec::new(),
            decoder: None,
            create_child_fn: Arc::new(create_child_entity),
            finalizer: None,
            counters: Counter::new(),
        }
    }

    pub fn with_naming(mut self, naming: BlueprintNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Install [`decode_json`] as the blueprint decoder.
    pub fn with_json_decoder(mut self) -> Self {
        self.set_decoder(decode_json);
        self
    }

    pub fn set_decoder<F>(&mut self, decoder: F)
    where
        F: Fn(&[u8]) -> Result<BlueprintTree, BlueprintError> + Send + Sync + 'static,
    {
        self.decoder = Some(Box::new(decoder));
    }

    /// Replace the step that turns each child blueprint into an entity.
    ///
    /// The default allocates a fresh id and runs the full construction
    /// protocol on it via [`create_with_tree`](Self::create_with_tree).
    pub fn set_create_child_fn<F>(&mut self, create_child: F)
    where
        F: Fn(&mut EntityFactory, Entity, &BlueprintTree) -> Entity + Send + Sync + 'static,
    {
        self.create_child_fn = Arc::new(create_child);
    }

    pub fn set_finalizer<F>(&mut self, finalizer: F)
    where
        F: Fn(&Blueprint) -> Vec<u8> + Send + Sync + 'static,
    {
        self.finalizer = Some(Box::new(finalizer));
    }

    /// Finalize `blueprint` into bytes. Empty without a finalizer.
    pub fn finalize(&self, blueprint: &Blueprint) -> Vec<u8> {
        match &self.finalizer {
            Some(finalizer) => blueprint.finalize(finalizer.as_ref()),
            None => Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Systems
    // ------------------------------------------------------------------

    /// Register `system` under `system_type`. First registration wins.
    pub fn add_system(&mut self, system_type: SystemTypeId, system: Box<dyn System>) -> bool {
        self.systems.add(system_type, system)
    }

    /// Register `system` under [`SystemTypeId::of::<S>()`](SystemTypeId::of).
    pub fn add_system_of<S: System + 'static>(&mut self, system: S) -> bool {
        self.add_system(SystemTypeId::of::<S>(), Box::new(system))
    }

    /// Route component definitions tagged `def_type` to `system_type`.
    /// Last registration wins.
    pub fn register_def(&mut self, system_type: SystemTypeId, def_type: DefType) {
        self.systems.register_def(system_type, def_type);
    }

    pub fn system_for_def(&mut self, def_type: DefType) -> Option<&mut (dyn System + 'static)> {
        self.systems.system_for_def(def_type)
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Initialize every system in registration order, then verify that all
    /// declared system dependencies are registered. Problems are logged as
    /// they are found.
    pub fn initialize(&mut self) -> Result<(), RegistryError> {
        self.systems.initialize()
    }

    /// Configure the ordered type list used by
    /// [`reverse_type_lookup`](Self::reverse_type_lookup).
    pub fn create_type_list(&mut self, names: &[&str]) {
        self.types = names.iter().map(|name| DefType::of(name)).collect();
    }

    /// Position of `def_type` in the configured type list.
    pub fn reverse_type_lookup(&self, def_type: DefType) -> Option<usize> {
        self.types.iter().position(|&ty| ty == def_type)
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Mint a new entity id without attaching any components.
    ///
    /// # Panics
    /// Panics if the id space is exhausted.
    pub fn create(&self) -> Entity {
        self.ledger.allocate()
    }

    /// Create an entity from the named blueprint. Returns [`Entity::NULL`]
    /// when the blueprint cannot be loaded; no id is consumed in that case.
    pub fn create_from_name(&mut self, name: &str) -> Entity {
        self.try_create_from_name(name)
            .unwrap_or_else(report_failure)
    }

    pub fn try_create_from_name(&mut self, name: &str) -> Result<Entity, CreateError> {
        let asset = self
            .blueprint_asset(name)
            .ok_or_else(|| CreateError::BlueprintNotFound {
                name: name.to_string(),
            })?;
        self.try_create_from_data(asset.data(), name)
    }

    /// Populate the caller-supplied `entity` from the named blueprint.
    pub fn create_with_name(&mut self, entity: Entity, name: &str) -> Entity {
        let result = match self.blueprint_asset(name) {
            Some(asset) => self.construct_from_data(entity, name, asset.data()),
            None => Err(CreateError::BlueprintNotFound {
                name: name.to_string(),
            }),
        };
        result.map(|()| entity).unwrap_or_else(report_failure)
    }

    /// Create an entity from raw blueprint bytes, recording `name` as its
    /// provenance.
    pub fn create_from_data(&mut self, data: &[u8], name: &str) -> Entity {
        self.try_create_from_data(data, name)
            .unwrap_or_else(report_failure)
    }

    pub fn try_create_from_data(&mut self, data: &[u8], name: &str) -> Result<Entity, CreateError> {
        let entity = self.create();
        self.construct_from_data(entity, name, data)?;
        Ok(entity)
    }

    /// Create an entity from a flat, in-memory blueprint.
    pub fn create_from_blueprint(&mut self, blueprint: &Blueprint) -> Entity {
        let entity = self.create();
        self.begin(entity, "")
            .map(|()| self.construct(entity, blueprint, &[]))
            .map(|()| entity)
            .unwrap_or_else(report_failure)
    }

    /// Create an entity and its descendants from an in-memory tree.
    pub fn create_from_tree(&mut self, tree: &BlueprintTree) -> Entity {
        let entity = self.create();
        self.create_with_tree(entity, tree)
    }

    /// Populate the caller-supplied `entity` (and new child entities) from
    /// an in-memory tree.
    pub fn create_with_tree(&mut self, entity: Entity, tree: &BlueprintTree) -> Entity {
        self.begin(entity, "")
            .map(|()| self.construct(entity, tree.blueprint(), tree.children()))
            .map(|()| entity)
            .unwrap_or_else(report_failure)
    }

    fn construct_from_data(
        &mut self,
        entity: Entity,
        name: &str,
        data: &[u8],
    ) -> Result<(), CreateError> {
        if entity.is_null() {
            return Err(CreateError::NullEntity);
        }
        if data.is_empty() {
            return Err(CreateError::EmptyData {
                name: name.to_string(),
            });
        }

        let tree = match &self.decoder {
            Some(decode) => decode(data).map_err(|source| CreateError::Decode {
                name: name.to_string(),
                source,
            })?,
            None => {
                tracing::error!(
                    "Unable to convert raw data to blueprint '{name}'. Install a decoder \
                     with set_decoder. Using empty blueprint instead"
                );
                BlueprintTree::default()
            }
        };

        self.begin(entity, name)?;
        self.construct(entity, tree.blueprint(), tree.children());
        Ok(())
    }

    /// Validate `entity` and record its provenance before any component
    /// exists, so diagnostics during construction can name the blueprint.
    fn begin(&mut self, entity: Entity, name: &str) -> Result<(), CreateError> {
        if entity.is_null() {
            return Err(CreateError::NullEntity);
        }
        if self.entity_to_blueprint.contains_key(&entity) {
            return Err(CreateError::AlreadyAlive { entity });
        }
        self.entity_to_blueprint.insert(entity, name.to_string());
        self.counters.increment("entities_created", 1);
        Ok(())
    }

    fn construct(&mut self, entity: Entity, blueprint: &Blueprint, children: &[BlueprintTree]) {
        blueprint.for_each_component(|def| match self.systems.system_for_def(def.def_type()) {
            Some(system) => {
                tracing::trace!(%entity, def = %def.def_type(), system = system.name(), "create component");
                system.create_component(entity, def);
                self.counters.increment("components_created", 1);
            }
            None => {
                let source = self
                    .entity_to_blueprint
                    .get(&entity)
                    .map(String::as_str)
                    .unwrap_or_default();
                tracing::error!(
                    "Unknown system for def {} when creating entity {entity} from blueprint: '{source}'",
                    def.def_type()
                );
                self.counters.increment("components_skipped", 1);
            }
        });

        // Children are finished before the parent's post-create pass.
        let create_child = Arc::clone(&self.create_child_fn);
        for child in children {
            create_child(self, entity, child);
        }

        blueprint.for_each_component(|def| {
            if let Some(system) = self.systems.system_for_def(def.def_type()) {
                system.post_create_component(entity, def);
            }
        });
    }

    // ------------------------------------------------------------------
    // Blueprint assets
    // ------------------------------------------------------------------

    /// Load (or fetch from cache) the raw bytes for a blueprint name.
    ///
    /// Each resolved filename is loaded at most once for the factory's
    /// lifetime. Zero-sized assets count as missing.
    pub fn blueprint_asset(&self, name: &str) -> Option<Arc<SimpleAsset>> {
        let filename = self.naming.resolve(name);
        let key = hash(&filename);

        let loader = &self.asset_loader;
        let asset = self.blueprints.create(key, || {
            tracing::debug!(%filename, "loading blueprint");
            loader.load_now(&filename)
        });

        if asset.size() == 0 {
            tracing::error!("Could not load entity blueprint: {name}");
            return None;
        }
        Some(asset)
    }

    pub fn naming(&self) -> &BlueprintNaming {
        &self.naming
    }

    // ------------------------------------------------------------------
    // Destruction
    // ------------------------------------------------------------------

    /// Remove `entity` from every registered system. Null is ignored.
    pub fn destroy(&mut self, entity: Entity) {
        if entity.is_null() {
            return;
        }

        self.entity_to_blueprint.remove(&entity);
        self.systems.destroy(entity);
        self.counters.increment("entities_destroyed", 1);
    }

    /// Schedule `entity` for destruction on the next
    /// [`destroy_queued_entities`](Self::destroy_queued_entities). Safe to
    /// reach from any thread through [`remote`](Self::remote).
    pub fn queue_for_destruction(&self, entity: Entity) {
        self.ledger.queue_for_destruction(entity);
    }

    /// Destroy everything queued so far and return how many entities were
    /// processed. The queue lock is released before any system is called,
    /// so systems may queue further entities; those wait for the next drain.
    pub fn destroy_queued_entities(&mut self) -> usize {
        let pending = self.ledger.take_pending();
        let count = pending.len();
        for entity in pending {
            self.destroy(entity);
        }
        count
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Name of the blueprint `entity` was built from. Empty for entities
    /// built from in-memory blueprints.
    pub fn blueprint_name(&self, entity: Entity) -> Option<&str> {
        self.entity_to_blueprint.get(&entity).map(String::as_str)
    }

    pub fn entity_to_blueprint_map(&self) -> &HashMap<Entity, String> {
        &self.entity_to_blueprint
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entity_to_blueprint.contains_key(&entity)
    }

    /// Cloneable handle for other threads.
    pub fn remote(&self) -> RemoteFactory {
        RemoteFactory {
            ledger: Arc::clone(&self.ledger),
        }
    }

    pub fn counters(&self) -> &Counter {
        &self.counters
    }
}

/// The thread-safe subset of [`EntityFactory`]: id allocation and queued
/// destruction.
#[derive(Clone)]
pub struct RemoteFactory {
    ledger: Arc<EntityLedger>,
}

impl RemoteFactory {
    /// # Panics
    /// Panics if the id space is exhausted.
    pub fn create(&self) -> Entity {
        self.ledger.allocate()
    }

    pub fn queue_for_destruction(&self, entity: Entity) {
        self.ledger.queue_for_destruction(entity);
    }
}

fn create_child_entity(factory: &mut EntityFactory, _parent: Entity, child: &BlueprintTree) -> Entity {
    let entity = factory.create();
    factory.create_with_tree(entity, child)
}

fn report_failure(err: CreateError) -> Entity {
    tracing::error!("{err}");
    Entity::NULL
}
