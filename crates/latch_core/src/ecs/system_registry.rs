use crate::ecs::{DefType, Entity, RegistryError, System, SystemTypeId};
use std::collections::HashMap;

/// Registered systems plus the definition-type routing table.
///
/// Systems are kept in registration order; that order drives
/// `initialize` and `destroy` fan-out.
pub(crate) struct SystemRegistry {
    systems: Vec<RegisteredSystem>,
    type_lookup: HashMap<SystemTypeId, usize>,
    def_routes: HashMap<DefType, SystemTypeId>,
}

impl SystemRegistry {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
            type_lookup: HashMap::new(),
            def_routes: HashMap::new(),
        }
    }

    /// Register `system` under `system_type`. The first registration wins;
    /// later ones are dropped and reported as `false`.
    pub fn add(&mut self, system_type: SystemTypeId, system: Box<dyn System>) -> bool {
        if self.type_lookup.contains_key(&system_type) {
            tracing::debug!(
                "system type {system_type} already registered, ignoring '{}'",
                system.name()
            );
            return false;
        }

        self.type_lookup.insert(system_type, self.systems.len());
        self.systems.push(RegisteredSystem {
            system_type,
            system,
        });
        true
    }

    /// Route `def_type` to `system_type`. Re-registration overwrites.
    pub fn register_def(&mut self, system_type: SystemTypeId, def_type: DefType) {
        if let Some(previous) = self.def_routes.insert(def_type, system_type) {
            if previous != system_type {
                tracing::debug!("def {def_type} rerouted from {previous} to {system_type}");
            }
        }
    }

    pub fn system_type_for_def(&self, def_type: DefType) -> Option<SystemTypeId> {
        self.def_routes.get(&def_type).copied()
    }

    /// Resolve a definition type to its owning system.
    pub fn system_for_def(&mut self, def_type: DefType) -> Option<&mut (dyn System + 'static)> {
        let system_type = self.system_type_for_def(def_type)?;
        self.get_mut(system_type)
    }

    pub fn get_mut(&mut self, system_type: SystemTypeId) -> Option<&mut (dyn System + 'static)> {
        let index = *self.type_lookup.get(&system_type)?;
        let registered = self.systems.get_mut(index)?;
        Some(registered.system.as_mut())
    }

    pub fn contains(&self, system_type: SystemTypeId) -> bool {
        self.type_lookup.contains_key(&system_type)
    }

    /// Run every system's `initialize` once, in registration order, then
    /// check cross-system dependencies.
    pub fn initialize(&mut self) -> Result<(), RegistryError> {
        if self.systems.is_empty() {
            tracing::error!("{}", RegistryError::Empty);
        }

        for registered in &mut self.systems {
            registered.system.initialize();
        }

        self.check_all_dependencies()
    }

    /// Every missing dependency is logged; the first one is returned.
    pub fn check_all_dependencies(&self) -> Result<(), RegistryError> {
        let mut first_missing = None;
        for registered in &self.systems {
            for dependency in registered.system.dependencies() {
                if self.contains(dependency) {
                    continue;
                }
                let err = RegistryError::MissingDependency {
                    system: registered.system.name().to_string(),
                    dependency,
                };
                tracing::error!(system_type = %registered.system_type, "{err}");
                if first_missing.is_none() {
                    first_missing = Some(err);
                }
            }
        }
        first_missing.map_or(Ok(()), Err)
    }

    /// Tell every system, in registration order, to drop `entity`.
    pub fn destroy(&mut self, entity: Entity) {
        for registered in &mut self.systems {
            registered.system.destroy(entity);
        }
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

struct RegisteredSystem {
    system_type: SystemTypeId,
    system: Box<dyn System>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::ComponentDef;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    struct Probe {
        label: &'static str,
        log: Log,
        deps: Vec<SystemTypeId>,
    }

    impl Probe {
        fn boxed(label: &'static str, log: &Log) -> Box<dyn System> {
            Box::new(Self {
                label,
                log: Arc::clone(log),
                deps: Vec::new(),
            })
        }
    }

    impl System for Probe {
        fn initialize(&mut self) {
            self.log.lock().unwrap().push(format!("init {}", self.label));
        }

        fn create_component(&mut self, entity: Entity, _def: &ComponentDef) {
            self.log
                .lock()
                .unwrap()
                .push(format!("create {} {entity}", self.label));
        }

        fn destroy(&mut self, entity: Entity) {
            self.log
                .lock()
                .unwrap()
                .push(format!("destroy {} {entity}", self.label));
        }

        fn dependencies(&self) -> Vec<SystemTypeId> {
            self.deps.clone()
        }

        fn name(&self) -> &str {
            self.label
        }
    }

    const PHYSICS: SystemTypeId = SystemTypeId::named("PhysicsSystem");
    const RENDER: SystemTypeId = SystemTypeId::named("RenderSystem");
    const BODY_DEF: DefType = DefType::of("RigidBodyDef");

    #[test]
    fn first_system_registration_wins() {
        let log = Log::default();
        let mut registry = SystemRegistry::new();
        assert!(registry.add(PHYSICS, Probe::boxed("a", &log)));
        assert!(!registry.add(PHYSICS, Probe::boxed("b", &log)));
        registry.register_def(PHYSICS, BODY_DEF);

        let system = registry.system_for_def(BODY_DEF).unwrap();
        assert_eq!(system.name(), "a");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn last_def_registration_wins() {
        let log = Log::default();
        let mut registry = SystemRegistry::new();
        registry.add(PHYSICS, Probe::boxed("physics", &log));
        registry.add(RENDER, Probe::boxed("render", &log));

        registry.register_def(PHYSICS, BODY_DEF);
        registry.register_def(RENDER, BODY_DEF);

        assert_eq!(registry.system_type_for_def(BODY_DEF), Some(RENDER));
        assert_eq!(registry.system_for_def(BODY_DEF).unwrap().name(), "render");
    }

    #[test]
    fn unmapped_or_unregistered_defs_resolve_to_none() {
        let mut registry = SystemRegistry::new();
        assert!(registry.system_for_def(BODY_DEF).is_none());

        registry.register_def(PHYSICS, BODY_DEF);
        assert!(registry.system_for_def(BODY_DEF).is_none());
    }

    #[test]
    fn initialize_runs_once_in_registration_order() {
        let log = Log::default();
        let mut registry = SystemRegistry::new();
        registry.add(RENDER, Probe::boxed("render", &log));
        registry.add(PHYSICS, Probe::boxed("physics", &log));

        assert_eq!(registry.initialize(), Ok(()));
        assert_eq!(*log.lock().unwrap(), vec!["init render", "init physics"]);
    }

    #[test]
    fn missing_dependency_is_reported() {
        let log = Log::default();
        let mut registry = SystemRegistry::new();
        registry.add(
            RENDER,
            Box::new(Probe {
                label: "render",
                log: Arc::clone(&log),
                deps: vec![PHYSICS],
            }),
        );

        assert_eq!(
            registry.initialize(),
            Err(RegistryError::MissingDependency {
                system: "render".to_string(),
                dependency: PHYSICS,
            })
        );

        registry.add(PHYSICS, Probe::boxed("physics", &log));
        assert_eq!(registry.check_all_dependencies(), Ok(()));
    }

    #[test]
    fn empty_registry_still_initializes() {
        let mut registry = SystemRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.initialize(), Ok(()));
    }

    #[test]
    fn destroy_reaches_every_system() {
        let log = Log::default();
        let mut registry = SystemRegistry::new();
        registry.add(PHYSICS, Probe::boxed("physics", &log));
        registry.add(RENDER, Probe::boxed("render", &log));

        registry.destroy(Entity::from_raw(5));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["destroy physics 5", "destroy render 5"]
        );
    }
}
