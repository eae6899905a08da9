use crate::ecs::{ComponentDef, Entity};
use crate::hash::{hash, HashValue};
use std::fmt;

/// Stable identifier a system is registered under.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SystemTypeId(HashValue);

impl SystemTypeId {
    #[inline]
    pub const fn from_raw(raw: HashValue) -> Self {
        Self(raw)
    }

    /// Identifier for a stable system name.
    #[inline]
    pub const fn named(name: &str) -> Self {
        Self(hash(name))
    }

    /// Identifier derived from the Rust type name of `S`.
    pub fn of<S: ?Sized + 'static>() -> Self {
        Self::named(std::any::type_name::<S>())
    }

    #[inline]
    pub const fn raw(self) -> HashValue {
        self.0
    }
}

impl fmt::Display for SystemTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Owner and processor of one kind of component across all entities.
///
/// The factory is the only caller, always from the thread that owns the
/// entity graph. Calls for one entity arrive in the order
/// `create_component` (every definition) then `post_create_component`
/// (every definition), with any child entities fully constructed in between.
pub trait System: Send {
    /// Called once from [`EntityFactory::initialize`](crate::ecs::EntityFactory::initialize).
    fn initialize(&mut self) {}

    fn create_component(&mut self, entity: Entity, def: &ComponentDef);

    /// Second pass, after the entity's children exist.
    fn post_create_component(&mut self, _entity: Entity, _def: &ComponentDef) {}

    /// Remove whatever this system holds for `entity`. Must be a no-op when
    /// it holds nothing.
    fn destroy(&mut self, entity: Entity);

    /// Systems that must be registered for this one to work.
    fn dependencies(&self) -> Vec<SystemTypeId> {
        Vec::new()
    }

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
