//! Entity Component System core types.
//!
//! This layer owns entity lifecycles, not component data. Components live
//! in the systems that process them; the [`EntityFactory`] only guarantees
//! that each component definition in a blueprint reaches its owning system,
//! in the right order, exactly once per entity.

mod blueprint;
mod entity;
mod factory;
mod ledger;
mod registry_error;
mod system;
mod system_registry;

pub use blueprint::{
    decode_json, encode_json, Blueprint, BlueprintError, BlueprintTree, ComponentDef, DefType,
    Finalizer,
};
pub use entity::Entity;
pub use factory::{BlueprintDecoder, CreateChildFn, CreateError, EntityFactory, RemoteFactory};
pub use ledger::EntityLedger;
pub use registry_error::RegistryError;
pub use system::{System, SystemTypeId};
pub(crate) use system_registry::SystemRegistry;
