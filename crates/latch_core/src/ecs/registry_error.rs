use crate::ecs::SystemTypeId;
use thiserror::Error;

/// Problems found while checking the registered system set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no systems registered; call initialize after adding systems")]
    Empty,

    #[error("system '{system}' depends on unregistered system {dependency}")]
    MissingDependency {
        system: String,
        dependency: SystemTypeId,
    },
}
