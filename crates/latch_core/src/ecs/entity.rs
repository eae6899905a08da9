//! Entity handle
//!
//! Entities are plain ids. They carry no data themselves; every component
//! lives in the system that owns it.

use std::fmt;

/// Entity handle (opaque ID)
///
/// Ids are minted by [`EntityLedger`](crate::ecs::EntityLedger) in strictly
/// increasing order. `0` is reserved for [`Entity::NULL`] and is never
/// handed out.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Entity(u32);

impl Entity {
    /// The "no entity" sentinel returned by failed creation calls.
    pub const NULL: Entity = Entity(0);

    #[inline]
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn id(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
