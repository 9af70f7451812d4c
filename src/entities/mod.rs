//! [Entities](Entity) represent the individual "things" of a world.
//!
//! An [Entity] doesn't store any data and has no associated behaviour;
//! its classification records which [components](crate::components::ComponentType) it
//! currently carries, and [entity sets](EntitySet) keep live lists of the entities whose
//! classification matches a filter.

mod entity;
mod world;
mod entity_set;
mod entity_set_ops;

pub use entity::*;
pub use entity_set::*;

pub(crate) use world::*;
