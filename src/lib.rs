//! An entity-component store with live, incrementally maintained queries.
//!
//! Component instances live in packed per-world pools, every entity carries a
//! [classification](data_structures::BitField) of the components it holds, and
//! [entity sets](entities::EntitySet) keep themselves correct by subscribing to the
//! synchronous [event bus](events).

extern crate self as sparse_ecs;

pub mod data_structures;
pub mod components;
pub mod entities;
pub mod events;
mod context;
mod config;
mod error;

pub use context::EcsContext;
pub use config::EcsConfig;
pub use error::{EcsError, EcsResult};

pub mod prelude {
	pub use crate::components::*;
	pub use crate::context::EcsContext;
	pub use crate::config::EcsConfig;
	pub use crate::error::{EcsError, EcsResult};
	pub use crate::data_structures::BitField;
	pub use crate::entities::{Entity, EntityFilter, EntitySet, EntitySetBuilder, WorldId};
	pub use crate::events::{Channel, ComponentEvent, EventType, Message, Subscription};
}

#[cfg(test)]
mod tests;
