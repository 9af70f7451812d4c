//! Component types and their per-world storage.
//!
//! Each [ComponentType] owns one packed pool per world. A pool keeps its instances
//! gap-free by moving the last instance into every freed slot, and lets several entities
//! share one instance through reference counting.

mod component_ops;
mod component_flag;
mod component_pool;
mod component_type;

pub use component_flag::*;
pub use component_type::*;

pub(crate) use component_pool::*;

pub use sparse_ecs_derive::Component;
