//! Context configuration.

/// Tuning knobs of an [EcsContext](crate::EcsContext).
///
/// Capacities only pre-size storage; every array still grows on demand.
#[derive(Debug, Clone)]
pub struct EcsConfig {
	/// The id handed to the first created world. World ids below it are never used.
	pub first_world_id: u32,
	/// Initial size of the classification table of every new world.
	pub entity_capacity: usize,
	/// Initial slot capacity of every new component pool.
	pub component_capacity: usize,
}

impl Default for EcsConfig {
	fn default() -> Self {
		Self {
			first_world_id: 1,
			entity_capacity: 0,
			component_capacity: 0,
		}
	}
}

impl EcsConfig {
	#[must_use]
	pub fn with_first_world_id(mut self, id: u32) -> Self {
		self.first_world_id = id;
		self
	}

	#[must_use]
	pub fn with_entity_capacity(mut self, capacity: usize) -> Self {
		self.entity_capacity = capacity;
		self
	}

	#[must_use]
	pub fn with_component_capacity(mut self, capacity: usize) -> Self {
		self.component_capacity = capacity;
		self
	}
}
