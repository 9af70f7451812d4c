use crate::components::{ComponentFlag, ComponentType, ComponentTypeData, FlagRegistry};
use crate::data_structures::{grown_capacity, BitField, IdDispenser};
use crate::entities::{Entity, EntitySetData, WorldData, WorldId};
use crate::events::{Channel, EventBus, Message};
use crate::error::{EcsError, EcsResult};
use nohash_hasher::IntMap;
use crate::EcsConfig;
use tracing::debug;

/// A container for worlds, their [entities](Entity), component types and entity sets.
///
/// The context owns every registry: the [flag generator](FlagRegistry), the worlds and
/// their classification tables, the component types and their pools, the entity sets,
/// and the event channels tying them together. Independent contexts share nothing.
pub struct EcsContext {
	pub(crate) config: EcsConfig,
	pub(crate) flags: FlagRegistry,

	pub(crate) worlds: Vec<Option<WorldData>>,
	pub(crate) world_ids: IdDispenser,

	pub(crate) components: Vec<Option<ComponentTypeData>>,
	pub(crate) component_ids: IdDispenser,
	pub(crate) component_flags: IntMap<ComponentFlag, ComponentType>,

	pub(crate) entity_sets: Vec<Option<EntitySetData>>,
	pub(crate) entity_set_ids: IdDispenser,

	pub(crate) bus: EventBus,
}

impl EcsContext {
	pub fn new() -> Self {
		Self::with_config(EcsConfig::default())
	}

	pub fn with_config(config: EcsConfig) -> Self {
		Self {
			world_ids: IdDispenser::starting_at(config.first_world_id),
			config,
			flags: FlagRegistry::new(),

			worlds: Vec::new(),
			components: Vec::new(),
			component_ids: IdDispenser::new(),
			component_flags: IntMap::default(),

			entity_sets: Vec::new(),
			entity_set_ids: IdDispenser::new(),

			bus: EventBus::default(),
		}
	}

	pub fn config(&self) -> &EcsConfig {
		&self.config
	}

	/// Create an empty world.
	pub fn create_world(&mut self) -> WorldId {
		let id = self.world_ids.get();
		let index = id as usize;
		if self.worlds.len() <= index {
			let len = grown_capacity(self.worlds.len(), index + 1);
			self.worlds.resize_with(len, || None);
		}

		self.worlds[index] = Some(WorldData::new(self.config.entity_capacity));
		debug!(world = id, "world created");
		WorldId(id)
	}

	/// Destroy a world together with every entity, component instance and channel it holds.
	///
	/// World-disposed callbacks run first, while the world's entities, component instances
	/// and entity sets are still readable.
	pub fn destroy_world(&mut self, world: WorldId) -> EcsResult {
		self.world(world)?;
		self.publish_world_disposed(world);
		self.bus.release(world);

		let entities = match self.worlds.get_mut(world.index()).and_then(Option::take) {
			Some(data) => data.len(),
			None => return Ok(()),
		};

		self.world_ids.release(world.0);
		debug!(world = world.0, entities, "world destroyed");
		Ok(())
	}

	pub fn world_exists(&self, world: WorldId) -> bool {
		self.world(world).is_ok()
	}

	/// The number of live entities in `world`.
	pub fn entity_count(&self, world: WorldId) -> EcsResult<usize> {
		Ok(self.world(world)?.len())
	}

	/// Create an alive and enabled entity without components.
	pub fn create_entity(&mut self, world: WorldId) -> EcsResult<Entity> {
		let id = self.world_mut(world)?.allocate();
		let entity = Entity::new(world, id);
		self.publish(Channel::EntityCreated, &Message::EntityCreated(entity));
		Ok(entity)
	}

	/// Destroy an entity and every component instance it references.
	///
	/// Disposed subscribers observe the entity as no longer alive. Its instances are
	/// dropped without removed notifications, then its id becomes available again.
	pub fn destroy_entity(&mut self, entity: Entity) -> EcsResult {
		let classification = self.live_mut(entity)?;
		classification.set_flag(ComponentFlag::ALIVE, false);
		classification.set_flag(ComponentFlag::ENABLED, false);

		self.publish(Channel::EntityDisposed, &Message::EntityDisposed(entity));
		if let Ok(world) = self.world_mut(entity.world) {
			world.release(entity.id);
		}

		Ok(())
	}

	/// Re-enable a disabled entity, making it eligible for entity sets again.
	pub fn enable_entity(&mut self, entity: Entity) -> EcsResult {
		let classification = self.live_mut(entity)?;
		if classification.get_flag(ComponentFlag::ENABLED) {
			return Err(EcsError::InvalidState);
		}

		classification.set_flag(ComponentFlag::ENABLED, true);
		self.publish(Channel::EntityEnabled, &Message::EntityEnabled(entity));
		Ok(())
	}

	/// Disable an entity, removing it from every entity set.
	///
	/// Only the entity-disabled channel is published; no removed notification is sent for
	/// the components it carries, and its component notifications stay muted until it is enabled.
	pub fn disable_entity(&mut self, entity: Entity) -> EcsResult {
		let classification = self.live_mut(entity)?;
		if !classification.get_flag(ComponentFlag::ENABLED) {
			return Err(EcsError::InvalidState);
		}

		classification.set_flag(ComponentFlag::ENABLED, false);
		self.publish(Channel::EntityDisabled, &Message::EntityDisabled(entity));
		Ok(())
	}

	pub fn entity_is_alive(&self, entity: Entity) -> bool {
		self.live(entity).is_ok()
	}

	pub fn entity_is_enabled(&self, entity: Entity) -> bool {
		match self.live(entity) {
			Ok(classification) => classification.get_flag(ComponentFlag::ENABLED),
			Err(_) => false,
		}
	}

	/// The classification of a live entity.
	pub fn classification(&self, entity: Entity) -> EcsResult<&BitField> {
		self.live(entity)
	}

	/// The classification of every entity id `world` has handed out, indexed by local id.
	/// Ids that are currently free have an all-zero classification.
	pub fn classifications(&self, world: WorldId) -> EcsResult<&[BitField]> {
		Ok(self.world(world)?.classifications())
	}

	/// The component types whose flag is set on `entity`.
	pub fn entity_component_types(&self, entity: Entity) -> EcsResult<Vec<ComponentType>> {
		let classification = self.live(entity)?;
		Ok(classification
			.iter_ones()
			.filter_map(|index| self.component_flags.get(&ComponentFlag::from_index(index)).copied())
			.collect())
	}

	#[inline]
	pub(crate) fn world(&self, world: WorldId) -> EcsResult<&WorldData> {
		self.worlds
			.get(world.index())
			.and_then(Option::as_ref)
			.ok_or(EcsError::InvalidWorld)
	}

	#[inline]
	pub(crate) fn world_mut(&mut self, world: WorldId) -> EcsResult<&mut WorldData> {
		self.worlds
			.get_mut(world.index())
			.and_then(Option::as_mut)
			.ok_or(EcsError::InvalidWorld)
	}

	#[inline]
	pub(crate) fn live(&self, entity: Entity) -> EcsResult<&BitField> {
		self.world(entity.world)?.live(entity.id).ok_or(EcsError::InvalidEntity)
	}

	#[inline]
	pub(crate) fn live_mut(&mut self, entity: Entity) -> EcsResult<&mut BitField> {
		self.world_mut(entity.world)?
			.live_mut(entity.id)
			.ok_or(EcsError::InvalidEntity)
	}

	#[inline]
	pub(crate) fn try_component_data(&self, ty: ComponentType) -> Option<&ComponentTypeData> {
		match self.components.get(ty.index as usize) {
			Some(Some(data)) if data.flag == ty.flag => Some(data),
			_ => None,
		}
	}

	#[inline]
	pub(crate) fn try_component_data_mut(&mut self, ty: ComponentType) -> Option<&mut ComponentTypeData> {
		match self.components.get_mut(ty.index as usize) {
			Some(Some(data)) if data.flag == ty.flag => Some(data),
			_ => None,
		}
	}

	#[inline(always)]
	pub(crate) fn assert_component(&self, ty: ComponentType) {
		self.component_data(ty);
	}

	/// # Panics
	/// If the component type has already been freed.
	#[inline]
	pub(crate) fn component_data(&self, ty: ComponentType) -> &ComponentTypeData {
		match self.try_component_data(ty) {
			Some(data) => data,
			None => panic!("Component type has already been freed"),
		}
	}

	/// # Panics
	/// If the component type has already been freed.
	#[inline]
	pub(crate) fn component_data_mut(&mut self, ty: ComponentType) -> &mut ComponentTypeData {
		match self.try_component_data_mut(ty) {
			Some(data) => data,
			None => panic!("Component type has already been freed"),
		}
	}
}

impl Default for EcsContext {
	fn default() -> Self {
		Self::new()
	}
}

impl Drop for EcsContext {
	fn drop(&mut self) {
		for data in self.components.iter_mut().flatten() {
			for pool in data.pools.iter_mut().flatten() {
				data.hooks.destruct_all(pool);
			}
		}
	}
}
