use crate::components::{
	Component, ComponentFlag, ComponentHook, ComponentHooks, ComponentPool, ComponentType, ComponentTypeData,
	TypedComponent, Unlinked,
};
use crate::data_structures::{grown_capacity, RECORD_ALIGNMENT};
use crate::events::{Channel, ComponentEvent, EventManager, Message, Subscriber};
use crate::error::{EcsError, EcsResult};
use crate::entities::{Entity, WorldId};
use std::mem::{align_of, size_of};
use tracing::{debug, trace};
use std::ptr::NonNull;
use crate::EcsContext;
use rayon::prelude::*;
use bytemuck::Pod;

impl EcsContext {
	/// Define a component type whose instances are `size` bytes long.
	///
	/// # Arguments
	/// * `constructor` - Runs on every new or re-initialized instance, after its initial value was written
	/// * `destructor` - Runs on every instance right before it is dropped or re-initialized
	///
	/// Both hooks are assumed to never fail.
	pub fn define_component(
		&mut self, size: usize, constructor: Option<ComponentHook>, destructor: Option<ComponentHook>,
	) -> ComponentType {
		let flag = self.flags.next_flag();
		let index = self.component_ids.get();
		let world_disposed_subscription = self
			.bus
			.world_disposed
			.add(Subscriber::ComponentType { component: index });

		let data = ComponentTypeData {
			flag,
			size,
			hooks: ComponentHooks {
				constructor,
				destructor,
			},
			pools: Vec::new(),
			added: EventManager::new(),
			removed: EventManager::new(),
			world_disposed_subscription,
		};

		let slot = index as usize;
		if self.components.len() <= slot {
			let len = grown_capacity(self.components.len(), slot + 1);
			self.components.resize_with(len, || None);
		}

		self.components[slot] = Some(data);

		let ty = ComponentType { index, flag };
		self.component_flags.insert(flag, ty);
		debug!(component = index, size, flag = flag.index(), "component type defined");
		ty
	}

	/// Define a component type storing values of `T`, with the hooks `T` declares.
	///
	/// # Panics
	/// If `T` is aligned to more than 16 bytes.
	pub fn define<T: Component>(&mut self) -> TypedComponent<T> {
		assert!(
			align_of::<T>() <= RECORD_ALIGNMENT,
			"Component types cannot be aligned to more than {} bytes",
			RECORD_ALIGNMENT
		);

		let constructor = T::CONSTRUCT.map(|hook| {
			Box::new(move |bytes: &mut [u8]| hook(bytemuck::from_bytes_mut(bytes))) as ComponentHook
		});

		let destructor = T::DESTRUCT.map(|hook| {
			Box::new(move |bytes: &mut [u8]| hook(bytemuck::from_bytes_mut(bytes))) as ComponentHook
		});

		TypedComponent::new(self.define_component(size_of::<T>(), constructor, destructor))
	}

	/// Free a component type, destroying every instance in every world.
	///
	/// The type's flag is cleared on every owner and the entity sets of the affected worlds
	/// are re-evaluated. No removed notification is published.
	///
	/// # Panics
	/// If the type has already been freed.
	pub fn free_component(&mut self, ty: ComponentType) {
		self.assert_component(ty);
		let data = match self.components.get_mut(ty.index as usize).and_then(Option::take) {
			Some(data) => data,
			None => return,
		};

		let ComponentTypeData {
			flag,
			hooks,
			pools,
			world_disposed_subscription,
			..
		} = data;

		self.bus.world_disposed.remove(world_disposed_subscription);
		self.component_flags.remove(&flag);
		self.component_ids.release(ty.index);

		let mut instances = 0;
		for (index, pool) in pools.into_iter().enumerate() {
			let mut pool = match pool {
				Some(pool) => pool,
				None => continue,
			};

			let world = WorldId(index as u32);
			hooks.destruct_all(&mut pool);
			instances += pool.len();

			if let Some(world_data) = self.worlds.get_mut(index).and_then(Option::as_mut) {
				for owner in pool.owners() {
					if let Some(classification) = world_data.live_mut(owner) {
						classification.set_flag(flag, false);
					}
				}
			}

			if let Some(event) = self.bus.disposed.event_mut(world) {
				event.remove(pool.entity_disposed_subscription);
			}

			self.reseed_entity_sets(world);
		}

		debug!(component = ty.index, instances, "component type freed");
	}

	/// Attach a zero-filled instance of `ty` to `entity`, or re-initialize the one it has.
	///
	/// Publishes added when the component flag goes from unset to set while the entity is enabled.
	///
	/// # Returns
	/// The instance's bytes. They may be relocated by any later removal from the same pool,
	/// so the slice cannot be kept across mutating calls.
	/// Fails with [InvalidEntity](EcsError::InvalidEntity) if an added subscriber removed
	/// the instance again.
	pub fn set(&mut self, entity: Entity, ty: ComponentType) -> EcsResult<&mut [u8]> {
		self.set_with(entity, ty, None)?;
		self.get_mut(entity, ty)
	}

	/// Like [set](EcsContext::set), but the instance starts as a copy of `value`.
	///
	/// # Panics
	/// If `value` is not exactly as long as the component.
	pub fn set_value(&mut self, entity: Entity, ty: ComponentType, value: &[u8]) -> EcsResult<&mut [u8]> {
		let size = self.component_data(ty).size;
		assert_eq!(value.len(), size, "Value size does not match the component size");
		self.set_with(entity, ty, Some(value))?;
		self.get_mut(entity, ty)
	}

	/// Make `entity` share the instance of `ty` owned by `reference`.
	///
	/// Writes through either entity are observed by both. An instance `entity` owned before
	/// is removed first.
	pub fn set_same_as(&mut self, entity: Entity, reference: Entity, ty: ComponentType) -> EcsResult {
		if entity.world != reference.world {
			return Err(EcsError::DifferentWorld);
		}

		self.live(entity)?;
		let target = self.slot_of(reference, ty).ok_or(EcsError::InvalidEntity)?;
		match self.slot_of(entity, ty) {
			Some(slot) if slot == target => return Err(EcsError::InvalidState),
			Some(_) => self.remove_component(entity, ty)?,
			None => {},
		}

		// Subscribers of the removal may have moved or dropped the reference's instance.
		let target = self.slot_of(reference, ty).ok_or(EcsError::InvalidEntity)?;
		if self.slot_of(entity, ty).is_some() {
			return Err(EcsError::InvalidState);
		}

		let classification = self.live_mut(entity)?;
		let publish = !classification.get_flag(ty.flag) && classification.get_flag(ComponentFlag::ENABLED);
		classification.set_flag(ty.flag, true);

		if let Some(pool) = self.component_data_mut(ty).pool_mut(entity.world) {
			pool.link(entity.id, target);
		}

		if publish {
			let event = ComponentEvent {
				entity,
				component: ty,
				slot: target,
			};

			self.publish(Channel::ComponentAdded(ty), &Message::ComponentAdded(event));
		}

		Ok(())
	}

	/// Detach `ty` from `entity`.
	///
	/// Publishes removed, with the bytes still readable, if the flag was set while the entity
	/// was enabled. The instance is destructed and compacted once no entity references it.
	/// If a removed subscriber sets the component on `entity` again, the entity keeps it.
	pub fn remove_component(&mut self, entity: Entity, ty: ComponentType) -> EcsResult {
		let slot = self.slot_of(entity, ty).ok_or(EcsError::InvalidEntity)?;

		let mut publish = false;
		if let Ok(classification) = self.live_mut(entity) {
			publish = classification.get_flag(ty.flag) && classification.get_flag(ComponentFlag::ENABLED);
			classification.set_flag(ty.flag, false);
		}

		if publish {
			let event = ComponentEvent {
				entity,
				component: ty,
				slot,
			};

			self.publish(Channel::ComponentRemoved(ty), &Message::ComponentRemoved(event));

			// A subscriber set the component again, reusing or replacing the instance.
			if self.try_component_data(ty).is_none() || self.is_component_enabled(entity, ty) {
				return Ok(());
			}
		}

		if self.try_component_data(ty).is_some() {
			self.drop_instance(ty.index, entity);
		}

		Ok(())
	}

	/// Set the component flag of an instance `entity` already owns.
	pub fn enable_component(&mut self, entity: Entity, ty: ComponentType) -> EcsResult {
		self.toggle_component(entity, ty, true)
	}

	/// Clear the component flag of an instance `entity` owns, keeping the instance.
	pub fn disable_component(&mut self, entity: Entity, ty: ComponentType) -> EcsResult {
		self.toggle_component(entity, ty, false)
	}

	/// Whether `entity` owns an instance of `ty`, enabled or not.
	#[inline]
	pub fn exists(&self, entity: Entity, ty: ComponentType) -> bool {
		self.slot_of(entity, ty).is_some()
	}

	/// Whether the flag of `ty` is set on `entity`.
	pub fn is_component_enabled(&self, entity: Entity, ty: ComponentType) -> bool {
		match self.live(entity) {
			Ok(classification) => classification.get_flag(ty.flag),
			Err(_) => false,
		}
	}

	pub fn get(&self, entity: Entity, ty: ComponentType) -> EcsResult<&[u8]> {
		let pool = self.component_data(ty).pool(entity.world).ok_or(EcsError::InvalidEntity)?;
		let slot = pool.slot_of(entity.id).ok_or(EcsError::InvalidEntity)?;
		Ok(pool.record(slot))
	}

	pub fn get_mut(&mut self, entity: Entity, ty: ComponentType) -> EcsResult<&mut [u8]> {
		let pool = self
			.component_data_mut(ty)
			.pool_mut(entity.world)
			.ok_or(EcsError::InvalidEntity)?;
		let slot = pool.slot_of(entity.id).ok_or(EcsError::InvalidEntity)?;
		Ok(pool.record_mut(slot))
	}

	/// Every instance of `ty` in `world` as one packed buffer, plus the instance count.
	/// Shared instances appear once.
	pub fn get_all(&self, world: WorldId, ty: ComponentType) -> EcsResult<(&[u8], usize)> {
		self.world(world)?;
		match self.component_data(ty).pool(world) {
			Some(pool) => Ok((pool.records(), pool.len())),
			None => Ok((&[], 0)),
		}
	}

	pub fn get_all_mut(&mut self, world: WorldId, ty: ComponentType) -> EcsResult<(&mut [u8], usize)> {
		self.world(world)?;
		match self.component_data_mut(ty).pool_mut(world) {
			Some(pool) => {
				let len = pool.len();
				Ok((pool.records_mut(), len))
			},
			None => Ok((&mut [], 0)),
		}
	}

	/// Attach `value` to `entity`; see [set_value](EcsContext::set_value).
	pub fn insert<T: Component>(&mut self, entity: Entity, ty: TypedComponent<T>, value: T) -> EcsResult<&mut T> {
		let bytes = self.set_value(entity, *ty, bytemuck::bytes_of(&value))?;
		Ok(bytemuck::from_bytes_mut(bytes))
	}

	pub fn get_as<T: Component>(&self, entity: Entity, ty: TypedComponent<T>) -> EcsResult<&T> {
		self.get(entity, *ty).map(bytemuck::from_bytes)
	}

	pub fn get_as_mut<T: Component>(&mut self, entity: Entity, ty: TypedComponent<T>) -> EcsResult<&mut T> {
		self.get_mut(entity, *ty).map(bytemuck::from_bytes_mut)
	}

	/// Every instance of `T` in `world`.
	pub fn all<T: Component>(&self, world: WorldId, ty: TypedComponent<T>) -> EcsResult<&[T]> {
		let (bytes, len) = self.get_all(world, *ty)?;
		Ok(cast_records(bytes, len))
	}

	pub fn all_mut<T: Component>(&mut self, world: WorldId, ty: TypedComponent<T>) -> EcsResult<&mut [T]> {
		let (bytes, len) = self.get_all_mut(world, *ty)?;
		Ok(cast_records_mut(bytes, len))
	}

	/// Run `func` on every instance of `T` in `world`, in parallel.
	pub fn par_for_each_mut<T: Component + Send + Sync>(
		&mut self, world: WorldId, ty: TypedComponent<T>, func: impl Fn(&mut T) + Send + Sync,
	) -> EcsResult {
		self.all_mut(world, ty)?.par_iter_mut().for_each(func);
		Ok(())
	}

	#[inline]
	pub(crate) fn slot_of(&self, entity: Entity, ty: ComponentType) -> Option<usize> {
		self.component_data(ty).pool(entity.world)?.slot_of(entity.id)
	}

	fn set_with(&mut self, entity: Entity, ty: ComponentType, value: Option<&[u8]>) -> EcsResult {
		let classification = self.live(entity)?;
		let was_set = classification.get_flag(ty.flag);
		let enabled = classification.get_flag(ComponentFlag::ENABLED);

		self.ensure_pool(entity.world, ty);
		let (pool, hooks) = self
			.component_data_mut(ty)
			.split_pool(entity.world)
			.ok_or(EcsError::InvalidWorld)?;

		let slot = match pool.slot_of(entity.id) {
			Some(slot) => {
				hooks.destruct(pool.record_mut(slot));
				slot
			},
			None => pool.push(entity.id),
		};

		let record = pool.record_mut(slot);
		match value {
			Some(value) => record.copy_from_slice(value),
			None => record.fill(0),
		}

		hooks.construct(record);
		self.live_mut(entity)?.set_flag(ty.flag, true);

		if !was_set && enabled {
			let event = ComponentEvent {
				entity,
				component: ty,
				slot,
			};

			self.publish(Channel::ComponentAdded(ty), &Message::ComponentAdded(event));
		}

		Ok(())
	}

	fn toggle_component(&mut self, entity: Entity, ty: ComponentType, value: bool) -> EcsResult {
		let slot = self.slot_of(entity, ty).ok_or(EcsError::InvalidEntity)?;
		let classification = self.live_mut(entity)?;
		if classification.get_flag(ty.flag) == value {
			return Err(EcsError::InvalidState);
		}

		classification.set_flag(ty.flag, value);
		if !classification.get_flag(ComponentFlag::ENABLED) {
			return Ok(());
		}

		let event = ComponentEvent {
			entity,
			component: ty,
			slot,
		};

		match value {
			true => self.publish(Channel::ComponentAdded(ty), &Message::ComponentAdded(event)),
			false => self.publish(Channel::ComponentRemoved(ty), &Message::ComponentRemoved(event)),
		}

		Ok(())
	}

	fn ensure_pool(&mut self, world: WorldId, ty: ComponentType) {
		if self.component_data(ty).pool(world).is_some() {
			return;
		}

		let subscription = self
			.bus
			.disposed
			.event_or_insert(world)
			.add(Subscriber::ComponentPool { component: ty.index });

		let capacity = self.config.component_capacity;
		let data = self.component_data_mut(ty);
		let pool = ComponentPool::new(data.size, capacity, subscription);

		let index = world.index();
		if data.pools.len() <= index {
			let len = grown_capacity(data.pools.len(), index + 1);
			data.pools.resize_with(len, || None);
		}

		data.pools[index] = Some(pool);
		trace!(component = ty.index, world = world.value(), "component pool created");
	}

	/// Drop `entity`'s reference to its instance of the type at `component`,
	/// destructing and compacting the instance if it was the last one.
	pub(crate) fn drop_instance(&mut self, component: u32, entity: Entity) {
		let data = match self.components.get_mut(component as usize).and_then(Option::as_mut) {
			Some(data) => data,
			None => return,
		};

		let (pool, hooks) = match data.split_pool(entity.world) {
			Some(split) => split,
			None => return,
		};

		if let Some(Unlinked::Last(slot)) = pool.unlink(entity.id) {
			hooks.destruct(pool.record_mut(slot));
			pool.swap_remove(slot);
			trace!(component, slot, len = pool.len(), "component instance compacted");
		}
	}

	/// Destroy the pool and channels the type at `component` holds for a disposed world.
	pub(crate) fn release_world_storage(&mut self, component: u32, world: WorldId) {
		let data = match self.components.get_mut(component as usize).and_then(Option::as_mut) {
			Some(data) => data,
			None => return,
		};

		data.added.release(world);
		data.removed.release(world);
		if let Some(mut pool) = data.pools.get_mut(world.index()).and_then(Option::take) {
			data.hooks.destruct_all(&mut pool);
			debug!(
				component,
				world = world.value(),
				instances = pool.len(),
				"component pool released"
			);
		}
	}
}

fn cast_records<T: Pod>(bytes: &[u8], len: usize) -> &[T] {
	match size_of::<T>() {
		// Any aligned dangling pointer is a valid slice of zero-sized values.
		0 => unsafe { std::slice::from_raw_parts(NonNull::<T>::dangling().as_ptr(), len) },
		_ => bytemuck::cast_slice(bytes),
	}
}

fn cast_records_mut<T: Pod>(bytes: &mut [u8], len: usize) -> &mut [T] {
	match size_of::<T>() {
		0 => unsafe { std::slice::from_raw_parts_mut(NonNull::<T>::dangling().as_ptr(), len) },
		_ => bytemuck::cast_slice_mut(bytes),
	}
}
