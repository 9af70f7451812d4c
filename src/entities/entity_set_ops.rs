use crate::entities::{Entity, EntitySet, EntitySetBuilder, EntitySetData, Reaction, WorldData, WorldId};
use crate::events::{Channel, Message, Route, Subscriber, Subscription};
use crate::data_structures::grown_capacity;
use crate::error::EcsResult;
use crate::EcsContext;
use tracing::debug;

impl EcsContext {
	/// Build a live [EntitySet] over `world`.
	///
	/// The set is seeded with every currently matching entity, then kept up to date
	/// through subscriptions to exactly the channels that can change an entity's verdict.
	///
	/// # Panics
	/// If the builder names a component type that has already been freed.
	pub fn build_entity_set(&mut self, builder: &EntitySetBuilder, world: WorldId) -> EcsResult<EntitySet> {
		self.world(world)?;

		let mut routes = vec![
			(Channel::EntityEnabled, Reaction::CheckedAdd),
			(Channel::EntityDisabled, Reaction::CheckedRemove),
			(Channel::EntityDisposed, Reaction::CheckedRemove),
		];

		// A bare entity can only match when nothing is required of it.
		if builder.with.is_empty() && builder.with_any.is_empty() {
			routes.push((Channel::EntityCreated, Reaction::CheckedAdd));
		}

		for ty in &builder.with {
			routes.push((Channel::ComponentAdded(*ty), Reaction::CheckedAdd));
			routes.push((Channel::ComponentRemoved(*ty), Reaction::CheckedRemove));
		}

		for ty in &builder.without {
			routes.push((Channel::ComponentRemoved(*ty), Reaction::CheckedAdd));
			routes.push((Channel::ComponentAdded(*ty), Reaction::CheckedRemove));
		}

		for ty in builder.with_any.iter().flatten() {
			routes.push((Channel::ComponentAdded(*ty), Reaction::CheckedAdd));
			routes.push((Channel::ComponentRemoved(*ty), Reaction::CheckedRemove));
		}

		let index = self.entity_set_ids.get();
		let mut subscriptions = Vec::with_capacity(routes.len());
		for (channel, reaction) in routes {
			let subscriber = Subscriber::EntitySet { set: index, reaction };
			subscriptions.push(self.subscribe_internal(world, channel, subscriber)?);
		}

		let world_disposed = Subscription {
			route: Route::WorldDisposed,
			id: self.bus.world_disposed.add(Subscriber::EntitySet {
				set: index,
				reaction: Reaction::Clear,
			}),
		};

		let mut data = EntitySetData::new(world, builder.compile(), subscriptions, world_disposed);
		data.seed(self.world(world)?);

		debug!(
			set = index,
			world = world.value(),
			entities = data.entities.len(),
			"entity set built"
		);

		let slot = index as usize;
		if self.entity_sets.len() <= slot {
			let len = grown_capacity(self.entity_sets.len(), slot + 1);
			self.entity_sets.resize_with(len, || None);
		}

		self.entity_sets[slot] = Some(data);
		Ok(EntitySet { index })
	}

	/// Tear down an [EntitySet] and every subscription it registered.
	pub fn free_entity_set(&mut self, set: EntitySet) {
		let data = match self.entity_sets.get_mut(set.index as usize).and_then(Option::take) {
			Some(data) => data,
			None => return,
		};

		// Channels of freed component types are already gone.
		for subscription in data.subscriptions {
			self.unsubscribe_internal(subscription).ok();
		}

		self.unsubscribe_internal(data.world_disposed_subscription).ok();
		self.entity_set_ids.release(set.index);
		debug!(set = set.index, "entity set freed");
	}

	/// The dense, gap-free list of entities currently matching `set`.
	pub fn entities(&self, set: &EntitySet) -> &[Entity] {
		match self.entity_set(set) {
			Some(data) => &data.entities,
			None => &[],
		}
	}

	pub fn entity_set_len(&self, set: &EntitySet) -> usize {
		self.entities(set).len()
	}

	/// O(1) membership test.
	pub fn entity_set_contains(&self, set: &EntitySet, entity: Entity) -> bool {
		match self.entity_set(set) {
			Some(data) => data.world == Some(entity.world) && data.contains(entity.id),
			None => false,
		}
	}

	/// Call `func` for every entity of `set`, letting it mutate the context.
	///
	/// Removing the visited entity from the set (directly or by changing its components)
	/// is tolerated: the entity compacted into its position is visited next.
	/// Entities added during the loop are visited as well, and entities removed before
	/// their turn are skipped.
	///
	/// Removing an entity that was already visited moves the last entity into an earlier
	/// position, where it may be skipped. Use [entities](EcsContext::entities) and collect
	/// the handles first when the callback reshapes the set beyond the visited entity.
	pub fn for_each_entity(&mut self, set: &EntitySet, mut func: impl FnMut(&mut EcsContext, Entity)) {
		let mut index = 0;
		while let Some(entity) = self.entities(set).get(index).copied() {
			func(self, entity);
			if self.entities(set).get(index) == Some(&entity) {
				index += 1;
			}
		}
	}

	pub(crate) fn react(&mut self, set: u32, reaction: Reaction, message: &Message<'_>) {
		let data = match self.entity_sets.get_mut(set as usize).and_then(Option::as_mut) {
			Some(data) => data,
			None => return,
		};

		if let Message::WorldDisposed(world) = message {
			if reaction == Reaction::Clear && data.world == Some(*world) {
				data.detach();
				debug!(set, world = world.value(), "entity set detached");
			}
			return;
		}

		let entity = match message.entity() {
			Some(entity) => entity,
			None => return,
		};

		match reaction {
			Reaction::CheckedAdd | Reaction::CheckedRemove => {
				let matches = self
					.worlds
					.get(entity.world.index())
					.and_then(Option::as_ref)
					.and_then(|world| world.classification(entity.id))
					.map_or(false, |classification| data.filter.matches(classification));

				match (reaction, matches) {
					(Reaction::CheckedAdd, true) => data.insert(entity),
					(Reaction::CheckedRemove, false) => data.remove(entity),
					_ => {},
				}
			},
			Reaction::Clear => {},
		}
	}

	/// Re-evaluate every set of `world` from scratch.
	pub(crate) fn reseed_entity_sets(&mut self, world: WorldId) {
		let world_data: &WorldData = match self.worlds.get(world.index()).and_then(Option::as_ref) {
			Some(data) => data,
			None => return,
		};

		for data in self.entity_sets.iter_mut().flatten() {
			if data.world == Some(world) {
				data.seed(world_data);
			}
		}
	}

	fn entity_set(&self, set: &EntitySet) -> Option<&EntitySetData> {
		self.entity_sets.get(set.index as usize).and_then(Option::as_ref)
	}
}
