use crate::components::{ComponentFlag, ComponentType};
use crate::data_structures::{grown_capacity, BitField};
use crate::entities::{Entity, WorldData, WorldId};
use crate::events::Subscription;

/// A utility structure to build [entity sets](EntitySet).
///
/// An entity matches when it is alive and enabled, carries every `with` component,
/// carries no `without` component, and carries at least one component of each `with_any` group.
#[derive(Default, Clone, Debug)]
pub struct EntitySetBuilder {
	pub(crate) with: Vec<ComponentType>,
	pub(crate) without: Vec<ComponentType>,
	pub(crate) with_any: Vec<Vec<ComponentType>>,
}

impl EntitySetBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Require every one of `components`.
	pub fn with(mut self, components: &[ComponentType]) -> Self {
		self.with.extend_from_slice(components);
		self
	}

	/// Reject entities carrying any of `components`.
	pub fn without(mut self, components: &[ComponentType]) -> Self {
		self.without.extend_from_slice(components);
		self
	}

	/// Require at least one of `components`.
	/// An empty group can never be satisfied.
	pub fn with_any(mut self, components: &[ComponentType]) -> Self {
		self.with_any.push(components.to_vec());
		self
	}

	/// Compile the builder into bit-field predicates.
	pub fn compile(&self) -> EntityFilter {
		let mut with = BitField::from([ComponentFlag::ALIVE, ComponentFlag::ENABLED].as_slice());
		for component in &self.with {
			with.set_flag(component.flag, true);
		}

		let mut without = BitField::new();
		for component in &self.without {
			without.set_flag(component.flag, true);
		}

		let with_any = self
			.with_any
			.iter()
			.map(|group| group.iter().map(|c| c.flag).collect::<Vec<_>>())
			.map(|flags| BitField::from(flags.as_slice()))
			.collect();

		EntityFilter { with, without, with_any }
	}
}

/// The compiled predicate of an [EntitySet].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntityFilter {
	with: BitField,
	without: BitField,
	with_any: Vec<BitField>,
}

impl EntityFilter {
	#[inline]
	pub fn matches(&self, classification: &BitField) -> bool {
		classification.contains(&self.with)
			&& classification.excludes(&self.without)
			&& self.with_any.iter().all(|group| classification.intersects(group))
	}

	/// Flags every match must carry, [ALIVE](ComponentFlag::ALIVE) and
	/// [ENABLED](ComponentFlag::ENABLED) included.
	pub fn with(&self) -> &BitField {
		&self.with
	}

	pub fn without(&self) -> &BitField {
		&self.without
	}

	pub fn with_any(&self) -> &[BitField] {
		&self.with_any
	}
}

/// A handle to a live query kept up to date by the [EcsContext](crate::EcsContext)
/// that built it.
///
/// Give it back with [free_entity_set](crate::EcsContext::free_entity_set).
#[derive(Debug)]
pub struct EntitySet {
	pub(crate) index: u32,
}

/// How an entity set responds to one of its subscriptions.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Reaction {
	/// Add the entity if it matches.
	CheckedAdd,
	/// Remove the entity unless it still matches.
	///
	/// Reactions always consult the current classification: a subscriber that ran earlier
	/// in the same publish may already have restored the match.
	CheckedRemove,
	/// Empty the set if its world is being disposed.
	Clear,
}

pub(crate) struct EntitySetData {
	pub world: Option<WorldId>,
	pub filter: EntityFilter,
	pub entities: Vec<Entity>,
	mapping: Vec<Option<u32>>,
	pub subscriptions: Vec<Subscription>,
	pub world_disposed_subscription: Subscription,
}

impl EntitySetData {
	pub fn new(
		world: WorldId, filter: EntityFilter, subscriptions: Vec<Subscription>,
		world_disposed_subscription: Subscription,
	) -> Self {
		Self {
			world: Some(world),
			filter,
			entities: Vec::new(),
			mapping: Vec::new(),
			subscriptions,
			world_disposed_subscription,
		}
	}

	#[inline]
	pub fn contains(&self, id: u32) -> bool {
		matches!(self.mapping.get(id as usize), Some(Some(_)))
	}

	pub fn insert(&mut self, entity: Entity) {
		if self.contains(entity.id) {
			return;
		}

		let id = entity.id as usize;
		if self.mapping.len() <= id {
			let len = grown_capacity(self.mapping.len(), id + 1);
			self.mapping.resize(len, None);
		}

		self.mapping[id] = Some(self.entities.len() as u32);
		self.entities.push(entity);
	}

	pub fn remove(&mut self, entity: Entity) {
		let position = match self.mapping.get_mut(entity.id as usize).and_then(Option::take) {
			Some(position) => position as usize,
			None => return,
		};

		self.entities.swap_remove(position);
		if let Some(moved) = self.entities.get(position) {
			self.mapping[moved.id as usize] = Some(position as u32);
		}
	}

	/// Replace the contents with every matching entity of `world`.
	pub fn seed(&mut self, world: &WorldData) {
		self.clear();
		let Some(id) = self.world else { return };
		for (local, classification) in world.classifications().iter().enumerate() {
			if self.filter.matches(classification) {
				self.insert(Entity::new(id, local as u32));
			}
		}
	}

	pub fn clear(&mut self) {
		self.entities.clear();
		self.mapping.fill(None);
	}

	/// Forget the world and every per-world subscription after the world was disposed.
	pub fn detach(&mut self) {
		self.world = None;
		self.subscriptions.clear();
		self.clear();
	}
}
