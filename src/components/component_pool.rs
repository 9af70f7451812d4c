use crate::data_structures::{grown_capacity, AnyBuffer};
use crate::events::SubscriptionId;

/// Which entity a slot is recorded under, and how many entities share it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct ComponentLink {
	pub entity: u32,
	pub references: u32,
}

/// Result of dropping one entity's reference to its slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Unlinked {
	/// Other entities still reference the slot.
	Shared,
	/// The last reference is gone; the slot must be destructed and compacted.
	Last(usize),
}

/// Packed storage for one component type within one world.
///
/// Slots `0..len` are occupied and gap-free. `mapping[e]` holds the slot entity `e`
/// owns, directly or through aliasing, whether or not its component flag is set.
pub(crate) struct ComponentPool {
	buffer: AnyBuffer,
	mapping: Vec<Option<u32>>,
	links: Vec<ComponentLink>,
	pub entity_disposed_subscription: SubscriptionId,
}

impl ComponentPool {
	pub fn new(size: usize, capacity: usize, entity_disposed_subscription: SubscriptionId) -> Self {
		Self {
			buffer: AnyBuffer::with_capacity(size, capacity),
			mapping: Vec::new(),
			links: Vec::with_capacity(capacity),
			entity_disposed_subscription,
		}
	}

	/// The number of occupied slots.
	#[inline]
	pub fn len(&self) -> usize {
		self.links.len()
	}

	#[inline]
	pub fn slot_of(&self, entity: u32) -> Option<usize> {
		match self.mapping.get(entity as usize) {
			Some(Some(slot)) => Some(*slot as usize),
			_ => None,
		}
	}

	#[inline]
	pub fn link_of(&self, slot: usize) -> Option<ComponentLink> {
		self.links.get(slot).copied()
	}

	/// Append a zero-filled slot owned solely by `entity`.
	pub fn push(&mut self, entity: u32) -> usize {
		let slot = self.links.len();
		self.buffer.reserve_for(slot + 1);
		self.buffer.record_mut(slot).fill(0);
		self.links.push(ComponentLink {
			entity,
			references: 1,
		});
		self.map(entity, Some(slot));
		slot
	}

	/// Make `entity` share the instance stored in `slot`.
	pub fn link(&mut self, entity: u32, slot: usize) {
		self.links[slot].references += 1;
		self.map(entity, Some(slot));
	}

	/// Drop `entity`'s reference to its slot.
	/// Returns [None] if the entity owns no instance.
	pub fn unlink(&mut self, entity: u32) -> Option<Unlinked> {
		let slot = self.slot_of(entity)?;
		self.mapping[entity as usize] = None;

		let link = &mut self.links[slot];
		link.references -= 1;
		if link.references == 0 {
			return Some(Unlinked::Last(slot));
		}

		if link.entity == entity {
			let owner = self.mapping.iter().position(|mapped| *mapped == Some(slot as u32));
			if let Some(owner) = owner {
				self.links[slot].entity = owner as u32;
			}
		}

		Some(Unlinked::Shared)
	}

	/// Fill the unreferenced `slot` with the last occupied slot and shrink by one.
	///
	/// Repairing the moved slot's owners is O(1) for a single owner
	/// and a scan of the mapping for a shared slot.
	pub fn swap_remove(&mut self, slot: usize) {
		let last = self.links.len() - 1;
		debug_assert_eq!(self.links[slot].references, 0, "Slot {} is still referenced", slot);

		if slot != last {
			self.buffer.copy_record(last, slot);
			let link = self.links[last];
			self.links[slot] = link;

			match link.references {
				1 => self.mapping[link.entity as usize] = Some(slot as u32),
				_ => {
					for mapped in self.mapping.iter_mut().filter(|m| **m == Some(last as u32)) {
						*mapped = Some(slot as u32);
					}
				},
			}
		}

		self.links.pop();
	}

	#[inline]
	pub fn record(&self, slot: usize) -> &[u8] {
		self.buffer.record(slot)
	}

	#[inline]
	pub fn record_mut(&mut self, slot: usize) -> &mut [u8] {
		self.buffer.record_mut(slot)
	}

	/// Every occupied slot as one contiguous byte slice.
	#[inline]
	pub fn records(&self) -> &[u8] {
		self.buffer.records(self.len())
	}

	#[inline]
	pub fn records_mut(&mut self) -> &mut [u8] {
		let len = self.len();
		self.buffer.records_mut(len)
	}

	/// Local ids of every entity that owns an instance.
	pub fn owners(&self) -> impl Iterator<Item = u32> + '_ {
		self.mapping
			.iter()
			.enumerate()
			.filter_map(|(entity, slot)| slot.map(|_| entity as u32))
	}

	fn map(&mut self, entity: u32, slot: Option<usize>) {
		let entity = entity as usize;
		if self.mapping.len() <= entity {
			let len = grown_capacity(self.mapping.len(), entity + 1);
			self.mapping.resize(len, None);
		}

		self.mapping[entity] = slot.map(|slot| slot as u32);
	}
}
