use crate::data_structures::{grown_capacity, BitField, IdDispenser};
use crate::components::ComponentFlag;

/// The id space and classification table of one world.
pub(crate) struct WorldData {
	ids: IdDispenser,
	classifications: Vec<BitField>,
}

impl WorldData {
	pub fn new(capacity: usize) -> Self {
		Self {
			ids: IdDispenser::new(),
			classifications: vec![BitField::new(); capacity],
		}
	}

	/// Hand out a local id and mark it alive and enabled.
	pub fn allocate(&mut self) -> u32 {
		let id = self.ids.get();
		let required = id as usize + 1;
		if self.classifications.len() < required {
			let len = grown_capacity(self.classifications.len(), required);
			self.classifications.resize(len, BitField::new());
		}

		let classification = &mut self.classifications[id as usize];
		classification.set_flag(ComponentFlag::ALIVE, true);
		classification.set_flag(ComponentFlag::ENABLED, true);
		id
	}

	/// Zero the classification of `id` and make it available again.
	pub fn release(&mut self, id: u32) {
		self.classifications[id as usize].clear();
		self.ids.release(id);
	}

	#[inline]
	pub fn classification(&self, id: u32) -> Option<&BitField> {
		self.classifications.get(id as usize)
	}

	/// The classification of `id` if the entity is alive.
	#[inline]
	pub fn live(&self, id: u32) -> Option<&BitField> {
		self.classification(id).filter(|c| c.get_flag(ComponentFlag::ALIVE))
	}

	#[inline]
	pub fn live_mut(&mut self, id: u32) -> Option<&mut BitField> {
		self.classifications
			.get_mut(id as usize)
			.filter(|c| c.get_flag(ComponentFlag::ALIVE))
	}

	/// Classifications of every id ever handed out, dead ones included (all zero).
	pub fn classifications(&self) -> &[BitField] {
		&self.classifications[..self.ids.total() as usize]
	}

	/// The number of live entities.
	pub fn len(&self) -> usize {
		self.ids.in_use()
	}
}
