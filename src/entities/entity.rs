/// A handle to a world of an [EcsContext](crate::EcsContext).
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Debug)]
pub struct WorldId(pub(crate) u32);

impl WorldId {
	#[inline(always)]
	pub fn value(self) -> u32 {
		self.0
	}

	#[inline(always)]
	pub(crate) fn index(self) -> usize {
		self.0 as usize
	}
}

/// A handle to an entity: the world it lives in plus its local id.
///
/// Local ids are reused once an entity is destroyed, so a retained handle must be
/// re-validated with [entity_is_alive](crate::EcsContext::entity_is_alive).
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Debug)]
pub struct Entity {
	pub(crate) world: WorldId,
	pub(crate) id: u32,
}

impl Entity {
	#[inline(always)]
	pub(crate) fn new(world: WorldId, id: u32) -> Self {
		Self { world, id }
	}

	#[inline(always)]
	pub fn world(&self) -> WorldId {
		self.world
	}

	#[inline(always)]
	pub fn id(&self) -> u32 {
		self.id
	}
}
