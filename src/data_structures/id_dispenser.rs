/// A small-integer allocator.
///
/// Released ids are handed out again before the counter advances,
/// which keeps arrays indexed by these ids as dense as possible.
#[derive(Default, Clone, Debug)]
pub struct IdDispenser {
	free: Vec<u32>,
	start: u32,
	total: u32,
}

impl IdDispenser {
	/// Create a new [IdDispenser] whose first id is 0.
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a new [IdDispenser] whose first id is `start`.
	pub fn starting_at(start: u32) -> Self {
		Self {
			free: Vec::new(),
			start,
			total: start,
		}
	}

	/// Get an open id.
	#[inline]
	pub fn get(&mut self) -> u32 {
		match self.free.pop() {
			Some(id) => id,
			None => {
				let id = self.total;
				self.total += 1;
				id
			},
		}
	}

	/// Release an id so it can be handed out again.
	///
	/// # Arguments
	/// * `id` - An id previously returned by [get](IdDispenser::get) that is currently in use
	#[inline]
	pub fn release(&mut self, id: u32) {
		debug_assert!(
			id >= self.start && id < self.total,
			"Id {} was never handed out by this dispenser",
			id
		);
		debug_assert!(self.in_use() > 0, "More ids released than handed out");
		self.free.push(id);
	}

	/// One past the highest id ever handed out.
	#[inline]
	pub fn total(&self) -> u32 {
		self.total
	}

	/// The number of ids currently in use.
	pub fn in_use(&self) -> usize {
		(self.total - self.start) as usize - self.free.len()
	}
}
