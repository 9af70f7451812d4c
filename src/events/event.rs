use crate::data_structures::{grown_capacity, IdDispenser};
use crate::entities::WorldId;

/// Identifies one subscription slot within its channel.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub struct SubscriptionId(pub(crate) u32);

/// One channel: a list of subscription slots.
///
/// Slot ids are dispensed so removal is O(1) and freed slots are reused.
pub struct Event<S> {
	ids: IdDispenser,
	subscribers: Vec<Option<S>>,
}

impl<S> Event<S> {
	pub fn new() -> Self {
		Self {
			ids: IdDispenser::new(),
			subscribers: Vec::new(),
		}
	}

	pub fn add(&mut self, subscriber: S) -> SubscriptionId {
		let id = self.ids.get() as usize;
		if self.subscribers.len() <= id {
			let len = grown_capacity(self.subscribers.len(), id + 1);
			self.subscribers.resize_with(len, || None);
		}

		self.subscribers[id] = Some(subscriber);
		SubscriptionId(id as u32)
	}

	/// Remove a subscription, returning its subscriber if it was active.
	pub fn remove(&mut self, id: SubscriptionId) -> Option<S> {
		let subscriber = self.subscribers.get_mut(id.0 as usize)?.take()?;
		self.ids.release(id.0);
		Some(subscriber)
	}

	/// The slot at `index`: [None] past the end, `Some(None)` for a free slot.
	#[inline]
	pub fn slot(&self, index: usize) -> Option<Option<&S>> {
		self.subscribers.get(index).map(Option::as_ref)
	}

	/// The number of active subscriptions.
	pub fn len(&self) -> usize {
		self.ids.in_use()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl<S> Default for Event<S> {
	fn default() -> Self {
		Self::new()
	}
}

/// One [Event] per world, created on first subscription and released with the world.
pub struct EventManager<S> {
	events: Vec<Option<Event<S>>>,
}

impl<S> EventManager<S> {
	pub fn new() -> Self {
		Self { events: Vec::new() }
	}

	#[inline]
	pub fn event(&self, world: WorldId) -> Option<&Event<S>> {
		self.events.get(world.index()).and_then(Option::as_ref)
	}

	#[inline]
	pub fn event_mut(&mut self, world: WorldId) -> Option<&mut Event<S>> {
		self.events.get_mut(world.index()).and_then(Option::as_mut)
	}

	pub fn event_or_insert(&mut self, world: WorldId) -> &mut Event<S> {
		let index = world.index();
		if self.events.len() <= index {
			let len = grown_capacity(self.events.len(), index + 1);
			self.events.resize_with(len, || None);
		}

		self.events[index].get_or_insert_with(Event::new)
	}

	/// Drop every subscription registered for `world`.
	pub fn release(&mut self, world: WorldId) {
		if let Some(event) = self.events.get_mut(world.index()) {
			*event = None;
		}
	}
}

impl<S> Default for EventManager<S> {
	fn default() -> Self {
		Self::new()
	}
}
