use crate::events::{Callback, Channel, Event, EventManager, EventType, Message, Route, Subscriber, Subscription};
use crate::data_structures::{grown_capacity, IdDispenser};
use crate::error::{EcsError, EcsResult};
use crate::entities::{Entity, WorldId};
use crate::EcsContext;
use tracing::{debug, trace};
use std::any::Any;
use paste::paste;
use std::rc::Rc;

/// Every channel that is not owned by a component type.
#[derive(Default)]
pub(crate) struct EventBus {
	pub created: EventManager<Subscriber>,
	pub disposed: EventManager<Subscriber>,
	pub enabled: EventManager<Subscriber>,
	pub disabled: EventManager<Subscriber>,
	pub world_disposed: Event<Subscriber>,
	pub custom: Vec<Option<EventManager<Subscriber>>>,
	pub custom_ids: IdDispenser,
}

impl EventBus {
	/// Drop every per-world channel of `world`.
	pub fn release(&mut self, world: WorldId) {
		self.created.release(world);
		self.disposed.release(world);
		self.enabled.release(world);
		self.disabled.release(world);
		for manager in self.custom.iter_mut().flatten() {
			manager.release(world);
		}
	}
}

/// Wrap a closure into a [Callback].
pub(crate) fn callback(func: impl Fn(&mut EcsContext, &Message<'_>) + 'static) -> Callback {
	Rc::new(func)
}

impl EcsContext {
	/// Subscribe `callback` to `channel` in `world`.
	///
	/// # Panics
	/// If `channel` refers to a component type that has already been freed.
	pub fn subscribe(
		&mut self, world: WorldId, channel: Channel, callback: impl Fn(&mut EcsContext, &Message<'_>) + 'static,
	) -> EcsResult<Subscription> {
		self.world(world)?;
		self.subscribe_internal(world, channel, Subscriber::Callback(self::callback(callback)))
	}

	/// Remove a subscription.
	/// Fails with [InvalidEntity](EcsError::InvalidEntity) if it is no longer registered,
	/// for example because its world has been destroyed.
	pub fn unsubscribe(&mut self, subscription: Subscription) -> EcsResult {
		self.unsubscribe_internal(subscription)
	}

	/// Subscribe `callback` to the disposal of every world.
	pub fn on_world_disposed(&mut self, callback: impl Fn(&mut EcsContext, WorldId) + 'static) -> Subscription {
		let callback = self::callback(move |ctx, message| {
			if let Message::WorldDisposed(world) = message {
				callback(ctx, *world);
			}
		});

		let id = self.bus.world_disposed.add(Subscriber::Callback(callback));
		Subscription {
			route: Route::WorldDisposed,
			id,
		}
	}

	/// Create a new user-defined [EventType].
	pub fn define_event(&mut self) -> EventType {
		let index = self.bus.custom_ids.get() as usize;
		if self.bus.custom.len() <= index {
			let len = grown_capacity(self.bus.custom.len(), index + 1);
			self.bus.custom.resize_with(len, || None);
		}

		self.bus.custom[index] = Some(EventManager::new());
		debug!(event = index, "event defined");
		EventType(index as u32)
	}

	/// Free a user-defined event together with every subscription to it.
	pub fn free_event(&mut self, event: EventType) -> EcsResult {
		self.bus
			.custom
			.get_mut(event.0 as usize)
			.and_then(Option::take)
			.ok_or(EcsError::InvalidEntity)?;

		self.bus.custom_ids.release(event.0);
		debug!(event = event.0, "event freed");
		Ok(())
	}

	/// Publish `payload` on a user-defined event of `world`.
	/// Subscribers retrieve it with [Message::payload].
	pub fn publish_custom<T: Any>(&mut self, world: WorldId, event: EventType, payload: &T) -> EcsResult {
		self.world(world)?;
		if self.manager(Channel::Custom(event)).is_none() {
			return Err(EcsError::InvalidEntity);
		}

		let message = Message::Custom { event, world, payload };
		self.publish(Channel::Custom(event), &message);
		Ok(())
	}

	pub(crate) fn publish(&mut self, channel: Channel, message: &Message<'_>) {
		let world = message.world();
		trace!(?channel, world = world.value(), "publish");
		self.publish_route(Route::World(world, channel), message, |_| true);
	}

	/// User callbacks run first, while the world's instances and entity sets are intact.
	/// Component storage and entity sets are torn down afterwards.
	pub(crate) fn publish_world_disposed(&mut self, world: WorldId) {
		trace!(world = world.value(), "publish world disposed");
		let message = Message::WorldDisposed(world);
		self.publish_route(Route::WorldDisposed, &message, |s| matches!(s, Subscriber::Callback(_)));
		self.publish_route(Route::WorldDisposed, &message, |s| !matches!(s, Subscriber::Callback(_)));
	}

	/// Visit every slot accepted by `filter` in order. The channel is looked up again for each
	/// slot, since subscribers may add or remove subscriptions while it is being published.
	fn publish_route(&mut self, route: Route, message: &Message<'_>, filter: impl Fn(&Subscriber) -> bool) {
		let mut index = 0;
		while let Some(slot) = self.event(route).and_then(|event| event.slot(index).map(|s| s.cloned())) {
			if let Some(subscriber) = slot.filter(|s| filter(s)) {
				self.dispatch(subscriber, message);
			}

			index += 1;
		}
	}

	pub(crate) fn subscribe_internal(
		&mut self, world: WorldId, channel: Channel, subscriber: Subscriber,
	) -> EcsResult<Subscription> {
		if let Channel::ComponentAdded(ty) | Channel::ComponentRemoved(ty) = channel {
			self.assert_component(ty);
		}

		let manager = self.manager_mut(channel).ok_or(EcsError::InvalidEntity)?;
		let id = manager.event_or_insert(world).add(subscriber);
		Ok(Subscription {
			route: Route::World(world, channel),
			id,
		})
	}

	pub(crate) fn unsubscribe_internal(&mut self, subscription: Subscription) -> EcsResult {
		let removed = match subscription.route {
			Route::World(world, channel) => self
				.manager_mut(channel)
				.and_then(|manager| manager.event_mut(world))
				.and_then(|event| event.remove(subscription.id)),
			Route::WorldDisposed => self.bus.world_disposed.remove(subscription.id),
		};

		removed.map(|_| ()).ok_or(EcsError::InvalidEntity)
	}

	fn event(&self, route: Route) -> Option<&Event<Subscriber>> {
		match route {
			Route::World(world, channel) => self.manager(channel)?.event(world),
			Route::WorldDisposed => Some(&self.bus.world_disposed),
		}
	}

	fn manager(&self, channel: Channel) -> Option<&EventManager<Subscriber>> {
		match channel {
			Channel::EntityCreated => Some(&self.bus.created),
			Channel::EntityDisposed => Some(&self.bus.disposed),
			Channel::EntityEnabled => Some(&self.bus.enabled),
			Channel::EntityDisabled => Some(&self.bus.disabled),
			Channel::ComponentAdded(ty) => self.try_component_data(ty).map(|data| &data.added),
			Channel::ComponentRemoved(ty) => self.try_component_data(ty).map(|data| &data.removed),
			Channel::Custom(event) => self.bus.custom.get(event.0 as usize)?.as_ref(),
		}
	}

	fn manager_mut(&mut self, channel: Channel) -> Option<&mut EventManager<Subscriber>> {
		match channel {
			Channel::EntityCreated => Some(&mut self.bus.created),
			Channel::EntityDisposed => Some(&mut self.bus.disposed),
			Channel::EntityEnabled => Some(&mut self.bus.enabled),
			Channel::EntityDisabled => Some(&mut self.bus.disabled),
			Channel::ComponentAdded(ty) => self.try_component_data_mut(ty).map(|data| &mut data.added),
			Channel::ComponentRemoved(ty) => self.try_component_data_mut(ty).map(|data| &mut data.removed),
			Channel::Custom(event) => self.bus.custom.get_mut(event.0 as usize)?.as_mut(),
		}
	}
}

macro_rules! impl_lifecycle_subscriptions {
	($($name: ident => $channel: ident),*) => {
		paste! {
			impl EcsContext {
				$(
					#[doc = "Subscribe `callback` to every entity " $name " in `world`."]
					pub fn [<on_entity_ $name>](
						&mut self, world: WorldId, callback: impl Fn(&mut EcsContext, Entity) + 'static,
					) -> EcsResult<Subscription> {
						self.subscribe(world, Channel::$channel, move |ctx, message| {
							if let Some(entity) = message.entity() {
								callback(ctx, entity);
							}
						})
					}
				)*
			}
		}
	};
}

impl_lifecycle_subscriptions!(
	created => EntityCreated,
	disposed => EntityDisposed,
	enabled => EntityEnabled,
	disabled => EntityDisabled
);
