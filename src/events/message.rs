use crate::components::ComponentType;
use crate::entities::{Entity, WorldId};
use crate::events::SubscriptionId;
use std::any::Any;

/// A user-defined event created with [define_event](crate::EcsContext::define_event).
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub struct EventType(pub(crate) u32);

/// A per-world stream of [messages](Message).
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub enum Channel {
	EntityCreated,
	EntityDisposed,
	EntityEnabled,
	EntityDisabled,
	ComponentAdded(ComponentType),
	ComponentRemoved(ComponentType),
	Custom(EventType),
}

/// Payload of component added/removed messages.
///
/// `slot` is the instance's position in the world's pool at publish time.
/// It stays valid only until the next removal from that pool.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ComponentEvent {
	pub entity: Entity,
	pub component: ComponentType,
	pub slot: usize,
}

/// What subscribers receive when a channel publishes.
#[derive(Copy, Clone, Debug)]
pub enum Message<'a> {
	EntityCreated(Entity),
	EntityDisposed(Entity),
	EntityEnabled(Entity),
	EntityDisabled(Entity),
	ComponentAdded(ComponentEvent),
	/// Published before the instance is destructed, so its bytes are still readable.
	ComponentRemoved(ComponentEvent),
	WorldDisposed(WorldId),
	Custom {
		event: EventType,
		world: WorldId,
		payload: &'a dyn Any,
	},
}

impl Message<'_> {
	/// The entity the message is about, if any.
	pub fn entity(&self) -> Option<Entity> {
		match self {
			Message::EntityCreated(entity)
			| Message::EntityDisposed(entity)
			| Message::EntityEnabled(entity)
			| Message::EntityDisabled(entity) => Some(*entity),
			Message::ComponentAdded(event) | Message::ComponentRemoved(event) => Some(event.entity),
			Message::WorldDisposed(_) | Message::Custom { .. } => None,
		}
	}

	/// The world the message was published in.
	pub fn world(&self) -> WorldId {
		match self {
			Message::EntityCreated(entity)
			| Message::EntityDisposed(entity)
			| Message::EntityEnabled(entity)
			| Message::EntityDisabled(entity) => entity.world(),
			Message::ComponentAdded(event) | Message::ComponentRemoved(event) => event.entity.world(),
			Message::WorldDisposed(world) | Message::Custom { world, .. } => *world,
		}
	}

	/// Downcast the payload of a custom message.
	pub fn payload<T: Any>(&self) -> Option<&T> {
		match self {
			Message::Custom { payload, .. } => payload.downcast_ref(),
			_ => None,
		}
	}
}

#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub(crate) enum Route {
	World(WorldId, Channel),
	WorldDisposed,
}

/// A registered subscription, needed to [unsubscribe](crate::EcsContext::unsubscribe).
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub struct Subscription {
	pub(crate) route: Route,
	pub(crate) id: SubscriptionId,
}
