use crate::events::Message;
use crate::entities::Reaction;
use crate::EcsContext;
use std::rc::Rc;

/// A user callback attached to a channel.
///
/// Callbacks receive the whole context and may mutate it; anything they publish is
/// dispatched before the outer publish continues.
pub type Callback = Rc<dyn Fn(&mut EcsContext, &Message<'_>)>;

/// Something that reacts to published messages.
#[derive(Clone)]
pub(crate) enum Subscriber {
	/// Re-evaluates an entity against an entity set.
	EntitySet { set: u32, reaction: Reaction },
	/// Drops a disposed entity's instance from the pool of its world.
	ComponentPool { component: u32 },
	/// Releases a component type's storage for a disposed world.
	ComponentType { component: u32 },
	Callback(Callback),
}

impl EcsContext {
	pub(crate) fn dispatch(&mut self, subscriber: Subscriber, message: &Message<'_>) {
		match subscriber {
			Subscriber::EntitySet { set, reaction } => self.react(set, reaction, message),

			Subscriber::ComponentPool { component } => {
				if let Message::EntityDisposed(entity) = message {
					self.drop_instance(component, *entity);
				}
			},

			Subscriber::ComponentType { component } => {
				if let Message::WorldDisposed(world) = message {
					self.release_world_storage(component, *world);
				}
			},

			Subscriber::Callback(callback) => callback(self, message),
		}
	}
}
