use crate::events::{Channel, Event, EventManager};
use crate::entities::WorldId;
use crate::{EcsContext, EcsError};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[test]
pub fn add_and_remove_subscriptions() {
	let mut event = Event::new();
	let a = event.add('a');
	let b = event.add('b');
	assert_eq!(event.len(), 2, "Both subscriptions should be active");

	assert_eq!(event.remove(a), Some('a'), "Removal should return the subscriber");
	assert_eq!(event.remove(a), None, "A subscription cannot be removed twice");
	assert_eq!(event.len(), 1, "Only one subscription should be left");

	let c = event.add('c');
	assert_eq!(c, a, "Freed subscription ids should be reused");
	assert_eq!(event.slot(0), Some(Some(&'c')), "The reused slot should hold the new subscriber");
	assert_eq!(event.slot(1), Some(Some(&'b')), "Other slots should be left untouched");
	assert_eq!(event.remove(b), Some('b'), "Removal should return the subscriber");
	assert_eq!(event.slot(1), Some(None), "A removed subscription leaves a free slot");
}

#[test]
pub fn managers_are_per_world() {
	let mut manager = EventManager::new();
	let (first, second) = (WorldId(1), WorldId(2));
	manager.event_or_insert(first).add(1u32);

	assert!(manager.event(first).is_some(), "Subscribing should create the world's event");
	assert!(manager.event(second).is_none(), "Events should only be created on first subscription");

	manager.release(first);
	assert!(manager.event(first).is_none(), "Releasing a world should drop its event");
}

#[test]
pub fn publish_visits_subscribers_in_order() {
	let mut ecs = EcsContext::new();
	let world = ecs.create_world();
	let log = Rc::new(RefCell::new(Vec::new()));

	for i in 0..3 {
		let log = log.clone();
		ecs.on_entity_created(world, move |_, _| log.borrow_mut().push(i)).unwrap();
	}

	ecs.create_entity(world).unwrap();
	assert_eq!(*log.borrow(), vec![0, 1, 2], "Subscribers should run in slot order");
}

#[test]
pub fn reentrant_publish_is_depth_first() {
	let mut ecs = EcsContext::new();
	let world = ecs.create_world();
	let log = Rc::new(RefCell::new(Vec::new()));

	ecs.on_entity_created(world, |ecs, entity| {
		if entity.id() == 0 {
			ecs.create_entity(entity.world()).unwrap();
		}
	})
	.unwrap();

	let inner = log.clone();
	ecs.on_entity_created(world, move |_, entity| inner.borrow_mut().push(entity.id()))
		.unwrap();

	ecs.create_entity(world).unwrap();
	assert_eq!(
		*log.borrow(),
		vec![1, 0],
		"A nested publish should complete before the outer one continues"
	);
}

#[test]
pub fn subscription_added_during_publish() {
	let mut ecs = EcsContext::new();
	let world = ecs.create_world();
	let late = Rc::new(Cell::new(0));
	let added = Rc::new(Cell::new(false));

	let counter = late.clone();
	ecs.on_entity_created(world, move |ecs, entity| {
		if !added.replace(true) {
			let counter = counter.clone();
			ecs.on_entity_created(entity.world(), move |_, _| counter.set(counter.get() + 1))
				.unwrap();
		}
	})
	.unwrap();

	ecs.create_entity(world).unwrap();
	assert_eq!(late.get(), 1, "A subscriber added to a later slot should see the current publish");

	ecs.create_entity(world).unwrap();
	assert_eq!(late.get(), 2, "The added subscriber should stay registered");
}

#[test]
pub fn unsubscribe_stops_delivery() {
	let mut ecs = EcsContext::new();
	let world = ecs.create_world();
	let count = Rc::new(Cell::new(0));

	let counter = count.clone();
	let subscription = ecs
		.subscribe(world, Channel::EntityCreated, move |_, _| counter.set(counter.get() + 1))
		.unwrap();

	ecs.create_entity(world).unwrap();
	assert_eq!(ecs.unsubscribe(subscription), Ok(()), "Unsubscribing should succeed");
	assert_eq!(
		ecs.unsubscribe(subscription),
		Err(EcsError::InvalidEntity),
		"A subscription cannot be removed twice"
	);

	ecs.create_entity(world).unwrap();
	assert_eq!(count.get(), 1, "Unsubscribed callbacks should not run");
}

#[test]
pub fn subscribe_to_unknown_world() {
	let mut ecs = EcsContext::new();
	let result = ecs.subscribe(WorldId(42), Channel::EntityCreated, |_, _| {});
	assert_eq!(result.err(), Some(EcsError::InvalidWorld), "Unknown worlds cannot be subscribed to");
}

#[test]
pub fn custom_events() {
	let mut ecs = EcsContext::new();
	let world = ecs.create_world();
	let other = ecs.create_world();
	let event = ecs.define_event();
	let received = Rc::new(RefCell::new(Vec::new()));

	let log = received.clone();
	ecs.subscribe(world, Channel::Custom(event), move |_, message| {
		if let Some(value) = message.payload::<u32>() {
			log.borrow_mut().push(*value);
		}
	})
	.unwrap();

	assert_eq!(ecs.publish_custom(world, event, &7u32), Ok(()), "Publishing should succeed");
	assert_eq!(ecs.publish_custom(other, event, &8u32), Ok(()), "Publishing should succeed");
	assert_eq!(*received.borrow(), vec![7], "Only subscribers of the publishing world should run");

	assert_eq!(ecs.free_event(event), Ok(()), "Freeing an event should succeed");
	assert_eq!(
		ecs.publish_custom(world, event, &9u32),
		Err(EcsError::InvalidEntity),
		"Freed events cannot be published"
	);
	assert_eq!(ecs.free_event(event), Err(EcsError::InvalidEntity), "Events cannot be freed twice");
}

#[test]
pub fn world_disposed_subscriptions() {
	let mut ecs = EcsContext::new();
	let world = ecs.create_world();
	let disposed = Rc::new(RefCell::new(Vec::new()));

	let log = disposed.clone();
	ecs.on_world_disposed(move |_, world| log.borrow_mut().push(world));
	let subscription = ecs.on_entity_created(world, |_, _| {}).unwrap();

	ecs.destroy_world(world).unwrap();
	assert_eq!(*disposed.borrow(), vec![world], "World-disposed subscribers should run once");
	assert_eq!(
		ecs.unsubscribe(subscription),
		Err(EcsError::InvalidEntity),
		"Per-world subscriptions should be released with their world"
	);
}

#[test]
pub fn callbacks_can_mutate_the_context() {
	let mut ecs = EcsContext::new();
	let world = ecs.create_world();
	let ty = ecs.define_component(4, None, None);

	ecs.on_entity_created(world, move |ecs, entity| {
		ecs.set_value(entity, ty, &[1, 2, 3, 4]).unwrap();
	})
	.unwrap();

	let entity = ecs.create_entity(world).unwrap();
	assert_eq!(ecs.get(entity, ty), Ok(&[1u8, 2, 3, 4][..]), "The callback should have set the component");
}
