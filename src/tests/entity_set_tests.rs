use crate::entities::{Entity, EntitySet, EntitySetBuilder, WorldId};
use crate::components::ComponentType;
use crate::EcsContext;

fn setup(count: usize) -> (EcsContext, WorldId, Vec<Entity>) {
	let mut ecs = EcsContext::new();
	let world = ecs.create_world();
	let entities = (0..count).map(|_| ecs.create_entity(world).unwrap()).collect();
	(ecs, world, entities)
}

fn members(ecs: &EcsContext, set: &EntitySet) -> Vec<u32> {
	let mut ids: Vec<_> = ecs.entities(set).iter().map(|e| e.id()).collect();
	ids.sort_unstable();
	ids
}

fn subscribers(ecs: &EcsContext, world: WorldId, ty: ComponentType) -> usize {
	let data = ecs.component_data(ty);
	let added = data.added.event(world).map_or(0, |e| e.len());
	let removed = data.removed.event(world).map_or(0, |e| e.len());
	added + removed
}

#[test]
pub fn required_component() {
	let (mut ecs, world, e) = setup(4);
	let flag = ecs.define_component(0, None, None);
	let set = ecs.build_entity_set(&EntitySetBuilder::new().with(&[flag]), world).unwrap();
	assert!(members(&ecs, &set).is_empty(), "No entity carries the component yet");

	ecs.set(e[0], flag).unwrap();
	ecs.set(e[2], flag).unwrap();
	assert_eq!(members(&ecs, &set), vec![0, 2], "Entities with the component should be added");

	ecs.remove_component(e[0], flag).unwrap();
	assert_eq!(members(&ecs, &set), vec![2], "Entities without the component should be removed");
}

#[test]
pub fn excluded_component() {
	let (mut ecs, world, e) = setup(3);
	let tag = ecs.define_component(0, None, None);
	let set = ecs.build_entity_set(&EntitySetBuilder::new().without(&[tag]), world).unwrap();
	assert_eq!(members(&ecs, &set), vec![0, 1, 2], "Every untagged entity should be seeded");

	ecs.set(e[1], tag).unwrap();
	assert_eq!(members(&ecs, &set), vec![0, 2], "Tagged entities should be removed");

	ecs.disable_entity(e[0]).unwrap();
	assert_eq!(members(&ecs, &set), vec![2], "Disabled entities should be removed");

	ecs.enable_entity(e[0]).unwrap();
	assert_eq!(members(&ecs, &set), vec![0, 2], "Re-enabled entities should be re-evaluated");

	ecs.remove_component(e[1], tag).unwrap();
	assert_eq!(members(&ecs, &set), vec![0, 1, 2], "Untagged entities should be added back");
}

#[test]
pub fn seeding_and_creation() {
	let (mut ecs, world, e) = setup(3);
	let ty = ecs.define_component(4, None, None);
	ecs.set(e[1], ty).unwrap();
	ecs.disable_entity(e[2]).unwrap();

	let everything = ecs.build_entity_set(&EntitySetBuilder::new(), world).unwrap();
	let with = ecs.build_entity_set(&EntitySetBuilder::new().with(&[ty]), world).unwrap();
	assert_eq!(members(&ecs, &everything), vec![0, 1], "Only enabled entities should be seeded");
	assert_eq!(members(&ecs, &with), vec![1], "Only matching entities should be seeded");

	let created = ecs.create_entity(world).unwrap();
	assert!(ecs.entity_set_contains(&everything, created), "A new entity should match an empty filter");
	assert!(!ecs.entity_set_contains(&with, created), "A new entity carries no components");

	ecs.destroy_entity(e[1]).unwrap();
	assert_eq!(members(&ecs, &everything), vec![0, 3], "Destroyed entities should be removed");
	assert_eq!(ecs.entity_set_len(&with), 0, "Destroyed entities should be removed");
}

#[test]
pub fn any_of_a_group() {
	let (mut ecs, world, e) = setup(2);
	let (a, b, c) = (
		ecs.define_component(0, None, None),
		ecs.define_component(0, None, None),
		ecs.define_component(0, None, None),
	);

	let builder = EntitySetBuilder::new().with_any(&[a, b]);
	let set = ecs.build_entity_set(&builder, world).unwrap();
	let both = ecs.build_entity_set(&builder.clone().with_any(&[c]), world).unwrap();

	ecs.set(e[0], a).unwrap();
	ecs.set(e[1], b).unwrap();
	assert_eq!(members(&ecs, &set), vec![0, 1], "Any member of the group should satisfy it");

	ecs.set(e[0], b).unwrap();
	ecs.remove_component(e[0], a).unwrap();
	assert_eq!(members(&ecs, &set), vec![0, 1], "Another group member should keep the entity");

	ecs.remove_component(e[0], b).unwrap();
	assert_eq!(members(&ecs, &set), vec![1], "Losing every group member should remove the entity");

	assert!(members(&ecs, &both).is_empty(), "Every group should be satisfied");
	ecs.set(e[1], c).unwrap();
	assert_eq!(members(&ecs, &both), vec![1], "Every group is now satisfied");
}

#[test]
pub fn empty_group_never_matches() {
	let (mut ecs, world, _) = setup(3);
	let set = ecs.build_entity_set(&EntitySetBuilder::new().with_any(&[]), world).unwrap();
	assert_eq!(ecs.entity_set_len(&set), 0, "An empty group cannot be satisfied");

	ecs.create_entity(world).unwrap();
	assert_eq!(ecs.entity_set_len(&set), 0, "An empty group cannot be satisfied");
}

#[test]
pub fn disabled_components() {
	let (mut ecs, world, e) = setup(1);
	let ty = ecs.define_component(4, None, None);
	let set = ecs.build_entity_set(&EntitySetBuilder::new().with(&[ty]), world).unwrap();
	ecs.set(e[0], ty).unwrap();

	ecs.disable_component(e[0], ty).unwrap();
	assert!(!ecs.entity_set_contains(&set, e[0]), "A disabled component should not count");

	ecs.enable_component(e[0], ty).unwrap();
	assert!(ecs.entity_set_contains(&set, e[0]), "A re-enabled component should count again");
}

#[test]
pub fn shared_instances_count() {
	let (mut ecs, world, e) = setup(2);
	let ty = ecs.define_component(4, None, None);
	let set = ecs.build_entity_set(&EntitySetBuilder::new().with(&[ty]), world).unwrap();

	ecs.set(e[0], ty).unwrap();
	ecs.set_same_as(e[1], e[0], ty).unwrap();
	assert_eq!(members(&ecs, &set), vec![0, 1], "Aliasing should count as ownership");

	ecs.remove_component(e[0], ty).unwrap();
	assert_eq!(members(&ecs, &set), vec![1], "The remaining alias should stay in the set");
}

#[test]
pub fn sets_are_bound_to_their_world() {
	let mut ecs = EcsContext::new();
	let (first, second) = (ecs.create_world(), ecs.create_world());
	let set = ecs.build_entity_set(&EntitySetBuilder::new(), first).unwrap();

	let a = ecs.create_entity(first).unwrap();
	let b = ecs.create_entity(second).unwrap();
	assert!(ecs.entity_set_contains(&set, a), "Entities of the set's world should be added");
	assert!(!ecs.entity_set_contains(&set, b), "Entities of other worlds should be ignored");
	assert!(ecs.build_entity_set(&EntitySetBuilder::new(), WorldId(9)).is_err(), "Unknown world");
}

#[test]
pub fn world_disposal_detaches_sets() {
	let (mut ecs, world, _) = setup(3);
	let ty = ecs.define_component(4, None, None);
	let set = ecs.build_entity_set(&EntitySetBuilder::new().without(&[ty]), world).unwrap();
	assert_eq!(ecs.entity_set_len(&set), 3, "Every entity should be seeded");

	ecs.destroy_world(world).unwrap();
	assert_eq!(ecs.entity_set_len(&set), 0, "A disposed world's set should be emptied");

	let reused = ecs.create_world();
	assert_eq!(reused, world, "The world id should be reused");
	ecs.create_entity(reused).unwrap();
	assert_eq!(ecs.entity_set_len(&set), 0, "A detached set should not follow a reused world id");

	ecs.free_entity_set(set);
}

#[test]
pub fn freeing_a_component_type_reseeds_sets() {
	let (mut ecs, world, e) = setup(2);
	let ty = ecs.define_component(4, None, None);
	let without = ecs.build_entity_set(&EntitySetBuilder::new().without(&[ty]), world).unwrap();
	let with = ecs.build_entity_set(&EntitySetBuilder::new().with(&[ty]), world).unwrap();

	ecs.set(e[0], ty).unwrap();
	assert_eq!(members(&ecs, &without), vec![1], "The owner should be excluded");
	assert_eq!(members(&ecs, &with), vec![0], "The owner should be included");

	ecs.free_component(ty);
	assert_eq!(members(&ecs, &without), vec![0, 1], "Former owners should match again");
	assert!(members(&ecs, &with).is_empty(), "No entity can carry a freed type");

	ecs.free_entity_set(with);
	ecs.free_entity_set(without);
}

#[test]
pub fn freeing_a_set_unsubscribes() {
	let (mut ecs, world, e) = setup(1);
	let ty = ecs.define_component(4, None, None);
	let set = ecs
		.build_entity_set(&EntitySetBuilder::new().with(&[ty]).with_any(&[ty]), world)
		.unwrap();
	assert_eq!(subscribers(&ecs, world, ty), 4, "The set should subscribe to added and removed");

	ecs.free_entity_set(set);
	assert_eq!(subscribers(&ecs, world, ty), 0, "Freeing the set should unsubscribe");
	assert_eq!(ecs.bus.world_disposed.len(), 1, "Only the component type should remain subscribed");

	ecs.set(e[0], ty).unwrap();
	let set = ecs.build_entity_set(&EntitySetBuilder::new().with(&[ty]), world).unwrap();
	assert_eq!(set.index, 0, "Set indices should be reused");
	assert_eq!(ecs.entities(&set), &[e[0]], "The new set should be seeded");
}

#[test]
pub fn iterate_while_removing() {
	let (mut ecs, world, e) = setup(5);
	let ty = ecs.define_component(4, None, None);
	for entity in &e {
		ecs.set(*entity, ty).unwrap();
	}

	let set = ecs.build_entity_set(&EntitySetBuilder::new().with(&[ty]), world).unwrap();
	let mut visited = Vec::new();
	ecs.for_each_entity(&set, |ecs, entity| {
		visited.push(entity.id());
		ecs.remove_component(entity, ty).unwrap();
	});

	visited.sort_unstable();
	assert_eq!(visited, vec![0, 1, 2, 3, 4], "Every entity should be visited exactly once");
	assert_eq!(ecs.entity_set_len(&set), 0, "Every entity should have been removed");
}

#[test]
pub fn iterate_without_mutation() {
	let (mut ecs, world, e) = setup(4);
	let set = ecs.build_entity_set(&EntitySetBuilder::new(), world).unwrap();
	let mut visited = Vec::new();
	ecs.for_each_entity(&set, |_, entity| visited.push(entity));

	assert_eq!(visited, e, "Entities should be visited in dense order");
	assert_eq!(ecs.entities(&set).iter().count(), 4, "The dense slice can be iterated repeatedly");
	assert_eq!(ecs.entities(&set).iter().count(), 4, "The dense slice can be iterated repeatedly");
}

#[test]
pub fn compiled_filter() {
	let mut ecs = EcsContext::new();
	let (a, b) = (ecs.define_component(0, None, None), ecs.define_component(0, None, None));
	let filter = EntitySetBuilder::new().with(&[a]).without(&[b]).with_any(&[a, b]).compile();

	assert!(filter.with().get_flag(a.flag()), "Required flags should be compiled");
	assert!(
		filter.with().get_flag(crate::components::ComponentFlag::ALIVE),
		"Matches must be alive"
	);
	assert!(filter.without().get_flag(b.flag()), "Excluded flags should be compiled");
	assert_eq!(filter.with_any().len(), 1, "Every group should be compiled");
}

#[test]
pub fn iterate_while_destroying_ahead() {
	let (mut ecs, world, e) = setup(5);
	let set = ecs.build_entity_set(&EntitySetBuilder::new(), world).unwrap();
	let doomed = e[3];

	let mut visited = Vec::new();
	ecs.for_each_entity(&set, |ecs, entity| {
		visited.push(entity.id());
		if entity == e[0] {
			ecs.destroy_entity(doomed).unwrap();
		}
	});

	visited.sort_unstable();
	assert_eq!(visited, vec![0, 1, 2, 4], "Entities removed before their turn should be skipped");
}
