use bytemuck::{Pod, Zeroable};
use criterion::*;
use sparse_ecs::prelude::*;

const COUNT: usize = 10000;

#[derive(Copy, Clone, Default, Pod, Zeroable, Component)]
#[repr(C)]
struct Translation([f32; 3]);

#[derive(Copy, Clone, Default, Pod, Zeroable, Component)]
#[repr(C)]
struct Velocity([f32; 3]);

#[derive(Copy, Clone, Default, Pod, Zeroable, Component)]
#[repr(C)]
struct Frozen(u32);

fn populate(ecs: &mut EcsContext, world: WorldId) -> (Vec<Entity>, TypedComponent<Translation>) {
    let translation = ecs.define::<Translation>();
    let velocity = ecs.define::<Velocity>();
    let entities: Vec<_> = (0..COUNT)
        .map(|i| {
            let entity = ecs.create_entity(world).unwrap();
            ecs.insert(entity, translation, Translation::default()).unwrap();
            ecs.insert(entity, velocity, Velocity([i as f32, 1.0, 0.0])).unwrap();
            entity
        })
        .collect();
    (entities, translation)
}

fn create_entities(c: &mut Criterion) {
    c.bench_function("Create entities", |b| {
        b.iter_batched(
            || {
                let mut ecs = EcsContext::with_config(EcsConfig::default().with_entity_capacity(COUNT));
                let world = ecs.create_world();
                (ecs, world)
            },
            |(mut ecs, world)| {
                for _ in 0..COUNT {
                    ecs.create_entity(world).unwrap();
                }
                ecs
            },
            BatchSize::PerIteration,
        );
    });
}

fn component_churn(c: &mut Criterion) {
    c.bench_function("Set and remove components", |b| {
        b.iter_batched(
            || {
                let mut ecs = EcsContext::new();
                let world = ecs.create_world();
                let (entities, _) = populate(&mut ecs, world);
                let frozen = ecs.define::<Frozen>();
                (ecs, entities, frozen)
            },
            |(mut ecs, entities, frozen)| {
                for entity in &entities {
                    ecs.set(*entity, *frozen).unwrap();
                }
                for entity in &entities {
                    ecs.remove_component(*entity, *frozen).unwrap();
                }
                ecs
            },
            BatchSize::PerIteration,
        );
    });
}

fn entity_set_maintenance(c: &mut Criterion) {
    c.bench_function("Maintain entity sets", |b| {
        b.iter_batched(
            || {
                let mut ecs = EcsContext::new();
                let world = ecs.create_world();
                let (entities, _) = populate(&mut ecs, world);
                let frozen = ecs.define::<Frozen>();
                let moving = EntitySetBuilder::new().without(&[*frozen]);
                let still = EntitySetBuilder::new().with(&[*frozen]);
                let sets = [
                    ecs.build_entity_set(&moving, world).unwrap(),
                    ecs.build_entity_set(&still, world).unwrap(),
                ];
                (ecs, entities, frozen, sets)
            },
            |(mut ecs, entities, frozen, sets)| {
                for entity in entities.iter().step_by(2) {
                    ecs.set(*entity, *frozen).unwrap();
                }
                for entity in entities.iter().step_by(3) {
                    ecs.disable_entity(*entity).unwrap();
                }
                (ecs, sets)
            },
            BatchSize::PerIteration,
        );
    });
}

fn iterate_components(c: &mut Criterion) {
    let mut group = c.benchmark_group("Iterate components");
    group.bench_function("Single-threaded", |b| {
        let mut ecs = EcsContext::new();
        let world = ecs.create_world();
        let (_, translation) = populate(&mut ecs, world);

        b.iter(|| {
            for t in ecs.all_mut(world, translation).unwrap() {
                t.0[0] += 1.0;
            }
        });
    });

    group.bench_function("Multi-threaded", |b| {
        let mut ecs = EcsContext::new();
        let world = ecs.create_world();
        let (_, translation) = populate(&mut ecs, world);

        b.iter(|| {
            ecs.par_for_each_mut(world, translation, |t| t.0[0] += 1.0)
                .unwrap()
        });
    });
}

criterion_group!(
    benchmarks,
    create_entities,
    component_churn,
    entity_set_maintenance,
    iterate_components,
);
criterion_main!(benchmarks);
