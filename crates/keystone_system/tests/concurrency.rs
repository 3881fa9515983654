//! Concurrency tests for worlds, pools and the per-thread default injector.

use std::sync::Arc;
use std::thread;

use keystone_system::inject::{ComponentType, with_default_injector};
use keystone_system::prelude::*;

struct Score(u32);

#[derive(Injectable, Default)]
struct Scorer {
    #[pool]
    scores: Option<Pool<Score>>,
}

impl System for Scorer {}

#[test]
fn pool_handles_share_storage_across_threads() {
    let world = World::new();
    let entities: Vec<Entity> = (0..8).map(|_| world.spawn()).collect();
    let scores = world.pool::<Score>();
    for entity in &entities {
        scores.add(*entity, Score(0)).unwrap();
    }

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let world = world.clone();
            let entities = entities.clone();
            thread::spawn(move || {
                let scores = world.pool::<Score>();
                for _ in 0..100 {
                    for entity in &entities {
                        if let Some(mut score) = scores.get_mut(*entity) {
                            score.0 += 1;
                        }
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for entity in &entities {
        assert_eq!(scores.get(*entity).unwrap().0, 400);
    }
}

#[test]
fn concurrent_pool_creation_yields_one_pool() {
    let world = World::new();

    let pools: Vec<Pool<Score>> = (0..8)
        .map(|_| {
            let world = world.clone();
            thread::spawn(move || world.pool::<Score>())
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    assert_eq!(world.pool_count(), 1);
    assert!(pools.iter().all(|pool| pool.ptr_eq(&pools[0])));
}

#[test]
fn default_injectors_are_per_thread() {
    let world = World::new();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let world = world.clone();
            thread::spawn(move || {
                let mut systems = Systems::new(world);
                systems.add(Scorer::default());
                systems.inject(()).unwrap();

                let injected = systems.system::<Scorer>().unwrap().scores.clone();
                let resolutions = with_default_injector(|injector| injector.cache().resolutions());
                (injected, resolutions)
            })
        })
        .collect();

    for handle in handles {
        let (injected, resolutions) = handle.join().unwrap();
        assert!(injected.unwrap().ptr_eq(&world.pool::<Score>()));
        assert_eq!(resolutions, 1);
    }

    let score = ComponentType::of::<Score>();
    assert!(!with_default_injector(|injector| injector.cache().contains(&score)));
}

#[test]
fn systems_container_moves_between_threads() {
    let shared = Arc::new(String::from("config"));
    let mut systems = Systems::new(World::new()).with_shared(Arc::clone(&shared));
    systems.add(Scorer::default());

    let systems = thread::spawn(move || {
        systems.inject(()).unwrap().init().unwrap();
        systems.run().unwrap();
        systems
    })
    .join()
    .unwrap();

    assert!(systems.is_initialized());
    assert!(systems.system::<Scorer>().unwrap().scores.is_some());
    assert_eq!(Arc::strong_count(&shared), 2);
}
