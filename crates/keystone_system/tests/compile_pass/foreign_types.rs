use std::sync::Arc;

use keystone_system::Injectable;
use keystone_system::world::{Pool, World};

mod conn {
    pub struct Pool<T>(pub T);

    pub struct World;
}

struct Postgres;

type Positions = Option<Pool<f32>>;

#[derive(Injectable)]
struct Persist {
    connections: Option<conn::Pool<Postgres>>,
    scene: Option<conn::World>,
    #[inject]
    shared_scene: Option<Arc<conn::World>>,
    #[world]
    world: Option<World>,
    positions: Positions,
}

fn assert_injectable<I: Injectable>() {}

fn main() {
    assert_injectable::<Persist>();
    let _persist = Persist {
        connections: None,
        scene: None,
        shared_scene: None,
        world: None,
        positions: None,
    };
}
