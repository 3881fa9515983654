use keystone_system::Injectable;
use keystone_system::world::{Pool, World};

struct Health(u32);

#[derive(Injectable)]
struct Regenerate(#[world] Option<World>, #[pool] Option<Pool<Health>>, u32);

fn main() {
    let _regenerate = Regenerate(None, None, 1);
}
