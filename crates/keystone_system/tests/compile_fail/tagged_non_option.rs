use std::sync::Arc;

use keystone_system::Injectable;

struct Config;

#[derive(Injectable)]
struct Render {
    #[shared]
    config: Arc<Config>,
}

fn main() {}
