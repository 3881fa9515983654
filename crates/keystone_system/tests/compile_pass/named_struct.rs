use std::sync::Arc;

use keystone_system::Injectable;
use keystone_system::world::{Pool, World};

struct Sprite;

struct Config;

trait Log: Send + Sync {}

/// Renders sprites.
#[derive(Injectable)]
struct Render {
    #[world("ui")]
    ui: Option<World>,
    #[world]
    main: Option<World>,
    #[pool]
    sprites: Option<Pool<Sprite>>,
    #[pool("ui")]
    ui_sprites: Option<Pool<Sprite>>,
    #[shared]
    config: Option<Arc<Config>>,
    #[inject]
    log: Option<Arc<dyn Log>>,
    #[inject]
    #[shared]
    either: Option<Arc<Config>>,
    /// Plain fields are never written.
    frames: u64,
    r#type: Option<String>,
}

fn main() {
    let _render = Render {
        ui: None,
        main: None,
        sprites: None,
        ui_sprites: None,
        config: None,
        log: None,
        either: None,
        frames: 0,
        r#type: None,
    };
}
