use std::sync::Arc;

use keystone_system::Injectable;
use keystone_system::world::{Component, Pool};

#[derive(Injectable)]
struct Track<T: Component, S>
where
    S: Clone + 'static,
{
    #[pool]
    items: Option<Pool<T>>,
    #[shared]
    settings: Option<S>,
    #[inject]
    template: Option<Arc<T>>,
}

fn assert_injectable<I: Injectable>() {}

fn main() {
    assert_injectable::<Track<u8, String>>();
    let _track: Track<u8, String> = Track {
        items: None,
        settings: None,
        template: None,
    };
}
