use keystone_system::Injectable;

#[derive(Injectable)]
struct Counter {
    #[inject]
    #[inject]
    step: Option<u32>,
}

fn main() {}
