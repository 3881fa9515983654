use keystone_system::Injectable;

#[derive(Injectable)]
enum Phase {
    Startup,
    Running,
}

fn main() {}
