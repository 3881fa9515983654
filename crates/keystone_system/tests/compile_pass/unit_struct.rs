use keystone_system::Injectable;
use keystone_system::system::System;

#[derive(Injectable)]
struct Noop;

#[derive(Injectable)]
struct Empty {}

impl System for Noop {}

impl System for Empty {}

fn main() {
    let _systems: Vec<Box<dyn System>> = vec![Box::new(Noop), Box::new(Empty {})];
}
