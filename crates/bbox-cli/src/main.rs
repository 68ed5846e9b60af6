#[macro_use]
extern crate hiro_system_kit;

#[macro_use]
extern crate serde_derive;

pub mod cli;

fn main() {
    cli::main();
}
