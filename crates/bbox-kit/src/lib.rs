pub mod context;
pub mod errors;
pub mod helpers;

pub use context::Context;

pub extern crate crossbeam_channel as channel;

pub use error_stack;
pub use futures;
pub use hex;
pub use hiro_system_kit;
pub use num_bigint;
pub use reqwest;
pub use serde_json;
