pub mod cv;
pub mod normalize;
pub mod tagged;

pub mod clarity {
    #![allow(ambiguous_glob_reexports)]
    pub use ::clarity::vm::types::*;
    pub use ::clarity::vm::*;
}

pub use normalize::{normalize, ClarityResult, NormalizedValue};
