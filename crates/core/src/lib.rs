// crates/core/src/lib.rs
pub mod result;
pub mod sample;

pub use result::*;
pub use sample::*;
