pub mod types;
pub mod queries;
pub mod lost;

pub use types::*;
