//! Domain models for the clinic record store.

mod patient;
mod validation;

pub use patient::*;
pub use validation::*;
