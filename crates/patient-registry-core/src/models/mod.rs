//! Domain models for the patient registry.

mod input;
mod patient;
mod view;

pub use input::*;
pub use patient::*;
pub use view::*;
