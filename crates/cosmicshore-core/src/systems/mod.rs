//! Systems - logic that operates on components

mod flight;

pub use flight::*;
