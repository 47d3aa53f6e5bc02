//! AI components

pub mod perception;
pub mod profile;
pub mod state;
pub mod steering;
pub mod temperament;
pub mod tuning;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod perception_tests;
#[cfg(test)]
mod profile_tests;
#[cfg(test)]
mod steering_tests;

// Re-export all components
pub use perception::*;
pub use profile::*;
pub use state::*;
pub use steering::*;
pub use temperament::*;
pub use tuning::*;
