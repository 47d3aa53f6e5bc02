//! AI systems (ECS обвязка вокруг RacerController)

pub mod events;
pub mod reactions;
pub mod tick;

// Re-export all systems
pub use events::*;
pub use reactions::*;
pub use tick::*;
