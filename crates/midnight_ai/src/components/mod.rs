//! ECS Components для участников гонки
//!
//! Организация по доменам:
//! - vehicle: тело, характеристики, входы управления, прогресс по трассе

pub mod vehicle;

// Re-exports для удобного импорта
pub use vehicle::*;
