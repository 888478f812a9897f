//! SeaORM entity definitions

pub mod daily_record;
pub mod intake;
pub mod profile;
pub mod settings;
pub mod strength;
pub mod targets;
pub mod user;
pub mod workout;

pub use profile::{ActivityLevel, Gender, Goal, GoalSpeed};
