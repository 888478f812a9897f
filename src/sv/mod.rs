pub mod daily;
pub mod insight;
pub mod profile;
pub mod settings;
pub mod strength;
pub mod user;
pub mod workout;

#[cfg(test)]
pub mod testing;

pub use daily::{Daily, DailyPatch};
pub use insight::Insight;
pub use profile::Profile;
pub use settings::{Settings, SettingsPatch};
pub use strength::{NewLift, Strength};
pub use user::User;
pub use workout::{NewWorkout, Workout};
