pub mod category;
pub mod coach_profile;
pub mod coach_profile_category;
pub mod player_profile;
pub mod profile;
pub mod user;
