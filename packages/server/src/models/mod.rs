pub mod auth;
pub mod category;
pub mod coach;
pub mod profile;
pub mod shared;
pub mod user;
