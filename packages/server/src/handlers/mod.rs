pub mod auth;
pub mod categories;
pub mod coaches;
pub mod profiles;
pub mod users;
