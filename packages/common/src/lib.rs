pub mod profile_type;
pub mod role;

pub use profile_type::ProfileType;
pub use role::{ParseRoleError, UserRole};
