pub mod attendance;
pub mod employee;
pub mod leave;
pub mod message;
pub mod overtime;
pub mod project;
pub mod role;
pub mod shift;
