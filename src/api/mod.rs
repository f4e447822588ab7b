pub mod attendance;
pub mod dashboard;
pub mod employee;
pub mod leave;
pub mod message;
pub mod overtime;
pub mod project;
pub mod shift;
