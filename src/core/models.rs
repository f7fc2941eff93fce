pub mod application;
pub mod membership;
pub mod project;
pub mod user;
