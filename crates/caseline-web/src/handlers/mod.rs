pub mod auth;
pub mod index;
pub mod outputs;
pub mod process;
pub mod projects;
