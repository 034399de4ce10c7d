pub mod admin;
pub mod auth;
pub mod donations;
pub mod profile;
pub mod root;
