pub mod auth;
pub mod content;
