pub mod auth;
pub mod files;
pub mod settings;
pub mod share;
pub mod status;
