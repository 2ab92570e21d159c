pub mod auth;
pub mod directory;
pub mod gateway;
pub mod scope;
