//! Application services layer.

pub mod auth;
pub mod bootstrap;
pub mod error;
pub mod posts;
pub mod render;
pub mod repos;
