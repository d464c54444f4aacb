//! quillpost: a small markdown blog served by axum on Postgres.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
