//! The publishing pipeline: slug derivation and field rules on write,
//! markdown rendering on read-for-display.

mod commands;
mod queries;
mod service;
pub mod types;

pub use service::*;
pub use types::{CreatePostCommand, PostError, ReadAccess, RenderedPost, UpdatePostCommand};
