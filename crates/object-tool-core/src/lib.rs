//! # object-tool-core
//!
//! Core types shared by the object-tool crates: the error taxonomy,
//! configuration, logging setup, one-time notification messages, and
//! small text utilities.

pub mod error;
pub mod logging;
pub mod messages;
pub mod settings;
pub mod text;

pub use error::{ObjectToolError, ToolResult};
pub use settings::Settings;
