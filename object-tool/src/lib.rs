//! # object-tool
//!
//! Custom object tools for admin panels: attach actions to a resource's
//! list and detail views beyond the built-in bulk actions.
//!
//! This is the meta-crate re-exporting the member crates. Depend on
//! `object-tool` for everything, or on individual crates for
//! finer-grained control.

/// Core types: errors, settings, logging, messages, text utilities.
pub use object_tool_core as core;

/// The HTTP seam: request, response, and query dictionary types.
pub use object_tool_http as http;

/// Form-collection support for form tools.
pub use object_tool_forms as forms;

/// Tool registration, collection, dispatch, and shortcut builders.
pub use object_tool_admin as admin;
