//! # object-tool-admin
//!
//! Custom object tools for admin panels: attach user-triggerable actions
//! to a resource's list and detail views beyond the built-in bulk actions.
//!
//! Tools are declared per resource (inline or by name), registered
//! site-wide, collected per request with permission filtering and
//! first-wins name deduplication, and dispatched back to their handlers.
//! Shortcut builders cover the three common shapes: plain links,
//! confirmation-gated actions, and form-collecting actions.

pub mod actor;
pub mod collect;
pub mod descriptor;
pub mod dispatch;
pub mod registry;
pub mod resource;
pub mod routes;
pub mod shortcuts;
pub mod site;
pub mod store;

pub use actor::Actor;
pub use collect::{collect_tools, ToolSet};
pub use descriptor::{
    TemplateResponse, ToolDeclaration, ToolDescriptor, ToolHandler, ToolOutcome,
};
pub use dispatch::ToolResponse;
pub use registry::{ToolRegistry, ViewScope};
pub use resource::{ResourceAdmin, ToolProvider};
pub use site::AdminSite;
pub use store::{InMemoryObjectStore, ObjectStore};
