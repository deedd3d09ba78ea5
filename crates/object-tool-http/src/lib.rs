//! # object-tool-http
//!
//! The HTTP seam of the object-tool subsystem. The real server, routing,
//! and middleware live in the host web stack; these are the request and
//! response shapes this subsystem reads from and writes into.

pub mod querydict;
pub mod request;
pub mod response;

pub use querydict::QueryDict;
pub use request::{ToolRequest, ToolRequestBuilder};
pub use response::{HttpResponse, HttpResponseRedirect, JsonResponse};
