//! Tool descriptors: the resolved, immutable metadata for one object tool.
//!
//! A [`ToolDescriptor`] is a plain record — name, display text, permission
//! requirements, method constraint, display properties — plus the handler
//! it routes to. [`ToolDeclaration`] is the unresolved form developers
//! write: either an inline descriptor or the name of a tool defined
//! elsewhere (a local handler on the resource admin, or a site
//! registration).

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use object_tool_core::text::{capfirst, humanize};
use object_tool_core::ToolResult;
use object_tool_http::{HttpResponse, ToolRequest};

use crate::resource::ResourceAdmin;

/// Display properties a tool may carry into the rendered page. Anything
/// outside this list is silently dropped at descriptor construction.
pub const ALLOWED_DISPLAY_PROPERTIES: &[&str] = &["classes", "help_text", "href", "target"];

/// A response rendered from a named template with a JSON context.
///
/// The template engine itself is an external collaborator; this type only
/// carries the name and the context shape the engine receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateResponse {
    /// The template to render.
    pub template_name: String,
    /// The context handed to the template engine.
    pub context: serde_json::Map<String, serde_json::Value>,
}

impl TemplateResponse {
    /// Creates a template response with an empty context.
    pub fn new(template_name: impl Into<String>) -> Self {
        Self {
            template_name: template_name.into(),
            context: serde_json::Map::new(),
        }
    }

    /// Adds one context entry.
    #[must_use]
    pub fn with(mut self, key: &str, value: serde_json::Value) -> Self {
        self.context.insert(key.to_string(), value);
        self
    }

    /// Merges extra context entries into this response, overwriting
    /// existing keys.
    pub fn extend(&mut self, extra: serde_json::Map<String, serde_json::Value>) {
        for (key, value) in extra {
            self.context.insert(key, value);
        }
    }
}

/// What a tool handler hands back to the dispatcher.
///
/// The dispatcher normalizes this into the final response: `Done` becomes
/// a redirect to the originating page, everything else passes through.
#[derive(Debug)]
pub enum ToolOutcome {
    /// The handler finished without producing a response; redirect back to
    /// the page the tool was triggered from.
    Done,
    /// Redirect to the given URL.
    Redirect(String),
    /// Render a template (e.g. a confirmation prompt).
    Template(TemplateResponse),
    /// A complete response the handler built itself (e.g. a file download).
    Response(HttpResponse),
}

/// The handler side of an object tool.
///
/// `target` is the object the tool acts on; `None` means "act on the whole
/// resource" and its interpretation is up to the handler.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use object_tool_admin::descriptor::{ToolHandler, ToolOutcome};
/// use object_tool_admin::resource::ResourceAdmin;
/// use object_tool_core::ToolResult;
/// use object_tool_http::ToolRequest;
///
/// struct PublishNow;
///
/// #[async_trait]
/// impl ToolHandler for PublishNow {
///     async fn execute(
///         &self,
///         _admin: &ResourceAdmin,
///         request: &ToolRequest,
///         _target: Option<&serde_json::Value>,
///     ) -> ToolResult<ToolOutcome> {
///         request.messages().success("Published.");
///         Ok(ToolOutcome::Done)
///     }
/// }
/// ```
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Runs the tool.
    ///
    /// # Errors
    ///
    /// Handler errors propagate to the framework's standard error handling;
    /// the dispatcher performs no retry or recovery.
    async fn execute(
        &self,
        admin: &ResourceAdmin,
        request: &ToolRequest,
        target: Option<&serde_json::Value>,
    ) -> ToolResult<ToolOutcome>;
}

/// Adapter lifting a plain synchronous closure into a [`ToolHandler`].
pub struct FnTool<F>(F);

impl<F> FnTool<F>
where
    F: Fn(&ResourceAdmin, &ToolRequest, Option<&serde_json::Value>) -> ToolResult<ToolOutcome>
        + Send
        + Sync,
{
    /// Wraps the closure.
    pub const fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> ToolHandler for FnTool<F>
where
    F: Fn(&ResourceAdmin, &ToolRequest, Option<&serde_json::Value>) -> ToolResult<ToolOutcome>
        + Send
        + Sync,
{
    async fn execute(
        &self,
        admin: &ResourceAdmin,
        request: &ToolRequest,
        target: Option<&serde_json::Value>,
    ) -> ToolResult<ToolOutcome> {
        (self.0)(admin, request, target)
    }
}

/// Resolved metadata plus handler for one object tool.
///
/// Descriptors are immutable once built; the collector clones them freely
/// into per-request tool sets.
///
/// # Examples
///
/// ```
/// use object_tool_admin::descriptor::{ToolDescriptor, ToolOutcome};
///
/// let tool = ToolDescriptor::from_fn("make_handsome", |_, _, _| Ok(ToolOutcome::Done))
///     .allowed_permissions(vec!["change"])
///     .display_prop("help_text", "change handsome property to True");
///
/// assert_eq!(tool.short_description, "Make handsome");
/// assert!(!tool.allow_get);
/// ```
#[derive(Clone)]
pub struct ToolDescriptor {
    /// The tool name, unique within any merged tool set.
    pub name: String,
    /// Display text shown on the rendered button or link.
    pub short_description: String,
    /// Permission-check names; empty means always allowed, otherwise the
    /// actor must satisfy at least one (logical OR).
    pub allowed_permissions: Vec<String>,
    /// Whether the tool may be invoked via a safe (GET/HEAD) request.
    pub allow_get: bool,
    /// Extra display properties, filtered to
    /// [`ALLOWED_DISPLAY_PROPERTIES`].
    pub display: BTreeMap<String, String>,
    /// The handler invoked on dispatch.
    pub handler: Arc<dyn ToolHandler>,
}

impl ToolDescriptor {
    /// Creates a descriptor with the default display text derived from the
    /// name (`"make_handsome"` becomes `"Make handsome"`).
    pub fn new(name: &str, handler: Arc<dyn ToolHandler>) -> Self {
        Self {
            name: name.to_string(),
            short_description: default_description(name),
            allowed_permissions: Vec::new(),
            allow_get: false,
            display: BTreeMap::new(),
            handler,
        }
    }

    /// Creates a descriptor from a plain synchronous closure.
    pub fn from_fn<F>(name: &str, f: F) -> Self
    where
        F: Fn(&ResourceAdmin, &ToolRequest, Option<&serde_json::Value>) -> ToolResult<ToolOutcome>
            + Send
            + Sync
            + 'static,
    {
        Self::new(name, Arc::new(FnTool::new(f)))
    }

    /// Sets the display text.
    #[must_use]
    pub fn short_description(mut self, text: &str) -> Self {
        self.short_description = text.to_string();
        self
    }

    /// Sets the permission-check names.
    #[must_use]
    pub fn allowed_permissions(mut self, permissions: Vec<&str>) -> Self {
        self.allowed_permissions = permissions.into_iter().map(String::from).collect();
        self
    }

    /// Allows invocation via safe (GET/HEAD) requests.
    #[must_use]
    pub const fn allow_get(mut self, allowed: bool) -> Self {
        self.allow_get = allowed;
        self
    }

    /// Attaches a display property. Keys outside
    /// [`ALLOWED_DISPLAY_PROPERTIES`] are dropped.
    #[must_use]
    pub fn display_prop(mut self, key: &str, value: &str) -> Self {
        if ALLOWED_DISPLAY_PROPERTIES.contains(&key) {
            self.display.insert(key.to_string(), value.to_string());
        }
        self
    }

    /// Returns a copy registered under a different name. A defaulted
    /// display text is re-derived from the new name; an explicit one is
    /// kept.
    pub fn with_name(&self, name: &str) -> Self {
        let mut tool = self.clone();
        if tool.short_description == default_description(&tool.name) {
            tool.short_description = default_description(name);
        }
        tool.name = name.to_string();
        tool
    }

    /// Returns the render-context bundle for this tool: its name, display
    /// text, and allowed display properties.
    pub fn display_context(&self) -> serde_json::Value {
        let mut bundle = serde_json::Map::new();
        bundle.insert("name".to_string(), serde_json::json!(self.name));
        bundle.insert(
            "short_description".to_string(),
            serde_json::json!(self.short_description),
        );
        for (key, value) in &self.display {
            bundle.insert(key.clone(), serde_json::json!(value));
        }
        serde_json::Value::Object(bundle)
    }
}

impl std::fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("short_description", &self.short_description)
            .field("allowed_permissions", &self.allowed_permissions)
            .field("allow_get", &self.allow_get)
            .field("display", &self.display)
            .finish_non_exhaustive()
    }
}

/// An unresolved tool reference as written by a developer.
///
/// Resolution happens freshly on every request: inline declarations are
/// used as-is, named ones are looked up on the resource admin first, then
/// in the site registry.
#[derive(Debug, Clone)]
pub enum ToolDeclaration {
    /// A fully specified tool.
    Inline(ToolDescriptor),
    /// The name of a tool defined elsewhere.
    Named(String),
}

impl From<ToolDescriptor> for ToolDeclaration {
    fn from(tool: ToolDescriptor) -> Self {
        Self::Inline(tool)
    }
}

impl From<&str> for ToolDeclaration {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

fn default_description(name: &str) -> String {
    capfirst(&humanize(name))
}
