//! Ready-made handlers for the three common tool shapes.
//!
//! - [`link`]: a side-effect-free redirect rendered as a plain anchor.
//! - [`ConfirmTool`] / [`confirm`]: an action gated behind a confirmation
//!   page.
//! - [`FormTool`] / [`form_tool`]: an action that collects and validates a
//!   form before running.
//!
//! Confirmation and form tools share one rendering contract: the template
//! receives the action name, the target object (if any), the tool's
//! display bundle, and the origin URL to return to afterwards.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use http::Method;

use object_tool_core::text::{capfirst, humanize};
use object_tool_core::{Settings, ToolResult};
use object_tool_forms::Form;
use object_tool_http::ToolRequest;

use crate::descriptor::{
    TemplateResponse, ToolDescriptor, ToolHandler, ToolOutcome, ALLOWED_DISPLAY_PROPERTIES,
};
use crate::resource::ResourceAdmin;
use crate::store::object_repr;

/// The template confirmation and form tools render into by default.
pub const DEFAULT_CONFIRM_TEMPLATE: &str = "admin/object_tool/form.html";

/// Builds a link tool: a redirect to a fixed URL, safe to trigger via GET,
/// carrying `href` so the UI can render a plain anchor instead of a
/// submit button.
///
/// # Examples
///
/// ```
/// use object_tool_admin::shortcuts::link;
///
/// let forkme = link("forkme", "https://example.com/repo", "Fork me on github")
///     .display_prop("classes", "viewsitelink")
///     .display_prop("target", "_blank");
/// assert!(forkme.allow_get);
/// assert_eq!(forkme.display.get("href").map(String::as_str), Some("https://example.com/repo"));
/// ```
pub fn link(name: &str, url: &str, short_description: &str) -> ToolDescriptor {
    let target = url.to_string();
    ToolDescriptor::from_fn(name, move |_, _, _| Ok(ToolOutcome::Redirect(target.clone())))
        .short_description(short_description)
        .allow_get(true)
        .display_prop("href", url)
}

/// Builds a confirmation tool with default settings around `handler`.
pub fn confirm(name: &str, confirm_text: &str, handler: Arc<dyn ToolHandler>) -> ToolDescriptor {
    ConfirmTool::new(name, confirm_text, handler).into_descriptor()
}

/// Builds a form tool with default settings around `handler`.
pub fn form_tool<F>(name: &str, form_factory: F, handler: Arc<dyn FormToolHandler>) -> ToolDescriptor
where
    F: Fn() -> Box<dyn Form> + Send + Sync + 'static,
{
    FormTool::new(name, form_factory, handler).into_descriptor()
}

/// An action gated behind a confirmation page.
///
/// A plain request renders the confirmation template with the interpolated
/// confirmation message; a POST carrying the confirm field invokes the
/// wrapped handler.
pub struct ConfirmTool {
    name: String,
    title: String,
    confirm_text: String,
    template: String,
    confirm_field: String,
    origin_field: String,
    display: BTreeMap<String, String>,
    handler: Arc<dyn ToolHandler>,
}

impl ConfirmTool {
    /// Creates a confirmation tool. `confirm_text` may contain `{obj}`,
    /// replaced with the target's display representation at render time.
    pub fn new(name: &str, confirm_text: &str, handler: Arc<dyn ToolHandler>) -> Self {
        let settings = Settings::default();
        Self {
            name: name.to_string(),
            title: capfirst(&humanize(name)),
            confirm_text: confirm_text.to_string(),
            template: DEFAULT_CONFIRM_TEMPLATE.to_string(),
            confirm_field: settings.confirm_field,
            origin_field: settings.origin_field,
            display: BTreeMap::new(),
            handler,
        }
    }

    /// Sets the display text (also used as the confirmation page title).
    #[must_use]
    pub fn short_description(mut self, text: &str) -> Self {
        self.title = text.to_string();
        self
    }

    /// Overrides the confirmation template.
    #[must_use]
    pub fn template(mut self, template: &str) -> Self {
        self.template = template.to_string();
        self
    }

    /// Overrides the confirm payload field name.
    #[must_use]
    pub fn confirm_field(mut self, field: &str) -> Self {
        self.confirm_field = field.to_string();
        self
    }

    /// Overrides the origin payload field name.
    #[must_use]
    pub fn origin_field(mut self, field: &str) -> Self {
        self.origin_field = field.to_string();
        self
    }

    /// Attaches a display property (filtered to the allow-list).
    #[must_use]
    pub fn display_prop(mut self, key: &str, value: &str) -> Self {
        if ALLOWED_DISPLAY_PROPERTIES.contains(&key) {
            self.display.insert(key.to_string(), value.to_string());
        }
        self
    }

    /// Wraps this tool into its descriptor.
    pub fn into_descriptor(self) -> ToolDescriptor {
        let name = self.name.clone();
        let title = self.title.clone();
        let display = self.display.clone();
        let mut descriptor = ToolDescriptor::new(&name, Arc::new(self))
            .short_description(&title)
            .allow_get(true);
        for (key, value) in &display {
            descriptor = descriptor.display_prop(key, value);
        }
        descriptor
    }
}

#[async_trait]
impl ToolHandler for ConfirmTool {
    async fn execute(
        &self,
        admin: &ResourceAdmin,
        request: &ToolRequest,
        target: Option<&serde_json::Value>,
    ) -> ToolResult<ToolOutcome> {
        if is_confirmed(request, &self.confirm_field) {
            return self.handler.execute(admin, request, target).await;
        }

        let text = self
            .confirm_text
            .replace("{obj}", &target.map(object_repr).unwrap_or_default());
        Ok(ToolOutcome::Template(confirm_context(
            &self.template,
            &self.name,
            &self.title,
            &text,
            None,
            target,
            &self.display,
            request,
            &self.origin_field,
        )))
    }
}

impl std::fmt::Debug for ConfirmTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmTool")
            .field("name", &self.name)
            .field("template", &self.template)
            .field("confirm_field", &self.confirm_field)
            .finish_non_exhaustive()
    }
}

/// The handler side of a form tool, receiving the validated form.
#[async_trait]
pub trait FormToolHandler: Send + Sync {
    /// Runs the tool with the bound, validated form.
    ///
    /// # Errors
    ///
    /// Handler errors propagate to the framework's standard error handling.
    async fn execute(
        &self,
        admin: &ResourceAdmin,
        request: &ToolRequest,
        form: &dyn Form,
        target: Option<&serde_json::Value>,
    ) -> ToolResult<ToolOutcome>;
}

/// Adapter lifting a plain synchronous closure into a [`FormToolHandler`].
pub struct FnFormTool<F>(F);

impl<F> FnFormTool<F>
where
    F: Fn(
            &ResourceAdmin,
            &ToolRequest,
            &dyn Form,
            Option<&serde_json::Value>,
        ) -> ToolResult<ToolOutcome>
        + Send
        + Sync,
{
    /// Wraps the closure.
    pub const fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> FormToolHandler for FnFormTool<F>
where
    F: Fn(
            &ResourceAdmin,
            &ToolRequest,
            &dyn Form,
            Option<&serde_json::Value>,
        ) -> ToolResult<ToolOutcome>
        + Send
        + Sync,
{
    async fn execute(
        &self,
        admin: &ResourceAdmin,
        request: &ToolRequest,
        form: &dyn Form,
        target: Option<&serde_json::Value>,
    ) -> ToolResult<ToolOutcome> {
        (self.0)(admin, request, form, target)
    }
}

/// An action that collects a form before running.
///
/// A plain request renders a fresh unbound form; a confirmed submission
/// binds and validates the payload, invoking the wrapped handler only when
/// the form is valid and re-rendering with field errors otherwise.
pub struct FormTool {
    name: String,
    title: String,
    confirm_text: String,
    template: String,
    confirm_field: String,
    origin_field: String,
    display: BTreeMap<String, String>,
    form_factory: Arc<dyn Fn() -> Box<dyn Form> + Send + Sync>,
    handler: Arc<dyn FormToolHandler>,
}

impl FormTool {
    /// Creates a form tool. `form_factory` must return a fresh, unbound
    /// form on every call.
    pub fn new<F>(name: &str, form_factory: F, handler: Arc<dyn FormToolHandler>) -> Self
    where
        F: Fn() -> Box<dyn Form> + Send + Sync + 'static,
    {
        let settings = Settings::default();
        Self {
            name: name.to_string(),
            title: capfirst(&humanize(name)),
            confirm_text: String::new(),
            template: DEFAULT_CONFIRM_TEMPLATE.to_string(),
            confirm_field: settings.confirm_field,
            origin_field: settings.origin_field,
            display: BTreeMap::new(),
            form_factory: Arc::new(form_factory),
            handler,
        }
    }

    /// Sets the display text (also used as the form page title).
    #[must_use]
    pub fn short_description(mut self, text: &str) -> Self {
        self.title = text.to_string();
        self
    }

    /// Sets an additional confirmation message shown above the form.
    #[must_use]
    pub fn confirm_text(mut self, text: &str) -> Self {
        self.confirm_text = text.to_string();
        self
    }

    /// Overrides the form template.
    #[must_use]
    pub fn template(mut self, template: &str) -> Self {
        self.template = template.to_string();
        self
    }

    /// Overrides the confirm payload field name.
    #[must_use]
    pub fn confirm_field(mut self, field: &str) -> Self {
        self.confirm_field = field.to_string();
        self
    }

    /// Overrides the origin payload field name.
    #[must_use]
    pub fn origin_field(mut self, field: &str) -> Self {
        self.origin_field = field.to_string();
        self
    }

    /// Attaches a display property (filtered to the allow-list).
    #[must_use]
    pub fn display_prop(mut self, key: &str, value: &str) -> Self {
        if ALLOWED_DISPLAY_PROPERTIES.contains(&key) {
            self.display.insert(key.to_string(), value.to_string());
        }
        self
    }

    /// Wraps this tool into its descriptor.
    pub fn into_descriptor(self) -> ToolDescriptor {
        let name = self.name.clone();
        let title = self.title.clone();
        let display = self.display.clone();
        let mut descriptor = ToolDescriptor::new(&name, Arc::new(self))
            .short_description(&title)
            .allow_get(true);
        for (key, value) in &display {
            descriptor = descriptor.display_prop(key, value);
        }
        descriptor
    }

    fn render(
        &self,
        form: &dyn Form,
        target: Option<&serde_json::Value>,
        request: &ToolRequest,
    ) -> ToolOutcome {
        let text = self
            .confirm_text
            .replace("{obj}", &target.map(object_repr).unwrap_or_default());
        ToolOutcome::Template(confirm_context(
            &self.template,
            &self.name,
            &self.title,
            &text,
            Some(form),
            target,
            &self.display,
            request,
            &self.origin_field,
        ))
    }
}

#[async_trait]
impl ToolHandler for FormTool {
    async fn execute(
        &self,
        admin: &ResourceAdmin,
        request: &ToolRequest,
        target: Option<&serde_json::Value>,
    ) -> ToolResult<ToolOutcome> {
        if is_confirmed(request, &self.confirm_field) {
            let mut form = (self.form_factory)();
            form.bind(request.post());
            if form.is_valid().await {
                return self.handler.execute(admin, request, form.as_ref(), target).await;
            }
            return Ok(self.render(form.as_ref(), target, request));
        }

        let form = (self.form_factory)();
        Ok(self.render(form.as_ref(), target, request))
    }
}

impl std::fmt::Debug for FormTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormTool")
            .field("name", &self.name)
            .field("template", &self.template)
            .field("confirm_field", &self.confirm_field)
            .finish_non_exhaustive()
    }
}

/// A submission counts as confirmed when it is a POST carrying a non-empty
/// confirm field.
fn is_confirmed(request: &ToolRequest, confirm_field: &str) -> bool {
    request.method() == Method::POST
        && request
            .post()
            .get(confirm_field)
            .is_some_and(|v| !v.is_empty())
}

/// Builds the shared confirmation/form template response.
#[allow(clippy::too_many_arguments)]
fn confirm_context(
    template: &str,
    action: &str,
    title: &str,
    confirm_text: &str,
    form: Option<&dyn Form>,
    target: Option<&serde_json::Value>,
    display: &BTreeMap<String, String>,
    request: &ToolRequest,
    origin_field: &str,
) -> TemplateResponse {
    let origin = request
        .post()
        .get(origin_field)
        .map(String::from)
        .or_else(|| request.meta().get("HTTP_REFERER").cloned())
        .unwrap_or_else(|| request.get_full_path());

    let mut bundle = serde_json::Map::new();
    bundle.insert("name".to_string(), serde_json::json!(action));
    bundle.insert("short_description".to_string(), serde_json::json!(title));
    for (key, value) in display {
        bundle.insert(key.clone(), serde_json::json!(value));
    }

    TemplateResponse::new(template)
        .with("action", serde_json::json!(action))
        .with("title", serde_json::json!(title))
        .with("confirm_text", serde_json::json!(confirm_text))
        .with(
            "form",
            form.map_or(serde_json::Value::Null, Form::as_context),
        )
        .with(
            "object",
            target.cloned().unwrap_or(serde_json::Value::Null),
        )
        .with(
            "object_id",
            target
                .and_then(|t| t.get("id"))
                .cloned()
                .unwrap_or(serde_json::Value::Null),
        )
        .with("object_tool", serde_json::Value::Object(bundle))
        .with("origin", serde_json::json!(origin))
}
