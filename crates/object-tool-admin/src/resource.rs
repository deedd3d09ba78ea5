//! Resource-admin configuration: the component object tools attach to.
//!
//! [`ResourceAdmin`] describes one admin-managed resource. Tool
//! declarations hang off an explicit ordered list of [`ToolProvider`]
//! records walked base-first at collection time — the structured
//! replacement for accumulating class attributes over an inheritance
//! chain. Named declarations resolve against the admin's local handler
//! table before falling back to the site registry.

use std::collections::HashMap;
use std::sync::Arc;

use object_tool_http::ToolRequest;

use crate::actor::Actor;
use crate::descriptor::{ToolDeclaration, ToolDescriptor};
use crate::registry::ViewScope;

/// A named permission predicate supplied by the host authorization layer.
pub type PermissionCheck = dyn Fn(&Actor, &ToolRequest) -> bool + Send + Sync;

/// One bundle of tool declarations contributed to a resource admin.
///
/// Providers are ordered: earlier (base) providers take precedence over
/// later (derived) ones when names collide, because collection walks them
/// first.
///
/// # Examples
///
/// ```
/// use object_tool_admin::resource::ToolProvider;
/// use object_tool_admin::shortcuts::link;
///
/// let provider = ToolProvider::new("UserAdmin")
///     .object_tool("make_handsome")
///     .changelist_tool(link("forkme", "https://example.com", "Fork me"));
/// assert_eq!(provider.label, "UserAdmin");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ToolProvider {
    /// A diagnostic label for this provider (e.g. the defining type's name).
    pub label: String,
    /// Declarations applying to every view.
    pub object_tools: Vec<ToolDeclaration>,
    /// Declarations applying to the list view only.
    pub changelist_tools: Vec<ToolDeclaration>,
    /// Declarations applying to the detail view only.
    pub change_tools: Vec<ToolDeclaration>,
}

impl ToolProvider {
    /// Creates an empty provider with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Declares a tool for every view.
    #[must_use]
    pub fn object_tool(mut self, declaration: impl Into<ToolDeclaration>) -> Self {
        self.object_tools.push(declaration.into());
        self
    }

    /// Declares a tool for the list view only.
    #[must_use]
    pub fn changelist_tool(mut self, declaration: impl Into<ToolDeclaration>) -> Self {
        self.changelist_tools.push(declaration.into());
        self
    }

    /// Declares a tool for the detail view only.
    #[must_use]
    pub fn change_tool(mut self, declaration: impl Into<ToolDeclaration>) -> Self {
        self.change_tools.push(declaration.into());
        self
    }

    /// Returns this provider's declarations for the given view: the
    /// all-views list first, then the view-specific list.
    pub fn tools_for(&self, view: ViewScope) -> impl Iterator<Item = &ToolDeclaration> {
        let scoped: &[ToolDeclaration] = match view {
            ViewScope::ChangeList => &self.changelist_tools,
            ViewScope::Change => &self.change_tools,
            ViewScope::Global => &[],
        };
        self.object_tools.iter().chain(scoped.iter())
    }
}

/// Configuration for one admin-managed resource.
///
/// # Examples
///
/// ```
/// use object_tool_admin::resource::{ResourceAdmin, ToolProvider};
///
/// let admin = ResourceAdmin::new("blog", "article")
///     .provider(ToolProvider::new("ArticleAdmin").object_tool("publish_now"));
/// assert_eq!(admin.model_key(), "blog.article");
/// assert_eq!(admin.verbose_name, "article");
/// ```
pub struct ResourceAdmin {
    /// The application label (e.g. "blog").
    pub app_label: String,
    /// The model name in lowercase (e.g. "article").
    pub model_name: String,
    /// The human-readable verbose name.
    pub verbose_name: String,
    /// The human-readable plural verbose name.
    pub verbose_name_plural: String,
    providers: Vec<ToolProvider>,
    local_tools: Vec<ToolDescriptor>,
    permission_checks: HashMap<String, Arc<PermissionCheck>>,
}

impl ResourceAdmin {
    /// Creates a new resource admin with default verbose names.
    pub fn new(app_label: impl Into<String>, model_name: impl Into<String>) -> Self {
        let model = model_name.into();
        let verbose = model.replace('_', " ");
        let verbose_plural = format!("{verbose}s");
        Self {
            app_label: app_label.into(),
            model_name: model,
            verbose_name: verbose,
            verbose_name_plural: verbose_plural,
            providers: Vec::new(),
            local_tools: Vec::new(),
            permission_checks: HashMap::new(),
        }
    }

    /// Sets the verbose name.
    #[must_use]
    pub fn verbose_name(mut self, name: impl Into<String>) -> Self {
        self.verbose_name = name.into();
        self
    }

    /// Sets the plural verbose name.
    #[must_use]
    pub fn verbose_name_plural(mut self, name: impl Into<String>) -> Self {
        self.verbose_name_plural = name.into();
        self
    }

    /// Appends a tool provider. Call order is precedence order: append
    /// base providers before derived ones.
    #[must_use]
    pub fn provider(mut self, provider: ToolProvider) -> Self {
        self.providers.push(provider);
        self
    }

    /// Registers a named local handler, resolvable from `Named`
    /// declarations before the site registry is consulted.
    #[must_use]
    pub fn local_tool(mut self, tool: ToolDescriptor) -> Self {
        self.local_tools.push(tool);
        self
    }

    /// Registers a custom named permission predicate, overriding the
    /// default codename check for that name.
    #[must_use]
    pub fn permission_check<F>(mut self, kind: &str, check: F) -> Self
    where
        F: Fn(&Actor, &ToolRequest) -> bool + Send + Sync + 'static,
    {
        self.permission_checks
            .insert(kind.to_string(), Arc::new(check));
        self
    }

    /// Returns the providers in precedence (base-first) order.
    pub fn providers(&self) -> &[ToolProvider] {
        &self.providers
    }

    /// Looks up a named local handler.
    pub fn get_local_tool(&self, name: &str) -> Option<&ToolDescriptor> {
        self.local_tools.iter().find(|t| t.name == name)
    }

    /// Returns the resource key in `"app_label.model_name"` format.
    pub fn model_key(&self) -> String {
        format!("{}.{}", self.app_label, self.model_name)
    }

    /// Evaluates one named permission check for the actor.
    ///
    /// A custom predicate registered under `kind` wins; otherwise the
    /// default codename `"{app_label}.{kind}_{model_name}"` is checked
    /// against the actor's permission set.
    pub fn has_tool_permission(&self, kind: &str, actor: &Actor, request: &ToolRequest) -> bool {
        if let Some(check) = self.permission_checks.get(kind) {
            return check(actor, request);
        }
        actor.has_perm(&format!(
            "{}.{}_{}",
            self.app_label, kind, self.model_name
        ))
    }

    /// Returns the list-view URL for this resource.
    pub fn changelist_url(&self, prefix: &str) -> String {
        format!("{prefix}/{}/{}/", self.app_label, self.model_name)
    }

    /// Returns the detail-view URL for one object.
    pub fn change_url(&self, prefix: &str, object_id: &str) -> String {
        format!(
            "{prefix}/{}/{}/{object_id}/change/",
            self.app_label, self.model_name
        )
    }

    /// Returns the invocation URL for a tool, with or without a target.
    pub fn tool_url(&self, prefix: &str, object_id: Option<&str>, action: &str) -> String {
        match object_id {
            Some(id) => format!(
                "{prefix}/{}/{}/{id}/objecttool/{action}/",
                self.app_label, self.model_name
            ),
            None => format!(
                "{prefix}/{}/{}/objecttool/{action}/",
                self.app_label, self.model_name
            ),
        }
    }
}

impl std::fmt::Debug for ResourceAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceAdmin")
            .field("app_label", &self.app_label)
            .field("model_name", &self.model_name)
            .field("providers", &self.providers.len())
            .field("local_tools", &self.local_tools.len())
            .finish_non_exhaustive()
    }
}
