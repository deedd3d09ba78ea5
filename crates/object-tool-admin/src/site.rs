//! The admin site: registry owner and dispatch front door.
//!
//! [`AdminSite`] owns the tool registry, the registered resource admins,
//! the object store, and the settings. Application start-up code builds
//! and populates one, then turns it into a router; after that the site is
//! only read. Registration must complete before serving traffic — there is
//! no locking around the registry.

use std::collections::HashMap;
use std::sync::Arc;

use object_tool_core::{ObjectToolError, Settings, ToolResult};
use object_tool_http::ToolRequest;

use crate::actor::Actor;
use crate::collect::{self, ToolSet};
use crate::descriptor::ToolDescriptor;
use crate::dispatch::{self, ToolResponse};
use crate::registry::{ToolRegistry, ViewScope};
use crate::resource::ResourceAdmin;
use crate::routes::{ActorResolver, DevActorResolver};
use crate::store::{InMemoryObjectStore, ObjectStore};

/// The admin site.
///
/// # Examples
///
/// ```
/// use object_tool_admin::registry::ViewScope;
/// use object_tool_admin::resource::ResourceAdmin;
/// use object_tool_admin::shortcuts::link;
/// use object_tool_admin::site::AdminSite;
///
/// let mut site = AdminSite::new("admin");
/// site.register(ResourceAdmin::new("auth", "user"));
/// site.add_tool(link("forkme", "https://x", "Fork me"), ViewScope::Global, None);
/// let router = site.into_axum_router();
/// ```
pub struct AdminSite {
    name: String,
    settings: Settings,
    registry: ToolRegistry,
    admins: HashMap<String, ResourceAdmin>,
    store: Arc<dyn ObjectStore>,
    actor_resolver: Arc<dyn ActorResolver>,
}

impl AdminSite {
    /// Creates a new admin site with default settings, an empty registry,
    /// an in-memory object store, and the development actor resolver.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            settings: Settings::default(),
            registry: ToolRegistry::new(),
            admins: HashMap::new(),
            store: Arc::new(InMemoryObjectStore::new()),
            actor_resolver: Arc::new(DevActorResolver),
        }
    }

    /// Replaces the settings.
    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Replaces the object store.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.store = store;
        self
    }

    /// Replaces the actor resolver.
    #[must_use]
    pub fn with_actor_resolver(mut self, resolver: Arc<dyn ActorResolver>) -> Self {
        self.actor_resolver = resolver;
        self
    }

    /// Returns the site name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the settings.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the object store.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Returns the actor resolver.
    pub fn actor_resolver(&self) -> &Arc<dyn ActorResolver> {
        &self.actor_resolver
    }

    /// Returns the tool registry.
    pub const fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    // ── Resource registration ──────────────────────────────────────────

    /// Registers a resource admin under its model key.
    pub fn register(&mut self, admin: ResourceAdmin) {
        self.admins.insert(admin.model_key(), admin);
    }

    /// Unregisters a resource admin.
    pub fn unregister(&mut self, model_key: &str) {
        self.admins.remove(model_key);
    }

    /// Returns the resource admin for a model key, if registered.
    pub fn get_resource_admin(&self, model_key: &str) -> Option<&ResourceAdmin> {
        self.admins.get(model_key)
    }

    /// Returns whether a model key is registered.
    pub fn is_registered(&self, model_key: &str) -> bool {
        self.admins.contains_key(model_key)
    }

    /// Returns the number of registered resources.
    pub fn resource_count(&self) -> usize {
        self.admins.len()
    }

    // ── Tool registration surface ──────────────────────────────────────

    /// Registers a site-wide tool (see
    /// [`ToolRegistry::add_tool`](crate::registry::ToolRegistry::add_tool)).
    pub fn add_tool(&mut self, tool: ToolDescriptor, scope: ViewScope, name: Option<&str>) {
        self.registry.add_tool(tool, scope, name);
    }

    /// Disables a site-wide tool.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectToolError::NotFound`] if no enabled tool with that
    /// name exists in the scope.
    pub fn disable_tool(&mut self, name: &str, scope: ViewScope) -> ToolResult<()> {
        self.registry.disable_tool(name, scope)
    }

    /// Looks a site-wide tool up by name, enabled or not.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectToolError::NotFound`] if no scope has the name.
    pub fn get_tool(&self, name: &str) -> ToolResult<&ToolDescriptor> {
        self.registry.get_tool(name)
    }

    /// Lists the enabled site-wide tools visible in a scope.
    pub fn list_tools(&self, scope: ViewScope) -> Vec<&ToolDescriptor> {
        self.registry.list_tools(scope)
    }

    // ── Collection and dispatch ────────────────────────────────────────

    /// Collects the tools available to `actor` on the request's view.
    ///
    /// # Errors
    ///
    /// Fails for an unregistered model key or an unresolvable declaration.
    pub fn collect_tools(
        &self,
        model_key: &str,
        actor: &Actor,
        request: &ToolRequest,
    ) -> ToolResult<ToolSet> {
        let admin = self.resource_admin(model_key)?;
        collect::collect_tools(
            admin,
            &self.registry,
            actor,
            request,
            &self.settings.origin_field,
        )
    }

    /// Collects tools for an explicitly known view (used by the listing
    /// endpoints, whose URLs do not classify).
    ///
    /// # Errors
    ///
    /// Fails for an unregistered model key or an unresolvable declaration.
    pub fn collect_tools_for_view(
        &self,
        model_key: &str,
        actor: &Actor,
        request: &ToolRequest,
        view: ViewScope,
    ) -> ToolResult<ToolSet> {
        let admin = self.resource_admin(model_key)?;
        collect::collect_tools_for_view(admin, &self.registry, actor, request, view)
    }

    /// Returns the render context for a page's tool buttons: the tool
    /// bundles plus the preserved changelist-filters value.
    ///
    /// # Errors
    ///
    /// Fails for an unregistered model key or an unresolvable declaration.
    pub fn tools_context(
        &self,
        model_key: &str,
        actor: &Actor,
        request: &ToolRequest,
        view: ViewScope,
    ) -> ToolResult<serde_json::Value> {
        let tools = self.collect_tools_for_view(model_key, actor, request, view)?;
        let filters = request
            .get()
            .get(&self.settings.filters_field)
            .unwrap_or("");
        Ok(serde_json::json!({
            "object_tools": tools.display_context(),
            "changelist_filters": filters,
        }))
    }

    /// Dispatches one tool invocation.
    ///
    /// # Errors
    ///
    /// See [`dispatch::dispatch`].
    pub async fn dispatch(
        &self,
        model_key: &str,
        action_name: &str,
        actor: &Actor,
        request: &ToolRequest,
        target_id: Option<&str>,
        extra_context: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> ToolResult<ToolResponse> {
        let admin = self.resource_admin(model_key)?;
        dispatch::dispatch(
            admin,
            &self.registry,
            self.store.as_ref(),
            actor,
            request,
            action_name,
            target_id,
            extra_context,
            &self.settings,
        )
        .await
    }

    /// Generates the Axum router serving the tool endpoints.
    ///
    /// The routes are:
    ///
    /// - `GET|POST /{app}/{model}/objecttool/{action}/` — invoke on the
    ///   whole resource
    /// - `GET|POST /{app}/{model}/{id}/objecttool/{action}/` — invoke on
    ///   one object
    /// - `POST /{app}/{model}/` and `POST /{app}/{model}/{id}/change/` —
    ///   field-encoded invocation via the `object-tool` form field
    /// - `GET /{app}/{model}/tools/` and `GET /{app}/{model}/{id}/tools/`
    ///   — the render-context listings
    pub fn into_axum_router(self) -> axum::Router {
        crate::routes::router(self)
    }

    fn resource_admin(&self, model_key: &str) -> ToolResult<&ResourceAdmin> {
        self.admins.get(model_key).ok_or_else(|| {
            ObjectToolError::ImproperlyConfigured(format!(
                "resource '{model_key}' is not registered with the admin site"
            ))
        })
    }
}

impl std::fmt::Debug for AdminSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut models: Vec<&str> = self.admins.keys().map(String::as_str).collect();
        models.sort_unstable();
        f.debug_struct("AdminSite")
            .field("name", &self.name)
            .field("resources", &models.join(", "))
            .finish_non_exhaustive()
    }
}
