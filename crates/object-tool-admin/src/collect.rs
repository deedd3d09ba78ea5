//! Per-request tool collection.
//!
//! [`collect_tools`] builds the set of tools available to the current
//! actor on the current page: site-registered tools for the view first,
//! then each provider's declarations walked base-first, resolved,
//! permission-filtered, and folded into an ordered set where the first
//! occurrence of a name wins.

use object_tool_core::{ObjectToolError, ToolResult};
use object_tool_http::ToolRequest;

use crate::actor::Actor;
use crate::descriptor::{ToolDeclaration, ToolDescriptor};
use crate::registry::{ToolRegistry, ViewScope};
use crate::resource::ResourceAdmin;

/// An ordered, name-deduplicated set of resolved tools.
#[derive(Debug, Default)]
pub struct ToolSet {
    tools: Vec<ToolDescriptor>,
}

impl ToolSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a tool unless its name is already present (first wins).
    pub fn insert(&mut self, tool: ToolDescriptor) {
        if !self.contains(&tool.name) {
            self.tools.push(tool);
        }
    }

    /// Returns the tool with the given name, if present.
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Returns `true` if a tool with the given name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name == name)
    }

    /// Returns the tool names in collection order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    /// Iterates over the tools in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter()
    }

    /// Returns the number of tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Returns the render-context bundles for every tool, in order.
    pub fn display_context(&self) -> serde_json::Value {
        serde_json::Value::Array(self.tools.iter().map(ToolDescriptor::display_context).collect())
    }
}

impl<'a> IntoIterator for &'a ToolSet {
    type Item = &'a ToolDescriptor;
    type IntoIter = std::slice::Iter<'a, ToolDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.tools.iter()
    }
}

/// Determines which view a request belongs to.
///
/// A request to a tool-invocation URL no longer reveals the view on its
/// own; the originating page is recovered from the `origin_field` payload
/// entry, falling back to the `Referer` header. Unrecoverable origins
/// default to the list view.
pub fn view_kind(request: &ToolRequest, origin_field: &str) -> ViewScope {
    classify_path(request.path()).unwrap_or_else(|| {
        request
            .post()
            .get(origin_field)
            .map(String::from)
            .or_else(|| request.meta().get("HTTP_REFERER").cloned())
            .and_then(|origin| origin_path(&origin))
            .and_then(|path| classify_path(&path))
            .unwrap_or(ViewScope::ChangeList)
    })
}

/// Classifies an admin URL path; `None` means a tool-invocation path whose
/// view must be recovered from the originating page.
fn classify_path(path: &str) -> Option<ViewScope> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.contains(&"objecttool") {
        return None;
    }
    if segments.last() == Some(&"change") {
        Some(ViewScope::Change)
    } else {
        Some(ViewScope::ChangeList)
    }
}

/// Extracts the path component from an absolute or server-relative URL.
fn origin_path(raw: &str) -> Option<String> {
    if raw.starts_with('/') {
        return Some(raw.split('?').next().unwrap_or(raw).to_string());
    }
    url::Url::parse(raw).ok().map(|u| u.path().to_string())
}

/// Collects the tools available to `actor` on the request's view.
///
/// # Errors
///
/// Returns [`ObjectToolError::UnknownTool`] when a named declaration
/// resolves to nothing — a configuration bug, fatal to the request.
pub fn collect_tools(
    admin: &ResourceAdmin,
    registry: &ToolRegistry,
    actor: &Actor,
    request: &ToolRequest,
    origin_field: &str,
) -> ToolResult<ToolSet> {
    collect_tools_for_view(admin, registry, actor, request, view_kind(request, origin_field))
}

/// Collects the tools available to `actor` for an explicitly known view.
///
/// # Errors
///
/// Returns [`ObjectToolError::UnknownTool`] when a named declaration
/// resolves to nothing.
pub fn collect_tools_for_view(
    admin: &ResourceAdmin,
    registry: &ToolRegistry,
    actor: &Actor,
    request: &ToolRequest,
    view: ViewScope,
) -> ToolResult<ToolSet> {
    // Site-registered tools come first, so they outrank same-named
    // per-resource declarations in the first-wins fold below.
    let mut pending: Vec<ToolDescriptor> =
        registry.list_tools(view).into_iter().cloned().collect();

    for provider in admin.providers() {
        for declaration in provider.tools_for(view) {
            pending.push(resolve_declaration(admin, registry, declaration)?);
        }
    }

    let mut set = ToolSet::new();
    for tool in pending {
        if passes_permission_filter(admin, &tool, actor, request) {
            set.insert(tool);
        }
    }
    Ok(set)
}

/// Resolves one declaration: inline descriptors as-is, named ones against
/// the admin's local handlers and then the site registry.
fn resolve_declaration(
    admin: &ResourceAdmin,
    registry: &ToolRegistry,
    declaration: &ToolDeclaration,
) -> ToolResult<ToolDescriptor> {
    match declaration {
        ToolDeclaration::Inline(tool) => Ok(tool.clone()),
        ToolDeclaration::Named(name) => admin
            .get_local_tool(name)
            .cloned()
            .or_else(|| registry.get_tool(name).ok().cloned())
            .ok_or_else(|| ObjectToolError::UnknownTool(name.clone())),
    }
}

/// A tool with no permission requirements always passes; otherwise the
/// actor must satisfy at least one of the named checks.
fn passes_permission_filter(
    admin: &ResourceAdmin,
    tool: &ToolDescriptor,
    actor: &Actor,
    request: &ToolRequest,
) -> bool {
    tool.allowed_permissions.is_empty()
        || tool
            .allowed_permissions
            .iter()
            .any(|kind| admin.has_tool_permission(kind, actor, request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ToolOutcome;

    fn noop(name: &str) -> ToolDescriptor {
        ToolDescriptor::from_fn(name, |_, _, _| Ok(ToolOutcome::Done))
    }

    fn changelist_request() -> ToolRequest {
        ToolRequest::builder().path("/admin/auth/user/").build()
    }

    #[test]
    fn test_view_kind_from_path() {
        let request = changelist_request();
        assert_eq!(view_kind(&request, "_objecttool_origin"), ViewScope::ChangeList);

        let request = ToolRequest::builder()
            .path("/admin/auth/user/3/change/")
            .build();
        assert_eq!(view_kind(&request, "_objecttool_origin"), ViewScope::Change);
    }

    #[test]
    fn test_view_kind_recovered_from_origin_field() {
        let request = ToolRequest::builder()
            .path("/admin/auth/user/3/objecttool/confirm_action/")
            .post_param("_objecttool_origin", "/admin/auth/user/3/change/?o=1")
            .build();
        assert_eq!(view_kind(&request, "_objecttool_origin"), ViewScope::Change);
    }

    #[test]
    fn test_view_kind_recovered_from_referer() {
        let request = ToolRequest::builder()
            .method(http::Method::POST)
            .path("/admin/auth/user/objecttool/greetings/")
            .referer("http://testserver/admin/auth/user/")
            .build();
        assert_eq!(view_kind(&request, "_objecttool_origin"), ViewScope::ChangeList);
    }

    #[test]
    fn test_view_kind_origin_field_beats_referer() {
        let request = ToolRequest::builder()
            .path("/admin/auth/user/objecttool/x/")
            .post_param("_objecttool_origin", "/admin/auth/user/3/change/")
            .referer("http://testserver/admin/auth/user/")
            .build();
        assert_eq!(view_kind(&request, "_objecttool_origin"), ViewScope::Change);
    }

    #[test]
    fn test_view_kind_unrecoverable_defaults_to_changelist() {
        let request = ToolRequest::builder()
            .method(http::Method::POST)
            .path("/admin/auth/user/objecttool/x/")
            .build();
        assert_eq!(view_kind(&request, "_objecttool_origin"), ViewScope::ChangeList);
    }

    #[test]
    fn test_collect_merges_site_then_providers() {
        let mut registry = ToolRegistry::new();
        registry.add_tool(noop("site_tool"), ViewScope::Global, None);

        let admin = ResourceAdmin::new("auth", "user").provider(fixture_provider());
        let actor = Actor::superuser("root");
        let set = collect_tools(&admin, &registry, &actor, &changelist_request(), "_o").unwrap();
        assert_eq!(set.names(), vec!["site_tool", "everywhere", "list_only"]);
    }

    fn fixture_provider() -> crate::resource::ToolProvider {
        crate::resource::ToolProvider::new("UserAdmin")
            .object_tool(noop("everywhere"))
            .changelist_tool(noop("list_only"))
            .change_tool(noop("detail_only"))
    }

    #[test]
    fn test_collect_first_wins_across_providers() {
        let registry = ToolRegistry::new();
        let admin = ResourceAdmin::new("auth", "user")
            .provider(
                crate::resource::ToolProvider::new("Base")
                    .object_tool(noop("x").short_description("base x")),
            )
            .provider(
                crate::resource::ToolProvider::new("Derived")
                    .object_tool(noop("x").short_description("derived x")),
            );
        let actor = Actor::superuser("root");
        let set = collect_tools(&admin, &registry, &actor, &changelist_request(), "_o").unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("x").unwrap().short_description, "base x");
    }

    #[test]
    fn test_collect_site_tool_outranks_provider_tool() {
        let mut registry = ToolRegistry::new();
        registry.add_tool(noop("x").short_description("site x"), ViewScope::Global, None);

        let admin = ResourceAdmin::new("auth", "user").provider(
            crate::resource::ToolProvider::new("UserAdmin")
                .object_tool(noop("x").short_description("admin x")),
        );
        let actor = Actor::superuser("root");
        let set = collect_tools(&admin, &registry, &actor, &changelist_request(), "_o").unwrap();
        assert_eq!(set.get("x").unwrap().short_description, "site x");
    }

    #[test]
    fn test_collect_unknown_named_declaration_fails() {
        let registry = ToolRegistry::new();
        let admin = ResourceAdmin::new("auth", "user").provider(
            crate::resource::ToolProvider::new("UserAdmin").object_tool("missing_tool"),
        );
        let actor = Actor::superuser("root");
        let err = collect_tools(&admin, &registry, &actor, &changelist_request(), "_o").unwrap_err();
        assert!(matches!(err, ObjectToolError::UnknownTool(name) if name == "missing_tool"));
    }

    #[test]
    fn test_collect_named_declaration_prefers_local_tool() {
        let mut registry = ToolRegistry::new();
        registry.add_tool(noop("dual").short_description("site"), ViewScope::Global, None);

        let admin = ResourceAdmin::new("auth", "user")
            .local_tool(noop("dual").short_description("local"))
            .provider(crate::resource::ToolProvider::new("UserAdmin").object_tool("dual"));
        let actor = Actor::superuser("root");
        let set = collect_tools(&admin, &registry, &actor, &changelist_request(), "_o").unwrap();
        // The site copy is collected first and wins the fold; resolution of
        // the named declaration still exercises the local table first.
        assert_eq!(set.get("dual").unwrap().short_description, "site");

        let registry = ToolRegistry::new();
        let set = collect_tools(&admin, &registry, &actor, &changelist_request(), "_o").unwrap();
        assert_eq!(set.get("dual").unwrap().short_description, "local");
    }

    #[test]
    fn test_permission_filter() {
        let registry = ToolRegistry::new();
        let admin = ResourceAdmin::new("auth", "user").provider(
            crate::resource::ToolProvider::new("UserAdmin")
                .object_tool(noop("open_tool"))
                .object_tool(noop("guarded").allowed_permissions(vec!["change"])),
        );

        let unprivileged = Actor::new("bob");
        let set =
            collect_tools(&admin, &registry, &unprivileged, &changelist_request(), "_o").unwrap();
        assert_eq!(set.names(), vec!["open_tool"]);

        let privileged = Actor::new("alice").with_permission("auth.change_user");
        let set =
            collect_tools(&admin, &registry, &privileged, &changelist_request(), "_o").unwrap();
        assert_eq!(set.names(), vec!["open_tool", "guarded"]);
    }

    #[test]
    fn test_permission_or_semantics() {
        let registry = ToolRegistry::new();
        let admin = ResourceAdmin::new("auth", "user").provider(
            crate::resource::ToolProvider::new("UserAdmin")
                .object_tool(noop("either").allowed_permissions(vec!["change", "view"])),
        );
        let viewer = Actor::new("eve").with_permission("auth.view_user");
        let set = collect_tools(&admin, &registry, &viewer, &changelist_request(), "_o").unwrap();
        assert!(set.contains("either"));
    }

    #[test]
    fn test_view_scoping_of_provider_tools() {
        let registry = ToolRegistry::new();
        let admin = ResourceAdmin::new("auth", "user").provider(fixture_provider());
        let actor = Actor::superuser("root");

        let request = ToolRequest::builder()
            .path("/admin/auth/user/3/change/")
            .build();
        let set = collect_tools(&admin, &registry, &actor, &request, "_o").unwrap();
        assert_eq!(set.names(), vec!["everywhere", "detail_only"]);
    }

    #[test]
    fn test_display_context_order() {
        let mut set = ToolSet::new();
        set.insert(noop("b"));
        set.insert(noop("a"));
        let context = set.display_context();
        let names: Vec<&str> = context
            .as_array()
            .unwrap()
            .iter()
            .map(|bundle| bundle["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
