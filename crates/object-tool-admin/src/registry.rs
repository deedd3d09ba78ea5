//! The site-level tool registry.
//!
//! A process-wide table of tools keyed by `(scope, name)`. The registry is
//! an explicit object owned by the [`AdminSite`](crate::site::AdminSite) —
//! registration happens at application start-up, reads happen on every
//! request. Disabling a tool hides it from listings but keeps it
//! retrievable by name.

use object_tool_core::{ObjectToolError, ToolResult};

use crate::descriptor::ToolDescriptor;

/// The view context a tool applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewScope {
    /// Applies everywhere (the `""` scope).
    Global,
    /// The list view only.
    ChangeList,
    /// The detail view only.
    Change,
}

impl ViewScope {
    /// Returns the wire name of this scope.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Global => "",
            Self::ChangeList => "changelist",
            Self::Change => "change",
        }
    }

    /// Parses a wire name back into a scope.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "" => Some(Self::Global),
            "changelist" => Some(Self::ChangeList),
            "change" => Some(Self::Change),
            _ => None,
        }
    }
}

impl std::fmt::Display for ViewScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered table of site-registered tools.
///
/// Two tables are kept: the enabled table drives listings, while the
/// ever-registered table backs [`get_tool`](ToolRegistry::get_tool) so
/// disabled tools remain explicitly retrievable.
///
/// # Examples
///
/// ```
/// use object_tool_admin::descriptor::{ToolDescriptor, ToolOutcome};
/// use object_tool_admin::registry::{ToolRegistry, ViewScope};
///
/// let mut registry = ToolRegistry::new();
/// let tool = ToolDescriptor::from_fn("forkme", |_, _, _| Ok(ToolOutcome::Done));
/// registry.add_tool(tool, ViewScope::Global, None);
///
/// assert!(registry.get_tool("forkme").is_ok());
/// assert_eq!(registry.list_tools(ViewScope::Change).len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ToolRegistry {
    enabled: Vec<(ViewScope, ToolDescriptor)>,
    registered: Vec<(ViewScope, ToolDescriptor)>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool under `(scope, name)`.
    ///
    /// `name` defaults to the tool's own name. Re-registering the same name
    /// in the same scope silently overwrites in place — last write wins at
    /// registration time, distinct from the first-wins deduplication the
    /// collector applies per request.
    pub fn add_tool(&mut self, tool: ToolDescriptor, scope: ViewScope, name: Option<&str>) {
        let tool = match name {
            Some(alias) if alias != tool.name => tool.with_name(alias),
            _ => tool,
        };
        upsert(&mut self.enabled, scope, tool.clone());
        upsert(&mut self.registered, scope, tool);
    }

    /// Disables a registered tool, removing it from listings.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectToolError::NotFound`] if no enabled tool with that
    /// name exists in the scope.
    pub fn disable_tool(&mut self, name: &str, scope: ViewScope) -> ToolResult<()> {
        let position = self
            .enabled
            .iter()
            .position(|(s, t)| *s == scope && t.name == name)
            .ok_or_else(|| {
                ObjectToolError::NotFound(format!("tool '{name}' in scope '{scope}'"))
            })?;
        self.enabled.remove(position);
        Ok(())
    }

    /// Looks a tool up by name across all scopes, enabled or not. The
    /// global scope is searched first.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectToolError::NotFound`] if no scope has the name.
    pub fn get_tool(&self, name: &str) -> ToolResult<&ToolDescriptor> {
        for scope in [ViewScope::Global, ViewScope::ChangeList, ViewScope::Change] {
            if let Some((_, tool)) = self
                .registered
                .iter()
                .find(|(s, t)| *s == scope && t.name == name)
            {
                return Ok(tool);
            }
        }
        Err(ObjectToolError::NotFound(format!("tool '{name}'")))
    }

    /// Returns the enabled tools visible in `scope`: the global scope's
    /// tools first, then the scope's own, each in registration order.
    pub fn list_tools(&self, scope: ViewScope) -> Vec<&ToolDescriptor> {
        let mut tools: Vec<&ToolDescriptor> = self
            .enabled
            .iter()
            .filter(|(s, _)| *s == ViewScope::Global)
            .map(|(_, t)| t)
            .collect();
        if scope != ViewScope::Global {
            tools.extend(
                self.enabled
                    .iter()
                    .filter(|(s, _)| *s == scope)
                    .map(|(_, t)| t),
            );
        }
        tools
    }
}

/// Replaces the `(scope, name)` entry in place, or appends a new one.
fn upsert(table: &mut Vec<(ViewScope, ToolDescriptor)>, scope: ViewScope, tool: ToolDescriptor) {
    if let Some(entry) = table
        .iter_mut()
        .find(|(s, t)| *s == scope && t.name == tool.name)
    {
        entry.1 = tool;
    } else {
        table.push((scope, tool));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ToolOutcome;

    fn noop(name: &str) -> ToolDescriptor {
        ToolDescriptor::from_fn(name, |_, _, _| Ok(ToolOutcome::Done))
    }

    fn names(tools: &[&ToolDescriptor]) -> Vec<String> {
        tools.iter().map(|t| t.name.clone()).collect()
    }

    #[test]
    fn test_scope_round_trip() {
        for scope in [ViewScope::Global, ViewScope::ChangeList, ViewScope::Change] {
            assert_eq!(ViewScope::parse(scope.as_str()), Some(scope));
        }
        assert_eq!(ViewScope::parse("bogus"), None);
    }

    #[test]
    fn test_add_and_list_scoped_visibility() {
        let mut registry = ToolRegistry::new();
        registry.add_tool(noop("global_tool"), ViewScope::Global, None);
        registry.add_tool(noop("global_tool2"), ViewScope::Global, Some("global_tool_alias"));
        registry.add_tool(noop("changelist_tool"), ViewScope::ChangeList, None);
        registry.add_tool(noop("changeform_tool"), ViewScope::Change, None);

        assert_eq!(
            names(&registry.list_tools(ViewScope::Global)),
            vec!["global_tool", "global_tool_alias"]
        );
        assert_eq!(
            names(&registry.list_tools(ViewScope::ChangeList)),
            vec!["global_tool", "global_tool_alias", "changelist_tool"]
        );
        assert_eq!(
            names(&registry.list_tools(ViewScope::Change)),
            vec!["global_tool", "global_tool_alias", "changeform_tool"]
        );
    }

    #[test]
    fn test_list_excludes_other_scopes() {
        let mut registry = ToolRegistry::new();
        registry.add_tool(noop("changelist_only"), ViewScope::ChangeList, None);
        assert!(registry.list_tools(ViewScope::Change).is_empty());
        assert!(registry.list_tools(ViewScope::Global).is_empty());
    }

    #[test]
    fn test_reregistration_overwrites_in_place() {
        let mut registry = ToolRegistry::new();
        registry.add_tool(noop("a"), ViewScope::Global, None);
        registry.add_tool(noop("b"), ViewScope::Global, None);
        registry.add_tool(
            noop("a").short_description("Replacement"),
            ViewScope::Global,
            None,
        );

        let tools = registry.list_tools(ViewScope::Global);
        assert_eq!(names(&tools), vec!["a", "b"]);
        assert_eq!(tools[0].short_description, "Replacement");
    }

    #[test]
    fn test_disable_hides_from_listing() {
        let mut registry = ToolRegistry::new();
        registry.add_tool(noop("global_tool"), ViewScope::Global, None);
        registry.add_tool(noop("changelist_tool"), ViewScope::ChangeList, None);

        registry.disable_tool("global_tool", ViewScope::Global).unwrap();
        assert!(registry.list_tools(ViewScope::Global).is_empty());
        assert_eq!(
            names(&registry.list_tools(ViewScope::ChangeList)),
            vec!["changelist_tool"]
        );
    }

    #[test]
    fn test_disable_unknown_is_not_found() {
        let mut registry = ToolRegistry::new();
        let err = registry.disable_tool("missing", ViewScope::Global).unwrap_err();
        assert!(matches!(err, ObjectToolError::NotFound(_)));
    }

    #[test]
    fn test_get_tool_includes_disabled() {
        let mut registry = ToolRegistry::new();
        registry.add_tool(noop("global_tool"), ViewScope::Global, None);
        registry.disable_tool("global_tool", ViewScope::Global).unwrap();

        assert_eq!(registry.get_tool("global_tool").unwrap().name, "global_tool");
    }

    #[test]
    fn test_get_tool_searches_all_scopes() {
        let mut registry = ToolRegistry::new();
        registry.add_tool(noop("changeform_tool"), ViewScope::Change, None);
        assert!(registry.get_tool("changeform_tool").is_ok());
        assert!(matches!(
            registry.get_tool("missing"),
            Err(ObjectToolError::NotFound(_))
        ));
    }

    #[test]
    fn test_get_tool_prefers_global_scope() {
        let mut registry = ToolRegistry::new();
        registry.add_tool(
            noop("dup").short_description("scoped"),
            ViewScope::Change,
            None,
        );
        registry.add_tool(
            noop("dup").short_description("global"),
            ViewScope::Global,
            None,
        );
        assert_eq!(registry.get_tool("dup").unwrap().short_description, "global");
    }

    #[test]
    fn test_alias_registration_renames() {
        let mut registry = ToolRegistry::new();
        registry.add_tool(noop("real_name"), ViewScope::Global, Some("alias"));
        assert!(registry.get_tool("alias").is_ok());
        assert!(registry.get_tool("real_name").is_err());
    }
}
