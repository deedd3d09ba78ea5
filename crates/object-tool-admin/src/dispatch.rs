//! Request dispatch: routing an inbound tool invocation to its handler.
//!
//! [`dispatch`] re-collects the tool set for the current actor (so hidden
//! or permission-filtered tools cannot be invoked by a crafted request),
//! enforces the method constraint, resolves the target object, invokes the
//! handler, and normalizes its outcome into a [`ToolResponse`].

use object_tool_core::{Settings, ToolResult};
use object_tool_http::{HttpResponse, ToolRequest};

use crate::actor::Actor;
use crate::collect::collect_tools;
use crate::descriptor::{TemplateResponse, ToolOutcome};
use crate::registry::ToolRegistry;
use crate::resource::ResourceAdmin;
use crate::store::ObjectStore;

/// The response shapes the dispatcher produces for the web layer.
#[derive(Debug)]
pub enum ToolResponse {
    /// Redirect to the given URL.
    Redirect(String),
    /// Render the given template with its context.
    Template(TemplateResponse),
    /// A complete response, passed through unchanged.
    Raw(HttpResponse),
}

/// Dispatches one tool invocation.
///
/// Request-shape failures become status responses, never errors: an action
/// absent from the collected set responds 403 (the handler is never
/// invoked), and a safe-method invocation of a state-changing tool
/// responds 405. Configuration errors and handler errors propagate.
///
/// # Errors
///
/// Propagates [`UnknownTool`](object_tool_core::ObjectToolError::UnknownTool)
/// from collection, [`NotFound`](object_tool_core::ObjectToolError::NotFound)
/// from target lookup, and any error the handler returns.
#[allow(clippy::too_many_arguments)]
pub async fn dispatch(
    admin: &ResourceAdmin,
    registry: &ToolRegistry,
    store: &dyn ObjectStore,
    actor: &Actor,
    request: &ToolRequest,
    action_name: &str,
    target_id: Option<&str>,
    extra_context: Option<serde_json::Map<String, serde_json::Value>>,
    settings: &Settings,
) -> ToolResult<ToolResponse> {
    let tools = collect_tools(admin, registry, actor, request, &settings.origin_field)?;
    let Some(tool) = tools.get(action_name) else {
        tracing::info!(
            action = action_name,
            actor = %actor.username,
            "object tool invocation denied"
        );
        return Ok(ToolResponse::Raw(HttpResponse::forbidden("")));
    };

    if !tool.allow_get && request.is_safe_method() {
        tracing::info!(
            action = action_name,
            method = %request.method(),
            "state-changing object tool invoked via safe method"
        );
        return Ok(ToolResponse::Raw(HttpResponse::not_allowed(&["POST"])));
    }

    let target = match target_id {
        Some(id) => Some(store.get_object(admin, id).await?),
        None => None,
    };

    tracing::debug!(action = action_name, target = ?target_id, "invoking object tool");
    let outcome = tool.handler.execute(admin, request, target.as_ref()).await?;

    Ok(match outcome {
        ToolOutcome::Template(mut template) => {
            if let Some(extra) = extra_context {
                template.extend(extra);
            }
            ToolResponse::Template(template)
        }
        ToolOutcome::Response(response) => ToolResponse::Raw(response),
        ToolOutcome::Redirect(url) => ToolResponse::Redirect(url),
        ToolOutcome::Done => {
            ToolResponse::Redirect(post_tool_url(admin, request, target_id, settings))
        }
    })
}

/// Computes the URL to return to after a tool completes.
///
/// The explicit origin payload field wins, then the `Referer` header, then
/// the resource's standard change/changelist URL with any preserved
/// changelist filters re-applied as the query string.
pub fn post_tool_url(
    admin: &ResourceAdmin,
    request: &ToolRequest,
    target_id: Option<&str>,
    settings: &Settings,
) -> String {
    if let Some(origin) = request.post().get(&settings.origin_field) {
        if !origin.is_empty() {
            return origin.to_string();
        }
    }
    if let Some(referer) = request.meta().get("HTTP_REFERER") {
        if !referer.is_empty() {
            return referer.clone();
        }
    }

    let base = match target_id {
        Some(id) => admin.change_url(&settings.url_prefix, id),
        None => admin.changelist_url(&settings.url_prefix),
    };
    let filters = request
        .post()
        .get(&settings.filters_field)
        .or_else(|| request.get().get(&settings.filters_field));
    match filters {
        Some(query) if !query.is_empty() => format!("{base}?{query}"),
        _ => base,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::descriptor::ToolDescriptor;
    use crate::resource::ToolProvider;
    use crate::store::InMemoryObjectStore;

    fn settings() -> Settings {
        Settings::default()
    }

    fn counting_tool(name: &str, counter: Arc<AtomicUsize>) -> ToolDescriptor {
        ToolDescriptor::from_fn(name, move |_, _, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(ToolOutcome::Done)
        })
    }

    fn admin_with(tool: ToolDescriptor) -> ResourceAdmin {
        ResourceAdmin::new("auth", "user")
            .provider(ToolProvider::new("UserAdmin").object_tool(tool))
    }

    fn post_request() -> ToolRequest {
        ToolRequest::builder()
            .method(http::Method::POST)
            .path("/admin/auth/user/objecttool/tool/")
            .referer("http://testserver/admin/auth/user/")
            .build()
    }

    #[tokio::test]
    async fn test_unknown_action_responds_403_without_invoking() {
        let counter = Arc::new(AtomicUsize::new(0));
        let admin = admin_with(counting_tool("tool", Arc::clone(&counter)));
        let registry = ToolRegistry::new();
        let store = InMemoryObjectStore::new();
        let actor = Actor::superuser("root");

        let response = dispatch(
            &admin,
            &registry,
            &store,
            &actor,
            &post_request(),
            "other_tool",
            None,
            None,
            &settings(),
        )
        .await
        .unwrap();

        match response {
            ToolResponse::Raw(r) => assert_eq!(r.status(), http::StatusCode::FORBIDDEN),
            other => panic!("expected raw 403, got {other:?}"),
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_hidden_tool_responds_403() {
        let counter = Arc::new(AtomicUsize::new(0));
        let admin = admin_with(
            counting_tool("tool", Arc::clone(&counter)).allowed_permissions(vec!["change"]),
        );
        let registry = ToolRegistry::new();
        let store = InMemoryObjectStore::new();
        let unprivileged = Actor::new("bob");

        let response = dispatch(
            &admin,
            &registry,
            &store,
            &unprivileged,
            &post_request(),
            "tool",
            None,
            None,
            &settings(),
        )
        .await
        .unwrap();

        match response {
            ToolResponse::Raw(r) => assert_eq!(r.status(), http::StatusCode::FORBIDDEN),
            other => panic!("expected raw 403, got {other:?}"),
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_safe_method_on_state_changing_tool_responds_405() {
        let counter = Arc::new(AtomicUsize::new(0));
        let admin = admin_with(counting_tool("tool", Arc::clone(&counter)));
        let registry = ToolRegistry::new();
        let store = InMemoryObjectStore::new();
        let actor = Actor::superuser("root");
        let request = ToolRequest::builder()
            .method(http::Method::GET)
            .path("/admin/auth/user/objecttool/tool/")
            .build();

        let response = dispatch(
            &admin,
            &registry,
            &store,
            &actor,
            &request,
            "tool",
            None,
            None,
            &settings(),
        )
        .await
        .unwrap();

        match response {
            ToolResponse::Raw(r) => {
                assert_eq!(r.status(), http::StatusCode::METHOD_NOT_ALLOWED);
            }
            other => panic!("expected raw 405, got {other:?}"),
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_done_outcome_redirects_to_referer() {
        let counter = Arc::new(AtomicUsize::new(0));
        let admin = admin_with(counting_tool("tool", Arc::clone(&counter)));
        let registry = ToolRegistry::new();
        let store = InMemoryObjectStore::new();
        let actor = Actor::superuser("root");

        let response = dispatch(
            &admin,
            &registry,
            &store,
            &actor,
            &post_request(),
            "tool",
            None,
            None,
            &settings(),
        )
        .await
        .unwrap();

        match response {
            ToolResponse::Redirect(url) => {
                assert_eq!(url, "http://testserver/admin/auth/user/");
            }
            other => panic!("expected redirect, got {other:?}"),
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_target_resolution_and_not_found() {
        let admin = admin_with(ToolDescriptor::from_fn("tool", |_, _, target| {
            let target = target.expect("target should be resolved");
            assert_eq!(target["name"], "alice");
            Ok(ToolOutcome::Done)
        }));
        let registry = ToolRegistry::new();
        let store = InMemoryObjectStore::new();
        store.insert("auth.user", "1", serde_json::json!({"id": 1, "name": "alice"}));
        let actor = Actor::superuser("root");

        let ok = dispatch(
            &admin,
            &registry,
            &store,
            &actor,
            &post_request(),
            "tool",
            Some("1"),
            None,
            &settings(),
        )
        .await;
        assert!(ok.is_ok());

        let err = dispatch(
            &admin,
            &registry,
            &store,
            &actor,
            &post_request(),
            "tool",
            Some("99"),
            None,
            &settings(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_template_outcome_merges_extra_context() {
        let admin = admin_with(ToolDescriptor::from_fn("tool", |_, _, _| {
            Ok(ToolOutcome::Template(
                TemplateResponse::new("admin/object_tool/form.html")
                    .with("action", serde_json::json!("tool")),
            ))
        }));
        let registry = ToolRegistry::new();
        let store = InMemoryObjectStore::new();
        let actor = Actor::superuser("root");

        let mut extra = serde_json::Map::new();
        extra.insert("site_name".to_string(), serde_json::json!("Admin"));

        let response = dispatch(
            &admin,
            &registry,
            &store,
            &actor,
            &post_request(),
            "tool",
            None,
            Some(extra),
            &settings(),
        )
        .await
        .unwrap();

        match response {
            ToolResponse::Template(t) => {
                assert_eq!(t.context["action"], "tool");
                assert_eq!(t.context["site_name"], "Admin");
            }
            other => panic!("expected template, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_passthrough_response_is_unchanged() {
        let admin = admin_with(ToolDescriptor::from_fn("tool", |_, _, _| {
            Ok(ToolOutcome::Response(HttpResponse::with_bytes(
                http::StatusCode::OK,
                vec![0x1f, 0x8b],
            )))
        }));
        let registry = ToolRegistry::new();
        let store = InMemoryObjectStore::new();
        let actor = Actor::superuser("root");

        let response = dispatch(
            &admin,
            &registry,
            &store,
            &actor,
            &post_request(),
            "tool",
            None,
            None,
            &settings(),
        )
        .await
        .unwrap();

        match response {
            ToolResponse::Raw(r) => assert_eq!(r.content_bytes(), vec![0x1f, 0x8b]),
            other => panic!("expected raw response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handler_error_propagates() {
        let admin = admin_with(ToolDescriptor::from_fn("tool", |_, _, _| {
            Err(object_tool_core::ObjectToolError::BadRequest(
                "boom".to_string(),
            ))
        }));
        let registry = ToolRegistry::new();
        let store = InMemoryObjectStore::new();
        let actor = Actor::superuser("root");

        let err = dispatch(
            &admin,
            &registry,
            &store,
            &actor,
            &post_request(),
            "tool",
            None,
            None,
            &settings(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_post_tool_url_precedence() {
        let admin = ResourceAdmin::new("auth", "user");
        let settings = settings();

        // Origin field wins.
        let request = ToolRequest::builder()
            .post_param("_objecttool_origin", "/admin/auth/user/?o=1")
            .referer("http://testserver/other/")
            .build();
        assert_eq!(
            post_tool_url(&admin, &request, None, &settings),
            "/admin/auth/user/?o=1"
        );

        // Then the referer.
        let request = ToolRequest::builder()
            .referer("http://testserver/admin/auth/user/")
            .build();
        assert_eq!(
            post_tool_url(&admin, &request, None, &settings),
            "http://testserver/admin/auth/user/"
        );

        // Then the recomputed resource URL.
        let request = ToolRequest::builder().build();
        assert_eq!(
            post_tool_url(&admin, &request, None, &settings),
            "/admin/auth/user/"
        );
        assert_eq!(
            post_tool_url(&admin, &request, Some("3"), &settings),
            "/admin/auth/user/3/change/"
        );
    }

    #[test]
    fn test_post_tool_url_preserves_filters() {
        let admin = ResourceAdmin::new("auth", "user");
        let request = ToolRequest::builder()
            .query_string("_changelist_filters=o%3D1%26q%3Dalice")
            .build();
        assert_eq!(
            post_tool_url(&admin, &request, None, &settings()),
            "/admin/auth/user/?o=1&q=alice"
        );
    }
}
