//! Axum route glue for the tool endpoints.
//!
//! Supports both invocation encodings: the path-encoded form
//! (`.../objecttool/{action}/`) and the field-encoded form (a POST to the
//! list/detail URL carrying an `object-tool` field). Template responses
//! serialize to JSON (template name plus context) for a frontend renderer.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use http::StatusCode;
use tracing::Instrument;

use object_tool_core::logging::dispatch_span;
use object_tool_core::ToolResult;
use object_tool_http::{HttpResponse, HttpResponseRedirect, JsonResponse, ToolRequest};

use crate::actor::Actor;
use crate::dispatch::ToolResponse;
use crate::registry::ViewScope;
use crate::site::AdminSite;

/// The form field naming the tool in a field-encoded invocation.
pub const OBJECT_TOOL_FIELD: &str = "object-tool";

/// Maximum accepted form payload size.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Resolves the current actor for a request.
///
/// Identity lives in the host framework; this seam lets deployments plug
/// their session/token machinery in.
pub trait ActorResolver: Send + Sync {
    /// Returns the actor the request runs as.
    fn resolve(&self, request: &ToolRequest) -> Actor;
}

/// Development resolver: every request runs as a superuser.
#[derive(Debug, Clone, Copy)]
pub struct DevActorResolver;

impl ActorResolver for DevActorResolver {
    fn resolve(&self, _request: &ToolRequest) -> Actor {
        Actor::superuser("admin")
    }
}

/// Builds the router for an admin site.
pub fn router(site: AdminSite) -> Router {
    let state = Arc::new(site);
    Router::new()
        .route("/{app}/{model}/", post(field_encoded_list))
        .route("/{app}/{model}/tools/", get(list_view_tools))
        .route(
            "/{app}/{model}/objecttool/{action}/",
            get(path_encoded_list).post(path_encoded_list),
        )
        .route("/{app}/{model}/{id}/change/", post(field_encoded_change))
        .route("/{app}/{model}/{id}/tools/", get(change_view_tools))
        .route(
            "/{app}/{model}/{id}/objecttool/{action}/",
            get(path_encoded_change).post(path_encoded_change),
        )
        .with_state(state)
}

async fn path_encoded_list(
    State(site): State<Arc<AdminSite>>,
    Path((app, model, action)): Path<(String, String, String)>,
    req: axum::extract::Request,
) -> axum::response::Response {
    invoke(&site, &app, &model, &action, None, req).await
}

async fn path_encoded_change(
    State(site): State<Arc<AdminSite>>,
    Path((app, model, id, action)): Path<(String, String, String, String)>,
    req: axum::extract::Request,
) -> axum::response::Response {
    invoke(&site, &app, &model, &action, Some(id), req).await
}

async fn field_encoded_list(
    State(site): State<Arc<AdminSite>>,
    Path((app, model)): Path<(String, String)>,
    req: axum::extract::Request,
) -> axum::response::Response {
    field_encoded(&site, &app, &model, None, req).await
}

async fn field_encoded_change(
    State(site): State<Arc<AdminSite>>,
    Path((app, model, id)): Path<(String, String, String)>,
    req: axum::extract::Request,
) -> axum::response::Response {
    field_encoded(&site, &app, &model, Some(id), req).await
}

async fn list_view_tools(
    State(site): State<Arc<AdminSite>>,
    Path((app, model)): Path<(String, String)>,
    req: axum::extract::Request,
) -> axum::response::Response {
    tools_listing(&site, &app, &model, ViewScope::ChangeList, req).await
}

async fn change_view_tools(
    State(site): State<Arc<AdminSite>>,
    Path((app, model, _id)): Path<(String, String, String)>,
    req: axum::extract::Request,
) -> axum::response::Response {
    tools_listing(&site, &app, &model, ViewScope::Change, req).await
}

/// Handles a field-encoded invocation: the action name arrives in the
/// `object-tool` form field against the plain list/detail URL.
async fn field_encoded(
    site: &AdminSite,
    app: &str,
    model: &str,
    target_id: Option<String>,
    req: axum::extract::Request,
) -> axum::response::Response {
    let Some(request) = read_request(req).await else {
        return HttpResponse::bad_request("unreadable request body").into_response();
    };
    let Some(action) = request.post().get(OBJECT_TOOL_FIELD).map(String::from) else {
        return HttpResponse::bad_request(format!("missing '{OBJECT_TOOL_FIELD}' field"))
            .into_response();
    };
    dispatch_and_convert(site, app, model, &action, target_id, request).await
}

async fn invoke(
    site: &AdminSite,
    app: &str,
    model: &str,
    action: &str,
    target_id: Option<String>,
    req: axum::extract::Request,
) -> axum::response::Response {
    let Some(request) = read_request(req).await else {
        return HttpResponse::bad_request("unreadable request body").into_response();
    };
    dispatch_and_convert(site, app, model, action, target_id, request).await
}

async fn dispatch_and_convert(
    site: &AdminSite,
    app: &str,
    model: &str,
    action: &str,
    target_id: Option<String>,
    request: ToolRequest,
) -> axum::response::Response {
    let model_key = format!("{app}.{model}");
    let actor = site.actor_resolver().resolve(&request);
    let result = site
        .dispatch(
            &model_key,
            action,
            &actor,
            &request,
            target_id.as_deref(),
            None,
        )
        .instrument(dispatch_span(&model_key, action))
        .await;
    into_axum(result)
}

async fn tools_listing(
    site: &AdminSite,
    app: &str,
    model: &str,
    view: ViewScope,
    req: axum::extract::Request,
) -> axum::response::Response {
    let Some(request) = read_request(req).await else {
        return HttpResponse::bad_request("unreadable request body").into_response();
    };
    let actor = site.actor_resolver().resolve(&request);
    let model_key = format!("{app}.{model}");
    match site.tools_context(&model_key, &actor, &request, view) {
        Ok(context) => JsonResponse::new(&context).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Reads the request head and body into a [`ToolRequest`].
async fn read_request(req: axum::extract::Request) -> Option<ToolRequest> {
    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES).await.ok()?;
    Some(ToolRequest::from_axum(parts, &bytes))
}

/// Converts a dispatch result into the wire response.
fn into_axum(result: ToolResult<ToolResponse>) -> axum::response::Response {
    match result {
        Ok(ToolResponse::Redirect(url)) => HttpResponseRedirect::new(&url).into_response(),
        Ok(ToolResponse::Template(template)) => JsonResponse::new(&serde_json::json!({
            "template_name": template.template_name,
            "context": template.context,
        }))
        .into_response(),
        Ok(ToolResponse::Raw(response)) => response.into_response(),
        Err(e) => error_response(&e),
    }
}

fn error_response(error: &object_tool_core::ObjectToolError) -> axum::response::Response {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    JsonResponse::with_status(
        status,
        &serde_json::json!({ "error": error.to_string() }),
    )
    .into_response()
}
