//! HTTP response types.
//!
//! [`HttpResponse`] is the passthrough response shape: handlers that take
//! full control of the response (a file download, a custom status) return
//! one of these, and the dispatcher forwards it unchanged. Status-response
//! constructors cover the request-shape failures the dispatcher converts to
//! plain HTTP statuses.

use axum::response::IntoResponse;
use http::{HeaderMap, HeaderValue, StatusCode};

/// The body content of a response.
#[derive(Debug, Clone)]
pub enum ResponseContent {
    /// UTF-8 text.
    Text(String),
    /// Raw bytes (e.g. a file download).
    Bytes(Vec<u8>),
}

/// An HTTP response with status, headers, content type, and body.
///
/// # Examples
///
/// ```
/// use object_tool_http::HttpResponse;
///
/// let response = HttpResponse::ok("Hello");
/// assert_eq!(response.status(), http::StatusCode::OK);
/// ```
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    content: ResponseContent,
    content_type: String,
}

impl HttpResponse {
    /// Creates a new response with the given status code and text body.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            content: ResponseContent::Text(body.into()),
            content_type: "text/html; charset=utf-8".to_string(),
        }
    }

    /// Creates a new response with the given status code and byte body.
    pub fn with_bytes(status: StatusCode, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            content: ResponseContent::Bytes(body),
            content_type: "application/octet-stream".to_string(),
        }
    }

    /// Creates a 200 OK response.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Creates a 403 Forbidden response.
    pub fn forbidden(body: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, body)
    }

    /// Creates a 404 Not Found response.
    pub fn not_found(body: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, body)
    }

    /// Creates a 400 Bad Request response.
    pub fn bad_request(body: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, body)
    }

    /// Creates a 405 Method Not Allowed response listing the permitted
    /// methods in the `Allow` header.
    pub fn not_allowed(permitted_methods: &[&str]) -> Self {
        let allow = permitted_methods.join(", ");
        let mut response = Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            format!("Method Not Allowed. Permitted: {allow}"),
        );
        if let Ok(value) = HeaderValue::from_str(&allow) {
            response.headers.insert(http::header::ALLOW, value);
        }
        response
    }

    /// Returns the status code.
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a mutable reference to the headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns the content type.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Sets the content type.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    /// Returns the body content.
    pub const fn content(&self) -> &ResponseContent {
        &self.content
    }

    /// Returns the body as bytes.
    pub fn content_bytes(&self) -> Vec<u8> {
        match &self.content {
            ResponseContent::Text(t) => t.as_bytes().to_vec(),
            ResponseContent::Bytes(b) => b.clone(),
        }
    }

    /// Returns the `Location` header value, if any.
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(http::header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> axum::response::Response {
        let mut builder = axum::response::Response::builder().status(self.status);
        if let Ok(ct) = HeaderValue::from_str(&self.content_type) {
            builder = builder.header(http::header::CONTENT_TYPE, ct);
        }

        let body = match self.content {
            ResponseContent::Text(text) => axum::body::Body::from(text),
            ResponseContent::Bytes(bytes) => axum::body::Body::from(bytes),
        };
        let response = builder.body(body).unwrap_or_else(|_| {
            axum::response::Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(axum::body::Body::from("Internal Server Error"))
                .expect("fallback response should always be valid")
        });

        let (mut parts, body) = response.into_parts();
        for (key, value) in &self.headers {
            parts.headers.insert(key, value.clone());
        }
        axum::response::Response::from_parts(parts, body)
    }
}

/// A 302 Found redirect response.
pub struct HttpResponseRedirect;

impl HttpResponseRedirect {
    /// Creates a 302 Found redirect to the given URL.
    pub fn new(url: &str) -> HttpResponse {
        let mut response = HttpResponse::new(StatusCode::FOUND, "");
        if let Ok(value) = HeaderValue::from_str(url) {
            response.headers.insert(http::header::LOCATION, value);
        }
        response
    }
}

/// A JSON response.
pub struct JsonResponse;

impl JsonResponse {
    /// Creates a 200 OK JSON response from a serializable value.
    pub fn new<T: serde::Serialize>(data: &T) -> HttpResponse {
        Self::with_status(StatusCode::OK, data)
    }

    /// Creates a JSON response with a custom status code.
    pub fn with_status<T: serde::Serialize>(status: StatusCode, data: &T) -> HttpResponse {
        match serde_json::to_string(data) {
            Ok(json) => {
                let mut response = HttpResponse::new(status, json);
                response.set_content_type("application/json");
                response
            }
            Err(e) => HttpResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("JSON serialization error: {e}"),
            ),
        }
    }
}
