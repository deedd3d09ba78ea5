//! The inbound request context for tool collection and dispatch.
//!
//! [`ToolRequest`] carries exactly what the subsystem reads per request:
//! the method, path, GET/POST parameters, headers, server metadata, and a
//! per-request [`MessageStorage`](object_tool_core::messages::MessageStorage)
//! tool handlers write notifications into. Instances are built from an Axum
//! request via [`ToolRequest::from_axum`], or via the builder in tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use http::{HeaderMap, Method};

use object_tool_core::messages::MessageStorage;

use crate::querydict::QueryDict;

/// An inbound HTTP request, reduced to the parts tool collection and
/// dispatch consume.
///
/// # Examples
///
/// ```
/// use object_tool_http::ToolRequest;
///
/// let request = ToolRequest::builder()
///     .method(http::Method::GET)
///     .path("/admin/blog/article/")
///     .query_string("page=2")
///     .build();
///
/// assert_eq!(request.get().get("page"), Some("2"));
/// assert_eq!(request.get_full_path(), "/admin/blog/article/?page=2");
/// ```
#[derive(Debug)]
pub struct ToolRequest {
    method: Method,
    path: String,
    query_string: String,
    get: QueryDict,
    post: QueryDict,
    headers: HeaderMap,
    meta: HashMap<String, String>,
    messages: Mutex<MessageStorage>,
}

impl ToolRequest {
    /// Creates a new [`ToolRequestBuilder`].
    pub fn builder() -> ToolRequestBuilder {
        ToolRequestBuilder::default()
    }

    /// Creates a `ToolRequest` from an Axum/hyper request head and its body
    /// bytes. Form-encoded bodies populate the POST dictionary.
    pub fn from_axum(parts: http::request::Parts, body: &[u8]) -> Self {
        let path = parts.uri.path().to_string();
        let query_string = parts.uri.query().unwrap_or("").to_string();
        let get = QueryDict::parse(&query_string);

        let is_form = parts
            .headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
        let post = if is_form {
            QueryDict::parse(&String::from_utf8_lossy(body))
        } else {
            QueryDict::new()
        };

        let mut meta = HashMap::new();
        for (name, value) in &parts.headers {
            if let Ok(v) = value.to_str() {
                let meta_key = format!("HTTP_{}", name.as_str().to_uppercase().replace('-', "_"));
                meta.insert(meta_key, v.to_string());
            }
        }
        meta.insert("REQUEST_METHOD".to_string(), parts.method.to_string());
        meta.insert("PATH_INFO".to_string(), path.clone());
        meta.insert("QUERY_STRING".to_string(), query_string.clone());

        Self {
            method: parts.method,
            path,
            query_string,
            get,
            post,
            headers: parts.headers,
            meta,
            messages: Mutex::new(MessageStorage::new()),
        }
    }

    /// Returns the HTTP method.
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns `true` if the method is safe (GET or HEAD).
    pub fn is_safe_method(&self) -> bool {
        self.method == Method::GET || self.method == Method::HEAD
    }

    /// Returns the request path (without query string).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the raw query string (without the leading `?`).
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Returns the GET query parameters.
    pub const fn get(&self) -> &QueryDict {
        &self.get
    }

    /// Returns the POST form parameters.
    pub const fn post(&self) -> &QueryDict {
        &self.post
    }

    /// Returns the request headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the META dictionary (`REQUEST_METHOD`, `HTTP_*` headers, etc.).
    pub const fn meta(&self) -> &HashMap<String, String> {
        &self.meta
    }

    /// Returns the full path including the query string.
    pub fn get_full_path(&self) -> String {
        if self.query_string.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query_string)
        }
    }

    /// Returns the per-request message storage.
    ///
    /// Handlers use this to record one-time notifications:
    ///
    /// ```
    /// use object_tool_http::ToolRequest;
    ///
    /// let request = ToolRequest::builder().build();
    /// request.messages().success("saved");
    /// assert_eq!(request.messages().len(), 1);
    /// ```
    pub fn messages(&self) -> MutexGuard<'_, MessageStorage> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Builder for [`ToolRequest`] instances, used primarily in tests.
#[derive(Debug, Default)]
pub struct ToolRequestBuilder {
    method: Option<Method>,
    path: String,
    query_string: String,
    post: Vec<(String, String)>,
    headers: HeaderMap,
    meta: HashMap<String, String>,
}

impl ToolRequestBuilder {
    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the request path.
    #[must_use]
    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Sets the raw query string.
    #[must_use]
    pub fn query_string(mut self, query_string: &str) -> Self {
        self.query_string = query_string.to_string();
        self
    }

    /// Adds one POST form parameter. Implies method POST unless a method
    /// was set explicitly.
    #[must_use]
    pub fn post_param(mut self, key: &str, value: &str) -> Self {
        self.post.push((key.to_string(), value.to_string()));
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: http::header::HeaderName, value: &str) -> Self {
        if let Ok(v) = http::HeaderValue::from_str(value) {
            self.headers.insert(name, v);
        }
        self
    }

    /// Sets the `Referer` header.
    #[must_use]
    pub fn referer(self, url: &str) -> Self {
        self.header(http::header::REFERER, url)
    }

    /// Adds a META entry.
    #[must_use]
    pub fn meta(mut self, key: &str, value: &str) -> Self {
        self.meta.insert(key.to_string(), value.to_string());
        self
    }

    /// Builds the request.
    pub fn build(self) -> ToolRequest {
        let method = self.method.unwrap_or(if self.post.is_empty() {
            Method::GET
        } else {
            Method::POST
        });

        let path = if self.path.is_empty() {
            "/".to_string()
        } else {
            self.path
        };

        let mut post = QueryDict::new_mutable();
        for (key, value) in &self.post {
            let _ = post.append(key, value);
        }

        let mut meta = self.meta;
        for (name, value) in &self.headers {
            if let Ok(v) = value.to_str() {
                let meta_key = format!("HTTP_{}", name.as_str().to_uppercase().replace('-', "_"));
                meta.entry(meta_key).or_insert_with(|| v.to_string());
            }
        }
        meta.insert("REQUEST_METHOD".to_string(), method.to_string());
        meta.insert("PATH_INFO".to_string(), path.clone());
        meta.insert("QUERY_STRING".to_string(), self.query_string.clone());

        ToolRequest {
            method,
            path,
            get: QueryDict::parse(&self.query_string),
            query_string: self.query_string,
            post,
            headers: self.headers,
            meta,
            messages: Mutex::new(MessageStorage::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let request = ToolRequest::builder().build();
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.path(), "/");
        assert!(request.get().is_empty());
        assert!(request.post().is_empty());
    }

    #[test]
    fn test_post_param_implies_post_method() {
        let request = ToolRequest::builder()
            .path("/admin/blog/article/")
            .post_param("confirm", "1")
            .build();
        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.post().get("confirm"), Some("1"));
    }

    #[test]
    fn test_is_safe_method() {
        let get = ToolRequest::builder().method(Method::GET).build();
        assert!(get.is_safe_method());
        let head = ToolRequest::builder().method(Method::HEAD).build();
        assert!(head.is_safe_method());
        let post = ToolRequest::builder().method(Method::POST).build();
        assert!(!post.is_safe_method());
    }

    #[test]
    fn test_referer_lands_in_headers_and_meta() {
        let request = ToolRequest::builder()
            .referer("http://testserver/admin/blog/article/")
            .build();
        assert_eq!(
            request
                .headers()
                .get(http::header::REFERER)
                .and_then(|v| v.to_str().ok()),
            Some("http://testserver/admin/blog/article/")
        );
        assert_eq!(
            request.meta().get("HTTP_REFERER").map(String::as_str),
            Some("http://testserver/admin/blog/article/")
        );
    }

    #[test]
    fn test_get_full_path() {
        let request = ToolRequest::builder()
            .path("/admin/blog/article/")
            .query_string("o=1&q=rust")
            .build();
        assert_eq!(request.get_full_path(), "/admin/blog/article/?o=1&q=rust");
    }

    #[test]
    fn test_messages_storage() {
        let request = ToolRequest::builder().build();
        request.messages().info("hello");
        request.messages().success("done");
        let drained = request.messages().drain();
        assert_eq!(drained.len(), 2);
        assert!(request.messages().is_empty());
    }

    #[test]
    fn test_from_axum_parses_form_body() {
        let req = http::Request::builder()
            .method(Method::POST)
            .uri("/admin/blog/article/objecttool/publish/?page=2")
            .header(
                http::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(())
            .unwrap();
        let (parts, ()) = req.into_parts();

        let request = ToolRequest::from_axum(parts, b"confirm=1&text=hello+world");
        assert_eq!(request.path(), "/admin/blog/article/objecttool/publish/");
        assert_eq!(request.get().get("page"), Some("2"));
        assert_eq!(request.post().get("confirm"), Some("1"));
        assert_eq!(request.post().get("text"), Some("hello world"));
        assert_eq!(
            request.meta().get("REQUEST_METHOD").map(String::as_str),
            Some("POST")
        );
    }
}
