//! The object-lookup collaborator.
//!
//! Resolving a target id to a concrete object is the persistence layer's
//! job; [`ObjectStore`] is the seam it plugs into. [`InMemoryObjectStore`]
//! backs tests and development setups.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use object_tool_core::{ObjectToolError, ToolResult};

use crate::resource::ResourceAdmin;

/// Looks up the target object for an object-level tool invocation.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns the object with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectToolError::NotFound`] for an unknown id.
    async fn get_object(
        &self,
        admin: &ResourceAdmin,
        object_id: &str,
    ) -> ToolResult<serde_json::Value>;
}

/// A simple in-memory object store keyed by `(model_key, object_id)`.
///
/// # Examples
///
/// ```
/// use object_tool_admin::resource::ResourceAdmin;
/// use object_tool_admin::store::{InMemoryObjectStore, ObjectStore};
///
/// # tokio_test::block_on(async {
/// let store = InMemoryObjectStore::new();
/// store.insert("blog.article", "1", serde_json::json!({"id": 1, "title": "First"}));
///
/// let admin = ResourceAdmin::new("blog", "article");
/// let obj = store.get_object(&admin, "1").await.unwrap();
/// assert_eq!(obj["title"], "First");
/// # });
/// ```
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<String, Vec<(String, serde_json::Value)>>>,
}

impl InMemoryObjectStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts (or replaces) an object.
    pub fn insert(&self, model_key: &str, object_id: &str, object: serde_json::Value) {
        let mut objects = self
            .objects
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let entries = objects.entry(model_key.to_string()).or_default();
        if let Some(entry) = entries.iter_mut().find(|(id, _)| id == object_id) {
            entry.1 = object;
        } else {
            entries.push((object_id.to_string(), object));
        }
    }

    /// Returns the number of objects stored for a resource.
    pub fn count(&self, model_key: &str) -> usize {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(model_key)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get_object(
        &self,
        admin: &ResourceAdmin,
        object_id: &str,
    ) -> ToolResult<serde_json::Value> {
        let objects = self
            .objects
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        objects
            .get(&admin.model_key())
            .and_then(|entries| entries.iter().find(|(id, _)| id == object_id))
            .map(|(_, obj)| obj.clone())
            .ok_or_else(|| {
                ObjectToolError::NotFound(format!(
                    "{} object with id '{object_id}'",
                    admin.model_key()
                ))
            })
    }
}

/// Returns a display representation for a target object: the `__str__`
/// field if present, then `title`, then `name`, then the id, then a
/// generic fallback.
pub fn object_repr(object: &serde_json::Value) -> String {
    for key in ["__str__", "title", "name"] {
        if let Some(value) = object.get(key).and_then(serde_json::Value::as_str) {
            return value.to_string();
        }
    }
    if let Some(id) = object.get("id") {
        return match id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
    }
    "object".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = InMemoryObjectStore::new();
        store.insert("auth.user", "1", serde_json::json!({"id": 1, "name": "alice"}));
        store.insert("auth.user", "2", serde_json::json!({"id": 2, "name": "bob"}));
        assert_eq!(store.count("auth.user"), 2);

        let admin = ResourceAdmin::new("auth", "user");
        let obj = store.get_object(&admin, "2").await.unwrap();
        assert_eq!(obj["name"], "bob");
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_not_found() {
        let store = InMemoryObjectStore::new();
        let admin = ResourceAdmin::new("auth", "user");
        let err = store.get_object(&admin, "99").await.unwrap_err();
        assert!(matches!(err, ObjectToolError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_insert_replaces_existing() {
        let store = InMemoryObjectStore::new();
        store.insert("auth.user", "1", serde_json::json!({"id": 1, "name": "alice"}));
        store.insert("auth.user", "1", serde_json::json!({"id": 1, "name": "alicia"}));
        assert_eq!(store.count("auth.user"), 1);

        let admin = ResourceAdmin::new("auth", "user");
        let obj = store.get_object(&admin, "1").await.unwrap();
        assert_eq!(obj["name"], "alicia");
    }

    #[test]
    fn test_object_repr_fallbacks() {
        assert_eq!(
            object_repr(&serde_json::json!({"__str__": "Article: First"})),
            "Article: First"
        );
        assert_eq!(object_repr(&serde_json::json!({"title": "First"})), "First");
        assert_eq!(object_repr(&serde_json::json!({"name": "alice"})), "alice");
        assert_eq!(object_repr(&serde_json::json!({"id": 7})), "7");
        assert_eq!(object_repr(&serde_json::json!({"id": "abc"})), "abc");
        assert_eq!(object_repr(&serde_json::json!({})), "object");
    }
}
