//! Query string dictionary for request parameters.
//!
//! [`QueryDict`] is a multi-value, immutable-by-default dictionary for GET
//! and POST parameters. Parsing handles percent-encoding and `+`-encoded
//! spaces; [`QueryDict::copy`] returns a mutable clone for code that needs
//! to amend a parameter set.

use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};

use object_tool_core::{ObjectToolError, ToolResult};

/// A multi-value dictionary for query string and form data.
///
/// Immutable by default; mutation on an immutable instance fails with
/// [`ObjectToolError::SuspiciousOperation`].
///
/// # Examples
///
/// ```
/// use object_tool_http::QueryDict;
///
/// let qd = QueryDict::parse("color=red&color=blue&size=large");
/// assert_eq!(qd.get("color"), Some("blue"));
/// assert_eq!(qd.get_list("color").unwrap().len(), 2);
///
/// let mut mutable = qd.copy();
/// mutable.set("color", "green").unwrap();
/// assert_eq!(mutable.get("color"), Some("green"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryDict {
    // Insertion-ordered: (key, values) pairs, one entry per distinct key.
    entries: Vec<(String, Vec<String>)>,
    mutable: bool,
}

impl QueryDict {
    /// Creates a new, empty, immutable `QueryDict`.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            mutable: false,
        }
    }

    /// Creates a new, empty, mutable `QueryDict`.
    pub fn new_mutable() -> Self {
        Self {
            entries: Vec::new(),
            mutable: true,
        }
    }

    /// Parses a URL-encoded string (`"key1=val1&key2=val2"`) into an
    /// immutable `QueryDict`. Supports multiple values per key.
    pub fn parse(query_string: &str) -> Self {
        let mut dict = Self::new_mutable();

        for pair in query_string.split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair
                .find('=')
                .map_or((pair, ""), |eq| (&pair[..eq], &pair[eq + 1..]));
            let _ = dict.append(&decode_component(key), &decode_component(value));
        }

        dict.mutable = false;
        dict
    }

    /// Returns the last value for the given key, or `None` if absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, values)| values.last())
            .map(String::as_str)
    }

    /// Returns all values for the given key, or `None` if absent.
    pub fn get_list(&self, key: &str) -> Option<&Vec<String>> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values)
    }

    /// Returns `true` if the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Returns the keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Sets a single value for the key, replacing any existing values.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectToolError::SuspiciousOperation`] if this instance is
    /// immutable.
    pub fn set(&mut self, key: &str, value: &str) -> ToolResult<()> {
        self.check_mutable()?;
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1 = vec![value.to_string()];
        } else {
            self.entries
                .push((key.to_string(), vec![value.to_string()]));
        }
        Ok(())
    }

    /// Appends a value to the list for the key.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectToolError::SuspiciousOperation`] if this instance is
    /// immutable.
    pub fn append(&mut self, key: &str, value: &str) -> ToolResult<()> {
        self.check_mutable()?;
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1.push(value.to_string());
        } else {
            self.entries
                .push((key.to_string(), vec![value.to_string()]));
        }
        Ok(())
    }

    /// Returns a mutable clone of this dictionary.
    pub fn copy(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            mutable: true,
        }
    }

    /// Returns the parameters re-encoded as a URL query string, preserving
    /// key order and repeated values.
    pub fn urlencode(&self) -> String {
        let mut parts = Vec::new();
        for (key, values) in &self.entries {
            for value in values {
                parts.push(format!(
                    "{}={}",
                    utf8_percent_encode(key, NON_ALPHANUMERIC),
                    utf8_percent_encode(value, NON_ALPHANUMERIC)
                ));
            }
        }
        parts.join("&")
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no parameters are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_mutable(&self) -> ToolResult<()> {
        if self.mutable {
            Ok(())
        } else {
            Err(ObjectToolError::SuspiciousOperation(
                "This QueryDict instance is immutable".to_string(),
            ))
        }
    }
}

/// Decodes one percent-encoded query component; `+` counts as a space.
fn decode_component(raw: &str) -> String {
    let plus_decoded = raw.replace('+', " ");
    percent_decode_str(&plus_decoded)
        .decode_utf8_lossy()
        .into_owned()
}
