//! Text helpers for deriving display strings from tool names.

/// Capitalizes the first character of a string.
///
/// # Examples
///
/// ```
/// use object_tool_core::text::capfirst;
///
/// assert_eq!(capfirst("make handsome"), "Make handsome");
/// assert_eq!(capfirst(""), "");
/// ```
pub fn capfirst(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Expands an identifier-style name into words: underscores become spaces.
///
/// # Examples
///
/// ```
/// use object_tool_core::text::humanize;
///
/// assert_eq!(humanize("make_handsome"), "make handsome");
/// ```
pub fn humanize(name: &str) -> String {
    name.replace('_', " ")
}
