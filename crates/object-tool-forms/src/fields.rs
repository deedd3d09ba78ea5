//! Form field definitions.
//!
//! Each [`FormFieldDef`] describes a single field: its type, whether it is
//! required, and its display metadata. The type-specific parsing and
//! coercion rules live in [`crate::validation`].

use object_tool_core::text::humanize;

/// The type of a form field, carrying type-specific validation parameters.
#[derive(Debug, Clone)]
pub enum FormFieldType {
    /// A character (string) field.
    Char {
        /// Minimum length in characters.
        min_length: Option<usize>,
        /// Maximum length in characters.
        max_length: Option<usize>,
        /// Whether to strip leading/trailing whitespace before validation.
        strip: bool,
    },
    /// An integer field.
    Integer {
        /// Minimum allowed value.
        min_value: Option<i64>,
        /// Maximum allowed value.
        max_value: Option<i64>,
    },
    /// A floating-point field.
    Float {
        /// Minimum allowed value.
        min_value: Option<f64>,
        /// Maximum allowed value.
        max_value: Option<f64>,
    },
    /// A boolean field. Unchecked checkboxes submit nothing, so a missing
    /// value cleans to `false` rather than failing the required check.
    Boolean,
    /// An email address field.
    Email,
    /// A single-choice field.
    Choice {
        /// Available choices as `(value, display_label)` pairs.
        choices: Vec<(String, String)>,
    },
}

impl FormFieldType {
    /// A character field with no length bounds.
    pub const fn char() -> Self {
        Self::Char {
            min_length: None,
            max_length: None,
            strip: true,
        }
    }

    /// An integer field with no bounds.
    pub const fn integer() -> Self {
        Self::Integer {
            min_value: None,
            max_value: None,
        }
    }
}

/// Complete definition of a single form field.
#[derive(Debug, Clone)]
pub struct FormFieldDef {
    /// The field name (HTML name attribute).
    pub name: String,
    /// The field type, controlling parsing and coercion.
    pub field_type: FormFieldType,
    /// Whether this field is required.
    pub required: bool,
    /// Initial value used when the field is omitted from a submission.
    pub initial: Option<serde_json::Value>,
    /// Human-readable label.
    pub label: String,
    /// Help text displayed alongside the field.
    pub help_text: String,
}

impl FormFieldDef {
    /// Creates a new field definition. The field is required by default and
    /// its label is derived from the name.
    pub fn new(name: impl Into<String>, field_type: FormFieldType) -> Self {
        let name = name.into();
        let label = humanize(&name);
        Self {
            name,
            field_type,
            required: true,
            initial: None,
            label,
            help_text: String::new(),
        }
    }

    /// Marks this field as optional.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Sets the initial value.
    #[must_use]
    pub fn initial(mut self, value: serde_json::Value) -> Self {
        self.initial = Some(value);
        self
    }

    /// Sets the human-readable label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the help text.
    #[must_use]
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = text.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults() {
        let field = FormFieldDef::new("first_name", FormFieldType::char());
        assert_eq!(field.name, "first_name");
        assert_eq!(field.label, "first name");
        assert!(field.required);
        assert!(field.initial.is_none());
        assert!(field.help_text.is_empty());
    }

    #[test]
    fn test_builder() {
        let field = FormFieldDef::new("age", FormFieldType::integer())
            .optional()
            .label("Age in years")
            .help_text("Whole years only")
            .initial(serde_json::json!(18));
        assert!(!field.required);
        assert_eq!(field.label, "Age in years");
        assert_eq!(field.help_text, "Whole years only");
        assert_eq!(field.initial, Some(serde_json::json!(18)));
    }

    #[test]
    fn test_char_shorthand_strips() {
        match FormFieldType::char() {
            FormFieldType::Char { strip, .. } => assert!(strip),
            _ => panic!("expected Char"),
        }
    }
}
