//! Form trait and `BaseForm` implementation.
//!
//! [`Form`] is the abstraction form tools program against: bind a request
//! payload, validate, read cleaned data, and produce a template context.
//! Validation is async so implementations can hit external systems for
//! cross-field checks (uniqueness, foreign references), matching the rest
//! of the subsystem's async seams.

use std::collections::HashMap;

use async_trait::async_trait;

use object_tool_http::QueryDict;

use crate::fields::FormFieldDef;
use crate::validation;

/// The core form trait.
///
/// Implementations must be `Send + Sync` so bound forms can cross async
/// task boundaries during dispatch.
#[async_trait]
pub trait Form: Send + Sync {
    /// Returns the form's field definitions.
    fn fields(&self) -> &[FormFieldDef];

    /// Binds raw submitted data to this form.
    fn bind(&mut self, data: &QueryDict);

    /// Returns `true` if this form has been bound to data.
    fn is_bound(&self) -> bool;

    /// Validates the form. Returns `true` if valid; afterwards
    /// [`errors`](Form::errors) and [`cleaned_data`](Form::cleaned_data)
    /// are populated. An unbound form is never valid.
    async fn is_valid(&mut self) -> bool;

    /// Returns per-field validation errors, keyed by field name. Form-level
    /// errors use the `"__all__"` key.
    fn errors(&self) -> &HashMap<String, Vec<String>>;

    /// Returns the cleaned (validated and coerced) data.
    fn cleaned_data(&self) -> &HashMap<String, serde_json::Value>;

    /// Generates the template context for rendering: field metadata,
    /// submitted values, and error lists as a JSON object.
    fn as_context(&self) -> serde_json::Value;

    /// Cross-field validation hook. The default implementation accepts.
    async fn clean(
        &self,
        _cleaned: &HashMap<String, serde_json::Value>,
    ) -> Result<(), HashMap<String, Vec<String>>> {
        Ok(())
    }
}

/// A general-purpose [`Form`] built from a list of field definitions.
///
/// # Examples
///
/// ```
/// use object_tool_forms::{BaseForm, Form, FormFieldDef, FormFieldType};
/// use object_tool_http::QueryDict;
///
/// # tokio_test::block_on(async {
/// let mut form = BaseForm::new(vec![
///     FormFieldDef::new("text", FormFieldType::char()),
/// ]);
/// form.bind(&QueryDict::parse("text=hello"));
/// assert!(form.is_valid().await);
/// assert_eq!(form.cleaned_data()["text"], serde_json::json!("hello"));
/// # });
/// ```
#[derive(Debug, Default)]
pub struct BaseForm {
    field_defs: Vec<FormFieldDef>,
    bound: bool,
    raw_data: HashMap<String, Option<String>>,
    errors: HashMap<String, Vec<String>>,
    cleaned_data: HashMap<String, serde_json::Value>,
}

impl BaseForm {
    /// Creates a new unbound form with the given field definitions.
    pub fn new(fields: Vec<FormFieldDef>) -> Self {
        Self {
            field_defs: fields,
            bound: false,
            raw_data: HashMap::new(),
            errors: HashMap::new(),
            cleaned_data: HashMap::new(),
        }
    }

    /// Returns the form-level (non-field) errors.
    pub fn non_field_errors(&self) -> &[String] {
        self.errors.get("__all__").map_or(&[], Vec::as_slice)
    }
}

#[async_trait]
impl Form for BaseForm {
    fn fields(&self) -> &[FormFieldDef] {
        &self.field_defs
    }

    fn bind(&mut self, data: &QueryDict) {
        self.bound = true;
        self.raw_data.clear();
        self.errors.clear();
        self.cleaned_data.clear();

        for field in &self.field_defs {
            let value = data.get(&field.name).map(String::from);
            self.raw_data.insert(field.name.clone(), value);
        }
    }

    fn is_bound(&self) -> bool {
        self.bound
    }

    async fn is_valid(&mut self) -> bool {
        if !self.bound {
            return false;
        }

        self.errors.clear();
        self.cleaned_data.clear();

        validation::clean_fields(
            &self.field_defs,
            &self.raw_data,
            &mut self.cleaned_data,
            &mut self.errors,
        );

        if let Err(form_errors) = self.clean(&self.cleaned_data).await {
            for (key, msgs) in form_errors {
                self.errors.entry(key).or_default().extend(msgs);
            }
        }

        self.errors.is_empty()
    }

    fn errors(&self) -> &HashMap<String, Vec<String>> {
        &self.errors
    }

    fn cleaned_data(&self) -> &HashMap<String, serde_json::Value> {
        &self.cleaned_data
    }

    fn as_context(&self) -> serde_json::Value {
        let fields: Vec<serde_json::Value> = self
            .field_defs
            .iter()
            .map(|field| {
                let value = self
                    .raw_data
                    .get(&field.name)
                    .cloned()
                    .flatten()
                    .map_or(serde_json::Value::Null, serde_json::Value::String);
                let errors = self.errors.get(&field.name).cloned().unwrap_or_default();
                serde_json::json!({
                    "name": field.name,
                    "label": field.label,
                    "help_text": field.help_text,
                    "required": field.required,
                    "value": value,
                    "errors": errors,
                })
            })
            .collect();

        serde_json::json!({
            "is_bound": self.bound,
            "fields": fields,
            "errors": self.errors,
        })
    }
}
