//! # object-tool-forms
//!
//! The form-collection seam used by form tools: field definitions, data
//! binding from a request payload, validation, and cleaned data. Rendering
//! stays external; forms expose a structured JSON context instead of
//! markup.

pub mod fields;
pub mod form;
pub mod validation;

pub use fields::{FormFieldDef, FormFieldType};
pub use form::{BaseForm, Form};
