//! Form renderer
//!
//! Builds live input controls from the editor table. Each field type has
//! its own render function; dispatch is an exhaustive match on
//! [`FieldType`]. Controls behave like their browser counterparts: inputs
//! start empty, a select starts at its first option.

use std::fmt::Write;

use crate::editor::{FieldRow, FieldTable};
use crate::error::{FormError, FormResult};
use crate::models::FieldType;

/// One `<option>` of a select control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

impl SelectOption {
    fn same(text: &str) -> Self {
        Self {
            value: text.to_string(),
            text: text.to_string(),
        }
    }
}

/// The kind of input element a field rendered as
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Text,
    Number,
    Date,
    Select(Vec<SelectOption>),
}

impl Control {
    /// `type` attribute for `<input>` controls
    fn input_type(&self) -> &'static str {
        match self {
            Control::Text => "text",
            Control::Number => "number",
            Control::Date => "date",
            Control::Select(_) => "select",
        }
    }
}

/// A labeled control plus its current value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormControl {
    pub label: String,
    pub field_type: FieldType,
    pub control: Control,
    pub required: bool,
    value: String,
}

impl FormControl {
    fn new(label: &str, field_type: FieldType, control: Control, required: bool) -> Self {
        let value = match &control {
            Control::Select(options) => options.first().map(|o| o.value.clone()).unwrap_or_default(),
            _ => String::new(),
        };
        Self {
            label: label.to_string(),
            field_type,
            control,
            required,
            value,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Set the current value. A select only takes values it has an option
    /// for; anything else leaves it with no selection.
    pub fn set_value(&mut self, value: &str) {
        self.value = match &self.control {
            Control::Select(options) => {
                if options.iter().any(|o| o.value == value) {
                    value.to_string()
                } else {
                    String::new()
                }
            }
            _ => value.to_string(),
        };
    }

    fn write_html(&self, out: &mut String) -> std::fmt::Result {
        write!(out, "<div class=\"form-field\"><label>{}</label>", escape_html(&self.label))?;
        let required = if self.required { " required" } else { "" };
        match &self.control {
            Control::Select(options) => {
                write!(out, "<select{}>", required)?;
                for option in options {
                    let selected = if option.value == self.value { " selected" } else { "" };
                    write!(
                        out,
                        "<option value=\"{}\"{}>{}</option>",
                        escape_html(&option.value),
                        selected,
                        escape_html(&option.text)
                    )?;
                }
                write!(out, "</select>")?;
            }
            input => {
                write!(out, "<input type=\"{}\"", input.input_type())?;
                if !self.value.is_empty() {
                    write!(out, " value=\"{}\"", escape_html(&self.value))?;
                }
                write!(out, "{}>", required)?;
            }
        }
        write!(out, "</div>")
    }
}

/// The rendered form, in table row order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedForm {
    fields: Vec<FormControl>,
}

impl GeneratedForm {
    pub fn fields(&self) -> &[FormControl] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Index of the first field with this label
    pub fn position(&self, label: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.label == label)
    }

    /// Resolve a field reference: an exact label (first match), or `#<n>`
    /// for the n-th field counting from 1
    pub fn resolve(&self, target: &str) -> Option<usize> {
        self.position(target).or_else(|| {
            target
                .strip_prefix('#')
                .and_then(|n| n.trim().parse::<usize>().ok())
                .and_then(|n| n.checked_sub(1))
                .filter(|&idx| idx < self.fields.len())
        })
    }

    /// Set the value of the field a label or `#<n>` reference points at
    pub fn fill(&mut self, target: &str, value: &str) -> FormResult<()> {
        let index = self
            .resolve(target)
            .ok_or_else(|| FormError::validation(format!("No field named {}.", target)))?;
        self.fill_at(index, value)
    }

    /// Set the value of the field at a render index. Fields sharing a label
    /// can only be told apart this way.
    pub fn fill_at(&mut self, index: usize, value: &str) -> FormResult<()> {
        let field = self
            .fields
            .get_mut(index)
            .ok_or_else(|| FormError::validation(format!("No field #{}.", index + 1)))?;
        field.set_value(value);
        Ok(())
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for field in &self.fields {
            let _ = field.write_html(&mut out);
        }
        out
    }
}

/// Build a fresh form from the table. Nothing is produced unless every
/// row has a name.
pub fn generate_form(table: &FieldTable) -> FormResult<GeneratedForm> {
    if table.is_empty() {
        return Err(FormError::validation(
            "No fields defined. Please add at least one field.",
        ));
    }

    let fields = table
        .rows()
        .iter()
        .map(render_row)
        .collect::<FormResult<Vec<_>>>()?;

    tracing::debug!(fields = fields.len(), "generated form");
    Ok(GeneratedForm { fields })
}

fn render_row(row: &FieldRow) -> FormResult<FormControl> {
    let name = row.name.trim();
    if name.is_empty() {
        return Err(FormError::validation("Field name is required for all fields."));
    }

    let control = match row.field_type {
        FieldType::String => render_string(),
        FieldType::Number => render_number(),
        FieldType::Dropdown => render_dropdown(&row.options),
        FieldType::Boolean => render_boolean(),
        FieldType::Date => render_date(),
    };
    Ok(FormControl::new(name, row.field_type, control, row.mandatory))
}

fn render_string() -> Control {
    Control::Text
}

fn render_number() -> Control {
    Control::Number
}

fn render_dropdown(raw_options: &str) -> Control {
    let options = raw_options
        .trim()
        .split(',')
        .map(|option| SelectOption::same(option.trim()))
        .collect();
    Control::Select(options)
}

fn render_boolean() -> Control {
    Control::Select(vec![
        SelectOption {
            value: "true".to_string(),
            text: "True".to_string(),
        },
        SelectOption {
            value: "false".to_string(),
            text: "False".to_string(),
        },
    ])
}

fn render_date() -> Control {
    Control::Date
}

pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
