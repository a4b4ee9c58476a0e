//! Field row editor
//!
//! The editable table of field definitions. Rows hold the raw editor
//! inputs exactly as typed; trimming and splitting happen when the table
//! is exported or rendered.

use std::fmt::Write;

use uuid::Uuid;

use crate::error::{FormError, FormResult};
use crate::models::FieldType;
use crate::render::escape_html;

/// Stable reference to one editor row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowId(Uuid);

impl RowId {
    fn new() -> Self {
        RowId(Uuid::new_v4())
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the editor table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRow {
    pub id: RowId,
    pub name: String,
    pub field_type: FieldType,
    pub mandatory: bool,
    /// Comma separated options, as typed
    pub options: String,
}

impl FieldRow {
    fn blank() -> Self {
        Self {
            id: RowId::new(),
            name: String::new(),
            field_type: FieldType::String,
            mandatory: true,
            options: String::new(),
        }
    }
}

/// Partial update of a row. Only fields that are set are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowEdit {
    pub name: Option<String>,
    pub field_type: Option<FieldType>,
    pub mandatory: Option<bool>,
    pub options: Option<String>,
}

impl RowEdit {
    pub fn name(value: impl Into<String>) -> Self {
        Self {
            name: Some(value.into()),
            ..Self::default()
        }
    }

    /// Parse a `column=value` assignment (`name`, `type`, `mandatory`, `options`)
    pub fn parse_assignment(assignment: &str) -> FormResult<Self> {
        let (column, value) = assignment.split_once('=').ok_or_else(|| {
            FormError::validation(format!("Expected column=value, got '{}'.", assignment))
        })?;

        let mut edit = RowEdit::default();
        match column.trim() {
            "name" => edit.name = Some(value.to_string()),
            "type" => {
                let field_type = value.trim().parse::<FieldType>().map_err(FormError::Validation)?;
                edit.field_type = Some(field_type);
            }
            "mandatory" => match value.trim().to_lowercase().as_str() {
                "true" => edit.mandatory = Some(true),
                "false" => edit.mandatory = Some(false),
                other => {
                    return Err(FormError::validation(format!(
                        "Invalid mandatory value: {}. Use: true, false",
                        other
                    )))
                }
            },
            "options" => edit.options = Some(value.to_string()),
            other => {
                return Err(FormError::validation(format!(
                    "Unknown column: {}. Use: name, type, mandatory, options",
                    other
                )))
            }
        }
        Ok(edit)
    }
}

/// The editor table. Sole source of truth for the current schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTable {
    rows: Vec<FieldRow>,
}

impl FieldTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a blank row: empty name, `String`, mandatory, no options
    pub fn add_row(&mut self) -> RowId {
        let row = FieldRow::blank();
        let id = row.id;
        self.rows.push(row);
        id
    }

    /// Append a row with the given values already entered
    pub fn push_row(
        &mut self,
        name: impl Into<String>,
        field_type: FieldType,
        mandatory: bool,
        options: impl Into<String>,
    ) -> RowId {
        let id = self.add_row();
        if let Some(row) = self.rows.last_mut() {
            row.name = name.into();
            row.field_type = field_type;
            row.mandatory = mandatory;
            row.options = options.into();
        }
        id
    }

    /// Remove a row immediately
    pub fn delete_row(&mut self, id: RowId) -> FormResult<FieldRow> {
        let index = self.position(id)?;
        Ok(self.rows.remove(index))
    }

    pub fn update_row(&mut self, id: RowId, edit: RowEdit) -> FormResult<()> {
        let index = self.position(id)?;
        let row = &mut self.rows[index];
        if let Some(name) = edit.name {
            row.name = name;
        }
        if let Some(field_type) = edit.field_type {
            row.field_type = field_type;
        }
        if let Some(mandatory) = edit.mandatory {
            row.mandatory = mandatory;
        }
        if let Some(options) = edit.options {
            row.options = options;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn rows(&self) -> &[FieldRow] {
        &self.rows
    }

    pub fn get(&self, id: RowId) -> Option<&FieldRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Row id at a display position (0-based)
    pub fn id_at(&self, index: usize) -> Option<RowId> {
        self.rows.get(index).map(|r| r.id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn position(&self, id: RowId) -> FormResult<usize> {
        self.rows
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| FormError::validation("Row not found."))
    }

    /// Render the table body as the editor page shows it
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for row in &self.rows {
            // Writing into a String cannot fail.
            let _ = write_row_html(&mut out, row);
        }
        out
    }
}

fn write_row_html(out: &mut String, row: &FieldRow) -> std::fmt::Result {
    write!(out, "<tr data-row=\"{}\">", row.id)?;
    write!(
        out,
        "<td><input type=\"text\" name=\"field-name\" value=\"{}\" placeholder=\"Field Name\"></td>",
        escape_html(&row.name)
    )?;

    write!(out, "<td><select name=\"field-type\">")?;
    for field_type in FieldType::ALL {
        let selected = if field_type == row.field_type { " selected" } else { "" };
        write!(
            out,
            "<option value=\"{}\"{}>{}</option>",
            field_type.as_str(),
            selected,
            field_type.label()
        )?;
    }
    write!(out, "</select></td>")?;

    write!(out, "<td><select name=\"mandatory\">")?;
    for (value, text) in [(true, "True"), (false, "False")] {
        let selected = if value == row.mandatory { " selected" } else { "" };
        write!(out, "<option value=\"{}\"{}>{}</option>", value, selected, text)?;
    }
    write!(out, "</select></td>")?;

    write!(
        out,
        "<td><input type=\"text\" name=\"options\" value=\"{}\" placeholder=\"Comma separated options\"></td>",
        escape_html(&row.options)
    )?;
    write!(out, "<td><button data-action=\"delete\">Delete</button></td></tr>")
}
