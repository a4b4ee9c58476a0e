//! Schema serializer
//!
//! Converts the editor table to and from the `form-definition.json`
//! document. Imported documents are checked against an embedded JSON
//! Schema before any row is rebuilt, so a malformed definition is
//! rejected up front instead of failing later during rendering.

use std::path::Path;

use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::editor::FieldTable;
use crate::error::{FormError, FormResult};
use crate::models::{FieldDefinition, FieldType, Schema};

pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON format. Please upload a valid JSON file.";

static FORM_DEFINITION_SCHEMA: Lazy<Result<JSONSchema, String>> = Lazy::new(|| {
    let schema = json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "array",
        "items": {
            "type": "object",
            "required": ["name", "options"],
            "properties": {
                "name": { "type": "string" },
                "type": { "type": "string" },
                "mandatory": { "type": "boolean" },
                "options": {
                    "type": "array",
                    "items": { "type": "string" }
                }
            }
        }
    });
    let compiled = JSONSchema::compile(&schema)
        .map_err(|e| format!("Failed to compile form definition schema: {}", e));
    compiled
});

/// Lenient view of one stored field. `type` and `mandatory` fall back the
/// way the editor selects do when the stored value matches no option.
#[derive(Debug, Deserialize)]
struct StoredField {
    name: String,
    #[serde(rename = "type", default)]
    field_type: Option<String>,
    #[serde(default)]
    mandatory: bool,
    options: Vec<String>,
}

/// Read every row into a schema. Fails on the first blank name.
pub fn table_to_schema(table: &FieldTable) -> FormResult<Schema> {
    table
        .rows()
        .iter()
        .map(|row| {
            let name = row.name.trim();
            if name.is_empty() {
                return Err(FormError::validation("Field name is required."));
            }
            Ok(FieldDefinition {
                name: name.to_string(),
                field_type: row.field_type,
                mandatory: row.mandatory,
                options: split_options(&row.options),
            })
        })
        .collect()
}

/// Serialize the table as pretty-printed JSON (2-space indent)
pub fn export_schema(table: &FieldTable) -> FormResult<String> {
    let schema = table_to_schema(table)?;
    let json = serde_json::to_string_pretty(&schema)?;
    tracing::debug!(fields = schema.len(), "exported form definition");
    Ok(json)
}

/// Parse and validate a form definition document and rebuild the table
/// from it. The caller's table is untouched on failure.
pub fn import_schema(text: &str) -> FormResult<FieldTable> {
    let document: Value =
        serde_json::from_str(text).map_err(|_| FormError::format(INVALID_JSON_MESSAGE))?;

    validate_document(&document)?;

    let fields: Vec<StoredField> = serde_json::from_value(document)
        .map_err(|e| FormError::validation(format!("Invalid form definition: {}", e)))?;

    let mut table = FieldTable::new();
    for field in fields {
        let field_type = field
            .field_type
            .as_deref()
            .map(FieldType::from_select_value)
            .unwrap_or_default();
        table.push_row(field.name, field_type, field.mandatory, field.options.join(","));
    }
    tracing::debug!(rows = table.len(), "imported form definition");
    Ok(table)
}

/// Read a form definition from disk. Only `.json` files are accepted.
pub fn import_schema_file(path: &Path) -> FormResult<FieldTable> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
    if !is_json {
        return Err(FormError::validation(format!(
            "Not a JSON file: {}",
            path.display()
        )));
    }
    let text = std::fs::read_to_string(path)?;
    import_schema(&text)
}

fn validate_document(document: &Value) -> FormResult<()> {
    let compiled = FORM_DEFINITION_SCHEMA
        .as_ref()
        .map_err(|e| FormError::Format(e.clone()))?;

    if let Err(errors) = compiled.validate(document) {
        let details: Vec<String> = errors
            .map(|e| {
                let path = e.instance_path.to_string();
                if path.is_empty() {
                    e.to_string()
                } else {
                    format!("{}: {}", path, e)
                }
            })
            .collect();
        tracing::warn!(errors = details.len(), "rejected form definition");
        return Err(FormError::validation(format!(
            "Invalid form definition: {}",
            details.join("; ")
        )));
    }
    Ok(())
}

/// Trim the whole options text, then split on commas. Parts keep their
/// own whitespace and empty parts are kept.
pub fn split_options(raw: &str) -> Vec<String> {
    raw.trim().split(',').map(str::to_string).collect()
}
