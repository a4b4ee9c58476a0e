//! Data models for form definitions and submissions
//!
//! These represent the canonical JSON structures written to
//! `form-definition.json`, `submission.json` and the submission log

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Storage key holding the whole submission log
pub const SUBMISSIONS_KEY: &str = "submissions";

/// File name used when delivering an exported form definition
pub const SCHEMA_FILE_NAME: &str = "form-definition.json";

/// File name used when delivering a single submission
pub const SUBMISSION_FILE_NAME: &str = "submission.json";

/// Kind of input control a field renders as
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum FieldType {
    #[default]
    String,
    Number,
    Dropdown,
    Boolean,
    Date,
}

impl FieldType {
    /// All variants in editor select order
    pub const ALL: [FieldType; 5] = [
        FieldType::String,
        FieldType::Number,
        FieldType::Dropdown,
        FieldType::Boolean,
        FieldType::Date,
    ];

    /// Value stored in JSON and in the editor select
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "String",
            FieldType::Number => "Number",
            FieldType::Dropdown => "Dropdown",
            FieldType::Boolean => "Boolean",
            FieldType::Date => "Date",
        }
    }

    /// Text shown for the option in the editor select
    pub fn label(&self) -> &'static str {
        match self {
            FieldType::Boolean => "True/False",
            other => other.as_str(),
        }
    }

    /// Resolve a select value, falling back to the first option
    /// the way a select does when no option matches.
    pub fn from_select_value(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "String" => Ok(FieldType::String),
            "Number" => Ok(FieldType::Number),
            "Dropdown" => Ok(FieldType::Dropdown),
            "Boolean" => Ok(FieldType::Boolean),
            "Date" => Ok(FieldType::Date),
            _ => Err(format!(
                "Invalid field type: {}. Use: String, Number, Dropdown, Boolean, Date",
                s
            )),
        }
    }
}

/// One named, typed entry of a form definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub mandatory: bool,
    pub options: Vec<String>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, field_type: FieldType, mandatory: bool) -> Self {
        Self {
            name: name.into(),
            field_type,
            mandatory,
            options: Vec::new(),
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

/// Ordered list of field definitions describing a form
pub type Schema = Vec<FieldDefinition>;

/// One completed form: label -> entered value, in render order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Submission {
    values: IndexMap<String, String>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value. A repeated label keeps its first position.
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.values.insert(label.into(), value.into());
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.values.get(label).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Pretty JSON with 2-space indentation
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
