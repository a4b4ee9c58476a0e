//! Submission store
//!
//! Collects values from a generated form, appends them to the persisted
//! submission log and renders the recent-submissions view. Durable storage
//! is injected through [`KeyValueStore`].

use std::collections::HashMap;
use std::fmt::Write;

use crate::error::{FormError, FormResult};
use crate::models::{Submission, SUBMISSIONS_KEY};
use crate::render::{escape_html, GeneratedForm};

/// Number of submissions shown in the recent view
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Durable string key-value storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> FormResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> FormResult<()>;
}

/// Process-local storage, used by tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> FormResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> FormResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Append-only history of every submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionLog {
    entries: Vec<Submission>,
}

impl SubmissionLog {
    /// Read the whole log. A missing key is an empty log.
    pub fn load(store: &dyn KeyValueStore) -> FormResult<Self> {
        let entries = match store.get(SUBMISSIONS_KEY)? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|_| FormError::format("Stored submissions are corrupted."))?,
            None => Vec::new(),
        };
        Ok(Self { entries })
    }

    /// Write the whole log back under the submissions key
    pub fn persist(&self, store: &mut dyn KeyValueStore) -> FormResult<()> {
        let raw = serde_json::to_string(&self.entries)?;
        store.set(SUBMISSIONS_KEY, &raw)
    }

    pub fn append(&mut self, submission: Submission) {
        self.entries.push(submission);
    }

    pub fn entries(&self) -> &[Submission] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The last `limit` entries, oldest of them first
    pub fn recent(&self, limit: usize) -> &[Submission] {
        let start = self.entries.len().saturating_sub(limit);
        &self.entries[start..]
    }

    /// Recent entries as pretty JSON blocks
    pub fn recent_blocks(&self, limit: usize) -> FormResult<Vec<String>> {
        self.recent(limit)
            .iter()
            .map(|s| s.to_pretty_json().map_err(FormError::from))
            .collect()
    }
}

/// Read every field of the form into a submission. Fails on the first
/// field whose trimmed value is empty.
pub fn collect_submission(form: Option<&GeneratedForm>) -> FormResult<Submission> {
    let form = match form {
        Some(form) if !form.is_empty() => form,
        _ => return Err(FormError::validation("No form fields available to save.")),
    };

    let mut submission = Submission::new();
    for field in form.fields() {
        let value = field.value().trim();
        if value.is_empty() {
            return Err(FormError::validation(format!(
                "Please fill in the {} field.",
                field.label
            )));
        }
        submission.insert(field.label.clone(), value);
    }
    Ok(submission)
}

/// Append one submission to the stored log and write the log back
pub fn append_submission(
    store: &mut dyn KeyValueStore,
    submission: Submission,
) -> FormResult<SubmissionLog> {
    let mut log = SubmissionLog::load(store)?;
    log.append(submission);
    log.persist(store)?;
    tracing::info!(total = log.len(), "stored submission");
    Ok(log)
}

/// Render the recent view from storage
pub fn load_submissions(store: &dyn KeyValueStore, limit: usize) -> FormResult<Vec<String>> {
    let log = SubmissionLog::load(store)?;
    tracing::debug!(total = log.len(), limit, "loaded submissions");
    log.recent_blocks(limit)
}

/// Recent view blocks as `<div class="submission">` elements
pub fn recent_html(blocks: &[String]) -> String {
    let mut out = String::new();
    for block in blocks {
        let _ = write!(out, "<div class=\"submission\">{}</div>", escape_html(block));
    }
    out
}
