//! Workbench: one user's form-building session
//!
//! Holds the state the page used to keep in globals (editor table,
//! generated form, recent view) and the injected storage and export
//! capabilities. Every failed operation posts an error notification with
//! its message before the error is returned; every successful one posts
//! its success message.

use std::path::{Path, PathBuf};

use crate::editor::{FieldTable, RowEdit, RowId};
use crate::error::{FormError, FormResult};
use crate::export::ExportSink;
use crate::models::{Submission, SCHEMA_FILE_NAME, SUBMISSION_FILE_NAME};
use crate::notify::Notifier;
use crate::render::{generate_form, GeneratedForm};
use crate::schema;
use crate::store::{self, KeyValueStore};

pub struct Workbench<S: KeyValueStore, E: ExportSink> {
    table: FieldTable,
    form: Option<GeneratedForm>,
    recent: Vec<String>,
    recent_limit: usize,
    store: S,
    sink: E,
    notifier: Notifier,
}

impl<S: KeyValueStore, E: ExportSink> Workbench<S, E> {
    /// Open a session and render the last `recent_limit` submissions
    /// from storage
    pub fn open(store: S, sink: E, notifier: Notifier, recent_limit: usize) -> Self {
        let mut workbench = Self {
            table: FieldTable::new(),
            form: None,
            recent: Vec::new(),
            recent_limit,
            store,
            sink,
            notifier,
        };
        // A failure here is already reported as a notification.
        let _ = workbench.load_submissions();
        workbench
    }

    pub fn table(&self) -> &FieldTable {
        &self.table
    }

    pub fn form(&self) -> Option<&GeneratedForm> {
        self.form.as_ref()
    }

    /// Recent submissions as pretty JSON blocks, oldest first
    pub fn recent(&self) -> &[String] {
        &self.recent
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn add_row(&mut self) -> RowId {
        self.table.add_row()
    }

    pub fn update_row(&mut self, id: RowId, edit: RowEdit) -> FormResult<()> {
        let result = self.table.update_row(id, edit);
        self.report(result)
    }

    pub fn delete_row(&mut self, id: RowId) -> FormResult<()> {
        let result = self.table.delete_row(id).map(|_| ());
        self.report(result)?;
        self.notifier.success("Row deleted successfully");
        Ok(())
    }

    /// Export the table and deliver it as `form-definition.json`
    pub fn export_schema(&mut self) -> FormResult<PathBuf> {
        let result = schema::export_schema(&self.table)
            .and_then(|json| self.sink.deliver(SCHEMA_FILE_NAME, &json));
        let path = self.report(result)?;
        self.notifier.success("Form definition saved as JSON successfully");
        Ok(path)
    }

    /// Replace the table with the rows of a form definition document
    pub fn import_schema(&mut self, text: &str) -> FormResult<()> {
        let result = schema::import_schema(text);
        self.table = self.report(result)?;
        self.notifier.success("Form definition loaded from JSON successfully");
        Ok(())
    }

    pub fn import_schema_file(&mut self, path: &Path) -> FormResult<()> {
        let result = schema::import_schema_file(path);
        self.table = self.report(result)?;
        self.notifier.success("Form definition loaded from JSON successfully");
        Ok(())
    }

    /// Render the table into a fresh form
    pub fn generate_form(&mut self) -> FormResult<()> {
        if !self.table.is_empty() {
            self.form = None;
        }
        let result = generate_form(&self.table);
        self.form = Some(self.report(result)?);
        self.notifier.success("Form generated successfully");
        Ok(())
    }

    /// Enter a value into the field a label or `#<n>` reference points at
    pub fn fill(&mut self, target: &str, value: &str) -> FormResult<()> {
        let result = match self.form.as_mut() {
            Some(form) => form.fill(target, value),
            None => Err(FormError::validation("No form generated.")),
        };
        self.report(result)
    }

    /// Enter a value into the field at a render index
    pub fn fill_at(&mut self, index: usize, value: &str) -> FormResult<()> {
        let result = match self.form.as_mut() {
            Some(form) => form.fill_at(index, value),
            None => Err(FormError::validation("No form generated.")),
        };
        self.report(result)
    }

    /// Collect the form, append it to the log, refresh the recent view and
    /// deliver the new submission as `submission.json`
    pub fn save_submission(&mut self) -> FormResult<Submission> {
        let result = store::collect_submission(self.form.as_ref());
        let submission = self.report(result)?;

        let result = store::append_submission(&mut self.store, submission.clone());
        self.report(result)?;
        self.load_submissions()?;

        let result = submission
            .to_pretty_json()
            .map_err(Into::into)
            .and_then(|json| self.sink.deliver(SUBMISSION_FILE_NAME, &json));
        self.report(result)?;

        self.notifier.success("Submission saved and downloaded successfully");
        Ok(submission)
    }

    /// Re-render the recent view from storage, replacing the previous one
    pub fn load_submissions(&mut self) -> FormResult<()> {
        let result = store::load_submissions(&self.store, self.recent_limit);
        self.recent = self.report(result)?;
        Ok(())
    }

    fn report<T>(&self, result: FormResult<T>) -> FormResult<T> {
        if let Err(e) = &result {
            self.notifier.error(e.to_string());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::MemorySink;
    use crate::models::SUBMISSIONS_KEY;
    use crate::notify::MessageKind;
    use crate::store::{MemoryStore, SubmissionLog, DEFAULT_RECENT_LIMIT};

    fn workbench() -> Workbench<MemoryStore, MemorySink> {
        Workbench::open(
            MemoryStore::new(),
            MemorySink::new(),
            Notifier::default(),
            DEFAULT_RECENT_LIMIT,
        )
    }

    fn last_message(wb: &Workbench<MemoryStore, MemorySink>) -> (MessageKind, String) {
        let message = wb.notifier().active().pop().expect("a message");
        (message.kind, message.text)
    }

    #[tokio::test]
    async fn test_delete_row_notifies() {
        let mut wb = workbench();
        let id = wb.add_row();
        wb.delete_row(id).unwrap();

        assert!(wb.table().is_empty());
        assert_eq!(
            last_message(&wb),
            (MessageKind::Success, "Row deleted successfully".to_string())
        );
    }

    #[tokio::test]
    async fn test_export_blank_name_delivers_nothing() {
        let mut wb = workbench();
        wb.add_row();

        let err = wb.export_schema().unwrap_err();
        assert_eq!(err.to_string(), "Field name is required.");
        assert!(wb.sink().deliveries().is_empty());
        assert_eq!(
            last_message(&wb),
            (MessageKind::Error, "Field name is required.".to_string())
        );
    }

    #[tokio::test]
    async fn test_invalid_import_keeps_table() {
        let mut wb = workbench();
        let id = wb.add_row();
        wb.update_row(id, RowEdit::name("Keep")).unwrap();

        assert!(wb.import_schema("not json").is_err());
        assert_eq!(wb.table().rows()[0].name, "Keep");
        assert_eq!(
            last_message(&wb),
            (
                MessageKind::Error,
                "Invalid JSON format. Please upload a valid JSON file.".to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_blank_name_clears_previous_form() {
        let mut wb = workbench();
        let id = wb.add_row();
        wb.update_row(id, RowEdit::name("Name")).unwrap();
        wb.generate_form().unwrap();
        assert!(wb.form().is_some());

        wb.add_row();
        assert!(wb.generate_form().is_err());
        assert!(wb.form().is_none());
    }

    #[tokio::test]
    async fn test_empty_table_keeps_previous_form() {
        let mut wb = workbench();
        let id = wb.add_row();
        wb.update_row(id, RowEdit::name("Name")).unwrap();
        wb.generate_form().unwrap();

        wb.delete_row(id).unwrap();
        let err = wb.generate_form().unwrap_err();
        assert_eq!(err.to_string(), "No fields defined. Please add at least one field.");
        assert!(wb.form().is_some());
    }

    #[tokio::test]
    async fn test_save_submission_persists_renders_and_delivers() {
        let mut wb = workbench();
        wb.import_schema(
            r#"[{"name":"Color","type":"Dropdown","mandatory":true,"options":["Red","Green"]},
                {"name":"Agree","type":"Boolean","mandatory":false,"options":[""]}]"#,
        )
        .unwrap();
        wb.generate_form().unwrap();
        wb.fill("Color", "Green").unwrap();

        let submission = wb.save_submission().unwrap();
        assert_eq!(submission.get("Color"), Some("Green"));
        assert_eq!(submission.get("Agree"), Some("true"));

        assert_eq!(SubmissionLog::load(wb.store()).unwrap().len(), 1);
        assert_eq!(wb.recent().len(), 1);

        let delivery = wb.sink().last().unwrap();
        assert_eq!(delivery.filename, "submission.json");
        assert_eq!(delivery.contents, "{\n  \"Color\": \"Green\",\n  \"Agree\": \"true\"\n}");
        assert_eq!(
            last_message(&wb),
            (
                MessageKind::Success,
                "Submission saved and downloaded successfully".to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_open_renders_existing_log() {
        let mut store = MemoryStore::new();
        for n in 0..3 {
            let mut s = Submission::new();
            s.insert("n", n.to_string());
            store::append_submission(&mut store, s).unwrap();
        }

        let wb = Workbench::open(store, MemorySink::new(), Notifier::default(), 2);
        assert_eq!(wb.recent().len(), 2);
        assert!(wb.recent()[0].contains("\"1\""));
        assert!(wb.recent()[1].contains("\"2\""));
    }

    #[tokio::test]
    async fn test_open_reports_corrupted_log_once() {
        let mut store = MemoryStore::new();
        store.set(SUBMISSIONS_KEY, "{oops").unwrap();

        let wb = Workbench::open(store, MemorySink::new(), Notifier::default(), 2);
        let active = wb.notifier().active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].kind, MessageKind::Error);
        assert_eq!(active[0].text, "Stored submissions are corrupted.");
        assert!(wb.recent().is_empty());
    }

    #[tokio::test]
    async fn test_save_form_with_duplicate_labels() {
        let mut wb = workbench();
        for _ in 0..2 {
            let id = wb.add_row();
            wb.update_row(id, RowEdit::name("Name")).unwrap();
        }
        wb.generate_form().unwrap();

        wb.fill("Name", "Ada").unwrap();
        wb.fill_at(1, "Bob").unwrap();
        assert!(wb.fill_at(2, "Cy").is_err());

        let submission = wb.save_submission().unwrap();
        assert_eq!(submission.len(), 1);
        assert_eq!(submission.get("Name"), Some("Bob"));
    }

    #[tokio::test]
    async fn test_fill_without_form_is_rejected() {
        let mut wb = workbench();
        assert!(wb.fill("Age", "3").is_err());
        assert!(wb.save_submission().is_err());
        assert_eq!(
            last_message(&wb),
            (MessageKind::Error, "No form fields available to save.".to_string())
        );
    }
}
