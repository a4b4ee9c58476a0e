// Integration tests for the form pipeline
// Tests editing, export/import, rendering and submission persistence

use anyhow::Result;
use formsmith::config::FormsmithPaths;
use formsmith::db::Database;
use formsmith::editor::RowEdit;
use formsmith::export::{DirectorySink, MemorySink};
use formsmith::models::FieldType;
use formsmith::notify::{MessageKind, Notifier};
use formsmith::render::Control;
use formsmith::store::{KeyValueStore, MemoryStore, SubmissionLog, DEFAULT_RECENT_LIMIT};
use formsmith::workbench::Workbench;
use std::fs;
use tempfile::TempDir;

/// Setup a workbench on an on-disk database in a temp directory
fn setup() -> Result<(TempDir, FormsmithPaths, Workbench<Database, DirectorySink>)> {
    let temp_dir = TempDir::new()?;
    let paths = FormsmithPaths::at(temp_dir.path().to_path_buf());
    paths.ensure_dirs()?;

    let db = Database::init(&paths)?;
    let sink = DirectorySink::new(paths.exports.clone());
    let workbench = Workbench::open(db, sink, Notifier::default(), DEFAULT_RECENT_LIMIT);

    Ok((temp_dir, paths, workbench))
}

fn last_message<S: KeyValueStore, E: formsmith::export::ExportSink>(
    wb: &Workbench<S, E>,
) -> (MessageKind, String) {
    let message = wb.notifier().active().pop().expect("a message");
    (message.kind, message.text)
}

#[tokio::test]
async fn test_empty_mandatory_number_rejects_save() -> Result<()> {
    let (_temp, _paths, mut wb) = setup()?;

    let id = wb.add_row();
    wb.update_row(id, RowEdit::name("Age"))?;
    wb.update_row(id, RowEdit::parse_assignment("type=Number")?)?;
    wb.generate_form()?;

    let err = wb.save_submission().unwrap_err();
    assert_eq!(err.to_string(), "Please fill in the Age field.");
    assert_eq!(
        last_message(&wb),
        (MessageKind::Error, "Please fill in the Age field.".to_string())
    );
    assert!(SubmissionLog::load(wb.store())?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_imported_dropdown_renders_options_in_order() -> Result<()> {
    let (_temp, _paths, mut wb) = setup()?;

    wb.import_schema(
        r#"[{"name":"Color","type":"Dropdown","mandatory":true,"options":["Red","Green"]}]"#,
    )?;
    wb.generate_form()?;

    let form = wb.form().expect("generated form");
    assert_eq!(form.len(), 1);
    let field = &form.fields()[0];
    assert_eq!(field.label, "Color");
    assert!(field.required);
    match &field.control {
        Control::Select(options) => {
            let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
            assert_eq!(values, vec!["Red", "Green"]);
        }
        other => panic!("expected select, got {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn test_export_blank_name_writes_no_file() -> Result<()> {
    let (_temp, paths, mut wb) = setup()?;

    let id = wb.add_row();
    wb.update_row(id, RowEdit::name("Name"))?;
    let blank = wb.add_row();
    wb.update_row(blank, RowEdit::name("   "))?;

    let err = wb.export_schema().unwrap_err();
    assert_eq!(err.to_string(), "Field name is required.");
    assert!(!paths.exports.join("form-definition.json").exists());

    Ok(())
}

#[tokio::test]
async fn test_export_then_import_reproduces_fields() -> Result<()> {
    let (_temp, _paths, mut wb) = setup()?;

    let rows = [
        ("Name", "String", "true", ""),
        ("Age", "Number", "false", ""),
        ("Size", "Dropdown", "true", "S,M,L"),
        ("Subscribed", "Boolean", "false", ""),
        ("Birthday", "Date", "true", ""),
    ];
    for (name, field_type, mandatory, options) in rows {
        let id = wb.add_row();
        wb.update_row(id, RowEdit::name(name))?;
        wb.update_row(id, RowEdit::parse_assignment(&format!("type={}", field_type))?)?;
        wb.update_row(id, RowEdit::parse_assignment(&format!("mandatory={}", mandatory))?)?;
        wb.update_row(id, RowEdit::parse_assignment(&format!("options={}", options))?)?;
    }

    let path = wb.export_schema()?;
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("form-definition.json"));
    let exported = fs::read_to_string(&path)?;
    assert!(exported.starts_with("[\n  {\n    \"name\": \"Name\""));

    let before: Vec<_> = wb.table().rows().iter().map(|r| {
        (r.name.clone(), r.field_type, r.mandatory, r.options.clone())
    }).collect();

    let mut other = Workbench::open(
        MemoryStore::new(),
        MemorySink::new(),
        Notifier::default(),
        DEFAULT_RECENT_LIMIT,
    );
    other.import_schema_file(&path)?;
    let after: Vec<_> = other.table().rows().iter().map(|r| {
        (r.name.clone(), r.field_type, r.mandatory, r.options.clone())
    }).collect();

    assert_eq!(before, after);
    assert_eq!(after[2].1, FieldType::Dropdown);
    assert_eq!(
        last_message(&other),
        (
            MessageKind::Success,
            "Form definition loaded from JSON successfully".to_string()
        )
    );

    Ok(())
}

#[tokio::test]
async fn test_generated_controls_match_rows() -> Result<()> {
    let (_temp, _paths, mut wb) = setup()?;

    for (idx, field_type) in FieldType::ALL.iter().enumerate() {
        let id = wb.add_row();
        wb.update_row(
            id,
            RowEdit {
                name: Some(format!("Field {}", idx)),
                field_type: Some(*field_type),
                mandatory: Some(idx % 2 == 0),
                options: Some("a,b".to_string()),
            },
        )?;
    }
    wb.generate_form()?;

    let form = wb.form().expect("generated form");
    assert_eq!(form.len(), FieldType::ALL.len());
    for (idx, field) in form.fields().iter().enumerate() {
        assert_eq!(field.label, format!("Field {}", idx));
        assert_eq!(field.required, idx % 2 == 0);
    }

    Ok(())
}

#[tokio::test]
async fn test_saved_submissions_persist_and_show_last_ten() -> Result<()> {
    let (_temp, paths, mut wb) = setup()?;

    let id = wb.add_row();
    wb.update_row(id, RowEdit::name("Count"))?;
    wb.generate_form()?;

    for n in 0..12 {
        wb.fill("Count", &format!(" {} ", n))?;
        let submission = wb.save_submission()?;
        assert_eq!(submission.get("Count"), Some(n.to_string().as_str()));
        assert_eq!(SubmissionLog::load(wb.store())?.len(), n + 1);
    }

    let recent = wb.recent();
    assert_eq!(recent.len(), 10);
    assert_eq!(recent[0], "{\n  \"Count\": \"2\"\n}");
    assert_eq!(recent[9], "{\n  \"Count\": \"11\"\n}");

    let delivered = fs::read_to_string(paths.exports.join("submission.json"))?;
    assert_eq!(delivered, "{\n  \"Count\": \"11\"\n}");

    // A fresh session on the same database sees the full log.
    drop(wb);
    let db = Database::open(&paths)?;
    let reopened = Workbench::open(db, MemorySink::new(), Notifier::default(), DEFAULT_RECENT_LIMIT);
    assert_eq!(SubmissionLog::load(reopened.store())?.len(), 12);
    assert_eq!(reopened.recent().len(), 10);

    Ok(())
}

#[tokio::test]
async fn test_malformed_definition_is_rejected_on_import() -> Result<()> {
    let (_temp, _paths, mut wb) = setup()?;

    let id = wb.add_row();
    wb.update_row(id, RowEdit::name("Existing"))?;

    let err = wb
        .import_schema(r#"[{"name":"Color","type":"Dropdown","mandatory":true}]"#)
        .unwrap_err();
    assert!(err.to_string().starts_with("Invalid form definition:"));
    assert_eq!(wb.table().len(), 1);
    assert_eq!(wb.table().rows()[0].name, "Existing");

    Ok(())
}

#[tokio::test]
async fn test_two_fields_named_alike_can_be_saved() -> Result<()> {
    let (_temp, paths, mut wb) = setup()?;

    wb.import_schema(
        r#"[{"name":"Name","type":"String","mandatory":true,"options":[""]},
            {"name":"Name","type":"String","mandatory":true,"options":[""]}]"#,
    )?;
    wb.generate_form()?;

    wb.fill("#1", "Ada")?;
    wb.fill("#2", "Bob")?;
    let submission = wb.save_submission()?;
    assert_eq!(submission.len(), 1);
    assert_eq!(submission.get("Name"), Some("Bob"));

    let delivered = fs::read_to_string(paths.exports.join("submission.json"))?;
    assert_eq!(delivered, "{\n  \"Name\": \"Bob\"\n}");

    Ok(())
}
