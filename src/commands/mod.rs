//! CLI commands for formsmith

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::config::{Config, FormsmithPaths};
use crate::db::Database;
use crate::error::FormError;
use crate::export::DirectorySink;
use crate::notify::{Message, MessageKind, Notifier};
use crate::render::{Control, GeneratedForm};
use crate::store::{self, recent_html};
use crate::workbench::Workbench;

/// Workbench backed by the on-disk database and exports directory
pub type DiskWorkbench = Workbench<Database, DirectorySink>;

/// Initialize formsmith for first-time setup
pub fn init() -> Result<()> {
    let paths = FormsmithPaths::new()?;

    if paths.is_initialized() {
        println!("Formsmith is already initialized at {}", paths.root.display());
        return Ok(());
    }

    println!("Initializing formsmith at {}...", paths.root.display());

    paths.ensure_dirs()?;
    println!("  Created directory structure");

    paths.save_config(&Config::default())?;
    println!("  Created config.toml");

    Database::init(&paths)?;
    println!("  Created submission storage");

    println!();
    println!("Formsmith initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  formsmith shell                      Build a form interactively");
    println!("  formsmith render <form.json>         Show the form a definition produces");
    println!("  formsmith submissions                List recent submissions");

    Ok(())
}

/// Print a notification the way the shell shows it
pub fn print_message(message: &Message) {
    match message.kind {
        MessageKind::Success => println!("✓ {}", message.text),
        MessageKind::Error => println!("✗ {}", message.text),
    }
}

/// Open a workbench on the user's storage, echoing notifications to stdout
pub fn open_workbench(paths: &FormsmithPaths) -> Result<DiskWorkbench> {
    ensure_initialized(paths)?;
    let config = paths.load_config()?;

    let db = Database::open(paths)?;
    let sink = DirectorySink::new(paths.exports_dir(&config));
    let notifier = Notifier::new(config.message_ttl()).on_show(print_message);

    Ok(Workbench::open(db, sink, notifier, config.recent_limit))
}

/// Render a form definition file
pub fn render(path: &Path, html: bool) -> Result<()> {
    let table = crate::schema::import_schema_file(path)
        .with_context(|| format!("Failed to load form definition {}", path.display()))?;
    let form = crate::render::generate_form(&table)?;

    if html {
        println!("{}", form.to_html());
    } else {
        print_form(&form);
    }
    Ok(())
}

/// Fill a form from `label=value` (or `#<n>=value`) pairs and save it as a
/// submission. Workbench failures have already been echoed as `✗` lines
/// when they surface here; see [`is_reported`].
pub fn submit(path: &Path, values: &[(String, String)]) -> Result<()> {
    let paths = FormsmithPaths::new()?;
    let mut workbench = open_workbench(&paths)?;

    workbench.import_schema_file(path)?;
    workbench.generate_form()?;
    for (label, value) in values {
        workbench.fill(label, value)?;
    }
    let submission = workbench.save_submission()?;

    println!();
    println!("{}", submission.to_pretty_json()?);
    Ok(())
}

/// Whether an error came out of the workbench, which shows every failure
/// as a notification before returning it
pub fn is_reported(err: &anyhow::Error) -> bool {
    err.downcast_ref::<FormError>().is_some()
}

/// List recent submissions
pub fn submissions(format: OutputFormat) -> Result<()> {
    let paths = FormsmithPaths::new()?;
    ensure_initialized(&paths)?;
    let config = paths.load_config()?;

    let db = Database::open(&paths)?;
    let blocks = store::load_submissions(&db, config.recent_limit)?;

    match format {
        OutputFormat::Html => println!("{}", recent_html(&blocks)),
        OutputFormat::Summary => {
            if blocks.is_empty() {
                println!("No submissions yet.");
                return Ok(());
            }
            if let Some(ts) = db.updated_at(crate::models::SUBMISSIONS_KEY)? {
                println!("Last saved: {}", format_timestamp(ts));
                println!();
            }
            for block in &blocks {
                println!("{}", block);
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Html,
    Summary,
}

/// Print a generated form as a one-line-per-field listing
pub fn print_form(form: &GeneratedForm) {
    println!("{:<4} {:<24} {:<10} {:<9} {}", "#", "LABEL", "TYPE", "REQUIRED", "VALUE");
    println!("{}", "-".repeat(70));
    for (idx, field) in form.fields().iter().enumerate() {
        let value = match &field.control {
            Control::Select(options) => {
                let choices: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
                format!("{} [{}]", field.value(), choices.join("|"))
            }
            _ => field.value().to_string(),
        };
        println!(
            "{:<4} {:<24} {:<10} {:<9} {}",
            idx + 1,
            truncate(&field.label, 22),
            field.field_type,
            if field.required { "yes" } else { "no" },
            value
        );
    }
}

/// Split a `label=value` argument
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("Expected label=value, got '{}'", s))
}

fn format_timestamp(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

fn ensure_initialized(paths: &FormsmithPaths) -> Result<()> {
    if !paths.is_initialized() {
        bail!("Formsmith not initialized. Run `formsmith init` first.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("Favourite color=Red=ish"),
            Ok(("Favourite color".to_string(), "Red=ish".to_string()))
        );
        assert!(parse_assignment("nothing").is_err());
    }

    #[test]
    fn test_workbench_errors_are_reported() {
        let err = anyhow::Error::from(FormError::validation("Please fill in the Name field."));
        assert!(is_reported(&err));

        let temp = tempfile::TempDir::new().unwrap();
        let paths = FormsmithPaths::at(temp.path().to_path_buf());
        let err = ensure_initialized(&paths).unwrap_err();
        assert!(!is_reported(&err));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Größenangabe", 8), "Größe...");
    }
}
