//! Interactive form-building session
//!
//! A line-oriented stand-in for the form builder page: edit the field
//! table, export/import definitions, generate and fill the form, save
//! submissions.

use std::path::Path;

use anyhow::{bail, Result};
use rustyline::{error::ReadlineError, DefaultEditor};

use crate::commands::{self, DiskWorkbench};
use crate::editor::{RowEdit, RowId};
use crate::notify::MessageId;

/// Outcome of one shell line
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

pub struct Shell {
    workbench: DiskWorkbench,
}

impl Shell {
    pub fn new(workbench: DiskWorkbench) -> Self {
        Self { workbench }
    }

    /// Start the interactive loop
    pub fn run(&mut self, schema: Option<&Path>) -> Result<()> {
        println!("Formsmith form builder");
        println!("Type `help` for commands, `exit` to quit.");
        println!();

        if let Some(path) = schema {
            // Errors are shown as notifications.
            let _ = self.workbench.import_schema_file(path);
        }

        let mut rl = DefaultEditor::new()?;
        loop {
            match rl.readline("formsmith> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    match self.handle_command(trimmed) {
                        Ok(Flow::Exit) => break,
                        Ok(Flow::Continue) => {}
                        Err(e) => println!("✗ Error: {}", e),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Interrupted. Use `exit` to quit.");
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    println!("Error: {:?}", err);
                    break;
                }
            }
        }

        println!("\nSession ended.");
        Ok(())
    }

    fn handle_command(&mut self, line: &str) -> Result<Flow> {
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        // Operation failures are already reported as notifications, so
        // their results are dropped here.
        match command {
            "help" => print_help(),
            "exit" | "quit" => return Ok(Flow::Exit),
            "add" => {
                self.workbench.add_row();
                self.print_rows();
            }
            "rows" => self.print_rows(),
            "set" => {
                let (row, assignment) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| anyhow::anyhow!("Usage: set <row> <column>=<value>"))?;
                let id = self.row_id(row)?;
                let edit = RowEdit::parse_assignment(assignment.trim())?;
                let _ = self.workbench.update_row(id, edit);
            }
            "delete" => {
                let id = self.row_id(rest)?;
                let _ = self.workbench.delete_row(id);
            }
            "export" => {
                if let Ok(path) = self.workbench.export_schema() {
                    println!("  Written to {}", path.display());
                }
            }
            "import" => {
                if rest.is_empty() {
                    bail!("Usage: import <file.json>");
                }
                if self.workbench.import_schema_file(Path::new(rest)).is_ok() {
                    self.print_rows();
                }
            }
            "generate" => {
                if self.workbench.generate_form().is_ok() {
                    self.print_form();
                }
            }
            "form" => self.print_form(),
            "html" => match self.workbench.form() {
                Some(form) => println!("{}", form.to_html()),
                None => println!("No form generated yet."),
            },
            "table" => println!("{}", self.workbench.table().to_html()),
            "fill" => {
                let (label, value) =
                    commands::parse_assignment(rest).map_err(anyhow::Error::msg)?;
                let _ = self.workbench.fill(label.trim(), &value);
            }
            "save" => {
                let _ = self.workbench.save_submission();
            }
            "recent" => {
                let _ = self.workbench.load_submissions();
                if self.workbench.recent().is_empty() {
                    println!("No submissions yet.");
                }
                for block in self.workbench.recent() {
                    println!("{}", block);
                }
            }
            "messages" => {
                let active = self.workbench.notifier().active();
                if active.is_empty() {
                    println!("No active messages.");
                }
                for message in active {
                    println!("  [{}] {} {}", message.id, message.kind, message.text);
                }
            }
            "dismiss" => {
                let id = rest.parse::<MessageId>().map_err(anyhow::Error::msg)?;
                if !self.workbench.notifier().dismiss(id) {
                    println!("No active message {}", id);
                }
            }
            other => bail!("Unknown command: {}. Type `help` for commands.", other),
        }
        Ok(Flow::Continue)
    }

    /// Resolve a 1-based row number
    fn row_id(&self, arg: &str) -> Result<RowId> {
        let number: usize = arg
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid row number: {}", arg))?;
        number
            .checked_sub(1)
            .and_then(|idx| self.workbench.table().id_at(idx))
            .ok_or_else(|| anyhow::anyhow!("No row {}", number))
    }

    fn print_rows(&self) {
        let rows = self.workbench.table().rows();
        if rows.is_empty() {
            println!("No fields defined. Use `add` to add one.");
            return;
        }
        println!("{:<4} {:<24} {:<11} {:<10} {}", "#", "NAME", "TYPE", "MANDATORY", "OPTIONS");
        println!("{}", "-".repeat(70));
        for (idx, row) in rows.iter().enumerate() {
            println!(
                "{:<4} {:<24} {:<11} {:<10} {}",
                idx + 1,
                commands::truncate(&row.name, 22),
                row.field_type.label(),
                if row.mandatory { "True" } else { "False" },
                row.options
            );
        }
    }

    fn print_form(&self) {
        match self.workbench.form() {
            Some(form) => commands::print_form(form),
            None => println!("No form generated yet."),
        }
    }
}

fn print_help() {
    println!("Field table:");
    println!("  add                         Add a field row");
    println!("  rows                        List field rows");
    println!("  set <row> <column>=<value>  Edit a row (name, type, mandatory, options)");
    println!("  delete <row>                Delete a row");
    println!("  table                       Print the table as HTML");
    println!("Definitions:");
    println!("  export                      Save the table as form-definition.json");
    println!("  import <file.json>          Load a form definition");
    println!("Form:");
    println!("  generate                    Generate the form from the table");
    println!("  form | html                 Show the generated form");
    println!("  fill <label|#n>=<value>     Enter a value (#n picks the n-th field)");
    println!("  save                        Save and download the submission");
    println!("  recent                      Show the last submissions");
    println!("Messages:");
    println!("  messages                    Show active messages");
    println!("  dismiss <id>                Dismiss a message");
    println!("  exit                        Leave the session");
}
