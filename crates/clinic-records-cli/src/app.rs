//! Command execution against a patient store.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clinic_records_core::export::{export_file_name, render, ExportFormat};
use clinic_records_core::{PatientInput, PatientRecord, PatientStore, StoreError};

use crate::cli::Command;
use crate::confirm::Confirm;
use crate::notify::{self, Notification};
use crate::table::{render_stats, render_table};

pub const CONFIRM_DELETE: &str =
    "Are you sure you want to delete this patient record? This action cannot be undone.";
pub const CONFIRM_CLEAR: &str =
    "WARNING: This will delete ALL patient records permanently. This action cannot be undone!";
pub const CONFIRM_CLEAR_AGAIN: &str =
    "Are you absolutely sure? All patient data will be lost forever.";

/// Runs commands against one store, writing tables and exports to `out`.
pub struct App<C, W> {
    store: PatientStore,
    confirm: C,
    out: W,
    export_dir: PathBuf,
}

impl<C: Confirm, W: Write> App<C, W> {
    pub fn new(store: PatientStore, confirm: C, out: W) -> Self {
        Self {
            store,
            confirm,
            out,
            export_dir: PathBuf::from("."),
        }
    }

    /// Directory for exports written under their default name.
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    pub fn store(&self) -> &PatientStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PatientStore {
        &mut self.store
    }

    /// Everything written so far (tables, stdout exports).
    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn execute(&mut self, command: Command) -> Result<Notification> {
        tracing::debug!(?command, "executing");
        match command {
            Command::List => self.list(),
            Command::Add { name, age, disease } => self.add(&name, &age, &disease),
            Command::Edit {
                id,
                name,
                age,
                disease,
            } => self.edit(id, name, age, disease),
            Command::Delete { id } => self.delete(id),
            Command::Search { term } => self.search(&term),
            Command::Stats => self.stats(),
            Command::Export { output, format } => self.export(output.as_deref(), format.into()),
            Command::Import { file } => self.import(file.as_deref()),
            Command::Clear => self.clear(),
        }
    }

    fn list(&mut self) -> Result<Notification> {
        let records = self.store.load_all().context("loading patients")?;
        self.print_summary(&records)?;
        self.print_table(&records)?;
        Ok(Notification::info("Patient list refreshed!"))
    }

    fn add(&mut self, name: &str, age: &str, disease: &str) -> Result<Notification> {
        let input = PatientInput::from_form(name, age, disease).map_err(StoreError::from)?;
        let record = self.store.add(&input).context("adding patient")?;
        self.print_table(&[record])?;
        Ok(Notification::success(notify::MSG_ADDED))
    }

    fn edit(
        &mut self,
        id: i64,
        name: Option<String>,
        age: Option<String>,
        disease: Option<String>,
    ) -> Result<Notification> {
        self.store.load_all().context("loading patients")?;
        let existing = self.store.find(id).ok_or(StoreError::NotFound(id))?;

        let name = name.unwrap_or_else(|| existing.name.clone());
        let age = age.unwrap_or_else(|| existing.age.to_string());
        let disease = disease.unwrap_or_else(|| existing.disease.clone());

        let input = PatientInput::from_form(&name, &age, &disease).map_err(StoreError::from)?;
        let record = self
            .store
            .update(id, &input)
            .with_context(|| format!("updating patient {}", id))?;
        self.print_table(&[record])?;
        Ok(Notification::success(notify::MSG_UPDATED))
    }

    fn delete(&mut self, id: i64) -> Result<Notification> {
        if !self.ask(CONFIRM_DELETE)? {
            return Ok(Notification::info(notify::MSG_CANCELLED));
        }
        self.store
            .remove(id)
            .with_context(|| format!("deleting patient {}", id))?;
        Ok(Notification::success(notify::MSG_DELETED))
    }

    fn search(&mut self, term: &str) -> Result<Notification> {
        let total = self.store.load_all().context("loading patients")?.len();
        let found = self.store.search(term);
        self.print_table(&found)?;
        Ok(Notification::info(format!(
            "{} of {} patients match \"{}\"",
            found.len(),
            total,
            term
        )))
    }

    fn stats(&mut self) -> Result<Notification> {
        let records = self.store.load_all().context("loading patients")?;
        self.print_summary(&records)?;
        Ok(Notification::info(format!("{} patients on record", records.len())))
    }

    fn export(&mut self, output: Option<&Path>, format: ExportFormat) -> Result<Notification> {
        let records = self.store.load_all().context("loading patients")?;
        let content = render(&records, format).context("rendering export")?;

        let destination = match output {
            Some(path) if path == Path::new("-") => {
                self.out.write_all(content.as_bytes())?;
                if !content.ends_with('\n') {
                    writeln!(self.out)?;
                }
                return Ok(Notification::success(notify::MSG_EXPORTED));
            }
            Some(path) => path.to_path_buf(),
            None => {
                let today = chrono::Local::now().date_naive();
                self.export_dir.join(export_file_name(today, format))
            }
        };

        fs::write(&destination, content)
            .with_context(|| format!("writing {}", destination.display()))?;
        tracing::info!(path = %destination.display(), count = records.len(), "exported patients");
        Ok(Notification::success(format!(
            "{} ({})",
            notify::MSG_EXPORTED,
            destination.display()
        )))
    }

    fn import(&mut self, file: Option<&Path>) -> Result<Notification> {
        let text = match file {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?,
            None => {
                let mut text = String::new();
                io::stdin()
                    .read_to_string(&mut text)
                    .context("reading stdin")?;
                text
            }
        };

        let count = self.store.import_json(&text).context("importing patients")?;
        Ok(Notification::success(format!(
            "Successfully imported {} patients!",
            count
        )))
    }

    fn clear(&mut self) -> Result<Notification> {
        if !self.ask(CONFIRM_CLEAR)? || !self.ask(CONFIRM_CLEAR_AGAIN)? {
            return Ok(Notification::info(notify::MSG_CANCELLED));
        }
        self.store.clear().context("clearing patients")?;
        Ok(Notification::success(notify::MSG_CLEARED))
    }

    fn ask(&mut self, prompt: &str) -> Result<bool> {
        self.confirm
            .confirm(prompt)
            .context("reading confirmation")
    }

    fn print_summary(&mut self, records: &[PatientRecord]) -> Result<()> {
        let stats = PatientStore::stats(records);
        self.out.write_all(render_stats(&stats).as_bytes())?;
        Ok(())
    }

    fn print_table(&mut self, records: &[PatientRecord]) -> Result<()> {
        self.out.write_all(render_table(records).as_bytes())?;
        Ok(())
    }
}
