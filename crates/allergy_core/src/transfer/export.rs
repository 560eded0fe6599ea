//! CSV export of the full allergy table.
//!
//! # Invariants
//! - Columns: id, allergen_name, danger_level, symptoms, ingredients, source,
//!   notes, created_date.
//! - Rows follow list order (`danger_level DESC, allergen_name ASC`).
//! - Missing optional values are written as empty cells.

use super::TransferResult;
use crate::model::allergy::{AllergyId, AllergyRecord};
use crate::repo::allergy_repo::AllergyRepository;
use log::info;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One exported CSV line; field order defines column order.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    id: AllergyId,
    allergen_name: &'a str,
    danger_level: i64,
    symptoms: Option<&'a str>,
    ingredients: Option<&'a str>,
    source: Option<&'a str>,
    notes: Option<&'a str>,
    created_date: Option<&'a str>,
}

impl<'a> From<&'a AllergyRecord> for ExportRow<'a> {
    fn from(record: &'a AllergyRecord) -> Self {
        Self {
            id: record.id,
            allergen_name: &record.allergen_name,
            danger_level: record.danger_level.as_i64(),
            symptoms: record.symptoms.as_deref(),
            ingredients: record.ingredients.as_deref(),
            source: record.source.as_deref(),
            notes: record.notes.as_deref(),
            created_date: record.created_date.as_deref(),
        }
    }
}

/// Writes every record as CSV and returns the number of data rows.
///
/// The header row is written even when the store is empty.
pub fn export_csv_writer<R, W>(repo: &R, sink: W) -> TransferResult<usize>
where
    R: AllergyRepository + ?Sized,
    W: Write,
{
    let records = repo.list_allergies(None)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(sink);

    writer.write_record([
        "id",
        "allergen_name",
        "danger_level",
        "symptoms",
        "ingredients",
        "source",
        "notes",
        "created_date",
    ])?;
    for record in &records {
        writer.serialize(ExportRow::from(record))?;
    }
    writer.flush()?;

    info!(
        "event=export_finish module=transfer status=ok rows={}",
        records.len()
    );
    Ok(records.len())
}

/// Creates (or truncates) `path` and exports into it.
pub fn export_csv_file<R>(repo: &R, path: impl AsRef<Path>) -> TransferResult<usize>
where
    R: AllergyRepository + ?Sized,
{
    let file = File::create(path)?;
    export_csv_writer(repo, file)
}
