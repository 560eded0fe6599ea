//! Bulk import of header-keyed rows into the allergy store.
//!
//! # Responsibility
//! - Map loosely-typed tabular rows onto `AllergyInput`.
//! - Apply the duplicate policy (`skip` or `update`) per row.
//! - Collect per-row problems in the summary instead of aborting.
//!
//! # Invariants
//! - Each row is an independent create/update; no transaction spans the batch.
//! - Row numbers in messages count the header as row 1.
//! - A missing or non-integer `danger_level` falls back to level 1.

use crate::model::allergy::{normalize_optional_text, AllergyInput, DangerLevel};
use crate::repo::allergy_repo::{AllergyRepository, RepoError};
use log::info;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

const HEADER_ROW_OFFSET: usize = 2;

/// How to treat rows whose `allergen_name` already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Leave the stored record untouched and count the row as skipped.
    #[default]
    Skip,
    /// Overwrite the stored record with the row values.
    Update,
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "update" => Ok(Self::Update),
            other => Err(format!(
                "unsupported duplicate policy `{other}`; expected skip|update"
            )),
        }
    }
}

impl Display for DuplicatePolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::Update => write!(f, "update"),
        }
    }
}

/// Outcome counters for one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

impl ImportSummary {
    /// Number of rows that changed the store.
    pub fn changed(&self) -> usize {
        self.imported + self.updated
    }
}

/// Imports already-parsed rows.
///
/// Header keys are matched case-insensitively; unknown keys are ignored.
pub fn import_rows<R, I>(repo: &R, rows: I, policy: DuplicatePolicy) -> ImportSummary
where
    R: AllergyRepository + ?Sized,
    I: IntoIterator<Item = HashMap<String, String>>,
{
    let mut summary = ImportSummary::default();
    for (index, row) in rows.into_iter().enumerate() {
        import_one(repo, &normalize_keys(row), index + HEADER_ROW_OFFSET, policy, &mut summary);
    }
    log_finish(policy, &summary);
    summary
}

/// Imports CSV text with a header row from any reader.
///
/// Problems that prevent reading the header end the run with a single
/// summary error; malformed records become per-row errors.
pub fn import_csv_reader<R, S>(repo: &R, source: S, policy: DuplicatePolicy) -> ImportSummary
where
    R: AllergyRepository + ?Sized,
    S: Read,
{
    let mut summary = ImportSummary::default();
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(source);

    let headers = match reader.headers() {
        Ok(headers) if headers.iter().any(|name| !name.trim().is_empty()) => headers
            .iter()
            .map(|name| name.trim().to_ascii_lowercase())
            .collect::<Vec<_>>(),
        Ok(_) => {
            summary.errors.push("CSV file has no header row".to_string());
            return summary;
        }
        Err(err) => {
            summary.errors.push(err.to_string());
            return summary;
        }
    };

    for (index, record) in reader.records().enumerate() {
        let row_number = index + HEADER_ROW_OFFSET;
        match record {
            Ok(record) => {
                let row = headers
                    .iter()
                    .cloned()
                    .zip(record.iter().map(str::to_string))
                    .collect::<HashMap<_, _>>();
                import_one(repo, &row, row_number, policy, &mut summary);
            }
            Err(err) => summary.errors.push(format!("Row {row_number}: {err}")),
        }
    }

    log_finish(policy, &summary);
    summary
}

/// Opens `path` and imports it as CSV.
pub fn import_csv_file<R>(repo: &R, path: impl AsRef<Path>, policy: DuplicatePolicy) -> ImportSummary
where
    R: AllergyRepository + ?Sized,
{
    let path = path.as_ref();
    match File::open(path) {
        Ok(file) => import_csv_reader(repo, file, policy),
        Err(err) if err.kind() == io::ErrorKind::NotFound => ImportSummary {
            errors: vec![format!("File not found: {}", path.display())],
            ..ImportSummary::default()
        },
        Err(err) => ImportSummary {
            errors: vec![err.to_string()],
            ..ImportSummary::default()
        },
    }
}

fn import_one<R>(
    repo: &R,
    row: &HashMap<String, String>,
    row_number: usize,
    policy: DuplicatePolicy,
    summary: &mut ImportSummary,
) where
    R: AllergyRepository + ?Sized,
{
    let input = match input_from_row(row) {
        Ok(input) => input,
        Err(message) => {
            summary.errors.push(format!("Row {row_number}: {message}"));
            return;
        }
    };

    match repo.create_allergy(&input) {
        Ok(_) => summary.imported += 1,
        Err(RepoError::DuplicateName(_)) => match policy {
            DuplicatePolicy::Skip => summary.skipped += 1,
            DuplicatePolicy::Update => update_existing(repo, &input, row_number, summary),
        },
        Err(err) => summary.errors.push(format!("Row {row_number}: {err}")),
    }
}

fn update_existing<R>(repo: &R, input: &AllergyInput, row_number: usize, summary: &mut ImportSummary)
where
    R: AllergyRepository + ?Sized,
{
    match repo.find_by_name(&input.allergen_name) {
        Ok(Some(existing)) => match repo.update_allergy(existing.id, input) {
            Ok(()) => summary.updated += 1,
            Err(_) => summary.errors.push(format!(
                "Row {row_number}: failed to update existing allergen '{}'",
                input.allergen_name
            )),
        },
        Ok(None) => summary.skipped += 1,
        Err(err) => summary.errors.push(format!("Row {row_number}: {err}")),
    }
}

fn input_from_row(row: &HashMap<String, String>) -> Result<AllergyInput, String> {
    let allergen_name = field(row, "allergen_name").unwrap_or_default();
    if allergen_name.is_empty() {
        return Err("missing allergen_name".to_string());
    }

    let danger_level = match field(row, "danger_level").map(|raw| raw.parse::<i64>()) {
        Some(Ok(value)) => DangerLevel::try_from(value).map_err(|err| err.to_string())?,
        Some(Err(_)) | None => DangerLevel::Mild,
    };

    Ok(AllergyInput {
        allergen_name,
        danger_level,
        symptoms: field(row, "symptoms"),
        ingredients: field(row, "ingredients"),
        source: field(row, "source"),
        notes: field(row, "notes"),
    })
}

fn field(row: &HashMap<String, String>, key: &str) -> Option<String> {
    normalize_optional_text(row.get(key).cloned())
}

fn normalize_keys(row: HashMap<String, String>) -> HashMap<String, String> {
    row.into_iter()
        .map(|(key, value)| (key.trim().to_ascii_lowercase(), value))
        .collect()
}

fn log_finish(policy: DuplicatePolicy, summary: &ImportSummary) {
    info!(
        "event=import_finish module=transfer status=ok policy={} imported={} updated={} skipped={} errors={}",
        policy,
        summary.imported,
        summary.updated,
        summary.skipped,
        summary.errors.len()
    );
}
