//! Command definitions and execution.

use allergy_core::db::{open_db, DbError};
use allergy_core::{
    AllergyId, AllergyInput, AllergyRecord, AllergyService, AppConfig, DangerLevel,
    DuplicatePolicy, RepoError, SqliteAllergyRepository, TransferError,
};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use std::fmt::{Display, Formatter};
use std::io::{self, Write};
use std::path::PathBuf;

/// Track food allergies in a local SQLite database.
#[derive(Debug, Parser)]
#[command(name = "allergy-shield", version)]
pub struct Cli {
    /// Database file. Falls back to `ALLERGY_SHIELD_DB_PATH`, then `allergies.db`.
    #[arg(long = "db", value_name = "path", global = true)]
    db_path: Option<PathBuf>,
    /// Log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "level", global = true)]
    log_level: Option<String>,
    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long = "log-dir", value_name = "dir", global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Applies command-line overrides on top of `base`.
    pub fn resolve_config(&self, base: AppConfig) -> AppConfig {
        AppConfig {
            db_path: self.db_path.clone().unwrap_or(base.db_path),
            log_level: self.log_level.clone().unwrap_or(base.log_level),
            log_dir: self.log_dir.clone().or(base.log_dir),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a new allergy.
    Add(AddArgs),
    /// Show one allergy in full.
    Show { id: AllergyId },
    /// Replace fields of an existing allergy; omitted flags keep current values.
    Edit {
        id: AllergyId,
        #[command(flatten)]
        fields: EditArgs,
    },
    /// Delete an allergy by id.
    Delete { id: AllergyId },
    /// List allergies, most dangerous first.
    List {
        #[arg(long, value_parser = parse_danger_level)]
        level: Option<DangerLevel>,
    },
    /// Search allergen names and ingredients.
    Search {
        term: String,
        #[arg(long, value_parser = parse_danger_level)]
        level: Option<DangerLevel>,
    },
    /// Import allergies from a CSV file with a header row.
    Import {
        file: PathBuf,
        #[arg(long = "on-duplicate", default_value = "skip", value_parser = parse_policy)]
        on_duplicate: DuplicatePolicy,
    },
    /// Export all allergies to a CSV file.
    Export { file: PathBuf },
    /// Insert the built-in sample allergens.
    Seed,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::Show { .. } => "show",
            Self::Edit { .. } => "edit",
            Self::Delete { .. } => "delete",
            Self::List { .. } => "list",
            Self::Search { .. } => "search",
            Self::Import { .. } => "import",
            Self::Export { .. } => "export",
            Self::Seed => "seed",
        }
    }
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    name: String,
    #[arg(long, value_parser = parse_danger_level)]
    level: DangerLevel,
    #[command(flatten)]
    details: DetailArgs,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long, value_parser = parse_danger_level)]
    level: Option<DangerLevel>,
    #[command(flatten)]
    details: DetailArgs,
}

/// Optional free-text fields. An empty value clears the field on edit.
#[derive(Debug, Args)]
pub struct DetailArgs {
    #[arg(long)]
    symptoms: Option<String>,
    #[arg(long)]
    ingredients: Option<String>,
    #[arg(long)]
    source: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

impl DetailArgs {
    fn apply(&self, mut input: AllergyInput) -> AllergyInput {
        if let Some(value) = &self.symptoms {
            input = input.with_symptoms(value.as_str());
        }
        if let Some(value) = &self.ingredients {
            input = input.with_ingredients(value.as_str());
        }
        if let Some(value) = &self.source {
            input = input.with_source(value.as_str());
        }
        if let Some(value) = &self.notes {
            input = input.with_notes(value.as_str());
        }
        input
    }
}

/// Failure surfaced to the user.
#[derive(Debug)]
pub enum CommandError {
    Usage(String),
    DuplicateName(String),
    Repo(RepoError),
    Db(DbError),
    Transfer(TransferError),
    Io(io::Error),
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Usage(message) => write!(f, "{message}"),
            Self::DuplicateName(name) => {
                write!(f, "Allergen \"{name}\" already exists in the database.")
            }
            Self::Repo(err) => write!(f, "Operation failed: {err}"),
            Self::Db(err) => write!(f, "Could not open database: {err}"),
            Self::Transfer(err) => write!(f, "Export failed: {err}"),
            Self::Io(err) => write!(f, "Output failed: {err}"),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<RepoError> for CommandError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateName(name) => Self::DuplicateName(name),
            other => Self::Repo(other),
        }
    }
}

impl From<DbError> for CommandError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<TransferError> for CommandError {
    fn from(value: TransferError) -> Self {
        Self::Transfer(value)
    }
}

impl From<io::Error> for CommandError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Opens the configured database and executes one command.
pub fn run(command: &Command, config: &AppConfig, out: &mut impl Write) -> Result<(), CommandError> {
    let conn = open_db(&config.db_path)?;
    let repo = SqliteAllergyRepository::try_new(&conn)?;
    let service = AllergyService::new(repo);
    let name = command.name();
    match execute(command, &service, out) {
        Ok(()) => {
            info!("event=cli_command module=cli status=ok command={name}");
            Ok(())
        }
        Err(err) => {
            warn!("event=cli_command module=cli status=error command={name} error={err}");
            Err(err)
        }
    }
}

fn execute(
    command: &Command,
    service: &AllergyService<SqliteAllergyRepository<'_>>,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    match command {
        Command::Add(args) => {
            let input = args
                .details
                .apply(AllergyInput::new(args.name.as_str(), args.level));
            if input.allergen_name.is_empty() {
                return Err(CommandError::Usage(
                    "Please enter allergen name and select danger level.".to_string(),
                ));
            }
            let id = service.create_allergy(&input)?;
            writeln!(
                out,
                "Allergy \"{}\" added successfully! (id {id})",
                input.allergen_name
            )?;
        }
        Command::Show { id } => match service.get_allergy(*id)? {
            Some(record) => write_details(out, &record)?,
            None => return Err(not_found(*id)),
        },
        Command::Edit { id, fields } => {
            let existing = service.get_allergy(*id)?.ok_or_else(|| not_found(*id))?;
            let mut input = existing.to_input();
            if let Some(name) = &fields.name {
                input.allergen_name = name.trim().to_string();
            }
            if let Some(level) = fields.level {
                input.danger_level = level;
            }
            let input = fields.details.apply(input);
            service.update_allergy(*id, &input)?;
            writeln!(
                out,
                "Allergy \"{}\" updated successfully!",
                input.allergen_name
            )?;
        }
        Command::Delete { id } => {
            let existing = service.get_allergy(*id).ok().flatten();
            service.delete_allergy(*id)?;
            match existing {
                Some(record) => writeln!(out, "Deleted \"{}\".", record.allergen_name)?,
                None => writeln!(out, "No allergy with id {id}; nothing deleted.")?,
            }
        }
        Command::List { level } => {
            let records = service.list_allergies(*level)?;
            if records.is_empty() {
                writeln!(out, "No allergies recorded yet.")?;
            }
            for record in &records {
                write_summary_line(out, record)?;
            }
        }
        Command::Search { term, level } => {
            if term.trim().is_empty() {
                return Ok(());
            }
            let records = service.search_allergies(term, *level)?;
            if records.is_empty() {
                writeln!(out, "No allergies found matching '{}'.", term.trim())?;
            }
            for record in &records {
                write_summary_line(out, record)?;
            }
        }
        Command::Import { file, on_duplicate } => {
            let summary = service.import_csv_file(file, *on_duplicate);
            writeln!(
                out,
                "Imported: {}, Updated: {}, Skipped: {}, Errors: {}",
                summary.imported,
                summary.updated,
                summary.skipped,
                summary.errors.len()
            )?;
            for error in &summary.errors {
                writeln!(out, "{error}")?;
            }
        }
        Command::Export { file } => {
            let path = with_csv_extension(file.clone());
            let rows = service.export_csv_file(&path)?;
            writeln!(out, "Exported {rows} rows to: {}", path.display())?;
        }
        Command::Seed => {
            let summary = service.seed_samples()?;
            writeln!(
                out,
                "Added {} sample allergies ({} already present). Database now holds {}.",
                summary.added,
                summary.skipped,
                service.count_allergies()?
            )?;
        }
    }
    Ok(())
}

fn write_summary_line(out: &mut impl Write, record: &AllergyRecord) -> io::Result<()> {
    writeln!(
        out,
        "{:>5}  {:<16}  {}",
        record.id,
        record.danger_level.label(),
        record.allergen_name
    )
}

fn write_details(out: &mut impl Write, record: &AllergyRecord) -> io::Result<()> {
    writeln!(out, "{} (id {})", record.allergen_name, record.id)?;
    writeln!(out, "  Danger level: {}", record.danger_level)?;
    for (label, value) in [
        ("Symptoms", &record.symptoms),
        ("Ingredients", &record.ingredients),
        ("Source", &record.source),
        ("Notes", &record.notes),
        ("Created", &record.created_date),
    ] {
        if let Some(value) = value {
            writeln!(out, "  {label}: {value}")?;
        }
    }
    Ok(())
}

fn not_found(id: AllergyId) -> CommandError {
    CommandError::Repo(RepoError::NotFound(id))
}

fn with_csv_extension(path: PathBuf) -> PathBuf {
    let has_csv_extension = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if has_csv_extension {
        return path;
    }
    let mut raw = path.into_os_string();
    raw.push(".csv");
    PathBuf::from(raw)
}

fn parse_danger_level(raw: &str) -> Result<DangerLevel, String> {
    let value = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("danger level must be a number from 1 to 4, got `{raw}`"))?;
    DangerLevel::try_from(value).map_err(|err| err.to_string())
}

fn parse_policy(raw: &str) -> Result<DuplicatePolicy, String> {
    raw.parse()
}
