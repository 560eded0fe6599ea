//! Allergy repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, list and search APIs over canonical `allergies` storage.
//! - Keep SQL details inside core persistence boundary.
//! - Report name collisions as a typed error distinct from storage failures.
//!
//! # Invariants
//! - Write paths must call `AllergyInput::validate()` before SQL mutations.
//! - Read paths reject an empty persisted name.
//! - A persisted `danger_level` outside `1..=4` reads as the nearest level
//!   and is logged; the stored value is left untouched.
//! - `create_allergy` never changes state when it returns an error.
//! - List and search results are ordered by `danger_level DESC, allergen_name ASC`.

use crate::db::migrations::{current_user_version, latest_version, table_columns};
use crate::db::DbError;
use crate::model::allergy::{
    normalize_optional_text, AllergyId, AllergyInput, AllergyRecord, AllergyValidationError,
    DangerLevel,
};
use log::{info, warn};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TABLE: &str = "allergies";
const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "allergen_name",
    "danger_level",
    "symptoms",
    "ingredients",
    "notes",
    "created_date",
];
const ORDER_BY_SQL: &str = " ORDER BY danger_level DESC, allergen_name ASC";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for allergy persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(AllergyValidationError),
    Db(DbError),
    /// Another record already uses this allergen name.
    DuplicateName(String),
    NotFound(AllergyId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateName(name) => write!(f, "allergen `{name}` already exists"),
            Self::NotFound(id) => write!(f, "allergy not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted allergy data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is below required {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::DuplicateName(_)
            | Self::NotFound(_)
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<AllergyValidationError> for RepoError {
    fn from(value: AllergyValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the allergy record store.
pub trait AllergyRepository {
    fn create_allergy(&self, input: &AllergyInput) -> RepoResult<AllergyId>;
    fn get_allergy(&self, id: AllergyId) -> RepoResult<Option<AllergyRecord>>;
    /// Case-insensitive exact match on `allergen_name`.
    fn find_by_name(&self, name: &str) -> RepoResult<Option<AllergyRecord>>;
    fn update_allergy(&self, id: AllergyId, input: &AllergyInput) -> RepoResult<()>;
    /// Succeeds whether or not `id` exists.
    fn delete_allergy(&self, id: AllergyId) -> RepoResult<()>;
    fn list_allergies(&self, danger_level: Option<DangerLevel>) -> RepoResult<Vec<AllergyRecord>>;
    /// Case-insensitive substring match on `allergen_name` or `ingredients`.
    fn search_allergies(
        &self,
        term: &str,
        danger_level: Option<DangerLevel>,
    ) -> RepoResult<Vec<AllergyRecord>>;
    fn count_allergies(&self) -> RepoResult<u64>;
}

/// SQLite-backed allergy repository.
pub struct SqliteAllergyRepository<'conn> {
    conn: &'conn Connection,
    has_source_column: bool,
}

impl<'conn> SqliteAllergyRepository<'conn> {
    /// Wraps a bootstrapped connection.
    ///
    /// A table that still lacks `source` (failed legacy repair) is accepted;
    /// `source` then reads as `None` and is not written.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` for foreign schemas.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version < expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let columns = table_columns(conn, TABLE)?;
        if columns.is_empty() {
            return Err(RepoError::MissingRequiredTable(TABLE));
        }
        if let Some(column) = REQUIRED_COLUMNS
            .iter()
            .copied()
            .find(|required| !columns.iter().any(|name| name == *required))
        {
            return Err(RepoError::MissingRequiredColumn {
                table: TABLE,
                column,
            });
        }

        let has_source_column = columns.iter().any(|name| name == "source");
        if !has_source_column {
            warn!("event=repo_init module=repo status=degraded missing_column=source");
        }

        Ok(Self {
            conn,
            has_source_column,
        })
    }

    fn select_sql(&self) -> String {
        let source = if self.has_source_column {
            "source"
        } else {
            "NULL AS source"
        };
        format!(
            "SELECT
    id,
    allergen_name,
    danger_level,
    symptoms,
    ingredients,
    {source},
    notes,
    created_date
FROM {TABLE}"
        )
    }

    fn query_records(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<AllergyRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_allergy_row(row)?);
        }

        Ok(records)
    }

    fn write_values(&self, input: &AllergyInput) -> Vec<Value> {
        let mut values = vec![
            Value::Text(input.allergen_name.trim().to_string()),
            Value::Integer(input.danger_level.as_i64()),
            optional_text_value(&input.symptoms),
            optional_text_value(&input.ingredients),
            optional_text_value(&input.notes),
        ];
        if self.has_source_column {
            values.push(optional_text_value(&input.source));
        }
        values
    }
}

impl AllergyRepository for SqliteAllergyRepository<'_> {
    fn create_allergy(&self, input: &AllergyInput) -> RepoResult<AllergyId> {
        input.validate()?;
        let name = input.allergen_name.trim();

        if self.find_by_name(name)?.is_some() {
            return Err(RepoError::DuplicateName(name.to_string()));
        }

        let sql = if self.has_source_column {
            "INSERT INTO allergies (
                allergen_name,
                danger_level,
                symptoms,
                ingredients,
                notes,
                source
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);"
        } else {
            "INSERT INTO allergies (
                allergen_name,
                danger_level,
                symptoms,
                ingredients,
                notes
            ) VALUES (?1, ?2, ?3, ?4, ?5);"
        };

        self.conn
            .execute(sql, params_from_iter(self.write_values(input)))
            .map_err(|err| map_write_error(err, name))?;
        let id = self.conn.last_insert_rowid();

        info!("event=allergy_create module=repo status=ok id={id}");
        Ok(id)
    }

    fn get_allergy(&self, id: AllergyId) -> RepoResult<Option<AllergyRecord>> {
        let sql = format!("{} WHERE id = ?1;", self.select_sql());
        let mut records = self.query_records(&sql, vec![Value::Integer(id)])?;
        Ok(records.pop())
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<AllergyRecord>> {
        let sql = format!(
            "{} WHERE LOWER(allergen_name) = LOWER(?1) ORDER BY id ASC LIMIT 1;",
            self.select_sql()
        );
        let mut records = self.query_records(&sql, vec![Value::Text(name.trim().to_string())])?;
        Ok(records.pop())
    }

    fn update_allergy(&self, id: AllergyId, input: &AllergyInput) -> RepoResult<()> {
        input.validate()?;

        let sql = if self.has_source_column {
            "UPDATE allergies
             SET
                allergen_name = ?1,
                danger_level = ?2,
                symptoms = ?3,
                ingredients = ?4,
                notes = ?5,
                source = ?6
             WHERE id = ?7;"
        } else {
            "UPDATE allergies
             SET
                allergen_name = ?1,
                danger_level = ?2,
                symptoms = ?3,
                ingredients = ?4,
                notes = ?5
             WHERE id = ?6;"
        };

        let mut values = self.write_values(input);
        values.push(Value::Integer(id));
        let changed = self
            .conn
            .execute(sql, params_from_iter(values))
            .map_err(|err| map_write_error(err, input.allergen_name.trim()))?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        info!("event=allergy_update module=repo status=ok id={id}");
        Ok(())
    }

    fn delete_allergy(&self, id: AllergyId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM allergies WHERE id = ?1;", [id])?;
        info!("event=allergy_delete module=repo status=ok id={id} changed={changed}");
        Ok(())
    }

    fn list_allergies(&self, danger_level: Option<DangerLevel>) -> RepoResult<Vec<AllergyRecord>> {
        let mut sql = format!("{} WHERE 1 = 1", self.select_sql());
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(level) = danger_level {
            sql.push_str(" AND danger_level = ?");
            bind_values.push(Value::Integer(level.as_i64()));
        }

        sql.push_str(ORDER_BY_SQL);
        self.query_records(&sql, bind_values)
    }

    fn search_allergies(
        &self,
        term: &str,
        danger_level: Option<DangerLevel>,
    ) -> RepoResult<Vec<AllergyRecord>> {
        let pattern = format!("%{}%", escape_like_term(term));
        let mut sql = format!(
            "{} WHERE (LOWER(allergen_name) LIKE LOWER(?) ESCAPE '\\'
                OR LOWER(ingredients) LIKE LOWER(?) ESCAPE '\\')",
            self.select_sql()
        );
        let mut bind_values = vec![Value::Text(pattern.clone()), Value::Text(pattern)];

        if let Some(level) = danger_level {
            sql.push_str(" AND danger_level = ?");
            bind_values.push(Value::Integer(level.as_i64()));
        }

        sql.push_str(ORDER_BY_SQL);
        self.query_records(&sql, bind_values)
    }

    fn count_allergies(&self) -> RepoResult<u64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM allergies;", [], |row| {
                row.get::<_, i64>(0)
            })?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }
}

fn parse_allergy_row(row: &Row<'_>) -> RepoResult<AllergyRecord> {
    let id: AllergyId = row.get("id")?;

    let level_value: i64 = row.get("danger_level")?;
    let danger_level = DangerLevel::try_from(level_value).unwrap_or_else(|_| {
        let clamped = DangerLevel::clamped(level_value);
        warn!(
            "event=allergy_read module=repo status=clamped id={id} stored_level={level_value} level={}",
            clamped.as_i64()
        );
        clamped
    });

    let allergen_name: String = row.get("allergen_name")?;
    if allergen_name.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "empty allergen_name for id {id}"
        )));
    }

    Ok(AllergyRecord {
        id,
        allergen_name,
        danger_level,
        symptoms: normalize_optional_text(row.get("symptoms")?),
        ingredients: normalize_optional_text(row.get("ingredients")?),
        source: normalize_optional_text(row.get("source")?),
        notes: normalize_optional_text(row.get("notes")?),
        created_date: row.get("created_date")?,
    })
}

fn optional_text_value(value: &Option<String>) -> Value {
    match normalize_optional_text(value.clone()) {
        Some(text) => Value::Text(text),
        None => Value::Null,
    }
}

fn map_write_error(err: rusqlite::Error, name: &str) -> RepoError {
    if is_unique_violation(&err) {
        return RepoError::DuplicateName(name.to_string());
    }
    RepoError::Db(DbError::Sqlite(err))
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        }
        _ => false,
    }
}

fn escape_like_term(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
