//! Allergy record domain model.
//!
//! # Responsibility
//! - Define the canonical allergy record and its writable input shape.
//! - Own danger level semantics and field normalization rules.
//!
//! # Invariants
//! - `allergen_name` is never blank after trimming.
//! - `danger_level` is always one of the four known severities.
//! - `id` and `created_date` are assigned by storage and never written by callers.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned row identifier.
pub type AllergyId = i64;

/// Severity classification, ordered from mild to life-threatening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum DangerLevel {
    Mild,
    Moderate,
    Severe,
    LifeThreatening,
}

impl DangerLevel {
    /// All levels in ascending severity.
    pub const ALL: [DangerLevel; 4] = [
        DangerLevel::Mild,
        DangerLevel::Moderate,
        DangerLevel::Severe,
        DangerLevel::LifeThreatening,
    ];

    /// Returns the persisted integer value (`1..=4`).
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Mild => 1,
            Self::Moderate => 2,
            Self::Severe => 3,
            Self::LifeThreatening => 4,
        }
    }

    /// Nearest valid level for an arbitrary stored integer.
    pub fn clamped(value: i64) -> Self {
        match value {
            i64::MIN..=1 => Self::Mild,
            2 => Self::Moderate,
            3 => Self::Severe,
            _ => Self::LifeThreatening,
        }
    }

    /// Upper-case badge label used by list views.
    pub fn label(self) -> &'static str {
        match self {
            Self::Mild => "MILD",
            Self::Moderate => "MODERATE",
            Self::Severe => "SEVERE",
            Self::LifeThreatening => "LIFE-THREATENING",
        }
    }

    /// Human-readable name, e.g. for form pickers (`2 - Moderate`).
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Mild => "Mild",
            Self::Moderate => "Moderate",
            Self::Severe => "Severe",
            Self::LifeThreatening => "Life-threatening",
        }
    }
}

impl TryFrom<i64> for DangerLevel {
    type Error = AllergyValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Mild),
            2 => Ok(Self::Moderate),
            3 => Ok(Self::Severe),
            4 => Ok(Self::LifeThreatening),
            other => Err(AllergyValidationError::DangerLevelOutOfRange(other)),
        }
    }
}

impl From<DangerLevel> for i64 {
    fn from(value: DangerLevel) -> Self {
        value.as_i64()
    }
}

impl Display for DangerLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.as_i64(), self.display_name())
    }
}

/// Validation failures for allergy writes and persisted rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllergyValidationError {
    EmptyAllergenName,
    DangerLevelOutOfRange(i64),
}

impl Display for AllergyValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyAllergenName => write!(f, "allergen_name cannot be empty"),
            Self::DangerLevelOutOfRange(value) => {
                write!(f, "danger_level must be between 1 and 4, got {value}")
            }
        }
    }
}

impl Error for AllergyValidationError {}

/// Writable fields of an allergy record.
///
/// Used for both create and full-replace update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllergyInput {
    pub allergen_name: String,
    pub danger_level: DangerLevel,
    pub symptoms: Option<String>,
    pub ingredients: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
}

impl AllergyInput {
    /// Creates an input with all optional text fields unset.
    ///
    /// The name is trimmed; use [`AllergyInput::validate`] to reject blanks.
    pub fn new(allergen_name: impl Into<String>, danger_level: DangerLevel) -> Self {
        Self {
            allergen_name: allergen_name.into().trim().to_string(),
            danger_level,
            symptoms: None,
            ingredients: None,
            source: None,
            notes: None,
        }
    }

    pub fn with_symptoms(mut self, value: impl Into<String>) -> Self {
        self.symptoms = normalize_optional_text(Some(value.into()));
        self
    }

    pub fn with_ingredients(mut self, value: impl Into<String>) -> Self {
        self.ingredients = normalize_optional_text(Some(value.into()));
        self
    }

    pub fn with_source(mut self, value: impl Into<String>) -> Self {
        self.source = normalize_optional_text(Some(value.into()));
        self
    }

    pub fn with_notes(mut self, value: impl Into<String>) -> Self {
        self.notes = normalize_optional_text(Some(value.into()));
        self
    }

    /// Checks write-path invariants.
    ///
    /// # Errors
    /// - [`AllergyValidationError::EmptyAllergenName`] when the name is blank.
    pub fn validate(&self) -> Result<(), AllergyValidationError> {
        if self.allergen_name.trim().is_empty() {
            return Err(AllergyValidationError::EmptyAllergenName);
        }
        Ok(())
    }
}

/// Persisted allergy record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllergyRecord {
    pub id: AllergyId,
    pub allergen_name: String,
    pub danger_level: DangerLevel,
    pub symptoms: Option<String>,
    pub ingredients: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
    /// `YYYY-MM-DD HH:MM:SS` in UTC, assigned at creation.
    pub created_date: Option<String>,
}

impl AllergyRecord {
    /// Returns the writable projection of this record.
    pub fn to_input(&self) -> AllergyInput {
        AllergyInput {
            allergen_name: self.allergen_name.clone(),
            danger_level: self.danger_level,
            symptoms: self.symptoms.clone(),
            ingredients: self.ingredients.clone(),
            source: self.source.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Trims optional free text and maps blank values to `None`.
pub fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
