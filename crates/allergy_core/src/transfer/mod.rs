//! CSV import/export for the allergy store.
//!
//! # Responsibility
//! - Move allergy records between the store and delimited text files.
//! - Keep file-format details out of repository code.
//!
//! # Invariants
//! - Import never aborts on a bad row; problems land in `ImportSummary::errors`.
//! - Export column order is fixed and matches the import header names.

use crate::repo::allergy_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod export;
pub mod import;

pub type TransferResult<T> = Result<T, TransferError>;

/// Failure while writing an export.
#[derive(Debug)]
pub enum TransferError {
    Io(std::io::Error),
    Csv(csv::Error),
    Repo(RepoError),
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Csv(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Csv(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for TransferError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for TransferError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<RepoError> for TransferError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}
