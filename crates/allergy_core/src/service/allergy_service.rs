//! Allergy use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for presentation-layer callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::allergy::{AllergyId, AllergyInput, AllergyRecord, DangerLevel};
use crate::repo::allergy_repo::{AllergyRepository, RepoResult};
use crate::seed::{seed_sample_allergies, SeedSummary};
use crate::transfer::export::export_csv_file;
use crate::transfer::import::{import_csv_file, import_rows, DuplicatePolicy, ImportSummary};
use crate::transfer::TransferResult;
use std::collections::HashMap;
use std::path::Path;

/// Use-case service wrapper over an allergy repository.
pub struct AllergyService<R: AllergyRepository> {
    repo: R,
}

impl<R: AllergyRepository> AllergyService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the wrapped repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn create_allergy(&self, input: &AllergyInput) -> RepoResult<AllergyId> {
        self.repo.create_allergy(input)
    }

    pub fn get_allergy(&self, id: AllergyId) -> RepoResult<Option<AllergyRecord>> {
        self.repo.get_allergy(id)
    }

    /// Replaces every mutable field of an existing record.
    ///
    /// Returns repository-level not-found or validation errors unchanged.
    pub fn update_allergy(&self, id: AllergyId, input: &AllergyInput) -> RepoResult<()> {
        self.repo.update_allergy(id, input)
    }

    pub fn delete_allergy(&self, id: AllergyId) -> RepoResult<()> {
        self.repo.delete_allergy(id)
    }

    pub fn list_allergies(&self, danger_level: Option<DangerLevel>) -> RepoResult<Vec<AllergyRecord>> {
        self.repo.list_allergies(danger_level)
    }

    /// Searches name and ingredients.
    ///
    /// # Contract
    /// - Surrounding whitespace is trimmed before matching.
    /// - A blank term returns an empty list without querying storage.
    pub fn search_allergies(
        &self,
        term: &str,
        danger_level: Option<DangerLevel>,
    ) -> RepoResult<Vec<AllergyRecord>> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        self.repo.search_allergies(term, danger_level)
    }

    pub fn count_allergies(&self) -> RepoResult<u64> {
        self.repo.count_allergies()
    }

    pub fn import_rows(
        &self,
        rows: impl IntoIterator<Item = HashMap<String, String>>,
        policy: DuplicatePolicy,
    ) -> ImportSummary {
        import_rows(&self.repo, rows, policy)
    }

    pub fn import_csv_file(&self, path: impl AsRef<Path>, policy: DuplicatePolicy) -> ImportSummary {
        import_csv_file(&self.repo, path, policy)
    }

    pub fn export_csv_file(&self, path: impl AsRef<Path>) -> TransferResult<usize> {
        export_csv_file(&self.repo, path)
    }

    pub fn seed_samples(&self) -> RepoResult<SeedSummary> {
        seed_sample_allergies(&self.repo)
    }
}
