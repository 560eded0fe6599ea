//! Core domain logic for the food allergy store.
//! This crate is the single source of truth for record invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;
pub mod transfer;

pub use config::AppConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::allergy::{
    AllergyId, AllergyInput, AllergyRecord, AllergyValidationError, DangerLevel,
};
pub use repo::allergy_repo::{AllergyRepository, RepoError, RepoResult, SqliteAllergyRepository};
pub use seed::{sample_allergies, seed_sample_allergies, SeedSummary};
pub use service::allergy_service::AllergyService;
pub use transfer::export::{export_csv_file, export_csv_writer};
pub use transfer::import::{
    import_csv_file, import_csv_reader, import_rows, DuplicatePolicy, ImportSummary,
};
pub use transfer::{TransferError, TransferResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
