//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service and transfer orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `AllergyInput::validate()` before persistence.
//! - Repository APIs return semantic errors (`DuplicateName`, `NotFound`) in
//!   addition to DB transport errors.

pub mod allergy_repo;
