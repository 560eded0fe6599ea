//! Domain model for allergy records.
//!
//! # Responsibility
//! - Define canonical data structures used by store, importer and exporter.
//!
//! # Invariants
//! - Every record is identified by a storage-assigned `AllergyId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod allergy;
