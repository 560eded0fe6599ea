//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and transfer calls into use-case level APIs.
//! - Keep CLI and other front ends decoupled from storage details.

pub mod allergy_service;
