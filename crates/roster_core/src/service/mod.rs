//! Core use-case services.
//!
//! # Responsibility
//! - Enforce roster validation rules above the repository layer.
//! - Keep CLI/UI callers decoupled from storage details.

pub mod record_store;
