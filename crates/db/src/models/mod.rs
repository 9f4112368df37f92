//! Persisted entity models and their request DTOs.

pub mod project;
pub mod upload;
