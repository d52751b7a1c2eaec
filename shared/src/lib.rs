//! Shared types and models for the Fabrication ERP
//!
//! This crate contains the domain rules shared between the backend, the
//! browser (via WASM), and tests: production stages, quantity invariants,
//! GST arithmetic and document numbering.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
