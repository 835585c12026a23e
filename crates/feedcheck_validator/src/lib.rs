//! # Feedcheck Validator
//!
//! Validation engine for feed metadata. This crate checks landed tables
//! against their declared metadata through a [`feedcheck_store::DataStore`]:
//!
//! - Schema validation (table existence, declared column types)
//! - Constraint validation (nullability, uniqueness, ranges, enumerations)
//! - Load-mode classification (Insert / Append)
//! - Quality checks (row counts, completeness)
//!
//! Every validator returns one record per column or table it evaluated.
//! Store failures never escape: they become ERROR records for the unit that
//! hit them.
//!
//! ## Example
//!
//! ```rust
//! use feedcheck_core::{MetadataSet, ValidationContext};
//! use feedcheck_store::FixtureStore;
//! use feedcheck_validator::DataValidator;
//!
//! let store = FixtureStore::new();
//! let validator = DataValidator::new(&store);
//!
//! let report = validator.validate(&MetadataSet::default(), &ValidationContext::new());
//!
//! if report.is_clean() {
//!     println!("Validation passed!");
//! } else {
//!     for record in &report.records {
//!         println!("{}: {:?}", record.validation_type(), record.error_message);
//!     }
//! }
//! ```

mod constraints;
mod engine;
mod error;
mod group;
mod load;
mod outcome;
mod quality;
mod schema;

pub use constraints::*;
pub use engine::*;
pub use error::*;
pub use group::*;
pub use load::*;
pub use quality::*;
pub use schema::*;
