//! # Feedcheck Core
//!
//! Core data structures for the feedcheck validation engine.
//!
//! Metadata declares what landed feed tables should look like; the engine
//! probes the live tables and reports one uniform record per check.
//!
//! ## Key Concepts
//!
//! - **FeedMetadata**: expected constraints for one column of a feed table
//! - **EnumerationCatalog**: named closed sets of allowed values
//! - **ValidationRecord**: PASS/FAIL/ERROR outcome plus a per-kind payload
//! - **ValidationContext**: feed filter, selected checks and expected counts
//!
//! ## Example
//!
//! ```rust
//! use feedcheck_core::{FeedMetadataBuilder, MetadataSet, ValidationContext};
//!
//! let metadata = MetadataSet {
//!     feeds: vec![
//!         FeedMetadataBuilder::new("Orders", "orders.csv", "warehouse", "orders", "order_id")
//!             .data_type("INTEGER")
//!             .mandatory(true)
//!             .build(),
//!     ],
//!     ..Default::default()
//! };
//!
//! let context = ValidationContext::new().with_feeds(["orders.csv"]);
//! assert_eq!(context.filter_feeds(&metadata.feeds).len(), 1);
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod metadata;
pub mod result;

pub use builder::*;
pub use context::*;
pub use error::*;
pub use metadata::*;
pub use result::*;
