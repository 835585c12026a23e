//! Builder for assembling feed metadata in code.
//!
//! Ingestion normally builds [`FeedMetadata`] from raw rows; the builder is
//! for programmatic setup and tests.

use crate::{FeedMetadata, Flag, RequestMode, parse_feed_list};

/// Builder for creating a `FeedMetadata`.
///
/// # Example
///
/// ```rust
/// use feedcheck_core::{FeedMetadataBuilder, Flag};
///
/// let meta = FeedMetadataBuilder::new("Orders", "orders.csv", "warehouse", "orders", "order_id")
///     .data_type("INTEGER")
///     .mandatory(true)
///     .unique(true)
///     .build();
///
/// assert_eq!(meta.mandatory, Flag::Yes);
/// assert_eq!(meta.table_key(), "warehouse.orders");
/// ```
#[derive(Debug, Clone)]
pub struct FeedMetadataBuilder {
    meta: FeedMetadata,
}

impl FeedMetadataBuilder {
    /// Creates a builder for one column with every optional constraint unset.
    pub fn new(
        module: impl Into<String>,
        feed: impl Into<String>,
        db_name: impl Into<String>,
        table_name: impl Into<String>,
        column_name: impl Into<String>,
    ) -> Self {
        let feed = feed.into();
        Self {
            meta: FeedMetadata {
                module: module.into(),
                feed_list: parse_feed_list(&feed),
                feed,
                column_name: column_name.into(),
                db_name: db_name.into(),
                table_name: table_name.into(),
                data_type: String::new(),
                nullable: Flag::No,
                request: RequestMode::Insert,
                default_value: None,
                enumeration: None,
                range_bottom: None,
                range_top: None,
                mandatory: Flag::No,
                unique: Flag::No,
            },
        }
    }

    /// Sets the declared data type.
    pub fn data_type(mut self, data_type: impl Into<String>) -> Self {
        self.meta.data_type = data_type.into();
        self
    }

    /// Sets the nullable flag.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.meta.nullable = to_flag(nullable);
        self
    }

    /// Sets the mandatory flag.
    pub fn mandatory(mut self, mandatory: bool) -> Self {
        self.meta.mandatory = to_flag(mandatory);
        self
    }

    /// Sets the unique flag.
    pub fn unique(mut self, unique: bool) -> Self {
        self.meta.unique = to_flag(unique);
        self
    }

    /// Sets the request mode.
    pub fn request(mut self, request: RequestMode) -> Self {
        self.meta.request = request;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.meta.default_value = Some(value.into());
        self
    }

    /// References an enumeration catalog by name.
    pub fn enumeration(mut self, name: impl Into<String>) -> Self {
        self.meta.enumeration = Some(name.into());
        self
    }

    /// Sets the lower range bound.
    pub fn range_bottom(mut self, bottom: impl Into<String>) -> Self {
        self.meta.range_bottom = Some(bottom.into());
        self
    }

    /// Sets the upper range bound.
    pub fn range_top(mut self, top: impl Into<String>) -> Self {
        self.meta.range_top = Some(top.into());
        self
    }

    /// Builds the metadata record.
    pub fn build(self) -> FeedMetadata {
        self.meta
    }
}

fn to_flag(value: bool) -> Flag {
    if value { Flag::Yes } else { Flag::No }
}
