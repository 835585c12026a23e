//! Type-name bucketing.
//!
//! Declared metadata types ("VARCHAR", "INT") and store-reported types
//! ("Utf8", "Int64") never match verbatim, so both sides are classified into
//! a coarse [`TypeBucket`] and compared by bucket.

use crate::{Result, StoreError};
use arrow_schema::{DataType, TimeUnit};

/// Coarse type category.
///
/// A type name is split into alphanumeric words. A word belongs to a bucket
/// when it equals one of the bucket's variants, optionally followed by a bit
/// width (`INT64`, `FLOAT32`, `DECIMAL128`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeBucket {
    Text,
    Integer,
    Decimal,
    Datetime,
    Boolean,
}

impl TypeBucket {
    /// Buckets in classification order.
    pub const ALL: [TypeBucket; 5] = [
        TypeBucket::Text,
        TypeBucket::Integer,
        TypeBucket::Decimal,
        TypeBucket::Datetime,
        TypeBucket::Boolean,
    ];

    /// Upper-case words belonging to this bucket.
    pub fn variants(self) -> &'static [&'static str] {
        match self {
            TypeBucket::Text => &[
                "VARCHAR",
                "NVARCHAR",
                "CHAR",
                "NCHAR",
                "CHARACTER",
                "TEXT",
                "STRING",
                "UTF8",
                "LARGEUTF8",
                "UTF8VIEW",
            ],
            TypeBucket::Integer => &["INTEGER", "BIGINT", "SMALLINT", "TINYINT", "INT", "UINT"],
            TypeBucket::Decimal => &["DECIMAL", "NUMERIC", "FLOAT", "REAL", "DOUBLE"],
            TypeBucket::Datetime => &["DATETIME", "TIMESTAMP", "DATE", "TIME"],
            TypeBucket::Boolean => &["BOOLEAN", "BOOL", "BIT"],
        }
    }

    /// Returns true if any word of `type_name` belongs to this bucket.
    pub fn matches(self, type_name: &str) -> bool {
        words(type_name).any(|word| {
            self.variants().iter().any(|variant| {
                word.strip_prefix(*variant)
                    .is_some_and(|width| width.chars().all(|c| c.is_ascii_digit()))
            })
        })
    }

    /// Classifies a type name into the first matching bucket, or `None`.
    pub fn classify(type_name: &str) -> Option<TypeBucket> {
        TypeBucket::ALL
            .into_iter()
            .find(|bucket| bucket.matches(type_name))
    }
}

fn words(type_name: &str) -> impl Iterator<Item = String> + '_ {
    type_name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_uppercase)
}

/// Returns true if both type names are equal or any bucket matches both.
pub fn type_compatible(actual_type: &str, expected_type: &str) -> bool {
    if actual_type.trim().eq_ignore_ascii_case(expected_type.trim()) {
        return true;
    }

    TypeBucket::ALL
        .into_iter()
        .any(|bucket| bucket.matches(actual_type) && bucket.matches(expected_type))
}

/// Maps a declared column type onto the Arrow type used to read it.
///
/// # Errors
///
/// Returns [`StoreError::Configuration`] if the type fits no bucket.
pub fn arrow_type(declared: &str) -> Result<DataType> {
    let bucket = TypeBucket::classify(declared).ok_or_else(|| {
        StoreError::configuration(format!("Unsupported column type '{}'", declared))
    })?;

    let upper = declared.trim().to_ascii_uppercase();
    Ok(match bucket {
        TypeBucket::Text => DataType::Utf8,
        TypeBucket::Integer => DataType::Int64,
        TypeBucket::Decimal => DataType::Float64,
        TypeBucket::Datetime if upper == "DATE" => DataType::Date32,
        TypeBucket::Datetime => DataType::Timestamp(TimeUnit::Microsecond, None),
        TypeBucket::Boolean => DataType::Boolean,
    })
}
