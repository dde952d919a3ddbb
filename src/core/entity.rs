//! Record trait - common interface for every table-backed record type

use thiserror::Error;

use crate::core::table::{Row, RowRef};

/// A typed view of one row in one table file
pub trait Record: Sized {
    /// Human-readable kind used in messages ("supplier", "asset")
    const KIND: &'static str;

    /// File name inside the data directory
    const FILE: &'static str;

    /// Canonical column order for the table
    const COLUMNS: &'static [&'static str];

    /// Column holding the record's unique key
    const ID_COLUMN: &'static str;

    /// Prefix for generated IDs; `None` when the key is supplied by the caller
    const ID_PREFIX: Option<&'static str>;

    /// Column naming the role a row belongs to, for scoped views
    const OWNER_COLUMN: Option<&'static str> = None;

    fn id(&self) -> &str;

    fn assign_id(&mut self, id: String);

    /// Check required fields and value ranges
    fn validate(&self) -> Result<(), ValidationError>;

    fn to_row(&self) -> Row;

    fn from_row(row: &RowRef<'_>) -> Self;
}

/// Form-level validation failure; nothing is written when this is returned
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("please fill in all required fields: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("{field} {message}")]
    Invalid { field: &'static str, message: String },
}

/// Fail with every blank field named at once
pub fn require(fields: &[(&'static str, &str)]) -> Result<(), ValidationError> {
    let missing: Vec<&'static str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Missing(missing))
    }
}

/// Optional numeric field must lie within `[min, max]`
pub fn within(field: &'static str, value: Option<f64>, min: f64, max: f64) -> Result<(), ValidationError> {
    match value {
        Some(v) if !(min..=max).contains(&v) => Err(ValidationError::Invalid {
            field,
            message: format!("must be between {} and {} (got {})", min, max, v),
        }),
        _ => Ok(()),
    }
}

/// Lowercase with separators folded, so `pending-renewal` matches `Pending Renewal`
pub fn normalize_label(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect()
}

/// Closed set of display labels stored verbatim in a column
macro_rules! label_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = $crate::core::entity::normalize_label(s);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| $crate::core::entity::normalize_label(v.as_str()) == wanted)
                    .ok_or_else(|| {
                        let options: Vec<&str> = Self::ALL.iter().map(|v| v.as_str()).collect();
                        format!("Unknown value '{}' (expected one of: {})", s, options.join(", "))
                    })
            }
        }
    };
}

pub(crate) use label_enum;
