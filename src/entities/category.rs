//! Contributor categories.
//!
//! The same closed set is used when adding and when editing a record, and is
//! stored as its text label.

use crate::errors::ValidationError;
use sea_orm::{Iterable, entity::prelude::*};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Relationship of a contributor to the host.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Category {
    /// A friend of the host
    #[default]
    #[sea_orm(string_value = "Friend")]
    Friend,
    /// A relative outside the immediate family
    #[sea_orm(string_value = "Relative")]
    Relative,
    /// A colleague
    #[sea_orm(string_value = "Workplace")]
    Workplace,
    /// Immediate family
    #[sea_orm(string_value = "Family")]
    Family,
    /// An acquaintance
    #[sea_orm(string_value = "Acquaintance")]
    Acquaintance,
    /// Anything else
    #[sea_orm(string_value = "Other")]
    Other,
}

impl Category {
    /// Label used for storage, display and the exported spreadsheet.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Friend => "Friend",
            Self::Relative => "Relative",
            Self::Workplace => "Workplace",
            Self::Family => "Family",
            Self::Acquaintance => "Acquaintance",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    /// Parses a label case-insensitively, ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::iter()
            .find(|category| category.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownCategory {
                input: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_category_case_insensitive() {
        assert_eq!("friend".parse::<Category>().unwrap(), Category::Friend);
        assert_eq!(" WORKPLACE ".parse::<Category>().unwrap(), Category::Workplace);
        assert_eq!(
            "Acquaintance".parse::<Category>().unwrap(),
            Category::Acquaintance
        );
    }

    #[test]
    fn test_parse_unknown_category() {
        let err = "neighbour".parse::<Category>().unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownCategory {
                input: "neighbour".to_string()
            }
        );
    }

    #[test]
    fn test_label_round_trips_through_display() {
        for category in Category::iter() {
            assert_eq!(category.to_string().parse::<Category>().unwrap(), category);
        }
    }
}
