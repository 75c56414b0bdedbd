//! Record entity - One gift contribution entry in the ledger.
//!
//! Each record carries the contributor's name, the amount given, the number of
//! meal tickets handed out, a relationship category and a free-text note.
//! `id` and `created_at` are assigned by the store and never change.

use super::category::Category;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Contribution record database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "records")]
pub struct Model {
    /// Store-assigned identifier, never reused until a full reset
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Contributor name (not unique)
    pub name: String,
    /// Amount given, in currency units
    pub amount: i64,
    /// Number of meal tickets handed to the contributor
    pub meal_ticket: i64,
    /// Relationship of the contributor to the host
    pub category: Category,
    /// Free-text remark, possibly empty
    pub note: String,
    /// Local time the record was inserted
    pub created_at: DateTime,
}

/// Records have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
