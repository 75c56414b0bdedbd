//! Shared test utilities for the ledger.
//!
//! This module provides common helper functions for setting up test databases
//! and building records and drafts with sensible defaults.

use crate::{
    core::{ledger::RecordDraft, record::RecordFields},
    entities::Category,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with the ledger table initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds already-normalized record fields.
///
/// # Defaults
/// * `meal_ticket`: 1
/// * `category`: Friend
/// * `note`: empty
#[must_use]
pub fn test_fields(name: &str, amount: i64) -> RecordFields {
    RecordFields {
        name: name.to_string(),
        amount,
        meal_ticket: 1,
        category: Category::Friend,
        note: String::new(),
    }
}

/// Builds a raw draft the way a form would submit it.
///
/// # Defaults
/// * `meal_ticket`: empty (stored as 0)
/// * `category`: Friend
/// * `note`: empty
#[must_use]
pub fn test_draft(name: &str, amount: &str) -> RecordDraft {
    RecordDraft {
        name: name.to_string(),
        amount: amount.to_string(),
        meal_ticket: String::new(),
        category: Category::Friend,
        note: String::new(),
    }
}

/// Builds a raw draft with every field given.
#[must_use]
pub fn custom_draft(
    name: &str,
    amount: &str,
    meal_ticket: &str,
    category: Category,
    note: &str,
) -> RecordDraft {
    RecordDraft {
        name: name.to_string(),
        amount: amount.to_string(),
        meal_ticket: meal_ticket.to_string(),
        category,
        note: note.to_string(),
    }
}
