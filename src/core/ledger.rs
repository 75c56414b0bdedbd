//! Ledger service - input normalization and business rules over the record store.
//!
//! The service owns the database connection. Raw form input arrives as a
//! [`RecordDraft`]; amounts and meal-ticket counts are parsed, validated and
//! normalized before anything reaches the store. Adding a contributor whose
//! name is already on file does not insert: it hands back a [`PendingRecord`]
//! that the caller must confirm through [`LedgerService::confirm_duplicate`].

use crate::{
    core::{
        export,
        record::{self, RecordFields},
    },
    entities::{Category, record as record_entity},
    errors::{Result, ValidationError},
};
use sea_orm::DatabaseConnection;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Amounts in this range are shorthand for multiples of [`ABBREVIATION_UNIT`].
pub const ABBREVIATED_RANGE: RangeInclusive<i64> = 1..=1000;

/// Multiplier applied to abbreviated amounts.
pub const ABBREVIATION_UNIT: i64 = 10_000;

/// Largest amount accepted for a single record.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Largest meal-ticket count accepted for a single record.
pub const MAX_MEAL_TICKETS: i64 = 100_000;

/// Raw form input for a record, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDraft {
    /// Contributor name
    pub name: String,
    /// Amount text, may contain thousands separators
    pub amount: String,
    /// Meal-ticket text, empty means zero
    pub meal_ticket: String,
    /// Selected category
    pub category: Category,
    /// Optional note
    pub note: String,
}

/// A validated record held back because its name is already on file.
///
/// Only [`LedgerService::add`] creates one. Pass it to
/// [`LedgerService::confirm_duplicate`] to insert it, or drop it to decline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRecord {
    fields: RecordFields,
}

impl PendingRecord {
    /// The normalized fields that would be inserted.
    #[must_use]
    pub const fn fields(&self) -> &RecordFields {
        &self.fields
    }
}

/// Result of [`LedgerService::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// No duplicate: the record was stored.
    Inserted(record_entity::Model),
    /// The name is already on file; nothing was stored yet.
    DuplicateWarning(PendingRecord),
}

/// Headline figures shown above the ledger table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dashboard {
    /// Number of contributors on file
    pub count: i64,
    /// Sum of all amounts
    pub total_amount: i64,
    /// `total_amount / count`, rounded down; 0 for an empty ledger
    pub average: i64,
    /// Sum of all meal tickets
    pub total_meal_tickets: i64,
}

/// Expands shorthand amounts: 1 to 1000 means that many units of 10,000.
///
/// Everything outside the range, including 0, is taken literally.
#[must_use]
pub fn normalize_amount(amount: i64) -> i64 {
    if ABBREVIATED_RANGE.contains(&amount) {
        amount * ABBREVIATION_UNIT
    } else {
        amount
    }
}

/// Parses amount text, ignoring surrounding whitespace and `,` separators.
pub fn parse_amount(raw: &str) -> std::result::Result<i64, ValidationError> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    let amount = cleaned
        .parse::<i64>()
        .map_err(|_| ValidationError::AmountNotNumeric {
            input: raw.to_string(),
        })?;
    if amount < 0 {
        return Err(ValidationError::NegativeValue {
            field: "amount",
            value: amount,
        });
    }
    if amount > MAX_AMOUNT {
        return Err(ValidationError::TooLarge {
            field: "amount",
            value: amount,
            max: MAX_AMOUNT,
        });
    }
    Ok(amount)
}

/// Parses meal-ticket text; blank input means zero.
pub fn parse_meal_ticket(raw: &str) -> std::result::Result<i64, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    let meal = trimmed
        .parse::<i64>()
        .map_err(|_| ValidationError::MealNotNumeric {
            input: raw.to_string(),
        })?;
    if meal < 0 {
        return Err(ValidationError::NegativeValue {
            field: "meal ticket",
            value: meal,
        });
    }
    if meal > MAX_MEAL_TICKETS {
        return Err(ValidationError::TooLarge {
            field: "meal ticket",
            value: meal,
            max: MAX_MEAL_TICKETS,
        });
    }
    Ok(meal)
}

/// Validates a draft into record fields.
///
/// `abbreviate` controls whether the 1..=1000 shorthand applies.
fn validate_draft(
    draft: &RecordDraft,
    abbreviate: bool,
) -> std::result::Result<RecordFields, ValidationError> {
    let name = draft.name.trim();
    if name.is_empty() || draft.amount.trim().is_empty() {
        return Err(ValidationError::MissingNameOrAmount);
    }

    let amount = parse_amount(&draft.amount)?;
    let amount = if abbreviate {
        normalize_amount(amount)
    } else {
        amount
    };
    let meal_ticket = parse_meal_ticket(&draft.meal_ticket)?;

    Ok(RecordFields {
        name: name.to_string(),
        amount,
        meal_ticket,
        category: draft.category,
        note: draft.note.trim().to_string(),
    })
}

/// Domain entry point used by the command layer.
#[derive(Debug, Clone)]
pub struct LedgerService {
    db: DatabaseConnection,
}

impl LedgerService {
    /// Wraps an open database connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    #[cfg(test)]
    pub(crate) const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Validates and stores a new record, unless the name is already on file.
    ///
    /// # Errors
    /// Returns [`crate::errors::Error::Validation`] for blank or non-numeric
    /// input; nothing is stored in that case.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn add(&self, draft: &RecordDraft) -> Result<AddOutcome> {
        let fields = validate_draft(draft, true)?;

        if record::exists_with_name(&self.db, &fields.name).await? {
            warn!("'{}' is already on file, confirmation required", fields.name);
            return Ok(AddOutcome::DuplicateWarning(PendingRecord { fields }));
        }

        let inserted = record::insert_record(&self.db, fields).await?;
        Ok(AddOutcome::Inserted(inserted))
    }

    /// Stores a record the caller confirmed despite the duplicate warning.
    #[instrument(skip(self, pending), fields(name = %pending.fields.name))]
    pub async fn confirm_duplicate(&self, pending: PendingRecord) -> Result<record_entity::Model> {
        info!("Duplicate name confirmed, inserting");
        record::insert_record(&self.db, pending.fields).await
    }

    /// Replaces the fields of an existing record.
    ///
    /// The amount is taken literally and no duplicate check is made.
    ///
    /// # Errors
    /// Returns [`crate::errors::Error::RecordNotFound`] if `id` is unknown.
    #[instrument(skip(self, draft))]
    pub async fn edit(&self, id: i64, draft: &RecordDraft) -> Result<record_entity::Model> {
        let fields = validate_draft(draft, false)?;
        record::update_record(&self.db, id, fields).await
    }

    /// Deletes one record. The caller is expected to have confirmed.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: i64) -> Result<bool> {
        record::delete_record(&self.db, id).await
    }

    /// Deletes everything and restarts ids at 1. Irreversible; confirm first.
    #[instrument(skip(self))]
    pub async fn reset_all(&self) -> Result<u64> {
        warn!("Resetting the entire ledger");
        record::delete_all_records(&self.db).await
    }

    /// Computes the headline figures.
    pub async fn dashboard(&self) -> Result<Dashboard> {
        let summary = record::summarize_records(&self.db).await?;
        let average = if summary.count > 0 {
            summary.total_amount / summary.count
        } else {
            0
        };

        Ok(Dashboard {
            count: summary.count,
            total_amount: summary.total_amount,
            average,
            total_meal_tickets: summary.total_meal_tickets,
        })
    }

    /// All records, newest first.
    pub async fn list(&self) -> Result<Vec<record_entity::Model>> {
        record::list_all_records(&self.db).await
    }

    /// Records whose name contains `query`, newest first.
    ///
    /// Matching is a case-sensitive substring test; an empty query matches all.
    pub async fn search(&self, query: &str) -> Result<Vec<record_entity::Model>> {
        let mut records = record::list_all_records(&self.db).await?;
        records.retain(|r| r.name.contains(query));
        Ok(records)
    }

    /// Writes the ledger workbook into `dir` and returns its path.
    #[instrument(skip(self))]
    pub async fn export(&self, dir: &Path, prefix: &str) -> Result<PathBuf> {
        export::export_ledger(&self.db, dir, prefix).await
    }
}
