//! Record store - persistence of contribution records.
//!
//! Provides functions for inserting, updating, deleting, listing and summarizing
//! records. Each function completes its write before returning; there is no
//! batching. Functions take any `ConnectionTrait` so they also run inside a
//! database transaction.

use crate::{
    entities::{Category, Record, record},
    errors::{Error, Result},
};
use chrono::{Local, NaiveDateTime, Timelike};
use sea_orm::{FromQueryResult, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use tracing::{debug, info};

/// The mutable fields of a record, already validated and normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFields {
    /// Contributor name
    pub name: String,
    /// Amount in currency units
    pub amount: i64,
    /// Meal tickets handed out
    pub meal_ticket: i64,
    /// Relationship category
    pub category: Category,
    /// Free-text note
    pub note: String,
}

/// Aggregate sums over every stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    /// Number of records
    pub count: i64,
    /// Sum of `amount`
    pub total_amount: i64,
    /// Sum of `meal_ticket`
    pub total_meal_tickets: i64,
}

#[derive(Debug, FromQueryResult)]
struct SummaryRow {
    count: i64,
    total_amount: Option<i64>,
    total_meal_tickets: Option<i64>,
}

/// Current local time truncated to whole seconds.
fn now_timestamp() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Inserts a new record, letting the store assign its id and creation time.
pub async fn insert_record<C>(db: &C, fields: RecordFields) -> Result<record::Model>
where
    C: ConnectionTrait,
{
    let record = record::ActiveModel {
        name: Set(fields.name),
        amount: Set(fields.amount),
        meal_ticket: Set(fields.meal_ticket),
        category: Set(fields.category),
        note: Set(fields.note),
        created_at: Set(now_timestamp()),
        ..Default::default()
    };

    let inserted = record.insert(db).await?;
    info!(
        "Inserted record {} for '{}': amount={}, meal_ticket={}, category={}",
        inserted.id, inserted.name, inserted.amount, inserted.meal_ticket, inserted.category
    );
    Ok(inserted)
}

/// Replaces every mutable field of the record with `id`.
///
/// `created_at` is left untouched. Returns [`Error::RecordNotFound`] when no
/// record has that id.
pub async fn update_record<C>(db: &C, id: i64, fields: RecordFields) -> Result<record::Model>
where
    C: ConnectionTrait,
{
    let existing = get_record_by_id(db, id)
        .await?
        .ok_or(Error::RecordNotFound { id })?;

    let mut record: record::ActiveModel = existing.into();
    record.name = Set(fields.name);
    record.amount = Set(fields.amount);
    record.meal_ticket = Set(fields.meal_ticket);
    record.category = Set(fields.category);
    record.note = Set(fields.note);

    let updated = record.update(db).await?;
    info!("Updated record {}", updated.id);
    Ok(updated)
}

/// Deletes the record with `id`. Returns `false` when there was nothing to delete.
pub async fn delete_record<C>(db: &C, id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = Record::delete_by_id(id).exec(db).await?;
    let removed = result.rows_affected > 0;
    if removed {
        info!("Deleted record {}", id);
    } else {
        debug!("Delete of record {} matched nothing", id);
    }
    Ok(removed)
}

/// Deletes every record and rewinds the id sequence so the next insert gets id 1.
///
/// Both steps run in one transaction. Returns the number of records removed.
pub async fn delete_all_records(db: &DatabaseConnection) -> Result<u64> {
    let txn = db.begin().await?;

    let result = Record::delete_many().exec(&txn).await?;
    txn.execute_unprepared("DELETE FROM sqlite_sequence WHERE name = 'records'")
        .await?;

    txn.commit().await?;

    info!(
        "Deleted all {} records and reset the id sequence",
        result.rows_affected
    );
    Ok(result.rows_affected)
}

/// Retrieves every record, newest (highest id) first.
pub async fn list_all_records<C>(db: &C) -> Result<Vec<record::Model>>
where
    C: ConnectionTrait,
{
    Record::find()
        .order_by_desc(record::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a record by its id.
pub async fn get_record_by_id<C>(db: &C, id: i64) -> Result<Option<record::Model>>
where
    C: ConnectionTrait,
{
    Record::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Returns true if any record has exactly this name (case-sensitive).
pub async fn exists_with_name<C>(db: &C, name: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    let found = Record::find()
        .filter(record::Column::Name.eq(name))
        .one(db)
        .await?;
    Ok(found.is_some())
}

/// Computes count, total amount and total meal tickets over all records.
///
/// All three are zero for an empty table.
pub async fn summarize_records<C>(db: &C) -> Result<Summary>
where
    C: ConnectionTrait,
{
    let row = Record::find()
        .select_only()
        .column_as(record::Column::Id.count(), "count")
        .column_as(record::Column::Amount.sum(), "total_amount")
        .column_as(record::Column::MealTicket.sum(), "total_meal_tickets")
        .into_model::<SummaryRow>()
        .one(db)
        .await?;

    Ok(row.map_or_else(Summary::default, |row| Summary {
        count: row.count,
        total_amount: row.total_amount.unwrap_or(0),
        total_meal_tickets: row.total_meal_tickets.unwrap_or(0),
    }))
}
