//! Core business logic - record storage, the ledger service and the spreadsheet
//! export. Nothing here depends on how commands reach the ledger.

/// Spreadsheet export of the full ledger and its category summary
pub mod export;
/// Input validation, duplicate confirmation and dashboard figures
pub mod ledger;
/// Persistence of contribution records
pub mod record;

pub use ledger::{AddOutcome, Dashboard, LedgerService, PendingRecord, RecordDraft};
