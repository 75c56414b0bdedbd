//! Entity module - SeaORM entity definitions for the ledger database.
//! The ledger has a single table; `Category` is the enum stored in it.

pub mod category;
pub mod record;

pub use category::Category;
pub use record::{Column as RecordColumn, Entity as Record, Model as RecordModel};
