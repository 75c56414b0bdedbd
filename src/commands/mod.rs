//! Command dispatch - maps user actions onto ledger service calls.
//!
//! A front end turns user input into a [`Command`], asks for confirmation when
//! [`Command::confirmation_prompt`] says so, and passes it to [`dispatch`]. The
//! returned [`Response`] is rendered however the front end likes. A
//! [`Response::Duplicate`] still needs the user's go-ahead before the pending
//! record is stored with [`LedgerService::confirm_duplicate`].

/// Line-oriented console front end
pub mod console;

use crate::{
    config::Settings,
    core::{AddOutcome, Dashboard, LedgerService, PendingRecord, RecordDraft},
    entities::RecordModel,
    errors::Result,
};
use std::path::PathBuf;
use tracing::debug;

/// A user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Register a new contribution
    Add(RecordDraft),
    /// Replace the fields of an existing record
    Edit {
        /// Record to change
        id: i64,
        /// New field values
        draft: RecordDraft,
    },
    /// Delete one record
    Remove {
        /// Record to delete
        id: i64,
    },
    /// Delete every record and restart ids
    ResetAll,
    /// Show the headline figures
    Dashboard,
    /// Show every record
    List,
    /// Show records whose name contains the query
    Search {
        /// Substring to look for
        query: String,
    },
    /// Write the ledger workbook
    Export,
    /// Show usage
    Help,
}

impl Command {
    /// Question to put to the user before dispatching, for destructive commands.
    #[must_use]
    pub fn confirmation_prompt(&self) -> Option<String> {
        match self {
            Self::Remove { id } => Some(format!("Delete record {id}?")),
            Self::ResetAll => {
                Some("All records will be permanently deleted. Reset the ledger?".to_string())
            }
            _ => None,
        }
    }
}

/// What a dispatched command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// A record was stored
    Added(RecordModel),
    /// The name is already on file; the pending record awaits confirmation
    Duplicate(PendingRecord),
    /// A record was changed
    Edited(RecordModel),
    /// A delete ran; `removed` is false when the id did not exist
    Removed {
        /// Targeted id
        id: i64,
        /// Whether a record was actually deleted
        removed: bool,
    },
    /// The ledger was cleared
    Reset {
        /// Number of records deleted
        removed: u64,
    },
    /// Headline figures
    Dashboard(Dashboard),
    /// Records, newest first
    Records(Vec<RecordModel>),
    /// The workbook was written here
    Exported(PathBuf),
    /// Usage text
    Help,
}

/// Runs one command against the ledger.
pub async fn dispatch(
    ledger: &LedgerService,
    settings: &Settings,
    command: Command,
) -> Result<Response> {
    debug!("Dispatching {:?}", command);
    let response = match command {
        Command::Add(draft) => match ledger.add(&draft).await? {
            AddOutcome::Inserted(record) => Response::Added(record),
            AddOutcome::DuplicateWarning(pending) => Response::Duplicate(pending),
        },
        Command::Edit { id, draft } => Response::Edited(ledger.edit(id, &draft).await?),
        Command::Remove { id } => Response::Removed {
            id,
            removed: ledger.remove(id).await?,
        },
        Command::ResetAll => Response::Reset {
            removed: ledger.reset_all().await?,
        },
        Command::Dashboard => Response::Dashboard(ledger.dashboard().await?),
        Command::List => Response::Records(ledger.list().await?),
        Command::Search { query } => Response::Records(ledger.search(&query).await?),
        Command::Export => Response::Exported(
            ledger
                .export(&settings.export_dir, &settings.export_prefix)
                .await?,
        ),
        Command::Help => Response::Help,
    };
    Ok(response)
}
