//! Connection and session engine behind the termdeck console.
//!
//! [`SessionManager`] owns the persisted [`ConnectionCatalog`], the volatile
//! [`SessionRegistry`] and the [`Interpreter`] that answers terminal input.
//! Front-ends construct one manager and drive it through its methods; they
//! never mutate the stores directly.

mod browser;
mod catalog;
mod clock;
mod config;
mod connection;
mod errors;
mod interpreter;
mod manager;
mod registry;
mod session;
mod storage;

pub use crate::browser::{
    EntryKind, FileEntry, PARENT_ENTRY, format_size, listing, parent_path,
    resolve_entry,
};
pub use crate::catalog::{CatalogLoadStatus, ConnectionCatalog};
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::config::{DEFAULT_CATALOG_KEY, EngineConfig};
pub use crate::connection::{
    AuthType, CONNECTION_COLORS, Connection, ConnectionDraft, ConnectionUpdate,
    SSH_DEFAULT_PORT, parse_port,
};
pub use crate::errors::{EngineError, StorageError};
pub use crate::interpreter::{
    CommandLine, CommandRule, Dispatch, Interpreter, LISTING_FIXTURE,
    Response, SHELL_PROMPT, WORKING_DIRECTORY_FIXTURE,
};
pub use crate::manager::{SessionManager, SessionManagerBuilder};
pub use crate::registry::SessionRegistry;
pub use crate::session::{Session, SessionKind, session_id};
pub use crate::storage::{JsonFileStore, KeyValueStore, MemoryStore};
