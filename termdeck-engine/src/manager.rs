use uuid::Uuid;

use crate::browser::{self, FileEntry};
use crate::catalog::{CatalogLoadStatus, ConnectionCatalog};
use crate::clock::{Clock, SystemClock};
use crate::config::{DEFAULT_CATALOG_KEY, EngineConfig};
use crate::connection::{Connection, ConnectionDraft, ConnectionUpdate};
use crate::errors::EngineError;
use crate::interpreter::{Dispatch, Interpreter};
use crate::registry::SessionRegistry;
use crate::session::{Session, SessionKind};
use crate::storage::{JsonFileStore, KeyValueStore};

/// Options applied when a [`SessionManager`] is constructed.
pub struct SessionManagerBuilder {
    catalog_key: String,
    clock: Box<dyn Clock>,
    interpreter: Interpreter,
}

impl Default for SessionManagerBuilder {
    fn default() -> Self {
        Self {
            catalog_key: String::from(DEFAULT_CATALOG_KEY),
            clock: Box::new(SystemClock),
            interpreter: Interpreter::default(),
        }
    }
}

impl SessionManagerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog_key(mut self, key: impl Into<String>) -> Self {
        self.catalog_key = key.into();
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn interpreter(mut self, interpreter: Interpreter) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Load the catalog from `store` and return the ready manager.
    pub fn build<S: KeyValueStore>(self, store: S) -> SessionManager<S> {
        let (catalog, status) =
            ConnectionCatalog::load(&store, &self.catalog_key);
        match status {
            CatalogLoadStatus::Loaded => {
                log::info!("loaded {} saved connections", catalog.len());
            },
            CatalogLoadStatus::Missing => {
                log::debug!("no saved connections under {}", self.catalog_key);
            },
            CatalogLoadStatus::Invalid(message) => {
                log::warn!("connection catalog load failed: {message}");
            },
        }

        SessionManager {
            catalog,
            registry: SessionRegistry::new(),
            interpreter: self.interpreter,
            store,
            clock: self.clock,
            catalog_key: self.catalog_key,
        }
    }
}

/// Owner of the connection catalog and the open sessions.
///
/// Every mutation goes through this type. Catalog changes are written back to
/// the store right away; a failed write is logged and the in-memory change
/// stays.
pub struct SessionManager<S> {
    catalog: ConnectionCatalog,
    registry: SessionRegistry,
    interpreter: Interpreter,
    store: S,
    clock: Box<dyn Clock>,
    catalog_key: String,
}

impl SessionManager<JsonFileStore> {
    /// Open the file-backed manager described by `config`.
    pub fn from_config(config: &EngineConfig) -> Self {
        SessionManagerBuilder::default()
            .catalog_key(config.catalog_key())
            .build(JsonFileStore::new(config.data_dir()))
    }
}

impl<S: KeyValueStore> SessionManager<S> {
    /// Load with default options.
    pub fn load(store: S) -> Self {
        SessionManagerBuilder::default().build(store)
    }

    pub fn connections(&self) -> &[Connection] {
        self.catalog.connections()
    }

    pub fn connection(&self, id: &str) -> Option<&Connection> {
        self.catalog.get(id)
    }

    pub fn sessions(&self) -> &[Session] {
        self.registry.sessions()
    }

    pub fn session(&self, id: &str) -> Option<&Session> {
        self.registry.get(id)
    }

    pub fn active_session_id(&self) -> Option<&str> {
        self.registry.active_id()
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.registry.active()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate `draft` and append it under a fresh id.
    pub fn add_connection(
        &mut self,
        draft: ConnectionDraft,
    ) -> Result<String, EngineError> {
        let id = Uuid::new_v4().to_string();
        let connection = self.catalog.add(id, draft)?;
        log::debug!(
            "connection added: id={} address={}",
            connection.id(),
            connection.address()
        );
        let id = connection.id().to_string();

        self.save_catalog();
        Ok(id)
    }

    /// Merge `update` into the connection with `id`.
    ///
    /// Unknown ids are ignored and reported as `Ok(false)`.
    pub fn update_connection(
        &mut self,
        id: &str,
        update: ConnectionUpdate,
    ) -> Result<bool, EngineError> {
        if !self.catalog.update(id, update)? {
            log::debug!("connection update ignored: unknown id={id}");
            return Ok(false);
        }

        log::debug!("connection updated: id={id}");
        self.save_catalog();
        Ok(true)
    }

    /// Delete the connection with `id` and close its sessions.
    ///
    /// Returns whether a connection was removed.
    pub fn delete_connection(&mut self, id: &str) -> bool {
        if self.catalog.remove(id).is_none() {
            log::debug!("connection delete ignored: unknown id={id}");
            return false;
        }

        let closed = self.registry.close_by_connection(id);
        log::debug!(
            "connection deleted: id={id} closed_sessions={}",
            closed.len()
        );

        self.save_catalog();
        true
    }

    /// Open and focus a new session against `connection_id`.
    ///
    /// An unknown connection is dropped without an error and yields `None`.
    pub fn open_session(
        &mut self,
        connection_id: &str,
        kind: SessionKind,
    ) -> Option<String> {
        let Some(connection) = self.catalog.get(connection_id) else {
            log::warn!(
                "session open dropped: unknown connection id={connection_id}"
            );
            return None;
        };

        let now = self.clock.now();
        let id = self.registry.allocate_id(connection_id, now);
        let session = Session::open(id.clone(), connection, kind, now);
        self.registry.insert(session);
        log::debug!("session opened: id={id} kind={kind}");

        match self
            .catalog
            .update(connection_id, ConnectionUpdate::touched_at(now))
        {
            Ok(true) => self.save_catalog(),
            Ok(false) => {},
            Err(err) => {
                log::warn!("last connected update failed: {err}");
            },
        }

        Some(id)
    }

    /// Close the session with `id`; returns whether one was open.
    pub fn close_session(&mut self, id: &str) -> bool {
        match self.registry.close(id) {
            Some(_) => {
                log::debug!(
                    "session closed: id={id} active={:?}",
                    self.registry.active_id()
                );
                true
            },
            None => false,
        }
    }

    /// Focus the session with `id`.
    pub fn focus_session(&mut self, id: &str) -> Result<(), EngineError> {
        self.registry.focus(id)?;
        log::debug!("session focused: id={id}");
        Ok(())
    }

    /// Run one typed line through the interpreter of a terminal session.
    ///
    /// File-browser sessions ignore submitted lines.
    pub fn submit_command(
        &mut self,
        session_id: &str,
        input: &str,
    ) -> Result<Dispatch, EngineError> {
        let session = self.registry.get_mut(session_id).ok_or_else(|| {
            EngineError::SessionNotFound {
                id: session_id.to_string(),
            }
        })?;

        if session.kind() != SessionKind::Terminal {
            log::debug!("command ignored: session {session_id} has no shell");
            return Ok(Dispatch::Ignored);
        }

        let dispatch = self.interpreter.apply(session.transcript_mut(), input);
        log::debug!("command dispatched: session={session_id} {dispatch:?}");
        Ok(dispatch)
    }

    /// Entries shown by a file-browser session.
    pub fn list_directory(
        &self,
        session_id: &str,
    ) -> Result<&'static [FileEntry], EngineError> {
        self.file_browser(session_id)?;
        Ok(browser::listing())
    }

    /// Open `entry` in a file-browser session.
    ///
    /// Returns `Ok(false)` when the entry is a file or not listed.
    pub fn navigate(
        &mut self,
        session_id: &str,
        entry: &str,
    ) -> Result<bool, EngineError> {
        let current = self.file_browser(session_id)?.current_path();
        let Some(next) = browser::resolve_entry(current.unwrap_or("/"), entry)
        else {
            return Ok(false);
        };

        if let Some(session) = self.registry.get_mut(session_id) {
            log::debug!("session {session_id} navigated to {next}");
            session.set_current_path(next);
        }
        Ok(true)
    }

    fn file_browser(&self, session_id: &str) -> Result<&Session, EngineError> {
        let session = self.registry.get(session_id).ok_or_else(|| {
            EngineError::SessionNotFound {
                id: session_id.to_string(),
            }
        })?;

        if session.kind() != SessionKind::FileBrowser {
            return Err(EngineError::WrongSessionKind {
                id: session_id.to_string(),
                expected: SessionKind::FileBrowser,
            });
        }

        Ok(session)
    }

    fn save_catalog(&mut self) {
        if let Err(err) = self.catalog.save(&mut self.store, &self.catalog_key)
        {
            log::warn!("connection catalog save failed: {err}");
        }
    }
}
