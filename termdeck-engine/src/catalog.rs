use std::collections::HashSet;

use crate::connection::{Connection, ConnectionDraft, ConnectionUpdate};
use crate::errors::{EngineError, StorageError};
use crate::storage::KeyValueStore;

/// Status describing how the catalog was read from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogLoadStatus {
    Loaded,
    Missing,
    Invalid(String),
}

/// Ordered collection of saved connection profiles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionCatalog {
    connections: Vec<Connection>,
}

impl ConnectionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the catalog stored under `key`.
    ///
    /// Missing or unreadable data yields an empty catalog; the status tells
    /// the caller which case happened.
    pub fn load(
        store: &dyn KeyValueStore,
        key: &str,
    ) -> (Self, CatalogLoadStatus) {
        let payload = match store.get(key) {
            Ok(Some(payload)) => payload,
            Ok(None) => return (Self::new(), CatalogLoadStatus::Missing),
            Err(err) => {
                let status = CatalogLoadStatus::Invalid(format!("{err}"));
                return (Self::new(), status);
            },
        };

        match Self::decode(&payload) {
            Ok(catalog) => (catalog, CatalogLoadStatus::Loaded),
            Err(err) => {
                (Self::new(), CatalogLoadStatus::Invalid(format!("{err}")))
            },
        }
    }

    /// Write the full catalog under `key`, replacing what was there.
    pub fn save(
        &self,
        store: &mut dyn KeyValueStore,
        key: &str,
    ) -> Result<(), StorageError> {
        let payload = self.encode()?;
        store.set(key, &payload)
    }

    pub fn encode(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string_pretty(&self.connections)?)
    }

    /// Parse a stored payload.
    ///
    /// Records that fail validation or repeat an earlier id are skipped with
    /// a warning; the rest keep their stored order.
    pub fn decode(payload: &str) -> Result<Self, StorageError> {
        let stored: Vec<Connection> = serde_json::from_str(payload)?;

        let mut seen = HashSet::new();
        let mut connections = Vec::with_capacity(stored.len());
        for record in stored {
            let id = record.id().to_string();
            if seen.contains(&id) {
                log::warn!("stored connection skipped: duplicate id={id}");
                continue;
            }
            match record.validated() {
                Ok(connection) => {
                    seen.insert(id);
                    connections.push(connection);
                },
                Err(err) => {
                    log::warn!("stored connection skipped: id={id} {err}");
                },
            }
        }

        Ok(Self { connections })
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn get(&self, id: &str) -> Option<&Connection> {
        self.connections.iter().find(|connection| connection.id() == id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Validate `draft`, assign `id` and append the record.
    pub fn add(
        &mut self,
        id: String,
        draft: ConnectionDraft,
    ) -> Result<&Connection, EngineError> {
        let connection = draft.into_connection(id)?;
        self.connections.push(connection);
        let index = self.connections.len() - 1;
        Ok(&self.connections[index])
    }

    /// Merge `update` into the record with `id`.
    ///
    /// Returns `Ok(false)` when no record matches.
    pub fn update(
        &mut self,
        id: &str,
        update: ConnectionUpdate,
    ) -> Result<bool, EngineError> {
        let Some(slot) = self
            .connections
            .iter_mut()
            .find(|connection| connection.id() == id)
        else {
            return Ok(false);
        };

        *slot = slot.merged(update)?;
        Ok(true)
    }

    /// Remove the record with `id`, returning it when present.
    pub fn remove(&mut self, id: &str) -> Option<Connection> {
        let index = self
            .connections
            .iter()
            .position(|connection| connection.id() == id)?;
        Some(self.connections.remove(index))
    }
}
