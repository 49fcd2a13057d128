use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::errors::EngineError;
use crate::session::{Session, session_id};

/// Open sessions in opening order plus the focused session pointer.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Vec<Session>,
    active_id: Option<String>,
    last_stamps: HashMap<String, i64>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|session| session.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|session| session.id() == id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active(&self) -> Option<&Session> {
        self.get(self.active_id.as_deref()?)
    }

    /// Allocate an id for a session of `connection_id` opened at `now`.
    ///
    /// Stamps issued for one connection only move forward, so an id is never
    /// handed out twice, even after its session was closed.
    pub(crate) fn allocate_id(
        &mut self,
        connection_id: &str,
        now: DateTime<Utc>,
    ) -> String {
        let mut stamp = now.timestamp_millis();
        if let Some(last) = self.last_stamps.get(connection_id) {
            stamp = stamp.max(last + 1);
        }
        self.last_stamps.insert(connection_id.to_string(), stamp);

        session_id(connection_id, stamp)
    }

    /// Append `session` and focus it.
    pub(crate) fn insert(&mut self, session: Session) {
        self.active_id = Some(session.id().to_string());
        self.sessions.push(session);
    }

    /// Focus the session with `id`.
    pub(crate) fn focus(&mut self, id: &str) -> Result<(), EngineError> {
        if !self.contains(id) {
            return Err(EngineError::SessionNotFound { id: id.to_string() });
        }

        self.active_id = Some(id.to_string());
        Ok(())
    }

    /// Remove the session with `id`, returning it when present.
    pub(crate) fn close(&mut self, id: &str) -> Option<Session> {
        let index = self
            .sessions
            .iter()
            .position(|session| session.id() == id)?;
        let removed = self.sessions.remove(index);
        self.resolve_active();
        Some(removed)
    }

    /// Remove every session bound to `connection_id`.
    pub(crate) fn close_by_connection(
        &mut self,
        connection_id: &str,
    ) -> Vec<Session> {
        let (closed, kept): (Vec<_>, Vec<_>) = self
            .sessions
            .drain(..)
            .partition(|session| session.connection_id() == connection_id);
        self.sessions = kept;
        self.resolve_active();
        closed
    }

    fn resolve_active(&mut self) {
        let still_open = self
            .active_id
            .as_deref()
            .is_some_and(|id| self.contains(id));
        if !still_open {
            self.active_id =
                self.sessions.first().map(|session| session.id().to_string());
        }
    }
}
