use std::fmt;

use chrono::{DateTime, Utc};

use crate::connection::Connection;

/// Kind of working context a session offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKind {
    Terminal,
    FileBrowser,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionKind::Terminal => "terminal",
            SessionKind::FileBrowser => "file-browser",
        };
        write!(f, "{label}")
    }
}

/// Open working context bound to one saved connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: String,
    connection_id: String,
    name: String,
    kind: SessionKind,
    output: Vec<String>,
    current_path: Option<String>,
    opened_at: DateTime<Utc>,
}

impl Session {
    /// Build a freshly connected session for `connection`.
    pub(crate) fn open(
        id: String,
        connection: &Connection,
        kind: SessionKind,
        opened_at: DateTime<Utc>,
    ) -> Self {
        let (output, current_path) = match kind {
            SessionKind::Terminal => (
                vec![
                    format!("Connected to {}", connection.host()),
                    format!(
                        "{}@{}:~$",
                        connection.username(),
                        connection.host()
                    ),
                ],
                None,
            ),
            SessionKind::FileBrowser => (
                Vec::new(),
                Some(format!("/home/{}", connection.username())),
            ),
        };

        Self {
            id,
            connection_id: connection.id().to_string(),
            name: connection.name().to_string(),
            kind,
            output,
            current_path,
            opened_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    /// Label copied from the connection when the session was opened.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    /// Terminal transcript, oldest line first.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Directory shown by a file-browser session.
    pub fn current_path(&self) -> Option<&str> {
        self.current_path.as_deref()
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub(crate) fn transcript_mut(&mut self) -> &mut Vec<String> {
        &mut self.output
    }

    pub(crate) fn set_current_path(&mut self, path: String) {
        self.current_path = Some(path);
    }
}

/// Compose a session id from its connection and creation time.
pub fn session_id(connection_id: &str, stamp_millis: i64) -> String {
    format!("{connection_id}_{stamp_millis}")
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::connection::ConnectionDraft;

    fn connection() -> Connection {
        ConnectionDraft {
            name: String::from("staging"),
            host: String::from("stage.example.com"),
            username: String::from("ops"),
            ..ConnectionDraft::default()
        }
        .into_connection(String::from("c1"))
        .expect("draft should be valid")
    }

    #[test]
    fn given_terminal_kind_when_opening_then_banner_and_prompt_are_seeded() {
        let now = Utc.timestamp_millis_opt(1_000).single().expect("valid");

        let session = Session::open(
            session_id("c1", now.timestamp_millis()),
            &connection(),
            SessionKind::Terminal,
            now,
        );

        assert_eq!(session.id(), "c1_1000");
        assert_eq!(session.name(), "staging");
        assert_eq!(
            session.output(),
            [
                String::from("Connected to stage.example.com"),
                String::from("ops@stage.example.com:~$"),
            ]
        );
        assert_eq!(session.current_path(), None);
    }

    #[test]
    fn given_file_browser_kind_when_opening_then_path_is_user_home() {
        let now = Utc.timestamp_millis_opt(1_000).single().expect("valid");

        let session = Session::open(
            String::from("c1_1000"),
            &connection(),
            SessionKind::FileBrowser,
            now,
        );

        assert!(session.output().is_empty());
        assert_eq!(session.current_path(), Some("/home/ops"));
    }
}
