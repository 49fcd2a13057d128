use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// Default SSH port applied when the draft port is missing or unusable.
pub const SSH_DEFAULT_PORT: u16 = 22;

/// Palette offered for tagging connections; the first entry is the default.
pub const CONNECTION_COLORS: [&str; 10] = [
    "#F44336", "#E91E63", "#9C27B0", "#673AB7", "#3F51B5", "#2196F3",
    "#00BCD4", "#009688", "#4CAF50", "#FF9800",
];

/// Supported authentication methods.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    #[default]
    Password,
    Key,
}

impl AuthType {
    /// Human readable label used by connection summaries.
    pub fn label(self) -> &'static str {
        match self {
            AuthType::Password => "Password",
            AuthType::Key => "SSH Key",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Saved connection profile.
///
/// Credentials are opaque blobs. Only the one selected by `auth_type` is
/// kept; the other is dropped whenever the record is built or updated.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    id: String,
    name: String,
    host: String,
    #[serde(default = "default_ssh_port")]
    port: u16,
    username: String,
    #[serde(default)]
    auth_type: AuthType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    private_key: Option<String>,
    #[serde(default = "default_color")]
    color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_connected: Option<DateTime<Utc>>,
}

impl Connection {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn auth_type(&self) -> AuthType {
        self.auth_type
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn private_key(&self) -> Option<&str> {
        self.private_key.as_deref()
    }

    /// Return the credential selected by the authentication method.
    pub fn credential(&self) -> Option<&str> {
        match self.auth_type {
            AuthType::Password => self.password(),
            AuthType::Key => self.private_key(),
        }
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn last_connected(&self) -> Option<DateTime<Utc>> {
        self.last_connected
    }

    /// Return `user@host:port` for list rows.
    pub fn address(&self) -> String {
        format!("{}@{}:{}", self.username, self.host, self.port)
    }

    /// Build the updated record without touching `self`.
    pub(crate) fn merged(
        &self,
        update: ConnectionUpdate,
    ) -> Result<Connection, EngineError> {
        let mut next = self.clone();
        if let Some(name) = update.name {
            next.name = name;
        }
        if let Some(host) = update.host {
            next.host = host;
        }
        if let Some(port) = update.port {
            next.port = port;
        }
        if let Some(username) = update.username {
            next.username = username;
        }
        if let Some(auth_type) = update.auth_type {
            next.auth_type = auth_type;
        }
        if let Some(password) = update.password {
            next.password = Some(password);
        }
        if let Some(private_key) = update.private_key {
            next.private_key = Some(private_key);
        }
        if let Some(color) = update.color {
            next.color = color;
        }
        if let Some(last_connected) = update.last_connected {
            next.last_connected = Some(last_connected);
        }

        next.validated()
    }

    /// Check required fields and the port, then drop the unused credential.
    pub(crate) fn validated(mut self) -> Result<Connection, EngineError> {
        if self.id.trim().is_empty() {
            return Err(EngineError::validation("Id is empty."));
        }
        validate_required(&self.name, &self.host, &self.username)?;
        if self.port == 0 {
            return Err(EngineError::validation(
                "Port must be greater than 0.",
            ));
        }
        self.retain_selected_credential();

        Ok(self)
    }

    fn retain_selected_credential(&mut self) {
        match self.auth_type {
            AuthType::Password => self.private_key = None,
            AuthType::Key => self.password = None,
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("auth_type", &self.auth_type)
            .field("password", &redacted(&self.password))
            .field("private_key", &redacted(&self.private_key))
            .field("color", &self.color)
            .field("last_connected", &self.last_connected)
            .finish()
    }
}

/// Connection fields as entered by the user, before an id is assigned.
#[derive(Clone, Default)]
pub struct ConnectionDraft {
    pub name: String,
    pub host: String,
    /// Raw port text; see [`parse_port`].
    pub port: Option<String>,
    pub username: String,
    pub auth_type: AuthType,
    pub password: Option<String>,
    pub private_key: Option<String>,
    pub color: Option<String>,
}

impl ConnectionDraft {
    /// Validate the draft and turn it into a record with the given id.
    pub(crate) fn into_connection(
        self,
        id: String,
    ) -> Result<Connection, EngineError> {
        validate_required(&self.name, &self.host, &self.username)?;

        let mut connection = Connection {
            id,
            name: self.name,
            host: self.host,
            port: parse_port(self.port.as_deref()),
            username: self.username,
            auth_type: self.auth_type,
            password: self.password,
            private_key: self.private_key,
            color: self.color.unwrap_or_else(default_color),
            last_connected: None,
        };
        connection.retain_selected_credential();

        Ok(connection)
    }
}

impl fmt::Debug for ConnectionDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDraft")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("auth_type", &self.auth_type)
            .field("password", &redacted(&self.password))
            .field("private_key", &redacted(&self.private_key))
            .field("color", &self.color)
            .finish()
    }
}

/// Partial update merged into an existing connection.
///
/// `None` leaves the stored value untouched.
#[derive(Clone, Default)]
pub struct ConnectionUpdate {
    pub name: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub auth_type: Option<AuthType>,
    pub password: Option<String>,
    pub private_key: Option<String>,
    pub color: Option<String>,
    pub last_connected: Option<DateTime<Utc>>,
}

impl ConnectionUpdate {
    pub(crate) fn touched_at(now: DateTime<Utc>) -> Self {
        Self {
            last_connected: Some(now),
            ..Self::default()
        }
    }
}

/// Parse the port text of a draft.
///
/// Leading digits are read up to the first non-digit. Anything that does not
/// produce a port in `1..=65535` falls back to [`SSH_DEFAULT_PORT`].
pub fn parse_port(raw: Option<&str>) -> u16 {
    let Some(raw) = raw else {
        return SSH_DEFAULT_PORT;
    };

    let digits: String = raw
        .trim()
        .chars()
        .take_while(|ch| ch.is_ascii_digit())
        .collect();

    match digits.parse::<u16>() {
        Ok(port) if port > 0 => port,
        _ => SSH_DEFAULT_PORT,
    }
}

fn validate_required(
    name: &str,
    host: &str,
    username: &str,
) -> Result<(), EngineError> {
    if name.trim().is_empty() {
        return Err(EngineError::validation("Name is empty."));
    }
    if host.trim().is_empty() {
        return Err(EngineError::validation("Host is empty."));
    }
    if username.trim().is_empty() {
        return Err(EngineError::validation("Username is empty."));
    }

    Ok(())
}

fn default_ssh_port() -> u16 {
    SSH_DEFAULT_PORT
}

fn default_color() -> String {
    String::from(CONNECTION_COLORS[0])
}

fn redacted(value: &Option<String>) -> &'static str {
    match value {
        Some(_) => "<redacted>",
        None => "<none>",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ConnectionDraft {
        ConnectionDraft {
            name: String::from("prod"),
            host: String::from("10.0.0.5"),
            port: Some(String::from("2222")),
            username: String::from("deploy"),
            auth_type: AuthType::Password,
            password: Some(String::from("hunter2")),
            private_key: Some(String::from("-----BEGIN KEY-----")),
            color: None,
        }
    }

    #[test]
    fn given_port_text_when_parsing_then_falls_back_to_default() {
        assert_eq!(parse_port(None), SSH_DEFAULT_PORT);
        assert_eq!(parse_port(Some("")), SSH_DEFAULT_PORT);
        assert_eq!(parse_port(Some("abc")), SSH_DEFAULT_PORT);
        assert_eq!(parse_port(Some("0")), SSH_DEFAULT_PORT);
        assert_eq!(parse_port(Some("70000")), SSH_DEFAULT_PORT);
        assert_eq!(parse_port(Some(" 2222 ")), 2222);
        assert_eq!(parse_port(Some("2200abc")), 2200);
    }

    #[test]
    fn given_password_draft_when_building_then_private_key_is_dropped() {
        let connection = draft()
            .into_connection(String::from("c1"))
            .expect("draft should be valid");

        assert_eq!(connection.port(), 2222);
        assert_eq!(connection.credential(), Some("hunter2"));
        assert_eq!(connection.private_key(), None);
        assert_eq!(connection.color(), CONNECTION_COLORS[0]);
        assert_eq!(connection.last_connected(), None);
        assert_eq!(connection.address(), "deploy@10.0.0.5:2222");
    }

    #[test]
    fn given_blank_required_field_when_building_then_returns_validation() {
        let mut missing_host = draft();
        missing_host.host = String::from("  ");

        let result = missing_host.into_connection(String::from("c1"));

        assert!(matches!(
            result,
            Err(EngineError::Validation { message })
            if message == "Host is empty."
        ));
    }

    #[test]
    fn given_auth_switch_when_merging_then_only_key_is_kept() {
        let connection = draft()
            .into_connection(String::from("c1"))
            .expect("draft should be valid");

        let merged = connection
            .merged(ConnectionUpdate {
                auth_type: Some(AuthType::Key),
                private_key: Some(String::from("KEY")),
                ..ConnectionUpdate::default()
            })
            .expect("update should be valid");

        assert_eq!(merged.auth_type(), AuthType::Key);
        assert_eq!(merged.password(), None);
        assert_eq!(merged.credential(), Some("KEY"));
        assert_eq!(merged.id(), "c1");
    }

    #[test]
    fn given_blank_name_update_when_merging_then_original_is_untouched() {
        let connection = draft()
            .into_connection(String::from("c1"))
            .expect("draft should be valid");

        let result = connection.merged(ConnectionUpdate {
            name: Some(String::new()),
            ..ConnectionUpdate::default()
        });

        assert!(matches!(result, Err(EngineError::Validation { .. })));
        assert_eq!(connection.name(), "prod");
    }

    #[test]
    fn given_secret_when_debug_formatting_then_secret_is_hidden() {
        let connection = draft()
            .into_connection(String::from("c1"))
            .expect("draft should be valid");

        let rendered = format!("{connection:?}");

        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
