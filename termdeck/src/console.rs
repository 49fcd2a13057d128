//! Line commands understood by the termdeck console.
//!
//! Each line is one command word followed by its arguments. Arguments are
//! split with shell quoting rules, except for `send`, whose remainder is
//! handed to the active terminal exactly as typed.

use std::io::Write;

use anyhow::{Context, Result, bail};
use termdeck_engine::{
    AuthType, Connection, ConnectionDraft, ConnectionUpdate, Dispatch,
    EngineError, FileEntry, KeyValueStore, SessionKind, SessionManager,
    format_size, parse_port,
};

pub(crate) const HELP: &str = "\
commands:
  list                          saved connections
  add key=value...              save a connection (name, host, port, user,
                                auth=password|key, password, key, color)
  edit <id> key=value...        change fields of a saved connection
  delete <id>                   remove a connection and its sessions
  open <id> [terminal|files]    open a session and focus it
  sessions                      open sessions, `*` marks the focused one
  focus <id>                    focus a session
  close [id]                    close a session (default: focused)
  show [id]                     print a session (default: focused)
  send <text>                   type a line into the focused terminal
  ls                            list the focused file browser
  cd <entry>                    open an entry in the focused file browser
  help                          this text
  quit                          leave";

/// Whether the read loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Quit,
}

/// Prompt printed before each line is read.
pub(crate) fn prompt<S: KeyValueStore>(manager: &SessionManager<S>) -> String {
    match manager.active_session() {
        Some(session) => format!("termdeck [{}]> ", session.name()),
        None => String::from("termdeck> "),
    }
}

/// Run one console line against `manager`, writing results to `out`.
pub(crate) fn execute<S, W>(
    manager: &mut SessionManager<S>,
    line: &str,
    out: &mut W,
) -> Result<Flow>
where
    S: KeyValueStore,
    W: Write,
{
    let line = line.trim_start();
    let (word, rest) =
        line.split_once(char::is_whitespace).unwrap_or((line, ""));

    if word == "send" {
        send(manager, rest, out)?;
        return Ok(Flow::Continue);
    }

    let args = shell_words::split(rest)
        .with_context(|| format!("cannot parse arguments of `{word}`"))?;

    match word {
        "" => {},
        "help" => writeln!(out, "{HELP}")?,
        "quit" | "exit" => return Ok(Flow::Quit),
        "list" => list_connections(manager, out)?,
        "add" => {
            let id = manager.add_connection(draft_from(&args)?)?;
            writeln!(out, "saved {id}")?;
        },
        "edit" => {
            let (id, changes) = split_target(&args, "edit")?;
            if !manager.update_connection(id, update_from(changes)?)? {
                return Err(connection_not_found(id));
            }
            writeln!(out, "updated {id}")?;
        },
        "delete" => {
            let (id, _) = split_target(&args, "delete")?;
            if !manager.delete_connection(id) {
                return Err(connection_not_found(id));
            }
            writeln!(out, "deleted {id}")?;
        },
        "open" => {
            let (id, kind) = split_target(&args, "open")?;
            let kind = parse_kind(kind.first().map(String::as_str))?;
            let Some(session_id) = manager.open_session(id, kind) else {
                return Err(connection_not_found(id));
            };
            writeln!(out, "opened {session_id}")?;
            show(manager, &session_id, out)?;
        },
        "sessions" => list_sessions(manager, out)?,
        "focus" => {
            let (id, _) = split_target(&args, "focus")?;
            manager.focus_session(id)?;
            writeln!(out, "focused {id}")?;
        },
        "close" => {
            let id = target_or_active(manager, &args)?;
            if !manager.close_session(&id) {
                return Err(EngineError::SessionNotFound { id }.into());
            }
            writeln!(out, "closed {id}")?;
        },
        "show" => {
            let id = target_or_active(manager, &args)?;
            show(manager, &id, out)?;
        },
        "ls" => {
            let id = active_id(manager)?;
            write_listing(manager.list_directory(&id)?, out)?;
        },
        "cd" => {
            let Some(entry) = args.first() else {
                bail!("usage: cd <entry>");
            };
            let id = active_id(manager)?;
            if !manager.navigate(&id, entry)? {
                bail!("not a directory: {entry}");
            }
            let path = manager
                .session(&id)
                .and_then(|session| session.current_path())
                .unwrap_or("/");
            writeln!(out, "{path}")?;
        },
        other => bail!("unknown command `{other}`, try `help`"),
    }

    Ok(Flow::Continue)
}

fn send<S, W>(
    manager: &mut SessionManager<S>,
    text: &str,
    out: &mut W,
) -> Result<()>
where
    S: KeyValueStore,
    W: Write,
{
    let id = active_id(manager)?;
    let before = manager.session(&id).map_or(0, |s| s.output().len());

    match manager.submit_command(&id, text)? {
        Dispatch::Ignored => {},
        Dispatch::Cleared => writeln!(out, "(cleared)")?,
        Dispatch::Appended { .. } => {
            let output = manager
                .session(&id)
                .map(|session| session.output())
                .unwrap_or_default();
            for line in output.iter().skip(before) {
                writeln!(out, "{line}")?;
            }
        },
    }

    Ok(())
}

fn show<S, W>(manager: &SessionManager<S>, id: &str, out: &mut W) -> Result<()>
where
    S: KeyValueStore,
    W: Write,
{
    let session = manager
        .session(id)
        .ok_or_else(|| EngineError::SessionNotFound { id: id.to_string() })?;

    match session.kind() {
        SessionKind::Terminal => {
            for line in session.output() {
                writeln!(out, "{line}")?;
            }
        },
        SessionKind::FileBrowser => {
            writeln!(out, "{}", session.current_path().unwrap_or("/"))?;
            write_listing(manager.list_directory(id)?, out)?;
        },
    }

    Ok(())
}

fn list_connections<S, W>(
    manager: &SessionManager<S>,
    out: &mut W,
) -> Result<()>
where
    S: KeyValueStore,
    W: Write,
{
    if manager.connections().is_empty() {
        writeln!(out, "no saved connections")?;
        return Ok(());
    }

    for connection in manager.connections() {
        writeln!(out, "{}", connection_row(connection))?;
    }
    Ok(())
}

fn connection_row(connection: &Connection) -> String {
    let last = match connection.last_connected() {
        Some(stamp) => stamp.format("%Y-%m-%d %H:%M").to_string(),
        None => String::from("never"),
    };
    format!(
        "{}  {}  {}  {}  {}  last: {last}",
        connection.id(),
        connection.color(),
        connection.name(),
        connection.address(),
        connection.auth_type(),
    )
}

fn list_sessions<S, W>(manager: &SessionManager<S>, out: &mut W) -> Result<()>
where
    S: KeyValueStore,
    W: Write,
{
    if manager.sessions().is_empty() {
        writeln!(out, "no open sessions")?;
        return Ok(());
    }

    let active = manager.active_session_id();
    for session in manager.sessions() {
        let marker = if active == Some(session.id()) { '*' } else { ' ' };
        writeln!(
            out,
            "{marker} {}  {}  {}  opened {}",
            session.id(),
            session.kind(),
            session.name(),
            session.opened_at().format("%H:%M:%S")
        )?;
    }
    Ok(())
}

fn write_listing<W: Write>(entries: &[FileEntry], out: &mut W) -> Result<()> {
    for entry in entries {
        let suffix = if entry.is_dir() { "/" } else { "" };
        writeln!(
            out,
            "{:<10}  {:>7}  {:<16}  {}{suffix}",
            entry.permissions.unwrap_or(""),
            format_size(entry.size),
            entry.modified.unwrap_or(""),
            entry.name,
        )?;
    }
    Ok(())
}

fn active_id<S: KeyValueStore>(manager: &SessionManager<S>) -> Result<String> {
    match manager.active_session_id() {
        Some(id) => Ok(id.to_string()),
        None => bail!("no focused session, use `open` or `focus` first"),
    }
}

fn target_or_active<S: KeyValueStore>(
    manager: &SessionManager<S>,
    args: &[String],
) -> Result<String> {
    match args.first() {
        Some(id) => Ok(id.clone()),
        None => active_id(manager),
    }
}

fn split_target<'a>(
    args: &'a [String],
    command: &str,
) -> Result<(&'a str, &'a [String])> {
    match args.split_first() {
        Some((id, rest)) => Ok((id.as_str(), rest)),
        None => bail!("usage: {command} <id> ..."),
    }
}

fn connection_not_found(id: &str) -> anyhow::Error {
    EngineError::ConnectionNotFound { id: id.to_string() }.into()
}

fn parse_kind(raw: Option<&str>) -> Result<SessionKind> {
    match raw {
        None | Some("terminal") => Ok(SessionKind::Terminal),
        Some("files" | "file-browser" | "sftp") => Ok(SessionKind::FileBrowser),
        Some(other) => bail!("unknown session kind `{other}`"),
    }
}

fn parse_auth(raw: &str) -> Result<AuthType> {
    match raw {
        "password" => Ok(AuthType::Password),
        "key" => Ok(AuthType::Key),
        other => bail!("unknown auth type `{other}`, use password or key"),
    }
}

fn fields(args: &[String]) -> Result<Vec<(&str, &str)>> {
    args.iter()
        .map(|arg| {
            arg.split_once('=')
                .with_context(|| format!("expected key=value, got `{arg}`"))
        })
        .collect()
}

fn draft_from(args: &[String]) -> Result<ConnectionDraft> {
    let mut draft = ConnectionDraft::default();
    for (key, value) in fields(args)? {
        let value = value.to_string();
        match key {
            "name" => draft.name = value,
            "host" => draft.host = value,
            "port" => draft.port = Some(value),
            "user" | "username" => draft.username = value,
            "auth" => draft.auth_type = parse_auth(&value)?,
            "password" => draft.password = Some(value),
            "key" => draft.private_key = Some(value),
            "color" => draft.color = Some(value),
            other => bail!("unknown connection field `{other}`"),
        }
    }
    Ok(draft)
}

fn update_from(args: &[String]) -> Result<ConnectionUpdate> {
    let mut update = ConnectionUpdate::default();
    for (key, value) in fields(args)? {
        let value = value.to_string();
        match key {
            "name" => update.name = Some(value),
            "host" => update.host = Some(value),
            "port" => update.port = Some(parse_port(Some(&value))),
            "user" | "username" => update.username = Some(value),
            "auth" => update.auth_type = Some(parse_auth(&value)?),
            "password" => update.password = Some(value),
            "key" => update.private_key = Some(value),
            "color" => update.color = Some(value),
            other => bail!("unknown connection field `{other}`"),
        }
    }
    Ok(update)
}

#[cfg(test)]
mod tests {
    use termdeck_engine::{
        EngineError, LISTING_FIXTURE, MemoryStore, SHELL_PROMPT,
        SessionManager,
    };

    use super::{Flow, execute};

    fn run(
        manager: &mut SessionManager<MemoryStore>,
        line: &str,
    ) -> anyhow::Result<String> {
        let mut out = Vec::new();
        execute(manager, line, &mut out)?;
        Ok(String::from_utf8(out).expect("console output should be utf-8"))
    }

    fn manager_with_connection() -> (SessionManager<MemoryStore>, String) {
        let mut manager = SessionManager::load(MemoryStore::new());
        run(
            &mut manager,
            "add name=web host=web.example.com user=ops port=2222",
        )
        .expect("add should succeed");
        let id = manager.connections()[0].id().to_string();
        (manager, id)
    }

    #[test]
    fn given_added_connection_when_listing_then_address_is_shown() {
        let (mut manager, id) = manager_with_connection();

        let listed = run(&mut manager, "list").expect("list should succeed");

        assert!(listed.starts_with(&id));
        assert!(listed.contains("ops@web.example.com:2222"));
        assert!(listed.contains("last: never"));
    }

    #[test]
    fn given_quoted_name_when_adding_then_spaces_are_kept() {
        let mut manager = SessionManager::load(MemoryStore::new());

        run(
            &mut manager,
            "add 'name=Prod box' host=10.0.0.5 user=root auth=key key=blob",
        )
        .expect("add should succeed");

        let connection = &manager.connections()[0];
        assert_eq!(connection.name(), "Prod box");
        assert_eq!(connection.port(), 22);
        assert_eq!(connection.credential(), Some("blob"));
    }

    #[test]
    fn given_missing_host_when_adding_then_validation_error_surfaces() {
        let mut manager = SessionManager::load(MemoryStore::new());

        let err = run(&mut manager, "add name=web user=ops")
            .expect_err("add should fail");

        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::Validation { .. })
        ));
        assert!(manager.connections().is_empty());
    }

    #[test]
    fn given_unknown_connection_when_editing_then_not_found_is_reported() {
        let mut manager = SessionManager::load(MemoryStore::new());

        let err = run(&mut manager, "edit nope name=other")
            .expect_err("edit should fail");

        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::ConnectionNotFound { .. })
        ));
    }

    #[test]
    fn given_terminal_when_sending_then_new_lines_are_printed() {
        let (mut manager, id) = manager_with_connection();
        run(&mut manager, &format!("open {id}")).expect("open should succeed");

        let printed = run(&mut manager, "send ls -la").expect("send");

        assert_eq!(
            printed,
            format!("ls -la\n{LISTING_FIXTURE}\n{SHELL_PROMPT}\n")
        );
        let cleared = run(&mut manager, "send clear").expect("send");
        assert_eq!(cleared, "(cleared)\n");
    }

    #[test]
    fn given_no_session_when_sending_then_error_is_returned() {
        let (mut manager, _) = manager_with_connection();

        assert!(run(&mut manager, "send pwd").is_err());
    }

    #[test]
    fn given_file_browser_when_changing_directory_then_path_is_printed() {
        let (mut manager, id) = manager_with_connection();
        run(&mut manager, &format!("open {id} files")).expect("open");

        let path = run(&mut manager, "cd Documents").expect("cd");
        let listing = run(&mut manager, "ls").expect("ls");

        assert_eq!(path, "/home/ops/Documents\n");
        assert!(listing.contains("config.json"));
        assert!(listing.contains("2.0 KB"));
        assert!(run(&mut manager, "cd notes.txt").is_err());
    }

    #[test]
    fn given_terminal_focused_when_listing_files_then_kind_error_surfaces() {
        let (mut manager, id) = manager_with_connection();
        run(&mut manager, &format!("open {id}")).expect("open");

        let err = run(&mut manager, "ls").expect_err("ls should fail");

        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::WrongSessionKind { .. })
        ));
    }

    #[test]
    fn given_quit_when_executing_then_loop_stops() {
        let mut manager = SessionManager::load(MemoryStore::new());
        let mut out = Vec::new();

        let flow = execute(&mut manager, "quit", &mut out).expect("quit");

        assert_eq!(flow, Flow::Quit);
        assert_eq!(
            execute(&mut manager, "   ", &mut out).expect("blank"),
            Flow::Continue
        );
    }

    #[test]
    fn given_malformed_field_when_adding_then_error_names_argument() {
        let mut manager = SessionManager::load(MemoryStore::new());

        let err = run(&mut manager, "add name").expect_err("add should fail");

        assert!(err.to_string().contains("`name`"));
    }

    #[test]
    fn given_open_sessions_when_listing_then_focus_and_open_time_are_shown() {
        let (mut manager, id) = manager_with_connection();
        run(&mut manager, &format!("open {id}")).expect("open");
        run(&mut manager, &format!("open {id} files")).expect("open");
        let focused = manager
            .active_session()
            .expect("a session should be focused");
        let expected = format!(
            "* {}  file-browser  web  opened {}",
            focused.id(),
            focused.opened_at().format("%H:%M:%S")
        );

        let listed = run(&mut manager, "sessions").expect("sessions");

        let lines: Vec<&str> = listed.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  "));
        assert!(lines[0].contains("  terminal  web  opened "));
        assert_eq!(lines[1], expected);
    }
}
