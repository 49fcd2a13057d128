//! Simulated shell for terminal sessions.
//!
//! A submitted line is matched against an ordered table of rules keyed on its
//! first token. Every rule except `clear` appends the typed line, the rule's
//! response lines and a trailing prompt to the transcript.

use std::fmt;

/// Prompt appended after every echoed command.
pub const SHELL_PROMPT: &str = "user@host:~$";

/// Canned output of `ls`.
pub const LISTING_FIXTURE: &str =
    "Documents  Downloads  Music  Pictures  Videos";

/// Canned output of `pwd`.
pub const WORKING_DIRECTORY_FIXTURE: &str = "/home/user";

/// A non-blank submitted line split for rule matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandLine<'a> {
    raw: &'a str,
    trimmed: &'a str,
    program: &'a str,
}

impl<'a> CommandLine<'a> {
    /// Split `raw`; `None` when it is empty or whitespace only.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let trimmed = raw.trim();
        let program = trimmed.split_whitespace().next()?;
        Some(Self {
            raw,
            trimmed,
            program,
        })
    }

    /// Line exactly as typed.
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn trimmed(&self) -> &'a str {
        self.trimmed
    }

    /// First whitespace-delimited token.
    pub fn program(&self) -> &'a str {
        self.program
    }

    pub fn args(&self) -> impl Iterator<Item = &'a str> + use<'a> {
        self.trimmed.split_whitespace().skip(1)
    }
}

/// What a rule does with the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Echo the line, append these lines, then the prompt.
    Lines(Vec<String>),
    /// Drop the whole transcript.
    Clear,
}

/// One entry of the dispatch table.
#[derive(Clone, Copy)]
pub struct CommandRule {
    pub name: &'static str,
    pub matches: fn(&CommandLine<'_>) -> bool,
    pub respond: fn(&CommandLine<'_>) -> Response,
}

impl fmt::Debug for CommandRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRule")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Result of submitting one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Ignored,
    Cleared,
    Appended { rule: &'static str },
}

/// Ordered rule table with a catch-all fallback.
#[derive(Debug, Clone)]
pub struct Interpreter {
    rules: Vec<CommandRule>,
    fallback: CommandRule,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self {
            rules: builtin_rules(),
            fallback: not_found_rule(),
        }
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule after the existing ones, ahead of the fallback.
    pub fn push_rule(&mut self, rule: CommandRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[CommandRule] {
        &self.rules
    }

    /// Find the rule that handles `line`.
    pub fn resolve(&self, line: &CommandLine<'_>) -> &CommandRule {
        self.rules
            .iter()
            .find(|rule| (rule.matches)(line))
            .unwrap_or(&self.fallback)
    }

    /// Apply `input` to `transcript`.
    pub fn apply(&self, transcript: &mut Vec<String>, input: &str) -> Dispatch {
        let Some(line) = CommandLine::parse(input) else {
            return Dispatch::Ignored;
        };

        let rule = self.resolve(&line);
        match (rule.respond)(&line) {
            Response::Clear => {
                transcript.clear();
                Dispatch::Cleared
            },
            Response::Lines(lines) => {
                transcript.push(line.raw().to_string());
                transcript.extend(lines);
                transcript.push(String::from(SHELL_PROMPT));
                Dispatch::Appended { rule: rule.name }
            },
        }
    }
}

fn not_found_rule() -> CommandRule {
    CommandRule {
        name: "not-found",
        matches: |_| true,
        respond: |line| {
            Response::Lines(vec![format!(
                "bash: {}: command not found",
                line.program()
            )])
        },
    }
}

fn builtin_rules() -> Vec<CommandRule> {
    vec![
        CommandRule {
            name: "clear",
            matches: |line| line.trimmed() == "clear",
            respond: |_| Response::Clear,
        },
        CommandRule {
            name: "ls",
            matches: |line| line.program().starts_with("ls"),
            respond: |_| Response::Lines(vec![String::from(LISTING_FIXTURE)]),
        },
        CommandRule {
            name: "pwd",
            matches: |line| line.program() == "pwd",
            respond: |_| {
                Response::Lines(vec![String::from(WORKING_DIRECTORY_FIXTURE)])
            },
        },
        CommandRule {
            name: "cd",
            matches: |line| line.program() == "cd",
            respond: |_| Response::Lines(vec![String::new()]),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript() -> Vec<String> {
        vec![
            String::from("Connected to example.com"),
            String::from("root@example.com:~$"),
        ]
    }

    fn expected(tail: &[&str]) -> Vec<String> {
        let mut lines = transcript();
        lines.extend(tail.iter().map(|line| line.to_string()));
        lines
    }

    #[test]
    fn given_ls_with_flags_when_applying_then_listing_and_prompt_follow() {
        let interpreter = Interpreter::default();
        let mut lines = transcript();

        let dispatch = interpreter.apply(&mut lines, "ls -la");

        assert_eq!(dispatch, Dispatch::Appended { rule: "ls" });
        assert_eq!(lines, expected(&["ls -la", LISTING_FIXTURE, SHELL_PROMPT]));
    }

    #[test]
    fn given_ls_prefixed_token_when_applying_then_listing_is_used() {
        let interpreter = Interpreter::default();
        let mut lines = transcript();

        interpreter.apply(&mut lines, "lsblk");

        assert_eq!(lines, expected(&["lsblk", LISTING_FIXTURE, SHELL_PROMPT]));
    }

    #[test]
    fn given_pwd_when_applying_then_fixed_path_follows() {
        let interpreter = Interpreter::default();
        let mut lines = transcript();

        interpreter.apply(&mut lines, "pwd");

        assert_eq!(
            lines,
            expected(&["pwd", WORKING_DIRECTORY_FIXTURE, SHELL_PROMPT])
        );
    }

    #[test]
    fn given_cd_when_applying_then_blank_line_follows() {
        let interpreter = Interpreter::default();
        let mut lines = transcript();

        interpreter.apply(&mut lines, "cd /var/log");

        assert_eq!(lines, expected(&["cd /var/log", "", SHELL_PROMPT]));
    }

    #[test]
    fn given_unknown_command_when_applying_then_not_found_names_token() {
        let interpreter = Interpreter::default();
        let mut lines = transcript();

        let dispatch = interpreter.apply(&mut lines, "frobnicate");

        assert_eq!(dispatch, Dispatch::Appended { rule: "not-found" });
        assert_eq!(
            lines,
            expected(&[
                "frobnicate",
                "bash: frobnicate: command not found",
                SHELL_PROMPT,
            ])
        );
    }

    #[test]
    fn given_near_miss_tokens_when_applying_then_fallback_is_used() {
        let interpreter = Interpreter::default();
        let mut lines = Vec::new();

        interpreter.apply(&mut lines, "pwdx");
        interpreter.apply(&mut lines, "clear all");

        assert_eq!(
            lines,
            [
                "pwdx",
                "bash: pwdx: command not found",
                SHELL_PROMPT,
                "clear all",
                "bash: clear: command not found",
                SHELL_PROMPT,
            ]
        );
    }

    #[test]
    fn given_clear_when_applying_then_transcript_is_emptied_without_prompt() {
        let interpreter = Interpreter::default();
        let mut lines = transcript();

        let dispatch = interpreter.apply(&mut lines, "  clear ");

        assert_eq!(dispatch, Dispatch::Cleared);
        assert!(lines.is_empty());
    }

    #[test]
    fn given_blank_input_when_applying_then_transcript_is_untouched() {
        let interpreter = Interpreter::default();
        let mut lines = transcript();

        assert_eq!(interpreter.apply(&mut lines, ""), Dispatch::Ignored);
        assert_eq!(interpreter.apply(&mut lines, " \t "), Dispatch::Ignored);
        assert_eq!(lines, transcript());
    }

    #[test]
    fn given_typed_padding_when_applying_then_echo_keeps_raw_text() {
        let interpreter = Interpreter::default();
        let mut lines = Vec::new();

        interpreter.apply(&mut lines, "  pwd");

        assert_eq!(lines, ["  pwd", WORKING_DIRECTORY_FIXTURE, SHELL_PROMPT]);
    }

    #[test]
    fn given_custom_rule_when_pushed_then_it_runs_before_fallback() {
        let mut interpreter = Interpreter::default();
        interpreter.push_rule(CommandRule {
            name: "echo",
            matches: |line| line.program() == "echo",
            respond: |line| {
                Response::Lines(vec![line.args().collect::<Vec<_>>().join(" ")])
            },
        });
        let mut lines = Vec::new();

        let dispatch = interpreter.apply(&mut lines, "echo  hello   world");

        assert_eq!(dispatch, Dispatch::Appended { rule: "echo" });
        assert_eq!(lines, ["echo  hello   world", "hello world", SHELL_PROMPT]);
    }

    #[test]
    fn given_builtin_table_when_listing_rules_then_clear_comes_first() {
        let interpreter = Interpreter::default();

        let names: Vec<&str> =
            interpreter.rules().iter().map(|rule| rule.name).collect();

        assert_eq!(names, ["clear", "ls", "pwd", "cd"]);
    }
}
