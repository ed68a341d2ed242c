use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

/// Slash commands understood by the REPL, with their argument hint.
pub const COMMANDS: &[(&str, &str)] = &[
    ("/upload", "<path>"),
    ("/new", ""),
    ("/chats", ""),
    ("/select", "<n>"),
    ("/search", "[text]"),
    ("/sidebar", ""),
    ("/sync", ""),
    ("/login", ""),
    ("/signup", ""),
    ("/google", ""),
    ("/logout", ""),
    ("/profile", ""),
    ("/quit", ""),
];

/// Rustyline helper that completes slash commands and hints their arguments.
#[derive(Clone)]
pub struct CliHelper {
    commands: &'static [(&'static str, &'static str)],
}

impl CliHelper {
    pub fn new() -> Self {
        Self { commands: COMMANDS }
    }

    /// Argument placeholder of a known command.
    fn args_of(&self, name: &str) -> Option<&'static str> {
        self.commands
            .iter()
            .find(|(command, _)| *command == name)
            .map(|(_, args)| *args)
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    /// Completes the command word. Commands taking arguments get a trailing
    /// space so the argument can be typed straight away.
    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return Ok((0, vec![]));
        }

        let candidates = self
            .commands
            .iter()
            .filter(|(name, _)| name.starts_with(line))
            .map(|(name, args)| {
                if args.is_empty() {
                    Pair {
                        display: name.to_string(),
                        replacement: name.to_string(),
                    }
                } else {
                    Pair {
                        display: format!("{} {}", name, args),
                        replacement: format!("{} ", name),
                    }
                }
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    /// Known commands are cyan, unknown ones yellow. Arguments stay plain.
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if !line.starts_with('/') {
            return Borrowed(line);
        }

        let (name, rest) = match line.find(' ') {
            Some(index) => line.split_at(index),
            None => (line, ""),
        };
        let name = if self.args_of(name).is_some() {
            name.bright_cyan()
        } else {
            name.yellow()
        };
        Owned(format!("{}{}", name, rest))
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    /// Hints the rest of the command word followed by its argument
    /// placeholder, or only the placeholder once the command is typed.
    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if !line.starts_with('/') {
            return None;
        }

        match line.split_once(' ') {
            None => self
                .commands
                .iter()
                .find(|(name, _)| name.starts_with(line) && name.len() > line.len())
                .map(|(name, args)| {
                    let rest = &name[line.len()..];
                    if args.is_empty() {
                        rest.to_string()
                    } else {
                        format!("{} {}", rest, args)
                    }
                }),
            Some((name, "")) => self
                .args_of(name)
                .filter(|args| !args.is_empty())
                .map(str::to_string),
            Some(_) => None,
        }
    }
}

impl Validator for CliHelper {}
