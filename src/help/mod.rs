//! Embedded command reference used by the `help` built-in and line completion.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::{self, Write};

use serde::Deserialize;

use crate::{RespError, Result};

const COMMANDS_JSON: &str = include_str!("commands.json");

pub const USAGE: &str = "Enter help <command> to show information about a command";

/// Documentation of a single command.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CommandDoc {
    pub summary: String,
    #[serde(default)]
    pub complexity: Option<String>,
    #[serde(default)]
    pub arguments: Vec<Argument>,
    #[serde(default)]
    pub since: String,
    #[serde(default)]
    pub group: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Argument {
    pub name: Words,
    #[serde(rename = "type")]
    pub kind: Words,
    #[serde(default)]
    pub optional: bool,
    // The argument may be repeated.
    #[serde(default)]
    pub multiple: bool,
    #[serde(default, rename = "enum")]
    pub choices: Vec<String>,
}

/// A single word, or a group of words for arguments given together such as `field value`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Words {
    One(String),
    Many(Vec<String>),
}

impl fmt::Display for Words {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Words::One(word) => f.write_str(word),
            Words::Many(words) => f.write_str(&words.join(" ")),
        }
    }
}

/// CommandTable maps lower cased command names to their documentation.
/// Names may consist of two tokens such as `config get`.
#[derive(Debug)]
pub struct CommandTable {
    // BTreeMap keeps names sorted for completion.
    commands: BTreeMap<String, CommandDoc>,
}

impl CommandTable {
    /// Load the table compiled into the binary.
    pub fn embedded() -> Result<Self> {
        CommandTable::from_json(COMMANDS_JSON)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let raw = serde_json::from_str::<HashMap<String, CommandDoc>>(json)
            .map_err(|err| RespError::Config(format!("command table: {}", err)))?;

        Ok(Self {
            commands: raw
                .into_iter()
                .map(|(name, doc)| (name.to_lowercase(), doc))
                .collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&CommandDoc> {
        self.commands.get(&name.to_lowercase())
    }

    /// Look up the tokens following `help`.
    /// With two or more tokens, `<first> <second>` is tried before `<first>`.
    /// Return the matched name with the documentation.
    pub fn lookup<S: AsRef<str>>(&self, tokens: &[S]) -> Option<(String, &CommandDoc)> {
        let first = tokens.first()?.as_ref().to_lowercase();

        if let Some(second) = tokens.get(1) {
            let name = format!("{} {}", first, second.as_ref().to_lowercase());
            if let Some(doc) = self.commands.get(&name) {
                return Some((name, doc));
            }
        }

        self.commands.get(&first).map(|doc| (first, doc))
    }

    /// Candidates replacing the whole line, sorted.
    /// Falls back to `help <name>` candidates for lines starting with `help `.
    pub fn complete(&self, line: &str) -> Vec<String> {
        let line = line.to_lowercase();

        let candidates = self
            .names_with_prefix(&line)
            .map(str::to_owned)
            .collect::<Vec<_>>();
        if !candidates.is_empty() {
            return candidates;
        }

        match line.strip_prefix("help ") {
            Some(phrase) => self
                .names_with_prefix(phrase)
                .map(|name| format!("help {}", name))
                .collect(),
            None => Vec::new(),
        }
    }

    fn names_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.commands
            .keys()
            .map(String::as_str)
            .filter(move |name| name.starts_with(prefix))
    }

    /// Write the answer of `help <tokens>`.
    pub fn write_help<W, S>(&self, w: &mut W, tokens: &[S]) -> io::Result<()>
    where
        W: Write,
        S: AsRef<str>,
    {
        if tokens.is_empty() {
            return writeln!(w, "{}", USAGE);
        }

        match self.lookup(tokens) {
            Some((name, doc)) => describe(w, &name, doc),
            None => {
                let name = tokens
                    .iter()
                    .take(2)
                    .map(|token| token.as_ref().to_uppercase())
                    .collect::<Vec<_>>()
                    .join(" ");
                writeln!(w, "No help found for {}", name)
            }
        }
    }
}

fn describe<W: Write>(w: &mut W, name: &str, doc: &CommandDoc) -> io::Result<()> {
    writeln!(w, "Command: {}", name.to_uppercase())?;
    writeln!(w, "Summary: {}", doc.summary)?;
    if let Some(complexity) = doc.complexity.as_deref().filter(|c| !c.is_empty()) {
        writeln!(w, "Complexity: {}", complexity)?;
    }
    if !doc.since.is_empty() {
        writeln!(w, "Since: {}", doc.since)?;
    }
    if !doc.group.is_empty() {
        writeln!(w, "Group: {}", doc.group)?;
    }
    if !doc.arguments.is_empty() {
        writeln!(w, "Args:")?;
        for arg in &doc.arguments {
            write!(w, "     {} ({})", arg.name, arg.kind)?;
            if arg.optional {
                write!(w, " optional")?;
            }
            if arg.multiple {
                write!(w, " multiple")?;
            }
            if !arg.choices.is_empty() {
                write!(w, " one of: {}", arg.choices.join("|"))?;
            }
            writeln!(w)?;
        }
    }
    Ok(())
}
