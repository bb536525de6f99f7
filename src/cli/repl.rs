//! Interactive prompt.

use std::io::Write;
use std::sync::Arc;

use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Context, Editor, Helper, Highlighter, Hinter, Validator};

use crate::client::{self, Api};
use crate::common::{debug, info, warn};
use crate::help::CommandTable;
use crate::{render, Result};

/// Line editor helper completing command names from the command table.
#[derive(Helper, Hinter, Highlighter, Validator)]
pub struct LineHelper {
    table: Arc<CommandTable>,
}

impl LineHelper {
    pub fn new(table: Arc<CommandTable>) -> Self {
        Self { table }
    }
}

impl Completer for LineHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        // Candidates replace the line up to the cursor.
        Ok((0, self.table.complete(&line[..pos])))
    }
}

/// What the prompt does after a line has been executed.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    /// Nothing to run, the line is not added to history.
    Skip,
    /// The line ran, add it to history.
    Continue,
    Exit,
}

/// Session executes the lines read by the prompt.
pub struct Session<'a, W> {
    api: &'a mut dyn Api,
    table: Arc<CommandTable>,
    out: W,
}

impl<'a, W: Write> Session<'a, W> {
    pub fn new(api: &'a mut dyn Api, table: Arc<CommandTable>, out: W) -> Self {
        Self { api, table, out }
    }

    /// Print the server version announced by `INFO`.
    pub async fn greet(&mut self) -> Result<()> {
        let info = client::server_info(self.api).await?;
        let version = info
            .get("redis_version")
            .map(String::as_str)
            .unwrap_or("unknown");

        writeln!(self.out, "Connected to {}", version)?;
        Ok(())
    }

    pub async fn execute(&mut self, line: &str) -> Result<Step> {
        let tokens = match shell_words::split(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                debug!(%err, "Ignore line");
                return Ok(Step::Skip);
            }
        };

        let (command, args) = match tokens.split_first() {
            Some(split) => split,
            None => return Ok(Step::Skip),
        };

        if command.eq_ignore_ascii_case("exit") {
            return Ok(Step::Exit);
        }
        if command.eq_ignore_ascii_case("help") {
            self.table.write_help(&mut self.out, args)?;
            return Ok(Step::Continue);
        }

        let reply = self.api.call(command, args).await?;
        if reply.is_error() {
            debug!(command = %command, "Error reply");
        }
        render::render(&mut self.out, &reply)?;
        self.out.flush()?;

        Ok(Step::Continue)
    }
}

/// Run the prompt until `exit`, Ctrl-C or end of input.
pub async fn run(api: &mut dyn Api, table: CommandTable, prompt: &str) -> Result<()> {
    let table = Arc::new(table);

    let config = rustyline::Config::builder()
        .auto_add_history(false)
        .completion_type(CompletionType::List)
        .build();
    let mut editor = Editor::<LineHelper, DefaultHistory>::with_config(config)?;
    editor.set_helper(Some(LineHelper::new(Arc::clone(&table))));

    let mut session = Session::new(api, table, std::io::stdout());
    session.greet().await?;

    loop {
        let line = match editor.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                info!("Input closed");
                break;
            }
            Err(err) => return Err(err.into()),
        };

        match session.execute(&line).await? {
            Step::Skip => (),
            Step::Continue => {
                if let Err(err) = editor.add_history_entry(line.as_str()) {
                    warn!(%err, "Failed to add history entry");
                }
            }
            Step::Exit => break,
        }
    }

    Ok(())
}
