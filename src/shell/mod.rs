//! Command dispatch
//!
//! Each input line runs through the same visible steps: parse, ask for
//! confirmation when the statement is destructive, execute and time it, then
//! turn the result or the error into user-facing text. No error ends the
//! loop; only `exit` does.

use std::{
    io::{self, BufRead, Write},
    time::Instant,
};

use crate::sql::{
    engine::{Engine, Session},
    parser::{
        Parser,
        ast::{Command, Statement},
    },
};

pub mod render;

pub const TITLE: &str = "***Table database***";

pub const PROMPT: &str = ">>> Enter command: ";

pub const HELP: &str = "\
***Working with tables and data***
Commands:
<command> create_table <table> <column1:type> <column2:type> ...
<command> list_tables
<command> drop_table <table>

<command> insert into <table> values (<v1>, <v2>, ...)
<command> select from <table>
<command> select from <table> where <column> = <value>
<command> update <table> set <column>=<value> where <column>=<value>
<command> delete from <table> where <column> = <value>

General commands:
<command> exit
<command> help";

/// Asks the user to approve a destructive action
pub trait Confirm {
    fn confirm(&mut self, action: &str) -> io::Result<bool>;
}

/// Whether the loop should read another line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Shell<E: Engine, C: Confirm, W: Write> {
    session: Session<E>,
    confirm: C,
    out: W,
    assume_yes: bool,
}

impl<E: Engine + 'static, C: Confirm, W: Write> Shell<E, C, W> {
    pub fn new(session: Session<E>, confirm: C, out: W) -> Self {
        Self {
            session,
            confirm,
            out,
            assume_yes: false,
        }
    }

    /// Skips confirmation prompts for destructive statements
    pub fn assume_yes(mut self, assume_yes: bool) -> Self {
        self.assume_yes = assume_yes;
        self
    }

    pub fn banner(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}\n\n{}\n", TITLE, HELP)
    }

    pub fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "{}", PROMPT)?;
        self.out.flush()
    }

    /// Handles one input line. Only output failures are returned as errors.
    pub fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        let command = match Parser::new(line).parse() {
            Ok(command) => command,
            Err(err) => {
                writeln!(self.out, "Invalid value: {}. Try again.", err)?;
                return Ok(Flow::Continue);
            }
        };

        match command {
            Command::Empty => {}
            Command::Help => writeln!(self.out, "\n{}\n", HELP)?,
            Command::Exit => return Ok(Flow::Exit),
            Command::Unknown(name) => {
                writeln!(self.out, "Function {} does not exist. Try again.", name)?
            }
            Command::Statement(stmt) => self.run_statement(stmt)?,
        }
        Ok(Flow::Continue)
    }

    fn run_statement(&mut self, stmt: Statement) -> io::Result<()> {
        if let Some(action) = stmt.destructive_action() {
            let confirmed = self.assume_yes
                || self.confirm.confirm(&action).unwrap_or_else(|err| {
                    tracing::warn!(action = %action, %err, "confirmation failed");
                    false
                });
            if !confirmed {
                tracing::debug!(action = %action, "cancelled by user");
                return writeln!(self.out, "Operation cancelled.");
            }
        }

        let name = stmt.name();
        let timed = stmt.is_timed();
        let start = Instant::now();
        let result = self.session.execute_statement(stmt);
        let elapsed = start.elapsed();

        match result {
            Ok(result) => render::write_result(&mut self.out, &result)?,
            Err(err) => writeln!(self.out, "Error: {}", err)?,
        }
        if timed {
            writeln!(
                self.out,
                "Function {} completed in {:.3} seconds",
                name,
                elapsed.as_secs_f64()
            )?;
        }
        Ok(())
    }

    pub fn session(&mut self) -> &mut Session<E> {
        &mut self.session
    }

    pub fn output(&self) -> &W {
        &self.out
    }
}

/// Reads one line, replacing invalid UTF-8 instead of failing.
/// Returns `None` at end of input.
pub fn read_line(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut buf = Vec::new();
    if input.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}
