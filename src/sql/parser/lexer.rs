//! Command lexer - splits command text into words and tracks quoting

use std::{fmt::Display, iter::Peekable, str::Chars};

use crate::error::{Error, Result};

/// Reserved words of the command language
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Keyword {
    // Shell commands
    Help,
    Exit,
    // DDL keywords
    ListTables,
    CreateTable,
    DropTable,
    // DML keywords
    Insert,
    Select,
    Update,
    Delete,
    Into,
    From,
    Values,
    Where,
    Set,
}

impl Keyword {
    /// Attempts to parse a string as a keyword (case-insensitive)
    pub fn from_str(ident: &str) -> Option<Self> {
        Some(match ident.to_lowercase().as_str() {
            "help" => Keyword::Help,
            "exit" => Keyword::Exit,
            "list_tables" => Keyword::ListTables,
            "create_table" => Keyword::CreateTable,
            "drop_table" => Keyword::DropTable,
            "insert" => Keyword::Insert,
            "select" => Keyword::Select,
            "update" => Keyword::Update,
            "delete" => Keyword::Delete,
            "into" => Keyword::Into,
            "from" => Keyword::From,
            "values" => Keyword::Values,
            "where" => Keyword::Where,
            "set" => Keyword::Set,
            _ => return None,
        })
    }

    /// Returns the lowercase string representation of the keyword
    pub fn to_str(&self) -> &'static str {
        match self {
            Keyword::Help => "help",
            Keyword::Exit => "exit",
            Keyword::ListTables => "list_tables",
            Keyword::CreateTable => "create_table",
            Keyword::DropTable => "drop_table",
            Keyword::Insert => "insert",
            Keyword::Select => "select",
            Keyword::Update => "update",
            Keyword::Delete => "delete",
            Keyword::Into => "into",
            Keyword::From => "from",
            Keyword::Values => "values",
            Keyword::Where => "where",
            Keyword::Set => "set",
        }
    }

    /// Whether `word` spells this keyword in any case
    pub fn matches(&self, word: &str) -> bool {
        word.eq_ignore_ascii_case(self.to_str())
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Word lexer
///
/// Words are separated by whitespace. Single and double quotes group
/// characters into one word and are removed. Outside quotes a backslash takes
/// the next character literally; inside quotes it escapes only a quote or a
/// backslash.
pub struct Lexer<'a> {
    iter: Peekable<Chars<'a>>,
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.scan().transpose()
    }
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            iter: text.chars().peekable(),
        }
    }

    /// Consumes the next character if it satisfies the predicate
    fn next_if<F: Fn(char) -> bool>(&mut self, predicate: F) -> Option<char> {
        self.iter.peek().filter(|&c| predicate(*c))?;
        self.iter.next()
    }

    /// Removes whitespace from the input stream
    fn erase_whitespace(&mut self) {
        while self.next_if(|c| c.is_whitespace()).is_some() {}
    }

    /// Scans and returns the next word
    fn scan(&mut self) -> Result<Option<String>> {
        self.erase_whitespace();
        if self.iter.peek().is_none() {
            return Ok(None);
        }

        let mut word = String::new();
        while let Some(c) = self.next_if(|c| !c.is_whitespace()) {
            match c {
                '\'' => self.scan_single_quoted(&mut word)?,
                '"' => self.scan_double_quoted(&mut word)?,
                '\\' => word.push(self.scan_escaped()?),
                c => word.push(c),
            }
        }
        Ok(Some(word))
    }

    fn scan_escaped(&mut self) -> Result<char> {
        self.iter
            .next()
            .ok_or_else(|| Error::Parse("no character after escape".to_string()))
    }

    fn scan_single_quoted(&mut self, word: &mut String) -> Result<()> {
        self.scan_quoted('\'', word)
    }

    fn scan_double_quoted(&mut self, word: &mut String) -> Result<()> {
        self.scan_quoted('"', word)
    }

    /// Scans up to the closing `quote`. A backslash escapes either quote
    /// character or another backslash; before any other character it is kept.
    fn scan_quoted(&mut self, quote: char, word: &mut String) -> Result<()> {
        loop {
            match self.iter.next() {
                Some(c) if c == quote => return Ok(()),
                Some('\\') => match self.iter.next() {
                    Some(c @ ('"' | '\'' | '\\')) => word.push(c),
                    Some(c) => {
                        word.push('\\');
                        word.push(c);
                    }
                    None => return Err(Error::Parse("no closing quotation".to_string())),
                },
                Some(c) => word.push(c),
                None => return Err(Error::Parse("no closing quotation".to_string())),
            }
        }
    }
}

/// Splits `text` into words
pub fn words(text: &str) -> Result<Vec<String>> {
    Lexer::new(text).collect()
}

/// Tracks whether a position in raw text is inside a quoted or escaped span
#[derive(Debug, Default)]
pub struct QuoteState {
    quote: Option<char>,
    escape: bool,
}

impl QuoteState {
    /// Feeds one character; returns true when it stands outside any quoted
    /// or escaped span and is not itself a quote or escape character
    pub fn feed(&mut self, c: char) -> bool {
        if self.escape {
            self.escape = false;
            return false;
        }
        if c == '\\' {
            self.escape = true;
            return false;
        }
        match self.quote {
            Some(q) => {
                if c == q {
                    self.quote = None;
                }
                false
            }
            None if c == '\'' || c == '"' => {
                self.quote = Some(c);
                false
            }
            None => true,
        }
    }

    /// True while a quote is unclosed or an escape is pending
    pub fn is_open(&self) -> bool {
        self.quote.is_some() || self.escape
    }
}
