use crate::error::{Error, Result};
use crate::sql::parser::ast::{Clause, Command, Statement};
use crate::sql::parser::lexer::{Keyword, QuoteState, words};
use crate::sql::types::{Value, is_integer_literal};

pub mod ast;
mod lexer;

const USAGE_CREATE_TABLE: &str = "create_table <table> <col:type> [<col:type> ...]";
const USAGE_DROP_TABLE: &str = "drop_table <table>";
const USAGE_INSERT: &str = "insert into <table> values (<v1>, <v2>, ...)";
const USAGE_SELECT: &str = "select from <table> [where <col> = <value>]";
const USAGE_UPDATE: &str = "update <table> set <col>=<value>[, ...] where <col>=<value>[, ...]";
const USAGE_DELETE: &str = "delete from <table> where <col>=<value>[, ...]";

/// Command parser - turns one input line into a [`Command`]
///
/// The command header (keywords and table name) is split into words with
/// shell-like quoting. Payloads after `values`, `set` and `where` are located
/// in the raw text and split on commas outside quoted spans.
pub struct Parser<'a> {
    text: &'a str,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Parser { text: input.trim() }
    }

    /// Parses the whole line; never yields a partially filled command
    pub fn parse(&mut self) -> Result<Command> {
        let head = match self.text.split_whitespace().next() {
            Some(head) => head.to_lowercase(),
            None => return Ok(Command::Empty),
        };

        let stmt = match Keyword::from_str(&head) {
            Some(Keyword::Help) => {
                self.expect_no_args(Keyword::Help)?;
                return Ok(Command::Help);
            }
            Some(Keyword::Exit) => {
                self.expect_no_args(Keyword::Exit)?;
                return Ok(Command::Exit);
            }
            Some(Keyword::ListTables) => {
                self.expect_no_args(Keyword::ListTables)?;
                Statement::ListTables
            }
            Some(Keyword::CreateTable) => self.parse_create_table()?,
            Some(Keyword::DropTable) => self.parse_drop_table()?,
            Some(Keyword::Insert) => self.parse_insert()?,
            Some(Keyword::Select) => self.parse_select()?,
            Some(Keyword::Update) => self.parse_update()?,
            Some(Keyword::Delete) => self.parse_delete()?,
            _ => return Ok(Command::Unknown(head)),
        };
        Ok(Command::Statement(stmt))
    }

    fn expect_no_args(&self, keyword: Keyword) -> Result<()> {
        let words = words(self.text)?;
        if words.len() != 1 {
            return Err(Error::Parse(format!("{} takes no arguments", keyword)));
        }
        Ok(())
    }

    /// create_table <table> <col:type> [<col:type> ...]
    fn parse_create_table(&self) -> Result<Statement> {
        let mut words = words(self.text)?.into_iter().skip(1);
        let name = next_table_name(&mut words, USAGE_CREATE_TABLE)?;
        let columns = words.collect::<Vec<_>>();
        if columns.is_empty() {
            return Err(usage(USAGE_CREATE_TABLE));
        }
        Ok(Statement::CreateTable { name, columns })
    }

    /// drop_table <table>
    fn parse_drop_table(&self) -> Result<Statement> {
        let words = words(self.text)?;
        if words.len() != 2 {
            return Err(usage(USAGE_DROP_TABLE));
        }
        let name = next_table_name(&mut words.into_iter().skip(1), USAGE_DROP_TABLE)?;
        Ok(Statement::DropTable { name })
    }

    /// insert into <table> values (<v1>, <v2>, ...)
    fn parse_insert(&self) -> Result<Statement> {
        let (start, end) = self
            .find_keyword(Keyword::Values, 0)
            .ok_or_else(|| missing_keyword(Keyword::Values, USAGE_INSERT))?;
        let table_name = self.parse_header(&self.text[..start], Some(Keyword::Into), USAGE_INSERT)?;

        let payload = self.text[end..].trim();
        let inner = payload
            .strip_prefix('(')
            .and_then(|p| p.strip_suffix(')'))
            .ok_or_else(|| Error::Parse(format!("expected parentheses: {}", USAGE_INSERT)))?;
        check_parentheses(inner)?;

        let values = split_outside_quotes(inner, ',')?
            .into_iter()
            .map(parse_literal)
            .collect::<Result<Vec<_>>>()?;
        Ok(Statement::Insert { table_name, values })
    }

    /// select from <table> [where <col> = <value>]
    fn parse_select(&self) -> Result<Statement> {
        let (header, condition) = match self.find_keyword(Keyword::Where, 0) {
            Some((start, end)) => (&self.text[..start], Some(&self.text[end..])),
            None => (self.text, None),
        };
        let table_name = self.parse_header(header, Some(Keyword::From), USAGE_SELECT)?;
        let where_clause = condition
            .map(|c| parse_clause(c, Keyword::Where))
            .transpose()?;
        Ok(Statement::Select { table_name, where_clause })
    }

    /// update <table> set <col>=<value>[, ...] where <col>=<value>[, ...]
    fn parse_update(&self) -> Result<Statement> {
        let (set_start, set_end) = self
            .find_keyword(Keyword::Set, 0)
            .ok_or_else(|| missing_keyword(Keyword::Set, USAGE_UPDATE))?;
        let (where_start, where_end) = self
            .find_keyword(Keyword::Where, set_end)
            .ok_or_else(|| missing_keyword(Keyword::Where, USAGE_UPDATE))?;

        let table_name = self.parse_header(&self.text[..set_start], None, USAGE_UPDATE)?;
        let set = parse_clause(&self.text[set_end..where_start], Keyword::Set)?;
        let where_clause = parse_clause(&self.text[where_end..], Keyword::Where)?;
        Ok(Statement::Update { table_name, set, where_clause })
    }

    /// delete from <table> where <col>=<value>[, ...]
    fn parse_delete(&self) -> Result<Statement> {
        let (start, end) = self
            .find_keyword(Keyword::Where, 0)
            .ok_or_else(|| missing_keyword(Keyword::Where, USAGE_DELETE))?;
        let table_name = self.parse_header(&self.text[..start], Some(Keyword::From), USAGE_DELETE)?;
        let where_clause = parse_clause(&self.text[end..], Keyword::Where)?;
        Ok(Statement::Delete { table_name, where_clause })
    }

    /// Parses `<command> [<keyword>] <table>` and returns the table name
    fn parse_header(&self, header: &str, keyword: Option<Keyword>, usage_text: &str) -> Result<String> {
        let mut words = words(header)?.into_iter().skip(1);
        if let Some(keyword) = keyword {
            match words.next() {
                Some(w) if keyword.matches(&w) => {}
                _ => return Err(missing_keyword(keyword, usage_text)),
            }
        }
        let table_name = next_table_name(&mut words, usage_text)?;
        if let Some(extra) = words.next() {
            return Err(Error::Parse(format!(
                "unexpected token {}, expected: {}",
                extra, usage_text
            )));
        }
        Ok(table_name)
    }

    /// Finds `keyword` as a standalone word outside quoted spans, starting
    /// at byte offset `from`. Returns the byte range of the keyword.
    fn find_keyword(&self, keyword: Keyword, from: usize) -> Option<(usize, usize)> {
        let kw = keyword.to_str();
        let mut state = QuoteState::default();
        let mut prev: Option<char> = None;

        for (i, c) in self.text.char_indices() {
            let outside = state.feed(c);
            let boundary_before = prev.is_none_or(|p| p.is_whitespace() || p == ')');
            prev = Some(c);
            if !outside || i < from || !boundary_before {
                continue;
            }

            let end = i + kw.len();
            let Some(candidate) = self.text.get(i..end) else {
                continue;
            };
            let boundary_after = self.text[end..]
                .chars()
                .next()
                .is_none_or(|n| n.is_whitespace() || n == '(');
            if boundary_after && keyword.matches(candidate) {
                return Some((i, end));
            }
        }
        None
    }
}

fn usage(usage_text: &str) -> Error {
    Error::Parse(format!("expected: {}", usage_text))
}

fn missing_keyword(keyword: Keyword, usage_text: &str) -> Error {
    Error::Parse(format!("expected keyword {}: {}", keyword, usage_text))
}

fn next_table_name(words: &mut impl Iterator<Item = String>, usage_text: &str) -> Result<String> {
    match words.next() {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(Error::Parse(format!("expected table name: {}", usage_text))),
    }
}

/// Rejects parentheses outside quoted spans inside the value list
fn check_parentheses(inner: &str) -> Result<()> {
    let mut state = QuoteState::default();
    for c in inner.chars() {
        if state.feed(c) && (c == '(' || c == ')') {
            return Err(Error::Parse("unbalanced parentheses in values list".to_string()));
        }
    }
    Ok(())
}

/// Splits on `sep` characters that are outside quoted and escaped spans;
/// items are trimmed
fn split_outside_quotes(text: &str, sep: char) -> Result<Vec<&str>> {
    let mut items = Vec::new();
    let mut state = QuoteState::default();
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if state.feed(c) && c == sep {
            items.push(text[start..i].trim());
            start = i + c.len_utf8();
        }
    }
    if state.is_open() {
        return Err(Error::Parse(format!("no closing quotation in {}", text.trim())));
    }
    items.push(text[start..].trim());
    Ok(items)
}

/// Splits `<col>=<value>` on the first `=` outside quoted spans
fn split_equals(text: &str) -> Result<(&str, &str)> {
    let mut state = QuoteState::default();
    for (i, c) in text.char_indices() {
        if state.feed(c) && c == '=' {
            return Ok((text[..i].trim(), text[i + 1..].trim()));
        }
    }
    Err(Error::Parse(format!("expected \"=\" in {}", text)))
}

/// Parses a comma separated list of `<col>=<value>` pairs
fn parse_clause(text: &str, keyword: Keyword) -> Result<Clause> {
    let mut clause = Clause::new();
    for item in split_outside_quotes(text, ',')? {
        if item.is_empty() {
            return Err(Error::Parse(format!("empty condition in {}", keyword)));
        }
        let (column, raw) = split_equals(item)?;
        if column.is_empty() {
            return Err(Error::Parse(format!("empty column name in {}", keyword)));
        }
        let value = parse_literal(raw)?;
        if !clause.insert(column.to_string(), value) {
            return Err(Error::Parse(format!("duplicate column {} in {}", column, keyword)));
        }
    }
    Ok(clause)
}

/// Parses one literal token
///
/// A token wrapped in matching quotes is text: the quotes are removed and
/// `\"`, `\'` and `\\` unescaped. Otherwise escape backslashes are dropped
/// and the result is, in priority order, `true`/`false` in any case, an
/// optionally signed run of digits, or text verbatim.
pub fn parse_literal(token: &str) -> Result<Value> {
    let t = token.trim();
    if t.is_empty() {
        return Err(Error::Parse("empty value".to_string()));
    }

    for quote in ['"', '\''] {
        if t.len() >= 2 && t.starts_with(quote) && t.ends_with(quote) {
            return Ok(Value::Text(unescape(&t[1..t.len() - 1])));
        }
    }

    let t = strip_escapes(t);
    if t.eq_ignore_ascii_case("true") {
        return Ok(Value::Boolean(true));
    }
    if t.eq_ignore_ascii_case("false") {
        return Ok(Value::Boolean(false));
    }

    if is_integer_literal(&t) {
        let n = t
            .parse::<i64>()
            .map_err(|err| Error::Parse(format!("invalid int value {}: {}", t, err)))?;
        return Ok(Value::Integer(n));
    }

    Ok(Value::Text(t))
}

/// Unescapes the body of a quoted literal
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('\\', Some(&next @ ('"' | '\'' | '\\'))) => {
                out.push(next);
                chars.next();
            }
            (c, _) => out.push(c),
        }
    }
    out
}

/// Replaces every `\x` in an unquoted token with `x`
fn strip_escapes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}
