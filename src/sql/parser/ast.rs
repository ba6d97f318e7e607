use crate::sql::types::Value;

/// A parsed input line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Blank line
    Empty,
    Help,
    Exit,
    /// Leading word that names no command
    Unknown(String),
    /// Anything that touches schema or data
    Statement(Statement),
}

/// Statements executed against schema and data
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    ListTables,
    /// CREATE TABLE; columns are raw `name:type` specs validated at execution
    CreateTable {
        name: String,
        columns: Vec<String>,
    },
    DropTable {
        name: String,
    },
    /// INSERT with one value per non-ID column, in schema order
    Insert {
        table_name: String,
        values: Vec<Value>,
    },
    Select {
        table_name: String,
        where_clause: Option<Clause>,
    },
    Update {
        table_name: String,
        set: Clause,
        where_clause: Clause,
    },
    Delete {
        table_name: String,
        where_clause: Clause,
    },
}

impl Statement {
    /// Name used when reporting on the statement
    pub fn name(&self) -> &'static str {
        match self {
            Statement::ListTables => "list_tables",
            Statement::CreateTable { .. } => "create_table",
            Statement::DropTable { .. } => "drop_table",
            Statement::Insert { .. } => "insert",
            Statement::Select { .. } => "select",
            Statement::Update { .. } => "update",
            Statement::Delete { .. } => "delete",
        }
    }

    /// Description of the destructive action, if the statement needs the
    /// user's confirmation before it runs
    pub fn destructive_action(&self) -> Option<String> {
        match self {
            Statement::DropTable { name } => Some(format!("drop table {}", name)),
            Statement::Delete { table_name, .. } => Some(format!("delete rows from {}", table_name)),
            _ => None,
        }
    }

    /// Whether execution time is reported for the statement
    pub fn is_timed(&self) -> bool {
        matches!(
            self,
            Statement::Insert { .. }
                | Statement::Select { .. }
                | Statement::Update { .. }
                | Statement::Delete { .. }
        )
    }
}

/// Equality conditions or assignments, `column = literal`, in input order
///
/// Column names are unique within one clause.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clause(Vec<(String, Value)>);

impl Clause {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Adds a pair; returns false and leaves the clause unchanged when the
    /// column is already present
    pub fn insert(&mut self, column: String, value: Value) -> bool {
        if self.get(&column).is_some() {
            return false;
        }
        self.0.push((column, value));
        true
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    /// First pair in input order
    pub fn first(&self) -> Option<(&String, &Value)> {
        self.0.first().map(|(c, v)| (c, v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter().map(|(c, v)| (c, v))
    }

    pub fn columns(&self) -> impl Iterator<Item = &String> {
        self.0.iter().map(|(c, _)| c)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for Clause {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, Value)> for Clause {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut clause = Clause::new();
        for (column, value) in iter {
            clause.insert(column, value);
        }
        clause
    }
}

impl<const N: usize> From<[(&str, Value); N]> for Clause {
    fn from(pairs: [(&str, Value); N]) -> Self {
        pairs.into_iter().map(|(c, v)| (c.to_string(), v)).collect()
    }
}
