use crate::{
    error::{Error, Result},
    sql::{
        cache::{CacheStatus, ResultCache},
        engine::Engine,
        executor::{
            mutation::{Delete, Insert, Update},
            query::Scan,
            schema::{CreateTable, DropTable, ListTables},
        },
        parser::ast::{Clause, Statement},
        schema::{Column, Table},
        types::{Row, Value},
    },
};

mod mutation;
mod query;
mod schema;

/// Statement executor trait
pub trait Executor<E: Engine> {
    fn execute(self: Box<Self>, engine: &mut E, cache: &mut ResultCache) -> Result<ResultSet>;
}

/// Builds an executor from a parsed statement
impl<E: Engine + 'static> dyn Executor<E> {
    pub fn build(stmt: Statement) -> Box<dyn Executor<E>> {
        match stmt {
            Statement::ListTables => ListTables::new(),
            Statement::CreateTable { name, columns } => CreateTable::new(name, columns),
            Statement::DropTable { name } => DropTable::new(name),
            Statement::Insert { table_name, values } => Insert::new(table_name, values),
            Statement::Select { table_name, where_clause } => Scan::new(table_name, where_clause),
            Statement::Update {
                table_name,
                set,
                where_clause,
            } => Update::new(table_name, set, where_clause),
            Statement::Delete {
                table_name,
                where_clause,
            } => Delete::new(table_name, where_clause),
        }
    }
}

/// Execution result set
#[derive(Debug, PartialEq)]
pub enum ResultSet {
    ListTables {
        tables: Vec<String>,
    },
    CreateTable {
        table_name: String,
        columns: Vec<Column>,
    },
    DropTable {
        table_name: String,
    },
    /// `id` is the identifier assigned to the new row
    Insert {
        table_name: String,
        id: u64,
    },
    Scan {
        table_name: String,
        columns: Vec<String>,
        rows: Vec<Row>,
        cache: CacheStatus,
    },
    Update {
        table_name: String,
        count: usize,
    },
    Delete {
        table_name: String,
        count: usize,
    },
}

/// Coerces a value into a column's type, naming the column on failure
fn coerce_for(column: &Column, value: Value) -> Result<Value> {
    value.coerce(column.datatype).map_err(|err| match err {
        Error::Validation(msg) => Error::Validation(format!("column {}: {}", column.name, msg)),
        other => other,
    })
}

/// Checks that every column named in the clause exists in the table
fn ensure_columns(table: &Table, clause: &Clause) -> Result<()> {
    for column in clause.columns() {
        table.get_column(column)?;
    }
    Ok(())
}

/// Coerces every literal of the clause into its column's type
fn coerce_clause(table: &Table, clause: Clause) -> Result<Clause> {
    clause
        .into_iter()
        .map(|(name, value)| {
            let column = table.get_column(&name)?;
            Ok((name, coerce_for(column, value)?))
        })
        .collect()
}

/// A row matches when it holds every clause column with an equal value of
/// the same type
fn row_matches(row: &Row, clause: &Clause) -> bool {
    clause.iter().all(|(column, value)| row.get(column) == Some(value))
}
