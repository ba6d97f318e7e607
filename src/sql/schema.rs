use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    sql::types::DataType,
};

/// Name of the implicit auto-increment column present in every table
pub const ID_COLUMN: &str = "ID";

/// Table schema definition
///
/// `columns[0]` is always the `ID` column. `last_id` is the last identifier
/// handed out by insert and never decreases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Filled from the catalog key, not stored inside the entry
    #[serde(skip)]
    pub name: String,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub last_id: u64,
}

impl Table {
    /// Builds a fresh schema with the `ID` column prepended
    pub fn new(name: String, columns: Vec<Column>) -> Result<Self> {
        validate_table_name(&name)?;
        let mut all = Vec::with_capacity(columns.len() + 1);
        all.push(Column {
            name: ID_COLUMN.to_string(),
            datatype: DataType::Integer,
        });
        all.extend(columns);

        let table = Table {
            name,
            columns: all,
            last_id: 0,
        };
        table.validate().map_err(|err| match err {
            Error::Storage(msg) => Error::Validation(msg),
            other => other,
        })?;
        Ok(table)
    }

    /// Validates the structural invariants of a schema read from storage
    pub fn validate(&self) -> Result<()> {
        match self.columns.first() {
            Some(c) if c.name == ID_COLUMN && c.datatype == DataType::Integer => {}
            _ => {
                return Err(Error::Storage(format!(
                    "table {} does not start with column {}:int",
                    self.name, ID_COLUMN
                )));
            }
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(Error::Storage(format!(
                    "duplicate column {} in table {}",
                    column.name, self.name
                )));
            }
        }
        Ok(())
    }

    /// Returns the column definition for a given column name
    pub fn get_column(&self, col_name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == col_name)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "column {} not found in table {}",
                    col_name, self.name
                ))
            })
    }

    /// Columns a user supplies values for, in insert order
    pub fn user_columns(&self) -> &[Column] {
        &self.columns[1..]
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

/// Table names become file names, so they must stay inside the data directory
fn validate_table_name(name: &str) -> Result<()> {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\', '\0']) {
        return Err(Error::Validation(format!("invalid table name: {:?}", name)));
    }
    Ok(())
}

/// Column schema definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub datatype: DataType,
}

impl Column {
    /// Parses a `name:type` spec from create_table
    pub fn from_spec(spec: &str) -> Result<Self> {
        let (name, datatype) = spec
            .split_once(':')
            .ok_or_else(|| Error::Validation(format!("invalid column definition: {}", spec)))?;
        let name = name.trim();
        let datatype = datatype.trim();

        if name.is_empty() {
            return Err(Error::Validation(format!("empty column name: {}", spec)));
        }
        if name == ID_COLUMN {
            return Err(Error::Validation(format!(
                "column {} is added automatically",
                ID_COLUMN
            )));
        }
        let datatype = DataType::from_str(datatype).ok_or_else(|| {
            Error::Validation(format!(
                "invalid type: {}, expected one of int, str, bool",
                datatype
            ))
        })?;

        Ok(Column {
            name: name.to_string(),
            datatype,
        })
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.name, self.datatype)
    }
}

/// The metadata document: every table schema keyed by table name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    tables: BTreeMap<String, Table>,
}

impl Catalog {
    /// Copies map keys into the schemas and checks them after decoding
    pub fn attach_names(mut self) -> Result<Self> {
        for (name, table) in self.tables.iter_mut() {
            table.name = name.clone();
            table.validate()?;
        }
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Returns table info, returns error if table doesn't exist
    pub fn must_get(&self, name: &str) -> Result<&Table> {
        self.get(name)
            .ok_or_else(|| Error::NotFound(format!("table {} does not exist", name)))
    }

    /// Inserts or replaces a schema under its own name
    pub fn put(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    pub fn remove(&mut self, name: &str) -> Option<Table> {
        self.tables.remove(name)
    }

    /// Table names in lexicographic order
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }
}
