use serde::{Serialize, Serializer, de::DeserializeOwned, ser::SerializeMap};

use crate::{
    error::Result,
    sql::{
        schema::{Catalog, Column, Table},
        types::Row,
    },
    storage::{Document, engine::Engine as StorageEngine},
};

use super::Engine;

/// SQL engine storing the catalog and each table as JSON documents
pub struct DocEngine<S: StorageEngine> {
    store: S,
}

impl<S: StorageEngine> DocEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn read<T: DeserializeOwned + Default>(&mut self, doc: &Document) -> Result<T> {
        match self.store.get(doc)? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(T::default()),
        }
    }

    fn write<T: Serialize + ?Sized>(&mut self, doc: &Document, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.store.set(doc, bytes)
    }
}

impl<S: StorageEngine> Engine for DocEngine<S> {
    fn load_catalog(&mut self) -> Result<Catalog> {
        self.read::<Catalog>(&Document::Metadata)?.attach_names()
    }

    fn save_catalog(&mut self, catalog: &Catalog) -> Result<()> {
        self.write(&Document::Metadata, catalog)
    }

    fn load_rows(&mut self, table_name: &str) -> Result<Vec<Row>> {
        self.read(&Document::Table(table_name.to_string()))
    }

    fn save_rows(&mut self, table: &Table, rows: &[Row]) -> Result<()> {
        let rows = rows
            .iter()
            .map(|row| SchemaOrdered {
                columns: &table.columns,
                row,
            })
            .collect::<Vec<_>>();
        self.write(&Document::Table(table.name.clone()), &rows)
    }

    fn delete_rows(&mut self, table_name: &str) -> Result<()> {
        self.store.delete(&Document::Table(table_name.to_string()))
    }
}

/// A row serialized with its cells in schema column order, `ID` first
struct SchemaOrdered<'a> {
    columns: &'a [Column],
    row: &'a Row,
}

impl Serialize for SchemaOrdered<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.row.len()))?;
        for column in self.columns {
            if let Some(value) = self.row.get(&column.name) {
                map.serialize_entry(&column.name, value)?;
            }
        }
        // cells outside the schema follow in name order
        for (name, value) in self.row {
            if !self.columns.iter().any(|c| &c.name == name) {
                map.serialize_entry(name, value)?;
            }
        }
        map.end()
    }
}
