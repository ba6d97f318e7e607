use crate::{
    error::{Error, Result},
    sql::{
        cache::ResultCache,
        engine::Engine,
        executor::{Executor, ResultSet},
        schema::{Column, Table},
    },
};

/// LIST TABLES executor
pub struct ListTables;

impl ListTables {
    pub fn new() -> Box<Self> {
        Box::new(Self)
    }
}

impl<E: Engine> Executor<E> for ListTables {
    fn execute(self: Box<Self>, engine: &mut E, _cache: &mut ResultCache) -> Result<ResultSet> {
        let tables = engine.load_catalog()?.table_names();
        Ok(ResultSet::ListTables { tables })
    }
}

/// CREATE TABLE executor
pub struct CreateTable {
    name: String,
    columns: Vec<String>,
}

impl CreateTable {
    pub fn new(name: String, columns: Vec<String>) -> Box<Self> {
        Box::new(Self { name, columns })
    }
}

impl<E: Engine> Executor<E> for CreateTable {
    fn execute(self: Box<Self>, engine: &mut E, _cache: &mut ResultCache) -> Result<ResultSet> {
        let mut catalog = engine.load_catalog()?;
        if catalog.contains(&self.name) {
            return Err(Error::Validation(format!("table {} already exists", self.name)));
        }

        let columns = self
            .columns
            .iter()
            .map(|spec| Column::from_spec(spec))
            .collect::<Result<Vec<_>>>()?;
        let table = Table::new(self.name, columns)?;

        // rows left over from an interrupted drop must not resurface
        engine.delete_rows(&table.name)?;
        catalog.put(table.clone());
        engine.save_catalog(&catalog)?;

        tracing::info!(table = %table.name, columns = table.columns.len(), "table created");
        Ok(ResultSet::CreateTable {
            table_name: table.name,
            columns: table.columns,
        })
    }
}

/// DROP TABLE executor
pub struct DropTable {
    name: String,
}

impl DropTable {
    pub fn new(name: String) -> Box<Self> {
        Box::new(Self { name })
    }
}

impl<E: Engine> Executor<E> for DropTable {
    fn execute(self: Box<Self>, engine: &mut E, cache: &mut ResultCache) -> Result<ResultSet> {
        let mut catalog = engine.load_catalog()?;
        if catalog.remove(&self.name).is_none() {
            return Err(Error::NotFound(format!("table {} does not exist", self.name)));
        }

        engine.save_catalog(&catalog)?;
        engine.delete_rows(&self.name)?;
        cache.invalidate(&self.name);

        tracing::info!(table = %self.name, "table dropped");
        Ok(ResultSet::DropTable { table_name: self.name })
    }
}
