use crate::{
    error::{Error, Result},
    sql::{
        cache::ResultCache,
        engine::Engine,
        executor::{Executor, ResultSet, coerce_clause, coerce_for, ensure_columns, row_matches},
        parser::ast::Clause,
        schema::ID_COLUMN,
        types::{Row, Value},
    },
};

/// INSERT executor
pub struct Insert {
    table_name: String,
    values: Vec<Value>,
}

impl Insert {
    pub fn new(table_name: String, values: Vec<Value>) -> Box<Self> {
        Box::new(Self { table_name, values })
    }
}

impl<E: Engine> Executor<E> for Insert {
    fn execute(self: Box<Self>, engine: &mut E, cache: &mut ResultCache) -> Result<ResultSet> {
        let mut catalog = engine.load_catalog()?;
        let mut table = catalog.must_get(&self.table_name)?.clone();

        let expected = table.user_columns().len();
        if self.values.len() != expected {
            return Err(Error::Validation(format!(
                "expected {} values, got {}",
                expected,
                self.values.len()
            )));
        }

        // Coerce everything before touching storage: one bad value, no write
        let mut row = Row::new();
        for (column, value) in table.user_columns().iter().zip(self.values) {
            row.insert(column.name.clone(), coerce_for(column, value)?);
        }

        let mut rows = engine.load_rows(&self.table_name)?;
        let id = table
            .last_id
            .checked_add(1)
            .filter(|id| i64::try_from(*id).is_ok())
            .ok_or_else(|| Error::Validation(format!("table {} ran out of IDs", self.table_name)))?;
        row.insert(ID_COLUMN.to_string(), Value::Integer(id as i64));

        // The schema goes first: if the row write then fails, the ID is
        // skipped rather than handed out twice.
        table.last_id = id;
        catalog.put(table);
        engine.save_catalog(&catalog)?;

        rows.push(row);
        engine.save_rows(catalog.must_get(&self.table_name)?, &rows)?;
        cache.invalidate(&self.table_name);

        tracing::debug!(table = %self.table_name, id, "row inserted");
        Ok(ResultSet::Insert {
            table_name: self.table_name,
            id,
        })
    }
}

/// UPDATE executor
pub struct Update {
    table_name: String,
    set: Clause,
    where_clause: Clause,
}

impl Update {
    pub fn new(table_name: String, set: Clause, where_clause: Clause) -> Box<Self> {
        Box::new(Self {
            table_name,
            set,
            where_clause,
        })
    }
}

impl<E: Engine> Executor<E> for Update {
    fn execute(self: Box<Self>, engine: &mut E, cache: &mut ResultCache) -> Result<ResultSet> {
        let table = engine.must_get_table(&self.table_name)?;
        ensure_columns(&table, &self.set)?;
        ensure_columns(&table, &self.where_clause)?;
        if self.set.get(ID_COLUMN).is_some() {
            return Err(Error::Validation(format!("column {} cannot be updated", ID_COLUMN)));
        }

        let set = coerce_clause(&table, self.set)?;
        let where_clause = coerce_clause(&table, self.where_clause)?;

        let mut rows = engine.load_rows(&self.table_name)?;
        let mut count = 0;
        for row in rows.iter_mut().filter(|row| row_matches(row, &where_clause)) {
            for (column, value) in set.iter() {
                row.insert(column.clone(), value.clone());
            }
            count += 1;
        }

        engine.save_rows(&table, &rows)?;
        cache.invalidate(&self.table_name);

        tracing::debug!(table = %self.table_name, count, "rows updated");
        Ok(ResultSet::Update {
            table_name: self.table_name,
            count,
        })
    }
}

/// DELETE executor
pub struct Delete {
    table_name: String,
    where_clause: Clause,
}

impl Delete {
    pub fn new(table_name: String, where_clause: Clause) -> Box<Self> {
        Box::new(Self {
            table_name,
            where_clause,
        })
    }
}

impl<E: Engine> Executor<E> for Delete {
    fn execute(self: Box<Self>, engine: &mut E, cache: &mut ResultCache) -> Result<ResultSet> {
        let table = engine.must_get_table(&self.table_name)?;
        ensure_columns(&table, &self.where_clause)?;
        let where_clause = coerce_clause(&table, self.where_clause)?;

        let rows = engine.load_rows(&self.table_name)?;
        let before = rows.len();
        let kept = rows
            .into_iter()
            .filter(|row| !row_matches(row, &where_clause))
            .collect::<Vec<_>>();
        let count = before - kept.len();

        engine.save_rows(&table, &kept)?;
        cache.invalidate(&self.table_name);

        tracing::debug!(table = %self.table_name, count, "rows deleted");
        Ok(ResultSet::Delete {
            table_name: self.table_name,
            count,
        })
    }
}
