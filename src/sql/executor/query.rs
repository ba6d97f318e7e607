use crate::{
    error::Result,
    sql::{
        cache::{CacheKey, ResultCache},
        engine::Engine,
        executor::{Executor, ResultSet, coerce_for, row_matches},
        parser::ast::Clause,
    },
};

/// Table scan executor (SELECT)
///
/// Only the first condition of the where clause is applied.
pub struct Scan {
    table_name: String,
    filter: Option<Clause>,
}

impl Scan {
    pub fn new(table_name: String, filter: Option<Clause>) -> Box<Self> {
        Box::new(Self { table_name, filter })
    }
}

impl<E: Engine> Executor<E> for Scan {
    fn execute(self: Box<Self>, engine: &mut E, cache: &mut ResultCache) -> Result<ResultSet> {
        let Scan { table_name, filter: clause } = *self;
        let table = engine.must_get_table(&table_name)?;

        let mut filter = Clause::new();
        if let Some(clause) = clause {
            if clause.len() > 1 {
                tracing::warn!(
                    table = %table_name,
                    ignored = clause.len() - 1,
                    "select applies only the first where condition"
                );
            }
            if let Some((name, value)) = clause.into_iter().next() {
                let column = table.get_column(&name)?;
                let value = coerce_for(column, value)?;
                filter.insert(name, value);
            }
        }

        let key = match filter.first() {
            Some((column, value)) => CacheKey::filtered(&table_name, column, value.clone()),
            None => CacheKey::table(&table_name),
        };
        let (rows, status) = cache.get_or_compute(key, || {
            let rows = engine.load_rows(&table_name)?;
            Ok(rows.into_iter().filter(|row| row_matches(row, &filter)).collect())
        })?;

        Ok(ResultSet::Scan {
            table_name,
            columns: table.column_names(),
            rows,
            cache: status,
        })
    }
}
