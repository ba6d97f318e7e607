//! Select result cache
//!
//! Entries live until a mutation on their table invalidates them; there is
//! no eviction and no size bound.

use std::collections::HashMap;

use crate::{
    error::Result,
    sql::types::{Row, Value},
};

/// Identifies one cached select: the table plus the optional single
/// equality predicate. The literal is stored typed, so `1` and `"1"` differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub table: String,
    pub column: Option<String>,
    pub literal: Option<Value>,
}

impl CacheKey {
    /// Key for an unfiltered read of `table`
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            column: None,
            literal: None,
        }
    }

    /// Key for a read of `table` filtered by `column = literal`
    pub fn filtered(table: &str, column: &str, literal: Value) -> Self {
        Self {
            table: table.to_string(),
            column: Some(column.to_string()),
            literal: Some(literal),
        }
    }
}

/// Whether a lookup was served from the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

/// Row snapshots keyed by [`CacheKey`]
///
/// Rows go in and come out as copies, never as shared references into live
/// data.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: HashMap<CacheKey, Vec<Row>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached rows for `key`, or runs `producer`, stores a copy of
    /// its rows and returns them. A failing producer stores nothing.
    pub fn get_or_compute<F>(&mut self, key: CacheKey, producer: F) -> Result<(Vec<Row>, CacheStatus)>
    where
        F: FnOnce() -> Result<Vec<Row>>,
    {
        if let Some(rows) = self.entries.get(&key) {
            tracing::debug!(table = %key.table, "cache hit");
            return Ok((rows.clone(), CacheStatus::Hit));
        }

        let rows = producer()?;
        tracing::debug!(table = %key.table, rows = rows.len(), "cache miss");
        self.entries.insert(key, rows.clone());
        Ok((rows, CacheStatus::Miss))
    }

    /// Removes every entry for `table`
    pub fn invalidate(&mut self, table: &str) {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.table != table);
        let removed = before - self.entries.len();
        if removed > 0 {
            tracing::debug!(table, removed, "cache invalidated");
        }
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::{CacheKey, CacheStatus, ResultCache};
    use crate::{
        error::{Error, Result},
        sql::types::{Row, Value},
    };

    fn row(id: i64) -> Row {
        Row::from([("ID".to_string(), Value::Integer(id))])
    }

    #[test]
    fn test_hit_after_miss() -> Result<()> {
        let mut cache = ResultCache::new();
        let calls = Cell::new(0);
        let producer = || {
            calls.set(calls.get() + 1);
            Ok(vec![row(1), row(2)])
        };

        let (first, status) = cache.get_or_compute(CacheKey::table("t"), producer)?;
        assert_eq!(status, CacheStatus::Miss);
        let (second, status) = cache.get_or_compute(CacheKey::table("t"), producer)?;
        assert_eq!(status, CacheStatus::Hit);
        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
        Ok(())
    }

    #[test]
    fn test_returned_rows_are_copies() -> Result<()> {
        let mut cache = ResultCache::new();
        let (mut rows, _) = cache.get_or_compute(CacheKey::table("t"), || Ok(vec![row(1)]))?;
        rows[0].insert("ID".to_string(), Value::Integer(99));
        rows.push(row(2));

        let (cached, status) = cache.get_or_compute(CacheKey::table("t"), || Ok(vec![]))?;
        assert_eq!(status, CacheStatus::Hit);
        assert_eq!(cached, vec![row(1)]);
        Ok(())
    }

    #[test]
    fn test_literal_type_is_part_of_key() -> Result<()> {
        let mut cache = ResultCache::new();
        let int_key = CacheKey::filtered("t", "a", Value::Integer(1));
        let text_key = CacheKey::filtered("t", "a", Value::from("1"));

        cache.get_or_compute(int_key.clone(), || Ok(vec![row(1)]))?;
        assert!(cache.contains(&int_key));
        assert!(!cache.contains(&text_key));

        let (_, status) = cache.get_or_compute(text_key, || Ok(vec![]))?;
        assert_eq!(status, CacheStatus::Miss);
        assert_eq!(cache.len(), 2);
        Ok(())
    }

    #[test]
    fn test_invalidate_is_table_scoped() -> Result<()> {
        let mut cache = ResultCache::new();
        cache.get_or_compute(CacheKey::table("a"), || Ok(vec![row(1)]))?;
        cache.get_or_compute(CacheKey::filtered("a", "ID", Value::Integer(1)), || Ok(vec![row(1)]))?;
        cache.get_or_compute(CacheKey::table("b"), || Ok(vec![row(2)]))?;

        cache.invalidate("a");
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&CacheKey::table("b")));

        let (_, status) = cache.get_or_compute(CacheKey::table("a"), || Ok(vec![]))?;
        assert_eq!(status, CacheStatus::Miss);

        // unknown table is a no-op
        cache.invalidate("zzz");
        assert_eq!(cache.len(), 2);
        Ok(())
    }

    #[test]
    fn test_failed_producer_stores_nothing() {
        let mut cache = ResultCache::new();
        let result = cache.get_or_compute(CacheKey::table("t"), || {
            Err(Error::Storage("disk gone".to_string()))
        });
        assert!(result.is_err());
        assert!(cache.is_empty());
    }
}
