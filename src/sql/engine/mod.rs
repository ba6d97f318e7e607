use crate::{
    error::{Error, Result},
    sql::{
        cache::ResultCache,
        executor::{Executor, ResultSet},
        parser::{
            Parser,
            ast::{Command, Statement},
        },
        schema::{Catalog, Table},
        types::Row,
    },
};

mod document;

pub use document::DocEngine;

/// SQL engine trait: schema and data access for the executors
///
/// A missing metadata document reads as an empty catalog and a missing table
/// document as no rows.
pub trait Engine {
    fn load_catalog(&mut self) -> Result<Catalog>;
    fn save_catalog(&mut self, catalog: &Catalog) -> Result<()>;

    fn load_rows(&mut self, table_name: &str) -> Result<Vec<Row>>;
    /// Replaces the whole row sequence of a table, cells in schema order
    fn save_rows(&mut self, table: &Table, rows: &[Row]) -> Result<()>;
    /// Removes the row document of a table; a missing document is fine
    fn delete_rows(&mut self, table_name: &str) -> Result<()>;

    /// Returns table info, returns error if table doesn't exist
    fn must_get_table(&mut self, table_name: &str) -> Result<Table> {
        self.load_catalog()?.must_get(table_name).cloned()
    }
}

/// Executes statements against one engine, keeping the select cache
/// consistent with every write made through it
pub struct Session<E: Engine> {
    engine: E,
    cache: ResultCache,
}

impl<E: Engine + 'static> Session<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            cache: ResultCache::new(),
        }
    }

    /// Parses and executes one statement line
    pub fn execute(&mut self, line: &str) -> Result<ResultSet> {
        match Parser::new(line).parse()? {
            Command::Statement(stmt) => self.execute_statement(stmt),
            Command::Unknown(name) => Err(Error::Parse(format!("unknown command {}", name))),
            other => Err(Error::Parse(format!("{:?} is not a statement", other))),
        }
    }

    pub fn execute_statement(&mut self, stmt: Statement) -> Result<ResultSet> {
        let name = stmt.name();
        let result = <dyn Executor<E>>::build(stmt).execute(&mut self.engine, &mut self.cache);
        match &result {
            Ok(_) => tracing::debug!(statement = name, "statement executed"),
            Err(err) => tracing::debug!(statement = name, %err, "statement failed"),
        }
        result
    }

    pub fn engine(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::{DocEngine, Engine, Session};
    use crate::{
        error::{Error, Result},
        sql::{
            cache::{CacheKey, CacheStatus},
            executor::ResultSet,
            schema::Column,
            types::{DataType, Row, Value},
        },
        storage::memory::MemoryEngine,
    };

    fn session() -> Session<DocEngine<MemoryEngine>> {
        Session::new(DocEngine::new(MemoryEngine::new()))
    }

    fn ann(id: i64, age: i64) -> Row {
        Row::from([
            ("ID".to_string(), Value::Integer(id)),
            ("name".to_string(), Value::from("Ann")),
            ("age".to_string(), Value::Integer(age)),
        ])
    }

    fn scan(result: ResultSet) -> (Vec<Row>, CacheStatus) {
        match result {
            ResultSet::Scan { rows, cache, .. } => (rows, cache),
            other => panic!("expected scan, got {:?}", other),
        }
    }

    #[test]
    fn test_scenarios() -> Result<()> {
        let mut s = session();

        // A
        let created = s.execute("create_table users name:str age:int")?;
        assert_eq!(
            created,
            ResultSet::CreateTable {
                table_name: "users".to_string(),
                columns: vec![
                    Column { name: "ID".to_string(), datatype: DataType::Integer },
                    Column { name: "name".to_string(), datatype: DataType::Text },
                    Column { name: "age".to_string(), datatype: DataType::Integer },
                ],
            }
        );
        let table = s.engine().must_get_table("users")?;
        assert_eq!(table.column_names(), vec!["ID", "name", "age"]);
        assert_eq!(table.last_id, 0);

        // B
        let inserted = s.execute(r#"insert into users values ("Ann", 30)"#)?;
        assert_eq!(inserted, ResultSet::Insert { table_name: "users".to_string(), id: 1 });
        assert_eq!(s.engine().load_rows("users")?, vec![ann(1, 30)]);

        // C
        let (rows, status) = scan(s.execute("select from users where age = 30")?);
        assert_eq!(rows, vec![ann(1, 30)]);
        assert_eq!(status, CacheStatus::Miss);
        let (again, status) = scan(s.execute("select from users where age = 30")?);
        assert_eq!(again, rows);
        assert_eq!(status, CacheStatus::Hit);

        // D
        let updated = s.execute(r#"update users set age=31 where name="Ann""#)?;
        assert_eq!(updated, ResultSet::Update { table_name: "users".to_string(), count: 1 });
        let (rows, status) = scan(s.execute("select from users where age = 30")?);
        assert!(rows.is_empty());
        assert_eq!(status, CacheStatus::Miss);
        let (rows, _) = scan(s.execute("select from users where age = 31")?);
        assert_eq!(rows, vec![ann(1, 31)]);

        // E
        let deleted = s.execute(r#"delete from users where name="Ann""#)?;
        assert_eq!(deleted, ResultSet::Delete { table_name: "users".to_string(), count: 1 });
        assert!(s.engine().load_rows("users")?.is_empty());
        assert!(s.cache().is_empty());

        // F
        let dropped = s.execute("drop_table users")?;
        assert_eq!(dropped, ResultSet::DropTable { table_name: "users".to_string() });
        assert!(matches!(s.execute("select from users"), Err(Error::NotFound(_))));
        assert!(matches!(s.engine().must_get_table("users"), Err(Error::NotFound(_))));
        Ok(())
    }

    #[test]
    fn test_list_tables() -> Result<()> {
        let mut s = session();
        assert_eq!(s.execute("list_tables")?, ResultSet::ListTables { tables: vec![] });

        s.execute("create_table zeta a:int")?;
        s.execute("create_table alpha a:int")?;
        s.execute("create_table mid a:int")?;
        assert_eq!(
            s.execute("list_tables")?,
            ResultSet::ListTables {
                tables: vec!["alpha".to_string(), "mid".to_string(), "zeta".to_string()]
            }
        );
        Ok(())
    }

    #[test]
    fn test_create_table_errors() -> Result<()> {
        let mut s = session();
        s.execute("create_table users name:str")?;

        assert!(matches!(s.execute("create_table users a:int"), Err(Error::Validation(_))));
        assert!(matches!(s.execute("create_table t ID:int"), Err(Error::Validation(_))));
        assert!(matches!(s.execute("create_table t a:float"), Err(Error::Validation(_))));
        assert!(matches!(s.execute("create_table t a"), Err(Error::Validation(_))));
        assert!(matches!(s.execute("create_table t :int"), Err(Error::Validation(_))));
        assert!(matches!(s.execute("create_table t a:int a:str"), Err(Error::Validation(_))));

        // failed attempts leave nothing behind
        assert_eq!(s.execute("list_tables")?, ResultSet::ListTables { tables: vec!["users".to_string()] });
        Ok(())
    }

    #[test]
    fn test_drop_missing_table() {
        let mut s = session();
        assert!(matches!(s.execute("drop_table ghost"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_insert_ids_never_reused() -> Result<()> {
        let mut s = session();
        s.execute("create_table t v:int")?;

        let mut ids = Vec::new();
        for v in 0..3 {
            match s.execute(&format!("insert into t values ({})", v))? {
                ResultSet::Insert { id, .. } => ids.push(id),
                other => panic!("unexpected {:?}", other),
            }
        }
        s.execute("delete from t where v = 2")?;
        s.execute("delete from t where v = 0")?;
        match s.execute("insert into t values (9)")? {
            ResultSet::Insert { id, .. } => ids.push(id),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(s.engine().must_get_table("t")?.last_id, 4);
        Ok(())
    }

    #[test]
    fn test_insert_validation() -> Result<()> {
        let mut s = session();
        s.execute("create_table t n:int b:bool")?;

        for line in [
            "insert into t values (1)",
            "insert into t values (1, true, 3)",
            r#"insert into t values ("true", true)"#,
            "insert into t values (abc, true)",
            "insert into t values (true, true)",
            "insert into t values (1, 5)",
        ] {
            assert!(
                matches!(s.execute(line), Err(Error::Validation(_))),
                "{} should fail validation",
                line
            );
        }
        assert!(s.engine().load_rows("t")?.is_empty());
        assert_eq!(s.engine().must_get_table("t")?.last_id, 0);

        assert!(matches!(s.execute("insert into nope values (1)"), Err(Error::NotFound(_))));

        // text that reads as the right type is accepted
        s.execute(r#"insert into t values ("7", "TRUE")"#)?;
        let rows = s.engine().load_rows("t")?;
        assert_eq!(rows[0]["n"], Value::Integer(7));
        assert_eq!(rows[0]["b"], Value::Boolean(true));
        Ok(())
    }

    #[test]
    fn test_text_column_accepts_any_literal() -> Result<()> {
        let mut s = session();
        s.execute("create_table t label:str")?;
        s.execute("insert into t values (42)")?;
        s.execute("insert into t values (false)")?;
        let rows = s.engine().load_rows("t")?;
        assert_eq!(rows[0]["label"], Value::from("42"));
        assert_eq!(rows[1]["label"], Value::from("false"));

        let (found, _) = scan(s.execute("select from t where label = 42")?);
        assert_eq!(found.len(), 1);
        Ok(())
    }

    #[test]
    fn test_select_errors() -> Result<()> {
        let mut s = session();
        s.execute("create_table t n:int")?;
        assert!(matches!(s.execute("select from t where nope = 1"), Err(Error::NotFound(_))));
        assert!(matches!(s.execute("select from t where n = abc"), Err(Error::Validation(_))));
        assert!(matches!(s.execute("select from ghost"), Err(Error::NotFound(_))));
        assert!(s.cache().is_empty());
        Ok(())
    }

    #[test]
    fn test_select_honors_first_condition_only() -> Result<()> {
        let mut s = session();
        s.execute("create_table t a:int b:int")?;
        s.execute("insert into t values (1, 1)")?;
        s.execute("insert into t values (1, 2)")?;

        let (rows, _) = scan(s.execute("select from t where a = 1, b = 2")?);
        assert_eq!(rows.len(), 2);
        assert!(s.cache().contains(&CacheKey::filtered("t", "a", Value::Integer(1))));
        Ok(())
    }

    #[test]
    fn test_select_literal_is_normalized() -> Result<()> {
        let mut s = session();
        s.execute("create_table t n:int")?;
        s.execute("insert into t values (5)")?;

        let (_, status) = scan(s.execute("select from t where n = 5")?);
        assert_eq!(status, CacheStatus::Miss);
        let (rows, status) = scan(s.execute(r#"select from t where n = "5""#)?);
        assert_eq!(status, CacheStatus::Hit);
        assert_eq!(rows.len(), 1);
        Ok(())
    }

    #[test]
    fn test_mutations_invalidate_cache() -> Result<()> {
        let mut s = session();
        s.execute("create_table t n:int")?;
        s.execute("create_table other n:int")?;
        s.execute("select from other")?;

        let mutations = [
            "insert into t values (1)",
            "update t set n = 2 where n = 1",
            "delete from t where n = 2",
        ];
        for mutation in mutations {
            s.execute("select from t")?;
            let (_, status) = scan(s.execute("select from t")?);
            assert_eq!(status, CacheStatus::Hit);

            s.execute(mutation)?;
            assert!(!s.cache().contains(&CacheKey::table("t")));
            let (_, status) = scan(s.execute("select from t")?);
            assert_eq!(status, CacheStatus::Miss, "stale cache after {}", mutation);
        }

        // other tables are untouched
        assert!(s.cache().contains(&CacheKey::table("other")));

        s.execute("drop_table t")?;
        assert!(!s.cache().contains(&CacheKey::table("t")));
        Ok(())
    }

    #[test]
    fn test_update_conjunctive_where() -> Result<()> {
        let mut s = session();
        s.execute("create_table t a:int b:bool c:str")?;
        s.execute(r#"insert into t values (1, true, "x")"#)?;
        s.execute(r#"insert into t values (1, false, "y")"#)?;
        s.execute(r#"insert into t values (2, true, "z")"#)?;

        let updated = s.execute(r#"update t set c = "hit", a = 10 where a = 1, b = true"#)?;
        assert_eq!(updated, ResultSet::Update { table_name: "t".to_string(), count: 1 });
        let rows = s.engine().load_rows("t")?;
        assert_eq!(rows[0]["c"], Value::from("hit"));
        assert_eq!(rows[0]["a"], Value::Integer(10));
        assert_eq!(rows[1]["c"], Value::from("y"));
        assert_eq!(rows[2]["c"], Value::from("z"));

        let none = s.execute("update t set c = q where a = 99")?;
        assert_eq!(none, ResultSet::Update { table_name: "t".to_string(), count: 0 });
        Ok(())
    }

    #[test]
    fn test_update_errors() -> Result<()> {
        let mut s = session();
        s.execute("create_table t a:int")?;
        s.execute("insert into t values (1)")?;

        assert!(matches!(s.execute("update t set nope = 1 where a = 1"), Err(Error::NotFound(_))));
        assert!(matches!(s.execute("update t set a = 1 where nope = 1"), Err(Error::NotFound(_))));
        assert!(matches!(s.execute("update t set a = x where a = 1"), Err(Error::Validation(_))));
        assert!(matches!(s.execute("update t set a = 1 where a = true"), Err(Error::Validation(_))));
        assert!(matches!(s.execute("update t set ID = 5 where a = 1"), Err(Error::Validation(_))));
        assert!(matches!(s.execute("update ghost set a = 1 where a = 1"), Err(Error::NotFound(_))));

        assert_eq!(s.engine().load_rows("t")?[0]["a"], Value::Integer(1));
        Ok(())
    }

    #[test]
    fn test_delete_by_id() -> Result<()> {
        let mut s = session();
        s.execute("create_table t a:int")?;
        for v in [10, 20, 30] {
            s.execute(&format!("insert into t values ({})", v))?;
        }

        let deleted = s.execute("delete from t where ID = 2")?;
        assert_eq!(deleted, ResultSet::Delete { table_name: "t".to_string(), count: 1 });
        let ids = s
            .engine()
            .load_rows("t")?
            .iter()
            .map(|r| r["ID"].clone())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![Value::Integer(1), Value::Integer(3)]);

        let none = s.execute("delete from t where a = 20")?;
        assert_eq!(none, ResultSet::Delete { table_name: "t".to_string(), count: 0 });
        assert!(matches!(s.execute("delete from t where b = 1"), Err(Error::NotFound(_))));
        Ok(())
    }

    #[test]
    fn test_recreated_table_starts_empty() -> Result<()> {
        let mut s = session();
        s.execute("create_table t a:int")?;
        s.execute("insert into t values (1)")?;
        s.execute("drop_table t")?;
        s.execute("create_table t a:int")?;

        let (rows, _) = scan(s.execute("select from t")?);
        assert!(rows.is_empty());
        match s.execute("insert into t values (1)")? {
            ResultSet::Insert { id, .. } => assert_eq!(id, 1),
            other => panic!("unexpected {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_non_statements() {
        let mut s = session();
        assert!(matches!(s.execute("help"), Err(Error::Parse(_))));
        assert!(matches!(s.execute("frobnicate"), Err(Error::Parse(_))));
    }
}
