use crate::{error::Result, storage::Document};

/// Abstract storage engine interface (byte-level operations)
///
/// Different from sql::engine::Engine which operates on schemas and rows.
/// A document that was never written reads as `None`.
pub trait Engine {
    fn set(&mut self, doc: &Document, value: Vec<u8>) -> Result<()>;
    fn get(&mut self, doc: &Document) -> Result<Option<Vec<u8>>>;
    /// Removes a document; removing a missing document is not an error
    fn delete(&mut self, doc: &Document) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::Engine;
    use crate::{
        config::Config,
        error::Result,
        storage::{Document, file::FileEngine, memory::MemoryEngine},
    };

    fn test_point_opt(mut eng: impl Engine) -> Result<()> {
        let users = Document::Table("users".to_string());
        assert_eq!(eng.get(&users)?, None);
        assert_eq!(eng.get(&Document::Metadata)?, None);

        eng.set(&users, vec![1, 2, 3, 4])?;
        assert_eq!(eng.get(&users)?, Some(vec![1, 2, 3, 4]));

        eng.set(&users, vec![5, 6, 7, 8])?;
        assert_eq!(eng.get(&users)?, Some(vec![5, 6, 7, 8]));

        eng.set(&Document::Metadata, b"{}".to_vec())?;
        assert_eq!(eng.get(&Document::Metadata)?, Some(b"{}".to_vec()));
        assert_eq!(eng.get(&users)?, Some(vec![5, 6, 7, 8]));

        eng.delete(&users)?;
        assert_eq!(eng.get(&users)?, None);

        // deleting twice is fine
        eng.delete(&users)?;

        eng.set(&users, vec![])?;
        assert_eq!(eng.get(&users)?, Some(vec![]));
        Ok(())
    }

    #[test]
    fn test_memory() -> Result<()> {
        test_point_opt(MemoryEngine::new())
    }

    #[test]
    fn test_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        test_point_opt(FileEngine::new(Config::new(dir.path()))?)
    }
}
