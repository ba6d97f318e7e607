use std::collections::BTreeMap;

use crate::{
    error::Result,
    storage::{Document, engine::Engine},
};

/// In-memory storage engine
#[derive(Debug, Default)]
pub struct MemoryEngine {
    data: BTreeMap<Document, Vec<u8>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self { data: BTreeMap::new() }
    }
}

impl Engine for MemoryEngine {
    fn set(&mut self, doc: &Document, value: Vec<u8>) -> Result<()> {
        self.data.insert(doc.clone(), value);
        Ok(())
    }

    fn get(&mut self, doc: &Document) -> Result<Option<Vec<u8>>> {
        Ok(self.data.get(doc).cloned())
    }

    fn delete(&mut self, doc: &Document) -> Result<()> {
        self.data.remove(doc);
        Ok(())
    }
}
