use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::Result;
use crate::remote::ScratchStore;

pub const DRAFT_KEY: &str = "entry-draft";

pub fn corrupt_summary_key(month: u32, year: i32) -> String {
    format!("corrupt-summary-{year}-{month:02}")
}

/// Local key/value scratch space backed by a single JSON file. Holds the
/// draft-recovery slot and any corrupt summary payloads preserved for manual
/// recovery; nothing here is authoritative.
pub struct FileScratch {
    path: PathBuf,
}

impl FileScratch {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content).unwrap_or_default())
    }

    fn write_all(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string(map)?)?;
        Ok(())
    }
}

impl ScratchStore for FileScratch {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.read_all()?;
        map.insert(key.to_string(), value.to_string());
        self.write_all(&map)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.read_all()?;
        if map.remove(key).is_some() {
            self.write_all(&map)?;
        }
        Ok(())
    }
}
