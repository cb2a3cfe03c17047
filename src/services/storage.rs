use crate::domain::constants::{DEFAULT_DEFINES_FILE, DEFINES_OFF};
use crate::domain::errors::MushError;
use crate::domain::models::{DefineEntry, StoreOutcome, SubstitutionTable};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Persistent defines, stored as a flat JSON object of strings.
#[derive(Debug, Clone)]
pub struct DefineStore {
    path: Option<PathBuf>,
}

impl DefineStore {
    /// `off` disables persistence; a directory implies `defines.json` inside it.
    pub fn from_arg(arg: &str) -> Self {
        if arg.eq_ignore_ascii_case(DEFINES_OFF) {
            return Self::disabled();
        }
        let p = PathBuf::from(arg);
        if p.is_dir() {
            Self::at(p.join(DEFAULT_DEFINES_FILE))
        } else {
            Self::at(p)
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn is_disabled(&self) -> bool {
        self.path.is_none()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn load(&self) -> anyhow::Result<SubstitutionTable> {
        let Some(p) = &self.path else {
            return Ok(SubstitutionTable::new());
        };
        if !p.exists() {
            return Ok(SubstitutionTable::new());
        }
        let raw = std::fs::read(p)?;
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(SubstitutionTable::new());
        }
        let table = serde_json::from_slice(&raw).map_err(|e| MushError::StoreCorrupt {
            path: p.clone(),
            reason: e.to_string(),
        })?;
        Ok(table)
    }

    /// Writes into a sibling temp file and renames it over the store, so a
    /// concurrent reader sees either the old or the new table.
    pub fn save(&self, table: &SubstitutionTable) -> anyhow::Result<()> {
        let Some(p) = &self.path else {
            return Ok(());
        };
        let parent = match p.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&parent)?;
        tmp.write_all(serde_json::to_string_pretty(table)?.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.persist(p).map_err(|e| e.error)?;
        Ok(())
    }

    pub fn set(&self, key: &str, value: &str) -> anyhow::Result<StoreOutcome> {
        if self.is_disabled() {
            return Ok(StoreOutcome::Disabled);
        }
        let mut table = self.load()?;
        table.set(key.to_string(), value.to_string());
        self.save(&table)?;
        Ok(StoreOutcome::Defined)
    }

    pub fn delete(&self, key: &str) -> anyhow::Result<StoreOutcome> {
        if self.is_disabled() {
            return Ok(StoreOutcome::Disabled);
        }
        let mut table = self.load()?;
        if table.remove(key).is_none() {
            return Ok(StoreOutcome::NotDefined);
        }
        self.save(&table)?;
        Ok(StoreOutcome::Deleted)
    }

    pub fn list(&self) -> anyhow::Result<Vec<DefineEntry>> {
        Ok(self
            .load()?
            .iter()
            .map(|(name, value)| DefineEntry {
                name: name.to_string(),
                value: value.to_string(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn directory_argument_implies_default_file() {
        let dir = TempDir::new().expect("temp dir");
        let store = DefineStore::from_arg(dir.path().to_str().expect("utf8 path"));
        assert_eq!(store.path(), Some(dir.path().join("defines.json").as_path()));
    }

    #[test]
    fn missing_store_loads_empty() {
        let dir = TempDir::new().expect("temp dir");
        let store = DefineStore::at(dir.path().join("nope.json"));
        assert!(store.load().expect("load").is_empty());
    }

    #[test]
    fn set_then_delete_round_trips() {
        let dir = TempDir::new().expect("temp dir");
        let store = DefineStore::at(dir.path().join("defines.json"));

        assert_eq!(store.set("JGO", "#12").expect("set"), StoreOutcome::Defined);
        assert_eq!(store.load().expect("load").get("JGO"), Some("#12"));

        assert_eq!(store.delete("JGO").expect("delete"), StoreOutcome::Deleted);
        assert_eq!(
            store.delete("JGO").expect("delete"),
            StoreOutcome::NotDefined
        );
        assert!(store.list().expect("list").is_empty());
    }

    #[test]
    fn disabled_store_is_inert() {
        let store = DefineStore::from_arg("off");
        assert!(store.is_disabled());
        assert_eq!(store.set("A", "1").expect("set"), StoreOutcome::Disabled);
        assert_eq!(store.delete("A").expect("delete"), StoreOutcome::Disabled);
        assert!(store.load().expect("load").is_empty());
    }

    #[test]
    fn corrupt_store_is_reported() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("defines.json");
        std::fs::write(&path, "[1, 2, 3]").expect("write");
        let err = DefineStore::at(&path).load().unwrap_err();
        let err = err.downcast::<MushError>().expect("mush error");
        assert_eq!(err.code(), "STORE_CORRUPT");
    }

    #[test]
    fn store_with_invalid_utf8_is_corrupt() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("defines.json");
        std::fs::write(&path, [0xff, 0xfe, b'{']).expect("write");
        let err = DefineStore::at(&path).load().unwrap_err();
        let err = err.downcast::<MushError>().expect("mush error");
        assert_eq!(err.code(), "STORE_CORRUPT");
        assert_eq!(err.exit_code(), 3);

        std::fs::write(&path, b"{\"A\": \"\xff\"}").expect("write");
        let err = DefineStore::at(&path).load().unwrap_err();
        assert!(matches!(
            err.downcast::<MushError>().expect("mush error"),
            MushError::StoreCorrupt { .. }
        ));
    }
}
