//! Wildcard tables — the name → candidate-phrase mapping and its loaders.

use rustc_hash::FxHashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("RON serialization error: {0}")]
    RonSer(#[from] ron::Error),
}

/// A mapping from wildcard name to an ordered list of candidate phrases.
///
/// Names may contain path-like separators (`cloth/dress-style`). The table
/// is read-only during expansion and may be shared across concurrent
/// expansions; nothing in the pipeline mutates it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WildcardTable {
    entries: FxHashMap<String, Vec<String>>,
}

impl WildcardTable {
    pub fn new() -> WildcardTable {
        WildcardTable::default()
    }

    /// Candidates for `name`, if the table knows it.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn insert(&mut self, name: impl Into<String>, candidates: Vec<String>) {
        self.entries.insert(name.into(), candidates);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the known wildcard names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Merge another table into this one. Entries from `other` override
    /// entries in `self` with the same name.
    pub fn merge(&mut self, other: WildcardTable) {
        for (name, candidates) in other.entries {
            self.entries.insert(name, candidates);
        }
    }

    /// Load every `*.txt` file under `dir` (recursively) as one table entry.
    ///
    /// The entry name is the file's relative path without extension, with
    /// `/` separators: `cloth/dress-style.txt` → `cloth/dress-style`. Lines
    /// starting with `#` are comments and dropped; blank lines are kept as
    /// intentionally blank candidates.
    pub fn load_from_dir(dir: &Path) -> Result<WildcardTable, TableError> {
        let mut table = WildcardTable::new();
        collect_txt_files(dir, dir, &mut table)?;
        Ok(table)
    }

    /// Load a table from a RON file (a bare `name: [candidates]` map).
    pub fn load_from_ron(path: &Path) -> Result<WildcardTable, TableError> {
        let contents = std::fs::read_to_string(path)?;
        WildcardTable::parse_ron(&contents)
    }

    /// Parse a table from a RON string.
    pub fn parse_ron(input: &str) -> Result<WildcardTable, TableError> {
        let entries: FxHashMap<String, Vec<String>> = ron::from_str(input)?;
        Ok(WildcardTable { entries })
    }

    /// Serialize the table to RON.
    pub fn to_ron(&self) -> Result<String, TableError> {
        let pretty = ron::ser::PrettyConfig::default();
        Ok(ron::ser::to_string_pretty(&self.entries, pretty)?)
    }

    /// Write the table to a RON file.
    pub fn save_to_ron(&self, path: &Path) -> Result<(), TableError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

fn collect_txt_files(
    root: &Path,
    dir: &Path,
    table: &mut WildcardTable,
) -> Result<(), TableError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_txt_files(root, &path, table)?;
        } else if path.extension().and_then(|s| s.to_str()) == Some("txt") {
            let contents = std::fs::read_to_string(&path)?;
            let candidates: Vec<String> = contents
                .lines()
                .filter(|line| !line.starts_with('#'))
                .map(str::to_string)
                .collect();
            table.insert(entry_name(root, &path), candidates);
        }
    }
    Ok(())
}

/// Relative path without extension, `/`-joined: the wildcard name.
fn entry_name(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
