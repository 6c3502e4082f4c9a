use std::{
    collections::{HashMap, hash_map::Entry},
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    core::{data::DataStore, error::ParseError},
    input::{InputFormat, read_path},
};

/// Parsed files keyed by canonical path.  Entries are never evicted or
/// refreshed; stdin never goes through here.
#[derive(Debug, Default)]
pub struct ParseCache {
    entries: HashMap<PathBuf, DataStore>,
}

impl ParseCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `path` has been parsed before.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        fs::canonicalize(path).is_ok_and(|p| self.entries.contains_key(&p))
    }

    /// The store for `path`, parsing it on first use.  `format` only matters
    /// for that first parse.
    pub fn load(
        &mut self,
        path: &Path,
        format: Option<InputFormat>,
    ) -> Result<&DataStore, ParseError> {
        let key = fs::canonicalize(path)?;
        match self.entries.entry(key) {
            Entry::Occupied(e) => {
                debug!(path = %e.key().display(), "parse cache hit");
                Ok(e.into_mut())
            }
            Entry::Vacant(e) => {
                let ds = read_path(e.key(), format)?;
                Ok(e.insert(ds))
            }
        }
    }
}
