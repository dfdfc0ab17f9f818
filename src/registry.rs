use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, warn};

use crate::catalog::{self, SqlQuery};
use crate::error::Error;

/// A (name, parameter-signature) pair that appeared more than once during
/// catalog loading. The first definition wins at resolution time; later ones
/// stay in the candidate list but are unreachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSignature {
    /// The shared query name.
    pub name: String,
    /// The shared parameter set, in the first definition's order.
    pub parameters: Vec<String>,
}

/// A registry of named SQL queries loaded from catalog sources.
///
/// Queries are indexed by name; several queries may share a name as long as
/// their parameter signatures differ, and a lookup supplies both the name and
/// the caller's parameter-name set. Once built the registry is never mutated,
/// so it can be shared freely between concurrent readers.
#[derive(Debug, Default)]
pub struct QueryRegistry {
    queries: HashMap<String, Vec<SqlQuery>>,
    duplicates: Vec<DuplicateSignature>,
}

impl QueryRegistry {
    /// Loads queries from a single catalog file or from a directory.
    ///
    /// For a directory, every file with the `.sql` extension is parsed in
    /// lexicographic path order and the definitions are appended
    /// cumulatively; other files are ignored. A directory with no catalogs,
    /// or a catalog with no queries, is valid and contributes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Catalog`] if the path cannot be read.
    pub fn load(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let mut registry = Self::default();
        if path.is_dir() {
            let entries = fs::read_dir(path).map_err(|source| Error::Catalog {
                path: path.to_path_buf(),
                source,
            })?;
            let mut files: Vec<PathBuf> = Vec::new();
            for entry in entries {
                let entry = entry.map_err(|source| Error::Catalog {
                    path: path.to_path_buf(),
                    source,
                })?;
                let file = entry.path();
                if file.extension().is_some_and(|ext| ext == "sql") {
                    files.push(file);
                }
            }
            files.sort();
            for file in &files {
                registry.load_file(file)?;
            }
        } else {
            registry.load_file(path)?;
        }
        Ok(registry)
    }

    fn load_file(&mut self, path: &Path) -> crate::Result<()> {
        let content = fs::read_to_string(path).map_err(|source| Error::Catalog {
            path: path.to_path_buf(),
            source,
        })?;
        self.add_source(&content)
    }

    fn add_source(&mut self, content: &str) -> crate::Result<()> {
        for query in catalog::parse(content)? {
            self.insert(query);
        }
        Ok(())
    }

    fn insert(&mut self, query: SqlQuery) {
        let candidates = self.queries.entry(query.name().to_string()).or_default();
        let caller_view: HashSet<&str> =
            query.parameter_names().iter().map(String::as_str).collect();
        if candidates.iter().any(|existing| existing.matches(&caller_view)) {
            warn!(
                query = query.name(),
                parameters = ?query.parameter_names(),
                "duplicate query signature, first definition wins"
            );
            self.duplicates.push(DuplicateSignature {
                name: query.name().to_string(),
                parameters: query.parameter_names().to_vec(),
            });
        }
        debug!(query = query.name(), parameters = ?query.parameter_names(), "loaded query");
        candidates.push(query);
    }

    /// Finds the query whose name and parameter signature both match.
    ///
    /// Candidates sharing the name are tried in insertion order and the first
    /// whose parameter set equals `caller_names` exactly wins. `None` is a
    /// normal outcome (an unknown name or a non-matching signature), not a
    /// failure.
    pub fn find(&self, name: &str, caller_names: &HashSet<&str>) -> Option<&SqlQuery> {
        self.queries
            .get(name)?
            .iter()
            .find(|query| query.matches(caller_names))
    }

    /// Signature collisions observed while loading.
    pub fn duplicates(&self) -> &[DuplicateSignature] {
        &self.duplicates
    }

    /// Total number of query definitions held, duplicates included.
    pub fn len(&self) -> usize {
        self.queries.values().map(Vec::len).sum()
    }

    /// Returns true if no definitions were loaded.
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

impl FromStr for QueryRegistry {
    type Err = Error;

    /// Parses a registry straight from catalog text, for embedded catalogs
    /// (`include_str!`) and tests.
    fn from_str(content: &str) -> crate::Result<Self> {
        let mut registry = Self::default();
        registry.add_source(content)?;
        Ok(registry)
    }
}
