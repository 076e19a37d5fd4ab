use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::loader::{load_table, LoadError};
use super::normalize::build_table;
use super::model::RecordTable;
use crate::config::TableSchema;

/// Datasets refresh after an hour, like the source dashboards.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

// ---------------------------------------------------------------------------
// TableCache – one file-system read per (path, generation) and TTL window
// ---------------------------------------------------------------------------

struct CacheEntry {
    table: Arc<RecordTable>,
    loaded_at: Instant,
    generation: u64,
}

/// Explicit load cache keyed by path.  Entries expire after their TTL or
/// when the generation is bumped by [`TableCache::invalidate`]; everything
/// inside the window is served from memory without touching the file.
#[derive(Default)]
pub struct TableCache {
    entries: BTreeMap<PathBuf, CacheEntry>,
    generation: u64,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The only entry point: return the cached table for `path`, loading and
    /// normalizing it on a miss.  Errors are not cached, so a fixed file is
    /// picked up by the next call.
    pub fn get_or_load(
        &mut self,
        path: &Path,
        schema: &TableSchema,
        ttl: Duration,
    ) -> Result<Arc<RecordTable>, LoadError> {
        if let Some(entry) = self.entries.get(path) {
            let fresh = entry.generation == self.generation && entry.loaded_at.elapsed() < ttl;
            if fresh && entry.table.schema == *schema {
                return Ok(Arc::clone(&entry.table));
            }
        }

        log::info!("Loading {}", path.display());
        let raw = load_table(path, schema)?;
        let table = Arc::new(build_table(raw, schema));
        log::info!("Loaded {} record(s) from {}", table.len(), path.display());

        self.entries.insert(
            path.to_path_buf(),
            CacheEntry {
                table: Arc::clone(&table),
                loaded_at: Instant::now(),
                generation: self.generation,
            },
        );
        Ok(table)
    }

    /// Force the next `get_or_load` to re-read every file.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::builtin_pages;

    fn schema() -> TableSchema {
        let mut schema = builtin_pages().remove(0).schema;
        schema.display_columns.clear();
        schema
    }

    fn write_csv(path: &Path, rank_of_first: &str) {
        let contents = format!(
            "Ranking,HC,NOMBRE,DEMPARTAMENTO,CANAL,Ganadores,Avance PP Total,Avance Eqv Total\n\
             {rank_of_first},1,ROSA,LIMA,TIENDA,1,80,90\n\
             2,2,JUAN,CUSCO,CALL,0,70,60\n"
        );
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn second_call_within_ttl_skips_the_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("avance.csv");
        write_csv(&path, "1");

        let mut cache = TableCache::new();
        let first = cache.get_or_load(&path, &schema(), DEFAULT_TTL).unwrap();

        // Change the file on disk; the cached table must still be served.
        write_csv(&path, "99");
        let second = cache.get_or_load(&path, &schema(), DEFAULT_TTL).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.records[0].ranking, Some(1.0));
    }

    #[test]
    fn zero_ttl_always_reloads() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("avance.csv");
        write_csv(&path, "1");

        let mut cache = TableCache::new();
        let first = cache.get_or_load(&path, &schema(), Duration::ZERO).unwrap();
        write_csv(&path, "99");
        let second = cache.get_or_load(&path, &schema(), Duration::ZERO).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.records[1].ranking, Some(99.0));
    }

    #[test]
    fn invalidate_bumps_the_generation() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("avance.csv");
        write_csv(&path, "1");

        let mut cache = TableCache::new();
        let first = cache.get_or_load(&path, &schema(), DEFAULT_TTL).unwrap();
        cache.invalidate();
        let second = cache.get_or_load(&path, &schema(), DEFAULT_TTL).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn load_failure_is_not_cached() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("avance.csv");

        let mut cache = TableCache::new();
        assert!(cache.get_or_load(&path, &schema(), DEFAULT_TTL).is_err());

        write_csv(&path, "1");
        assert!(cache.get_or_load(&path, &schema(), DEFAULT_TTL).is_ok());
    }
}
