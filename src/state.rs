use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{resolve_data_path, PageSpec};
use crate::data::aggregate::TOP_N_DEFAULT;
use crate::data::cache::{TableCache, DEFAULT_TTL};
use crate::data::filter::{filtered_indices, FilterSelection};
use crate::data::model::RecordTable;

// ---------------------------------------------------------------------------
// Per-page state
// ---------------------------------------------------------------------------

/// UI state of one dashboard page, independent of rendering.
pub struct PageState {
    pub spec: PageSpec,

    /// Current dataset (None until the first successful load).
    pub table: Option<Arc<RecordTable>>,

    /// Dropdown and winners-only selections.
    pub selection: FilterSelection,

    /// Top-N slider value.
    pub top_n: usize,

    /// Indices of records passing the current filters (cached).
    pub visible: Vec<usize>,

    /// Error message shown in the UI after a failed load.
    pub error: Option<String>,

    /// A failed load is not retried until the user asks for a reload.
    pub failed: bool,

    /// File picked via the open dialog, replacing the configured one.
    pub data_override: Option<PathBuf>,
}

impl PageState {
    pub fn new(spec: PageSpec) -> Self {
        let selection = FilterSelection::all_for(&spec.schema);
        PageState {
            spec,
            table: None,
            selection,
            top_n: TOP_N_DEFAULT,
            visible: Vec::new(),
            error: None,
            failed: false,
            data_override: None,
        }
    }

    /// The file this page reads, honouring a dialog override.
    pub fn data_path(&self, data_dir: &Path) -> PathBuf {
        self.data_override
            .clone()
            .unwrap_or_else(|| resolve_data_path(data_dir, &self.spec.data_file))
    }

    /// Ingest a newly loaded table.  Selections survive a TTL refresh; they
    /// only reset when the schema shape changed underneath them.
    pub fn set_table(&mut self, table: Arc<RecordTable>) {
        if self.selection.groups.len() != table.schema.group_columns.len() {
            self.selection = FilterSelection::all_for(&table.schema);
        }
        self.table = Some(table);
        self.error = None;
        self.refilter();
    }

    /// Recompute `visible` after a filter change.
    pub fn refilter(&mut self) {
        match &self.table {
            Some(table) => self.visible = filtered_indices(table, &self.selection),
            None => self.visible.clear(),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

pub struct AppState {
    pub cache: TableCache,
    pub pages: Vec<PageState>,
    pub active: usize,
    pub data_dir: PathBuf,
    pub ttl: Duration,
}

impl AppState {
    pub fn new(pages: Vec<PageSpec>, data_dir: PathBuf) -> Self {
        AppState {
            cache: TableCache::new(),
            pages: pages.into_iter().map(PageState::new).collect(),
            active: 0,
            data_dir,
            ttl: DEFAULT_TTL,
        }
    }

    pub fn active_page(&self) -> &PageState {
        &self.pages[self.active]
    }

    pub fn active_page_mut(&mut self) -> &mut PageState {
        &mut self.pages[self.active]
    }

    /// Run the cache-checked load for the active page.  Within the TTL this
    /// is a cheap map lookup; on expiry the file is re-read and the page
    /// picks up the fresh table.  A failure parks the page until the user
    /// reloads.
    pub fn ensure_loaded(&mut self) {
        let page = &mut self.pages[self.active];
        if page.failed {
            return;
        }
        let path = page.data_path(&self.data_dir);
        match self.cache.get_or_load(&path, &page.spec.schema, self.ttl) {
            Ok(table) => {
                let changed = page
                    .table
                    .as_ref()
                    .map_or(true, |current| !Arc::ptr_eq(current, &table));
                if changed {
                    page.set_table(table);
                }
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                page.error = Some(format!("Error: {e}"));
                page.failed = true;
            }
        }
    }

    /// Manual reload: drop the cache generation and clear the failure latch.
    pub fn reload_active(&mut self) {
        self.cache.invalidate();
        let page = self.active_page_mut();
        page.failed = false;
        page.error = None;
    }

    /// Point the active page at a file picked in the open dialog.
    pub fn open_override(&mut self, path: PathBuf) {
        self.cache.invalidate();
        let page = self.active_page_mut();
        log::info!("Switching data file to {}", path.display());
        page.data_override = Some(path);
        page.table = None;
        page.failed = false;
        page.error = None;
        page.refilter();
    }
}
