//! The row store: the only place that talks to a `Sheet`.
//!
//! Failures never reach callers from here. A failed read is logged and looks like an empty range;
//! a failed append is logged and reported as `false`.

use crate::api::Sheet;
use std::sync::Arc;
use tracing::{debug, error};

/// Reads and appends rows of string cells against named ranges of a `Sheet`.
#[derive(Clone)]
pub struct RowStore {
    sheet: Arc<dyn Sheet>,
}

impl RowStore {
    pub fn new(sheet: Arc<dyn Sheet>) -> Self {
        Self { sheet }
    }

    /// Returns every row of `range`, header included, or an empty vector if the read fails.
    pub async fn read(&self, range: &str) -> Vec<Vec<String>> {
        match self.sheet.get(range).await {
            Ok(rows) => {
                debug!("Read {} rows from {range}", rows.len());
                rows
            }
            Err(e) => {
                error!("Error fetching sheet data for {range}: {e:#}");
                Vec::new()
            }
        }
    }

    /// Appends `row` to the end of `range`. Returns `false` if the append fails.
    pub async fn append(&self, range: &str, row: Vec<String>) -> bool {
        match self.sheet.append(range, row).await {
            Ok(()) => {
                debug!("Appended a row to {range}");
                true
            }
            Err(e) => {
                error!("Error appending a row to {range}: {e:#}");
                false
            }
        }
    }
}

impl std::fmt::Debug for RowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowStore").finish_non_exhaustive()
    }
}
