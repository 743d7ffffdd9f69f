use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::Analysis;
use crate::error::NumResult;

/// A rendered plot persisted by a [`PlotStore`].
#[derive(Debug, Clone, Serialize)]
pub struct PlotRecord {
    /// File name, e.g. `01J9Z3...png`. Safe to embed in a URL path.
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub size_bytes: u64,
}

pub trait PlotStore {
    // Write
    fn save(&self, analysis: &Analysis) -> NumResult<PlotRecord>;

    // Read
    fn open(&self, name: &str) -> NumResult<Option<Vec<u8>>>;
    fn list(&self) -> NumResult<Vec<PlotRecord>>;

    // Lifecycle
    fn prune(&self, max_age: Duration) -> NumResult<usize>;
}
