//! Result sinks: one analyzer code path, two persistence strategies.
//!
//! `TableSink` keeps every frame in memory for one wide merged table, the
//! tidy output for modest POI sets. `FileSink` writes one CSV per id and
//! skips ids whose file already exists, trading memory for disk and
//! per-id restart granularity on very large batches.

use std::collections::BTreeMap;
use std::path::PathBuf;

use log::info;

use crate::{Error, NodeId};

/// One category's accessibility result: ranked travel minutes per node.
#[derive(Debug, Clone)]
pub struct ResultFrame {
    /// Sanitized category key.
    pub key: String,
    /// Column names, rank 1 first.
    pub columns: Vec<String>,
    /// Ranked travel minutes keyed by node id; `None` where that rank had
    /// no reachable POI.
    pub rows: BTreeMap<NodeId, Vec<Option<f64>>>,
}

/// Destination for per-category result frames.
pub trait ResultSink {
    /// Whether this category's output already exists and the computation
    /// can be skipped entirely.
    fn is_complete(&self, key: &str) -> bool;
    /// Whether column names need the category key suffix to stay unique
    /// when many categories are merged into one table.
    fn qualified_columns(&self) -> bool;
    fn write(&mut self, frame: ResultFrame) -> Result<(), Error>;
}

/// Accumulates all frames in memory for the wide-merge output path.
#[derive(Debug, Default)]
pub struct TableSink {
    frames: Vec<ResultFrame>,
}

impl TableSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_frames(self) -> Vec<ResultFrame> {
        self.frames
    }
}

impl ResultSink for TableSink {
    fn is_complete(&self, _key: &str) -> bool {
        false
    }

    fn qualified_columns(&self) -> bool {
        true
    }

    fn write(&mut self, frame: ResultFrame) -> Result<(), Error> {
        self.frames.push(frame);
        Ok(())
    }
}

/// Writes one `<edge_table>_<key>.csv` per category under a data
/// directory.
pub struct FileSink {
    dir: PathBuf,
    edge_table: String,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>, edge_table: &str) -> Self {
        Self {
            dir: dir.into(),
            edge_table: edge_table.to_string(),
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}_{key}.csv", self.edge_table))
    }
}

impl ResultSink for FileSink {
    fn is_complete(&self, key: &str) -> bool {
        let path = self.path_for(key);
        if path.exists() {
            info!("{} already exists! Skipping...", path.display());
            true
        } else {
            false
        }
    }

    fn qualified_columns(&self) -> bool {
        false
    }

    fn write(&mut self, frame: ResultFrame) -> Result<(), Error> {
        std::fs::create_dir_all(&self.dir)?;
        let mut writer = csv::Writer::from_path(self.path_for(&frame.key))?;

        let mut header = vec!["node_id".to_string()];
        header.extend(frame.columns.iter().cloned());
        writer.write_record(&header)?;

        for (node_id, ranks) in &frame.rows {
            let mut record = vec![node_id.to_string()];
            record.extend(
                ranks
                    .iter()
                    .map(|v| v.map(|m| m.to_string()).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}
