//! PDF export
//!
//! Renders an ordered list of moments into a US Letter PDF: one page per
//! moment plus continuation pages for photos that overflow. The exporter
//! is a pure function of its input and never sees the live store; the
//! async entry point takes an owned snapshot.
//!
//! ## Usage
//!
//! ```ignore
//! let exporter = Exporter::from_config(&config);
//! let task = exporter.spawn(store.snapshot());
//! let document = task.wait().await?;
//! let path = write_export(&config.resolved_export_dir(), &document)?;
//! ```

pub mod images;
pub mod layout;
pub mod pdf;

use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::info;

use crate::config::{Config, DEFAULT_JPEG_QUALITY};
use crate::models::Moment;
use crate::storage::persistence::atomic_write;
use crate::storage::StorageError;

use images::prepare_all;
use layout::layout_moment;
use pdf::PdfBuilder;

/// Errors that can occur while exporting
#[derive(Error, Debug)]
pub enum ExportError {
    /// The document could not be written for hand-off
    #[error("Failed to write export to '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: StorageError,
    },

    /// The background render panicked or was aborted
    #[error("Export task failed: {0}")]
    Task(#[from] JoinError),
}

/// A rendered document
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub moment_count: usize,
}

/// Renders moments to PDF
#[derive(Debug, Clone, Copy)]
pub struct Exporter {
    jpeg_quality: u8,
}

impl Default for Exporter {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl Exporter {
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.jpeg_quality)
    }

    /// Render `moments` in the given order
    ///
    /// Each moment starts on a new page. An empty list yields a valid
    /// document with no pages.
    pub fn export(&self, moments: &[Moment]) -> ExportedDocument {
        let mut builder = PdfBuilder::new();

        for moment in moments {
            let prepared = prepare_all(&moment.images, self.jpeg_quality);
            let sizes: Vec<_> = prepared.iter().map(|p| p.as_ref().map(|p| p.size)).collect();
            let pages = layout_moment(moment, &sizes);
            builder.add_pages(&pages, &prepared);
        }

        let page_count = builder.page_count();
        let bytes = builder.finish();
        info!(
            "Rendered {} moments into {} pages ({} bytes)",
            moments.len(),
            page_count,
            bytes.len()
        );

        ExportedDocument {
            bytes,
            page_count,
            moment_count: moments.len(),
        }
    }

    /// Render on a blocking worker
    ///
    /// The snapshot is moved into the task, so later changes to the store
    /// do not affect it.
    pub fn spawn(&self, snapshot: Vec<Moment>) -> ExportTask {
        ExportTask::spawn(*self, snapshot)
    }
}

/// A render running in the background
///
/// There is no cancellation: once spawned the render runs to completion.
pub struct ExportTask {
    handle: JoinHandle<ExportedDocument>,
}

impl ExportTask {
    /// Must be called from within a Tokio runtime
    pub fn spawn(exporter: Exporter, snapshot: Vec<Moment>) -> Self {
        let handle = tokio::task::spawn_blocking(move || exporter.export(&snapshot));
        Self { handle }
    }

    /// Wait for the rendered document
    pub async fn wait(self) -> Result<ExportedDocument, ExportError> {
        Ok(self.handle.await?)
    }
}

/// Write a rendered document into `dir` for hand-off
///
/// The file is named after the current time, e.g.
/// `moments-20240501-123000.pdf`, and written atomically.
pub fn write_export(dir: &Path, document: &ExportedDocument) -> Result<PathBuf, ExportError> {
    let name = format!("moments-{}.pdf", Utc::now().format("%Y%m%d-%H%M%S"));
    let path = dir.join(name);

    atomic_write(&path, &document.bytes).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;

    info!("Wrote export to {:?}", path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::images::tests::png;
    use crate::storage::MemoryKeyValueStore;
    use crate::store::MomentStore;
    use tempfile::TempDir;

    fn count_marker(bytes: &[u8]) -> bool {
        String::from_utf8_lossy(bytes).contains("/Count")
    }

    #[test]
    fn test_empty_list_is_valid_document() {
        let doc = Exporter::default().export(&[]);
        assert!(doc.bytes.starts_with(b"%PDF"));
        assert_eq!(doc.page_count, 0);
        assert_eq!(doc.moment_count, 0);
        assert!(count_marker(&doc.bytes));
    }

    #[test]
    fn test_sunny_day_scenario() {
        let mut store = MomentStore::new(MemoryKeyValueStore::new(), "moments");
        let moment = store.add("Sunny day", Vec::new(), 0.8);

        assert_eq!(store.len(), 1);
        assert_eq!(moment.description, "Sunny day");
        assert_eq!(moment.emotion, 0.8);
        assert!(moment.images.is_empty());

        let doc = Exporter::default().export(&[moment]);
        assert_eq!(doc.page_count, 1);
        assert!(String::from_utf8_lossy(&doc.bytes).contains("/Count 1"));
    }

    #[test]
    fn test_page_count_per_moment() {
        let a = Moment::new("No photos", Vec::new(), 0.3);
        // Square photos scale to 512pt tall; two of them need two
        // continuation pages after the first page of B
        let b = Moment::new("Photos", vec![png(64, 64), png(64, 64)], 0.7);

        let exporter = Exporter::default();
        assert_eq!(exporter.export(&[a.clone()]).page_count, 1);

        let b_pages = exporter.export(&[b.clone()]).page_count;
        assert!(b_pages >= 2);
        assert_eq!(b_pages, 3);

        // Records never share pages
        assert_eq!(exporter.export(&[a, b]).page_count, 1 + b_pages);
    }

    #[test]
    fn test_images_are_embedded() {
        let moment = Moment::new("One photo", vec![png(32, 8)], 0.5);
        let doc = Exporter::default().export(&[moment]);
        let text = String::from_utf8_lossy(&doc.bytes);

        assert_eq!(doc.page_count, 1);
        assert!(text.contains("/DCTDecode"));
        assert!(text.contains("/Im0"));
    }

    #[test]
    fn test_undecodable_image_is_skipped() {
        let moment = Moment::new("Broken photo", vec![b"not an image".to_vec()], 0.5);
        let doc = Exporter::default().export(&[moment]);

        assert_eq!(doc.page_count, 1);
        assert!(!String::from_utf8_lossy(&doc.bytes).contains("/DCTDecode"));
    }

    #[test]
    fn test_export_does_not_reorder() {
        let older = Moment::new("older", Vec::new(), 0.5);
        let newer = Moment::new("newer", Vec::new(), 0.5);

        let forward = Exporter::default().export(&[older.clone(), newer.clone()]);
        let text = String::from_utf8_lossy(&forward.bytes).into_owned();
        assert!(text.find("(older)").unwrap() < text.find("(newer)").unwrap());

        let backward = Exporter::default().export(&[newer, older]);
        let text = String::from_utf8_lossy(&backward.bytes).into_owned();
        assert!(text.find("(newer)").unwrap() < text.find("(older)").unwrap());
    }

    #[test]
    fn test_huge_emotion_keeps_content_finite() {
        let moment = Moment::new("huge", Vec::new(), 1e39);
        let doc = Exporter::default().export(&[moment]);
        let text = String::from_utf8_lossy(&doc.bytes);

        assert_eq!(doc.page_count, 1);
        assert!(!text.contains("inf "));
        assert!(!text.contains("NaN"));
    }

    #[test]
    fn test_quality_is_clamped() {
        assert_eq!(Exporter::new(0).jpeg_quality, 1);
        assert_eq!(Exporter::new(200).jpeg_quality, 100);
    }

    #[tokio::test]
    async fn test_spawned_export_uses_snapshot() {
        let mut store = MomentStore::new(MemoryKeyValueStore::new(), "moments");
        store.add("first", Vec::new(), 0.5);

        let task = Exporter::default().spawn(store.snapshot());
        store.add("added after submission", Vec::new(), 0.5);
        store.add("and another", Vec::new(), 0.5);

        let doc = task.wait().await.unwrap();
        assert_eq!(doc.moment_count, 1);
        assert_eq!(doc.page_count, 1);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_write_export() {
        let temp_dir = TempDir::new().unwrap();
        let doc = Exporter::default().export(&[Moment::new("Saved", Vec::new(), 0.5)]);

        let path = write_export(temp_dir.path(), &doc).unwrap();

        assert!(path.starts_with(temp_dir.path()));
        assert_eq!(path.extension().unwrap(), "pdf");
        assert_eq!(std::fs::read(&path).unwrap(), doc.bytes);
    }

    #[test]
    fn test_write_export_failure() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let doc = Exporter::default().export(&[]);
        let err = write_export(&blocker, &doc).unwrap_err();
        assert!(matches!(err, ExportError::Write { .. }));
    }
}
