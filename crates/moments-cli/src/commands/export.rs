//! Export command handler

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{error, warn};

use moments_core::{write_export, Config, Exporter, MomentStore};

use crate::output::{Output, OutputFormat};

/// Render all moments, newest first, and hand the PDF off
///
/// The render runs on a background worker over a snapshot. A failed file
/// write is reported and nothing is opened; there is no retry.
pub async fn export(
    store: &MomentStore,
    config: &Config,
    dir: Option<PathBuf>,
    open_after: bool,
    output: &Output,
) -> Result<()> {
    let exporter = Exporter::from_config(config);
    let task = exporter.spawn(store.newest_first());

    let document = task.wait().await.context("Failed to render export")?;

    let dir = dir.unwrap_or_else(|| config.resolved_export_dir());
    let path = match write_export(&dir, &document) {
        Ok(path) => path,
        Err(e) => {
            error!("Export hand-off failed: {}", e);
            return Err(e).context("Failed to save exported document");
        }
    };

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "path": path,
                    "pages": document.page_count,
                    "moments": document.moment_count,
                    "bytes": document.bytes.len(),
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", path.display());
        }
        OutputFormat::Human => {
            output.success(&format!(
                "Exported {} moment(s) on {} page(s) to {}",
                document.moment_count,
                document.page_count,
                path.display()
            ));
        }
    }

    if open_after {
        if let Err(e) = open::that(&path) {
            warn!("Failed to open {:?}: {}", path, e);
            output.warning(&format!("Could not open {}: {}", path.display(), e));
        }
    }

    Ok(())
}
