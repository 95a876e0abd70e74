//! Photo acquisition
//!
//! Each requested photo is read on its own. A file that cannot be read is
//! reported and skipped; the rest of the batch still goes through.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::output::Output;

/// Read every path, keeping the bytes of the ones that load
pub fn load_photos(paths: &[PathBuf], output: &Output) -> Vec<Vec<u8>> {
    let mut loaded = Vec::with_capacity(paths.len());

    for path in paths {
        match fs::read(path) {
            Ok(bytes) => {
                debug!("Loaded photo {:?} ({} bytes)", path, bytes.len());
                loaded.push(bytes);
            }
            Err(e) => {
                warn!("Failed to read photo {:?}: {}", path, e);
                output.warning(&format!("Skipping photo {}: {}", path.display(), e));
            }
        }
    }

    loaded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use tempfile::TempDir;

    #[test]
    fn test_partial_failure_keeps_the_rest() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("first.jpg");
        let third = temp_dir.path().join("third.jpg");
        fs::write(&first, b"one").unwrap();
        fs::write(&third, b"three").unwrap();

        let paths = vec![first, temp_dir.path().join("missing.jpg"), third];
        let output = Output::new(OutputFormat::Quiet);

        let photos = load_photos(&paths, &output);
        assert_eq!(photos, vec![b"one".to_vec(), b"three".to_vec()]);
    }

    #[test]
    fn test_no_paths() {
        let output = Output::new(OutputFormat::Quiet);
        assert!(load_photos(&[], &output).is_empty());
    }
}
