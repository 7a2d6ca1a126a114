//! Artifact Delivery
//!
//! Hands a finished export artifact to the filesystem. The core does not
//! retain the artifact afterward.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::ExportArtifact;

/// Resolve the delivery directory: `CITY_EXPORT_DIR` override, else the
/// platform download directory, else the current directory.
pub fn target_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CITY_EXPORT_DIR") {
        return PathBuf::from(dir);
    }
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Write the artifact payload to `<target_dir>/<filename>`.
pub fn deliver(artifact: &ExportArtifact, target_dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(target_dir)?;

    let path = target_dir.join(&artifact.filename);
    let mut file = File::create(&path)?;
    file.write_all(&artifact.payload)?;
    file.flush()?;

    log::info!(
        "Delivered {} artifact ({} bytes) to {}",
        artifact.format.as_str(),
        artifact.payload.len(),
        path.display()
    );
    Ok(path)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::export::ExportFormat;
    use tempfile::tempdir;

    #[test]
    fn test_deliver_writes_payload_bytes() {
        let dir = tempdir().unwrap();
        let artifact = ExportArtifact {
            format: ExportFormat::Csv,
            filename: "smart_city_all_2025-01-05.csv".to_string(),
            payload: b"module\ntraffic".to_vec(),
        };

        let path = deliver(&artifact, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("smart_city_all_2025-01-05.csv"));
        assert_eq!(fs::read(&path).unwrap(), artifact.payload);
    }

    #[test]
    fn test_deliver_creates_missing_target_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("exports");
        let artifact = ExportArtifact {
            format: ExportFormat::Pdf,
            filename: "smart_city_report_2025-01-05.pdf".to_string(),
            payload: vec![0x25, 0x50, 0x44, 0x46],
        };

        let path = deliver(&artifact, &nested).unwrap();
        assert!(path.exists());
    }
}
