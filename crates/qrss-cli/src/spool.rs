//! Spool directory writer.
//!
//! Layout:
//!
//! ```text
//! <spool>/<label>/<label>--<timestamp>.png   one file per session
//! <spool>/<label>.png                        most recent session
//! ```
//!
//! Both files are written to a temporary file in the destination directory
//! and renamed into place, so readers never see a partial image.

use std::io::Write;
use std::path::{Path, PathBuf};

use qrss_spec::Band;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors from writing into the spool.
#[derive(Debug, Error)]
pub enum SpoolError {
    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where one session's image ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpoolEntry {
    pub session_path: PathBuf,
    pub latest_path: PathBuf,
    /// BLAKE3 hash of the PNG bytes.
    pub hash: String,
    pub bytes: usize,
}

/// Atomically replace `path` with `data`.
fn replace_file(path: &Path, data: &[u8]) -> Result<(), SpoolError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let write_err = |source| SpoolError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(data).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Store a session image and make it the band's latest.
pub fn write_session_image(
    spool: &Path,
    band: &Band,
    timestamp: &str,
    png: &[u8],
    hash: String,
) -> Result<SpoolEntry, SpoolError> {
    let dir = band.output_dir(spool);
    std::fs::create_dir_all(&dir).map_err(|source| SpoolError::CreateDir {
        path: dir.clone(),
        source,
    })?;

    let session_path = band.session_path(spool, timestamp);
    replace_file(&session_path, png)?;

    let latest_path = band.latest_path(spool);
    replace_file(&latest_path, png)?;

    tracing::info!(
        band = %band.label,
        path = %session_path.display(),
        bytes = png.len(),
        "wrote image"
    );

    Ok(SpoolEntry {
        session_path,
        latest_path,
        hash,
        bytes: png.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn band(label: &str) -> Band {
        Band {
            label: label.to_string(),
            host: "localhost".to_string(),
            base_hz: 7_039_000,
            center_hz: 850,
            bandwidth_hz: 300,
        }
    }

    #[test]
    fn test_layout_and_latest_replacement() {
        let spool = tempfile::tempdir().unwrap();
        let b = band("W6REK-40m");

        let first = write_session_image(spool.path(), &b, "2024-01-02--03-04-00", b"one", "h1".into())
            .unwrap();
        assert_eq!(
            first.session_path,
            spool.path().join("W6REK-40m/W6REK-40m--2024-01-02--03-04-00.png")
        );
        assert_eq!(first.latest_path, spool.path().join("W6REK-40m.png"));

        write_session_image(spool.path(), &b, "2024-01-02--03-05-00", b"two", "h2".into()).unwrap();
        assert_eq!(std::fs::read(&first.session_path).unwrap(), b"one");
        assert_eq!(std::fs::read(&first.latest_path).unwrap(), b"two");

        // No temporary files left behind.
        let names: Vec<_> = std::fs::read_dir(spool.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_unwritable_spool_is_an_error() {
        let spool = tempfile::tempdir().unwrap();
        // A regular file where the spool directory should be.
        let blocker = spool.path().join("blocked");
        std::fs::write(&blocker, b"").unwrap();

        let err = write_session_image(&blocker, &band("x"), "t", b"png", String::new()).unwrap_err();
        assert!(matches!(err, SpoolError::CreateDir { .. }));
    }
}
