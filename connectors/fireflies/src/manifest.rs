use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("No local transcripts found in {0}")]
    DirectoryAbsent(PathBuf),
    #[error("Failed to read manifest directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One locally stored transcript eligible for remote deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub path: PathBuf,
    /// `None` when the record has no usable `id`.
    pub transcript_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
    /// Files that could not be read or parsed.
    pub rejected: Vec<PathBuf>,
}

impl Manifest {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn extract_transcript_id(record: &Value) -> Option<String> {
    record
        .get("id")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

fn is_transcript_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Reads every `*.json` record in `dir`, ordered by file name.
///
/// A missing directory is reported as [`ManifestError::DirectoryAbsent`]; an
/// existing empty one yields an empty manifest. Files that cannot be read or
/// are not JSON objects are logged and listed in [`Manifest::rejected`].
pub async fn load_manifest(dir: &Path) -> Result<Manifest, ManifestError> {
    let io_err = |source: io::Error| ManifestError::Io {
        path: dir.to_path_buf(),
        source,
    };

    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(ManifestError::DirectoryAbsent(dir.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ManifestError::DirectoryAbsent(dir.to_path_buf()))
        }
        Err(e) => return Err(io_err(e)),
    }

    let mut paths = Vec::new();
    let mut read_dir = tokio::fs::read_dir(dir).await.map_err(io_err)?;
    while let Some(entry) = read_dir.next_entry().await.map_err(io_err)? {
        let path = entry.path();
        let is_file = entry
            .file_type()
            .await
            .map(|ft| ft.is_file())
            .unwrap_or(false);
        if is_file && is_transcript_file(&path) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut manifest = Manifest::default();
    for path in paths {
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) => {
                warn!("Skipping unreadable transcript file {}: {}", path.display(), e);
                manifest.rejected.push(path);
                continue;
            }
        };

        let record: Value = match serde_json::from_slice(&bytes) {
            Ok(v @ Value::Object(_)) => v,
            Ok(_) => {
                warn!(
                    "Skipping transcript file {}: not a JSON object",
                    path.display()
                );
                manifest.rejected.push(path);
                continue;
            }
            Err(e) => {
                warn!("Skipping malformed transcript file {}: {}", path.display(), e);
                manifest.rejected.push(path);
                continue;
            }
        };

        let transcript_id = extract_transcript_id(&record);
        debug!("Found {} (id: {:?})", path.display(), transcript_id);
        manifest.entries.push(ManifestEntry {
            path,
            transcript_id,
        });
    }

    Ok(manifest)
}
