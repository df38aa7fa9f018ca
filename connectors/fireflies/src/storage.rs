use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use shared::slugify;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::Transcript;

const UNDATED: &str = "undated";

/// Deterministic file name: `{date}_{slug}[_{id}].json`.
pub fn transcript_filename(transcript: &Transcript, include_id: bool) -> String {
    let date = transcript
        .date
        .as_ref()
        .and_then(|d| d.to_datetime())
        .map(|dt| format!("{:04}-{:02}-{:02}", dt.year(), dt.month() as u8, dt.day()))
        .unwrap_or_else(|| UNDATED.to_string());

    let title = slugify(transcript.title.as_deref().unwrap_or(""));

    if include_id {
        format!("{}_{}_{}.json", date, title, sanitize_id(&transcript.id))
    } else {
        format!("{}_{}.json", date, title)
    }
}

fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn to_pretty_json(transcript: &Transcript) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    transcript.serialize(&mut serializer)?;
    Ok(buf)
}

pub struct TranscriptStore {
    dir: PathBuf,
    include_id_in_filename: bool,
}

impl TranscriptStore {
    pub fn new(dir: impl Into<PathBuf>, include_id_in_filename: bool) -> Self {
        Self {
            dir: dir.into(),
            include_id_in_filename,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes one file per transcript and returns the written paths in order.
    pub async fn save_all(&self, transcripts: &[Transcript]) -> io::Result<Vec<PathBuf>> {
        if transcripts.is_empty() {
            return Ok(Vec::new());
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        info!("Saving transcripts to {}...", self.dir.display());

        let mut written = Vec::with_capacity(transcripts.len());
        for transcript in transcripts {
            let path = self
                .dir
                .join(transcript_filename(transcript, self.include_id_in_filename));
            let bytes = to_pretty_json(transcript).map_err(io::Error::from)?;

            tokio::fs::write(&path, bytes).await?;
            info!("Transcript saved: {}", path.display());
            written.push(path);
        }

        Ok(written)
    }
}
