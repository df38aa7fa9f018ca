use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

use crate::client::FirefliesClient;
use crate::config::FirefliesConfig;
use crate::delete::{DeleteEngine, DeleteSummary};
use crate::manifest::load_manifest;
use crate::storage::TranscriptStore;

pub struct TranscriptManager {
    config: FirefliesConfig,
    client: Arc<FirefliesClient>,
}

impl TranscriptManager {
    pub fn new(config: FirefliesConfig) -> Result<Self> {
        let client = FirefliesClient::new(&config).context("Failed to build Fireflies client")?;
        Ok(Self {
            config,
            client: Arc::new(client),
        })
    }

    /// Downloads every transcript and writes it under the output directory.
    pub async fn fetch(&self) -> Result<Vec<PathBuf>> {
        let transcripts = self
            .client
            .fetch_all_transcripts()
            .await
            .context("Failed to fetch data")?;
        info!("Fetched {} transcripts", transcripts.len());

        let store = TranscriptStore::new(
            &self.config.output_dir,
            self.config.include_id_in_filename,
        );
        let written = store.save_all(&transcripts).await.with_context(|| {
            format!("Failed to save transcripts to {}", store.dir().display())
        })?;

        Ok(written)
    }

    /// Deletes, on the remote side, every transcript stored locally.
    pub async fn delete(&self, cancelled: &AtomicBool) -> Result<DeleteSummary> {
        let manifest = load_manifest(&self.config.output_dir).await?;
        if !manifest.rejected.is_empty() {
            warn!(
                "Ignoring {} unreadable transcript file(s) in {}",
                manifest.rejected.len(),
                self.config.output_dir.display()
            );
        }

        let engine = DeleteEngine::new(
            Arc::clone(&self.client),
            self.config.delete_concurrency,
            self.config.request_timeout,
        );
        Ok(engine.run(manifest.entries, cancelled).await)
    }
}
