use futures::stream::{self, StreamExt};
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::client::TranscriptDeleter;
use crate::manifest::ManifestEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingIdentifier,
    Cancelled,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingIdentifier => write!(f, "missing transcript id"),
            SkipReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    Deleted,
    Failed(String),
    Skipped(SkipReason),
}

#[derive(Debug, Clone)]
pub struct DeletionReport {
    pub path: PathBuf,
    pub transcript_id: Option<String>,
    pub outcome: DeletionOutcome,
}

/// Per-file outcomes of a deletion run, in manifest order.
#[derive(Debug, Clone, Default)]
pub struct DeleteSummary {
    pub reports: Vec<DeletionReport>,
}

impl DeleteSummary {
    pub fn deleted(&self) -> usize {
        self.count(|o| matches!(o, DeletionOutcome::Deleted))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DeletionOutcome::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, DeletionOutcome::Skipped(_)))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, pred: impl Fn(&DeletionOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }
}

pub struct DeleteEngine<D: ?Sized> {
    deleter: Arc<D>,
    concurrency: usize,
    timeout: Duration,
}

impl<D: TranscriptDeleter + ?Sized> DeleteEngine<D> {
    pub fn new(deleter: Arc<D>, concurrency: usize, timeout: Duration) -> Self {
        Self {
            deleter,
            concurrency: concurrency.max(1),
            timeout,
        }
    }

    /// Deletes every entry with an id, at most `concurrency` at a time, and
    /// returns once all of them have resolved.
    ///
    /// Setting `cancelled` stops new calls from starting; entries that never
    /// started are reported as [`SkipReason::Cancelled`].
    pub async fn run(&self, entries: Vec<ManifestEntry>, cancelled: &AtomicBool) -> DeleteSummary {
        info!("Deleting {} transcripts...", entries.len());

        let mut indexed: Vec<(usize, DeletionReport)> =
            stream::iter(entries.into_iter().enumerate())
                .map(move |(index, entry)| async move {
                    (index, self.process(entry, cancelled).await)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        indexed.sort_by_key(|(index, _)| *index);
        let summary = DeleteSummary {
            reports: indexed.into_iter().map(|(_, report)| report).collect(),
        };

        info!(
            "Deletion run finished: deleted={}, failed={}, skipped={}",
            summary.deleted(),
            summary.failed(),
            summary.skipped()
        );

        summary
    }

    async fn process(&self, entry: ManifestEntry, cancelled: &AtomicBool) -> DeletionReport {
        let outcome = match entry.transcript_id.as_deref() {
            None => {
                error!(
                    "Failed to queue deletion: {} has no transcript id",
                    entry.path.display()
                );
                DeletionOutcome::Skipped(SkipReason::MissingIdentifier)
            }
            Some(id) if cancelled.load(Ordering::SeqCst) => {
                warn!("Deletion cancelled before deleting transcript {}", id);
                DeletionOutcome::Skipped(SkipReason::Cancelled)
            }
            Some(id) => {
                info!(
                    "Queueing deletion for transcript {} with ID {}",
                    entry.path.display(),
                    id
                );
                self.delete_one(id).await
            }
        };

        DeletionReport {
            path: entry.path,
            transcript_id: entry.transcript_id,
            outcome,
        }
    }

    async fn delete_one(&self, transcript_id: &str) -> DeletionOutcome {
        info!("Deleting transcript with ID: {}", transcript_id);

        let call = self.deleter.delete_transcript(transcript_id);

        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(())) => {
                info!("Deleted transcript with ID: {}", transcript_id);
                DeletionOutcome::Deleted
            }
            Ok(Err(e)) => {
                error!("Failed to delete transcript: {} - {}", transcript_id, e);
                DeletionOutcome::Failed(e.to_string())
            }
            Err(_) => {
                let reason = format!("timed out after {:?}", self.timeout);
                error!("Failed to delete transcript: {} - {}", transcript_id, reason);
                DeletionOutcome::Failed(reason)
            }
        }
    }
}
