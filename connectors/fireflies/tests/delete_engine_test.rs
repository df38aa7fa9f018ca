use async_trait::async_trait;
use fireflies_transcripts::{
    DeleteEngine, DeletionOutcome, FirefliesError, ManifestEntry, SkipReason, TranscriptDeleter,
};
use reqwest::StatusCode;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Deleter that records calls and tracks how many run at once.
#[derive(Default)]
struct MockDeleter {
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    failing: HashSet<String>,
    hanging: HashSet<String>,
    delay: Duration,
    cancel_after_first: Option<Arc<AtomicBool>>,
}

impl MockDeleter {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranscriptDeleter for MockDeleter {
    async fn delete_transcript(&self, transcript_id: &str) -> Result<(), FirefliesError> {
        self.calls.lock().unwrap().push(transcript_id.to_string());
        if let Some(flag) = &self.cancel_after_first {
            flag.store(true, Ordering::SeqCst);
        }

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if self.hanging.contains(transcript_id) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        } else if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(transcript_id) {
            return Err(FirefliesError::Http {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "internal error".to_string(),
            });
        }
        Ok(())
    }
}

fn entry(name: &str, id: Option<&str>) -> ManifestEntry {
    ManifestEntry {
        path: PathBuf::from(format!("transcripts/{}.json", name)),
        transcript_id: id.map(str::to_string),
    }
}

fn engine(deleter: &Arc<MockDeleter>, concurrency: usize) -> DeleteEngine<MockDeleter> {
    DeleteEngine::new(Arc::clone(deleter), concurrency, Duration::from_secs(5))
}

#[tokio::test]
async fn test_deleted_failed_and_skipped_are_aggregated() {
    let deleter = Arc::new(MockDeleter {
        failing: HashSet::from(["b".to_string()]),
        ..Default::default()
    });
    let cancelled = AtomicBool::new(false);

    let summary = engine(&deleter, 4)
        .run(
            vec![entry("one", Some("a")), entry("two", Some("b")), entry("three", None)],
            &cancelled,
        )
        .await;

    assert_eq!(summary.deleted(), 1);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.skipped(), 1);

    let mut calls = deleter.calls();
    calls.sort();
    assert_eq!(calls, vec!["a".to_string(), "b".to_string()]);

    assert_eq!(summary.reports[0].outcome, DeletionOutcome::Deleted);
    assert_eq!(summary.reports[1].transcript_id.as_deref(), Some("b"));
    match &summary.reports[1].outcome {
        DeletionOutcome::Failed(reason) => assert!(reason.contains("500"), "{}", reason),
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(
        summary.reports[2].path,
        PathBuf::from("transcripts/three.json")
    );
    assert_eq!(
        summary.reports[2].outcome,
        DeletionOutcome::Skipped(SkipReason::MissingIdentifier)
    );
}

#[tokio::test]
async fn test_every_eligible_entry_resolves_before_return() {
    let deleter = Arc::new(MockDeleter {
        delay: Duration::from_millis(20),
        ..Default::default()
    });
    let cancelled = AtomicBool::new(false);
    let entries: Vec<ManifestEntry> = (0..25)
        .map(|i| entry(&format!("t{}", i), Some(&format!("id-{}", i))))
        .collect();

    let summary = engine(&deleter, 100).run(entries, &cancelled).await;

    assert_eq!(deleter.calls().len(), 25);
    assert_eq!(summary.reports.len(), 25);
    assert_eq!(summary.deleted(), 25);
    assert_eq!(deleter.in_flight.load(Ordering::SeqCst), 0);
    for (i, report) in summary.reports.iter().enumerate() {
        assert_eq!(report.transcript_id, Some(format!("id-{}", i)));
    }
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let deleter = Arc::new(MockDeleter {
        delay: Duration::from_millis(25),
        ..Default::default()
    });
    let cancelled = AtomicBool::new(false);
    let entries: Vec<ManifestEntry> = (0..12)
        .map(|i| entry(&format!("t{}", i), Some(&format!("id-{}", i))))
        .collect();

    let summary = engine(&deleter, 3).run(entries, &cancelled).await;

    assert_eq!(summary.deleted(), 12);
    let max = deleter.max_in_flight.load(Ordering::SeqCst);
    assert!(max <= 3, "max in flight was {}", max);
    assert!(max >= 2, "calls never overlapped (max {})", max);
}

#[tokio::test]
async fn test_failure_does_not_affect_siblings() {
    let deleter = Arc::new(MockDeleter {
        failing: HashSet::from(["gone".to_string()]),
        delay: Duration::from_millis(10),
        ..Default::default()
    });
    let cancelled = AtomicBool::new(false);

    let summary = engine(&deleter, 2)
        .run(
            vec![
                entry("a", Some("gone")),
                entry("b", Some("x")),
                entry("c", Some("y")),
                entry("d", Some("z")),
            ],
            &cancelled,
        )
        .await;

    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.deleted(), 3);
    assert_eq!(deleter.calls().len(), 4);
}

#[tokio::test]
async fn test_timeout_is_reported_as_failure() {
    let deleter = Arc::new(MockDeleter {
        hanging: HashSet::from(["slow".to_string()]),
        ..Default::default()
    });
    let cancelled = AtomicBool::new(false);
    let engine = DeleteEngine::new(Arc::clone(&deleter), 4, Duration::from_millis(50));

    let summary = engine
        .run(
            vec![entry("slow", Some("slow")), entry("fast", Some("fast"))],
            &cancelled,
        )
        .await;

    match &summary.reports[0].outcome {
        DeletionOutcome::Failed(reason) => assert!(reason.contains("timed out"), "{}", reason),
        other => panic!("expected timeout failure, got {:?}", other),
    }
    assert_eq!(summary.reports[1].outcome, DeletionOutcome::Deleted);
}

#[tokio::test]
async fn test_cancellation_stops_new_calls() {
    let cancelled = Arc::new(AtomicBool::new(false));
    let deleter = Arc::new(MockDeleter {
        cancel_after_first: Some(Arc::clone(&cancelled)),
        ..Default::default()
    });

    let summary = engine(&deleter, 1)
        .run(
            vec![
                entry("a", Some("a")),
                entry("b", Some("b")),
                entry("c", None),
                entry("d", Some("d")),
            ],
            &cancelled,
        )
        .await;

    assert_eq!(deleter.calls(), vec!["a".to_string()]);
    assert_eq!(summary.reports[0].outcome, DeletionOutcome::Deleted);
    assert_eq!(
        summary.reports[1].outcome,
        DeletionOutcome::Skipped(SkipReason::Cancelled)
    );
    assert_eq!(
        summary.reports[2].outcome,
        DeletionOutcome::Skipped(SkipReason::MissingIdentifier)
    );
    assert_eq!(
        summary.reports[3].outcome,
        DeletionOutcome::Skipped(SkipReason::Cancelled)
    );
    assert!(!summary.has_failures());
}

#[tokio::test]
async fn test_empty_manifest_makes_no_calls() {
    let deleter = Arc::new(MockDeleter::default());
    let cancelled = AtomicBool::new(false);

    let summary = engine(&deleter, 4).run(Vec::new(), &cancelled).await;

    assert!(summary.reports.is_empty());
    assert!(deleter.calls().is_empty());
}
