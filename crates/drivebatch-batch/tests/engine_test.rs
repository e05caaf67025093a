//! Behavioural tests for the batch engine

use drivebatch_batch::{
    BatchConfig, BatchEngine, CancellationToken, FailFastMode, ProgressCallback, ProgressEvent,
};
use drivebatch_core::Error;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("id-{i}")).collect()
}

/// Operation that sleeps a little (longer for low indexes, so completion
/// order differs from dispatch order) and fails for the listed indexes.
fn scripted(
    failing: &[usize],
) -> impl Fn(drivebatch_batch::ItemContext, String) -> std::pin::Pin<
    Box<dyn std::future::Future<Output = drivebatch_core::Result<String>> + Send>,
> + Send
+ Sync
+ 'static {
    let failing: HashSet<usize> = failing.iter().copied().collect();
    move |ctx, id| {
        let fail = failing.contains(&ctx.index);
        Box::pin(async move {
            let delay = 2 + (ctx.total.saturating_sub(ctx.index) % 5) as u64;
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if fail {
                Err(Error::remote(500, format!("cannot process {id}")))
            } else {
                Ok(id)
            }
        })
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn all_items_succeed_regardless_of_policy() {
    for n in [0, 1, 7, 25] {
        for continue_on_error in [true, false] {
            let engine = BatchEngine::new(
                BatchConfig::builder()
                    .workers(4)
                    .continue_on_error(continue_on_error)
                    .build(),
            );
            let outcome = engine.run(ids(n), scripted(&[])).await;

            assert!(outcome.error.is_none());
            assert_eq!(outcome.report.total_count, n);
            assert_eq!(outcome.report.success_count, n);
            assert_eq!(outcome.report.failed_count, 0);

            let indexes: HashSet<_> = outcome.report.successes.iter().map(|s| s.index).collect();
            assert_eq!(indexes, (0..n).collect());
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn continue_on_error_records_every_failure_once() {
    let failing = [0, 3, 4, 11, 19];
    let engine = BatchEngine::new(
        BatchConfig::builder()
            .workers(6)
            .continue_on_error(true)
            .build(),
    );
    let outcome = engine.run(ids(20), scripted(&failing)).await;

    assert!(outcome.error.is_none());
    let report = &outcome.report;
    assert_eq!(report.success_count + report.failed_count, 20);
    assert_eq!(report.failed_count, failing.len());

    let mut failed: Vec<_> = report.errors.iter().map(|e| e.index).collect();
    failed.sort_unstable();
    assert_eq!(failed, failing.to_vec());

    for err in &report.errors {
        assert_eq!(err.identifier, format!("id-{}", err.index));
        assert!(err.message.contains("cannot process"));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn fail_fast_returns_early_with_error() {
    let engine = BatchEngine::new(BatchConfig::builder().workers(3).build());
    let outcome = engine.run(ids(30), scripted(&[5])).await;

    let err = outcome.error.expect("fail-fast must surface the item error");
    assert!(err.to_string().contains("cannot process id-5"));

    let report = &outcome.report;
    assert!(report.success_count + report.failed_count <= 30);
    assert_eq!(report.failed_count, 1);
    assert_eq!(report.errors[0].index, 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn delete_scenario_third_item_fails() {
    let engine = BatchEngine::new(
        BatchConfig::builder()
            .workers(3)
            .continue_on_error(true)
            .build(),
    );
    let outcome = engine.run(ids(5), scripted(&[2])).await;

    assert!(outcome.error.is_none());
    assert_eq!(outcome.report.total_count, 5);
    assert_eq!(outcome.report.success_count, 4);
    assert_eq!(outcome.report.failed_count, 1);
    assert_eq!(outcome.report.errors[0].index, 2);
}

async fn peak_concurrency(requested: i64, items: usize) -> usize {
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let engine = BatchEngine::new(
        BatchConfig::builder()
            .workers(requested)
            .continue_on_error(true)
            .build(),
    );

    let (a, p) = (active.clone(), peak.clone());
    let outcome = engine
        .run(ids(items), move |_ctx, id: String| {
            let (a, p) = (a.clone(), p.clone());
            async move {
                let now = a.fetch_add(1, Ordering::SeqCst) + 1;
                p.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(15)).await;
                a.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, Error>(id)
            }
        })
        .await;
    assert_eq!(outcome.report.success_count, items);

    peak.load(Ordering::SeqCst)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn worker_count_is_clamped() {
    assert_eq!(peak_concurrency(0, 6).await, 1);
    assert_eq!(peak_concurrency(-3, 6).await, 1);

    let capped = peak_concurrency(50, 40).await;
    assert!((2..=10).contains(&capped), "peak {}", capped);

    let three = peak_concurrency(3, 12).await;
    assert!((1..=3).contains(&three), "peak {}", three);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn progress_is_monotonic_and_ends_at_total() {
    for throttle in [true, false] {
        let seen: Arc<Mutex<Vec<(usize, usize)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback: ProgressCallback = Arc::new(move |event: &ProgressEvent<'_>| {
            sink.lock().push((event.completed, event.total));
        });

        let engine = BatchEngine::new(
            BatchConfig::builder()
                .workers(5)
                .continue_on_error(true)
                .throttle_progress(throttle)
                .progress(callback)
                .build(),
        );
        engine.run(ids(37), scripted(&[4, 9])).await;

        let seen = seen.lock();
        assert!(!seen.is_empty());
        assert!(seen.windows(2).all(|w| w[0].0 <= w[1].0));
        assert_eq!(*seen.last().unwrap(), (37, 37));
        if !throttle {
            assert_eq!(seen.len(), 37);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn progress_reports_failure_details() {
    let failures: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = failures.clone();
    let callback: ProgressCallback = Arc::new(move |event: &ProgressEvent<'_>| {
        if !event.success {
            let message = event.error.map(|e| e.to_string()).unwrap_or_default();
            sink.lock().push(format!("{}: {}", event.label, message));
        }
    });

    let engine = BatchEngine::new(
        BatchConfig::builder()
            .workers(2)
            .continue_on_error(true)
            .throttle_progress(false)
            .progress(callback)
            .build(),
    );
    engine.run(ids(4), scripted(&[1])).await;

    assert_eq!(
        *failures.lock(),
        vec!["id-1: Remote error (500): cannot process id-1".to_string()]
    );
}

fn counting(calls: Arc<AtomicUsize>, failing: usize) -> impl Fn(drivebatch_batch::ItemContext, String) -> std::pin::Pin<
    Box<dyn std::future::Future<Output = drivebatch_core::Result<String>> + Send>,
> + Send
+ Sync
+ 'static {
    move |ctx, id| {
        let calls = calls.clone();
        Box::pin(async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            if ctx.index == failing {
                Err(Error::other("boom"))
            } else {
                Ok(id)
            }
        })
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn detached_fail_fast_leaves_work_running() {
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = BatchEngine::new(BatchConfig::builder().workers(1).build());
    let outcome = engine.run(ids(10), counting(calls.clone(), 2)).await;

    assert!(outcome.error.is_some());
    assert_eq!(outcome.report.success_count, 2);
    assert_eq!(outcome.report.failed_count, 1);

    // The worker keeps draining the queue after the collector returned.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while calls.load(Ordering::SeqCst) < 10 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(calls.load(Ordering::SeqCst), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancelling_fail_fast_stops_dispatch() {
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = BatchEngine::new(
        BatchConfig::builder()
            .workers(1)
            .fail_fast(FailFastMode::Cancel)
            .build(),
    );
    let outcome = engine.run(ids(10), counting(calls.clone(), 2)).await;

    assert!(outcome.error.is_some());
    let started = calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(50)).await;

    // The worker may have picked up one more item before observing the
    // cancellation; nothing is dispatched after that, and everything that
    // started is accounted for.
    assert_eq!(calls.load(Ordering::SeqCst), started);
    assert!(started <= 4, "started {}", started);
    assert_eq!(
        outcome.report.success_count + outcome.report.failed_count,
        started
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn caller_cancellation_stops_batch() {
    let token = CancellationToken::new();
    let engine = BatchEngine::new(
        BatchConfig::builder()
            .workers(2)
            .continue_on_error(true)
            .cancel_token(token.clone())
            .build(),
    );

    let trigger = token.clone();
    let outcome = engine
        .run(ids(50), move |ctx, id: String| {
            let trigger = trigger.clone();
            async move {
                if ctx.index == 3 {
                    trigger.cancel();
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok::<_, Error>(id)
            }
        })
        .await;

    assert!(matches!(outcome.error, Some(Error::Cancelled { .. })));
    assert!(!outcome.report.is_complete());
    assert!(outcome.report.success_count < 50);
}
