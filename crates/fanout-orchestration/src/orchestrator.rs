//! Core orchestration: spawn, join, drain, verify.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, info, warn};

use fanout_core::constants::WORKER_THREAD_PREFIX;
use fanout_core::error::FanOutError;
use fanout_core::observer::WorkerObserver;
use fanout_core::observers::NoOpObserver;
use fanout_core::options::RunOptions;
use fanout_core::queue::{shared_queue, QueueProducer};
use fanout_core::worker::WorkerUnit;

use crate::interfaces::RunReport;

/// Longest index list quoted in a mismatch message.
const MAX_LISTED: usize = 16;

type WorkerHandle = (usize, JoinHandle<Result<(), FanOutError>>);

/// Run `n` workers with no observer and no timeout.
pub fn run(n: usize) -> Result<RunReport, FanOutError> {
    run_with_observer(&RunOptions::with_workers(n), Arc::new(NoOpObserver::new()))
}

/// Run a fan-out with the given options, notifying `observer` from each worker.
///
/// Every launched worker is joined before the queue is drained. With a
/// timeout set, workers that have not finished by the deadline fail the run
/// with `Timeout` and are left detached. The coordinator's own producer is
/// dropped before draining, so a worker that exits without pushing yields
/// `QueueDisconnected` rather than a hang.
pub fn run_with_observer(
    opts: &RunOptions,
    observer: Arc<dyn WorkerObserver>,
) -> Result<RunReport, FanOutError> {
    run_with_builder(opts, observer, worker_builder)
}

fn worker_builder(index: usize) -> thread::Builder {
    thread::Builder::new().name(format!("{WORKER_THREAD_PREFIX}{index}"))
}

fn run_with_builder<B>(
    opts: &RunOptions,
    observer: Arc<dyn WorkerObserver>,
    builder: B,
) -> Result<RunReport, FanOutError>
where
    B: Fn(usize) -> thread::Builder,
{
    let start = Instant::now();
    let n = opts.workers;
    let (producer, consumer) = shared_queue::<usize>();
    let (done_tx, done_rx) = unbounded();

    let handles = spawn_workers(n, &producer, &observer, &done_tx, builder)?;
    drop(producer);
    drop(done_tx);
    debug!(workers = n, "all workers launched");

    if let Some(timeout) = opts.drain_timeout {
        await_completion(&done_rx, n, timeout)?;
    }

    join_workers(handles)?;
    debug!(workers = n, queued = consumer.len(), "all workers joined");

    // Every worker has exited, so this never blocks.
    let results = consumer.drain(n, None)?;
    let duration = start.elapsed();
    info!(workers = n, ?duration, "fan-out complete");

    Ok(RunReport::new(n, results, duration))
}

/// Signals the coordinator when a worker thread exits, panicking or not.
struct CompletionGuard {
    index: usize,
    done: Sender<usize>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        let _ = self.done.send(self.index);
    }
}

fn spawn_workers<B>(
    n: usize,
    producer: &QueueProducer<usize>,
    observer: &Arc<dyn WorkerObserver>,
    done: &Sender<usize>,
    builder: B,
) -> Result<Vec<WorkerHandle>, FanOutError>
where
    B: Fn(usize) -> thread::Builder,
{
    // Grows as threads start; `n` can exceed what the OS will ever run.
    let mut handles = Vec::new();
    for unit in (0..n).map(WorkerUnit::new) {
        let producer = producer.clone();
        let observer = Arc::clone(observer);
        let guard = CompletionGuard {
            index: unit.index(),
            done: done.clone(),
        };

        let spawned = builder(unit.index()).spawn(move || {
            let _guard = guard;
            unit.execute(&producer, observer.as_ref())
        });

        match spawned {
            Ok(handle) => handles.push((unit.index(), handle)),
            Err(source) => {
                let index = unit.index();
                warn!(worker = index, error = %source, "failed to spawn worker");
                // Launched workers are still joined. Their own failures are
                // logged by `join_workers`; the spawn error is what surfaces.
                let _ = join_workers(handles);
                return Err(FanOutError::Spawn { index, source });
            }
        }
    }
    Ok(handles)
}

/// Wait until `n` workers have exited or `timeout` elapses.
fn await_completion(
    done: &Receiver<usize>,
    n: usize,
    timeout: Duration,
) -> Result<(), FanOutError> {
    let Some(deadline) = Instant::now().checked_add(timeout) else {
        return Ok(());
    };
    for finished in 0..n {
        match done.recv_deadline(deadline) {
            Ok(_) => {}
            Err(RecvTimeoutError::Timeout) => {
                warn!(finished, workers = n, ?timeout, "workers did not finish in time");
                return Err(FanOutError::Timeout {
                    timeout,
                    received: finished,
                    expected: n,
                });
            }
            // All guards dropped; join reports anything missing.
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    Ok(())
}

/// Join every handle, returning the first failure after all have finished.
fn join_workers(handles: Vec<WorkerHandle>) -> Result<(), FanOutError> {
    let mut first_error = None;
    for (index, handle) in handles {
        let outcome = handle.join().unwrap_or_else(|payload| {
            Err(FanOutError::WorkerPanicked {
                index,
                message: panic_message(payload.as_ref()),
            })
        });
        if let Err(e) = outcome {
            warn!(worker = index, error = %e, "worker failed");
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Check that a report holds every worker index exactly once.
///
/// Memory use is bounded by the number of collected values, not by the
/// worker count the report claims.
pub fn verify_report(report: &RunReport) -> Result<(), FanOutError> {
    let n = report.workers();
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for &value in report.results() {
        *counts.entry(value).or_default() += 1;
    }

    let missing: Vec<usize> = (0..n)
        .filter(|i| !counts.contains_key(i))
        .take(MAX_LISTED)
        .collect();
    let duplicated: Vec<usize> = counts
        .range(..n)
        .filter(|(_, &count)| count > 1)
        .map(|(&value, _)| value)
        .take(MAX_LISTED)
        .collect();
    let unexpected: Vec<usize> = counts
        .range(n..)
        .map(|(&value, _)| value)
        .take(MAX_LISTED)
        .collect();

    if report.results().len() == n && missing.is_empty() && unexpected.is_empty() {
        return Ok(());
    }

    Err(FanOutError::Mismatch(format!(
        "expected {n} values, got {} (missing {missing:?}, duplicated {duplicated:?}, unexpected {unexpected:?})",
        report.results().len()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use fanout_core::observer::{WorkerEvent, WorkerEventKind};
    use fanout_core::observers::ChannelObserver;

    #[test]
    fn run_zero_workers() {
        let report = run(0).unwrap();
        assert_eq!(report.workers(), 0);
        assert!(report.results().is_empty());
        assert!(verify_report(&report).is_ok());
    }

    #[test]
    fn run_single_worker() {
        let report = run(1).unwrap();
        assert_eq!(report.results(), &[0]);
    }

    #[test]
    fn run_five_workers_is_permutation() {
        let report = run(5).unwrap();
        assert_eq!(report.results().len(), 5);
        assert_eq!(report.sorted_results(), vec![0, 1, 2, 3, 4]);
        assert!(verify_report(&report).is_ok());
    }

    #[test]
    fn run_many_workers() {
        let report = run(64).unwrap();
        assert_eq!(report.sorted_results(), (0..64).collect::<Vec<_>>());
    }

    #[test]
    fn repeated_runs_hold_set_equality() {
        for _ in 0..10 {
            let report = run(8).unwrap();
            let set: HashSet<usize> = report.results().iter().copied().collect();
            assert_eq!(set, (0..8).collect::<HashSet<_>>());
        }
    }

    #[test]
    fn observer_sees_one_push_per_worker() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let observer = Arc::new(ChannelObserver::new(tx));
        let report = run_with_observer(&RunOptions::with_workers(6), observer).unwrap();
        assert_eq!(report.results().len(), 6);

        let pushed: Vec<WorkerEvent> = rx
            .try_iter()
            .filter(|e| e.kind == WorkerEventKind::Pushed)
            .collect();
        let mut indices: Vec<usize> = pushed.iter().map(|e| e.index).collect();
        indices.sort_unstable();
        assert_eq!(indices, (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn no_events_for_zero_workers() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let observer = Arc::new(ChannelObserver::new(tx));
        run_with_observer(&RunOptions::with_workers(0), observer).unwrap();
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn drain_timeout_does_not_fire_on_healthy_run() {
        let opts = RunOptions::with_workers(4).drain_timeout(Duration::from_secs(5));
        let report = run_with_observer(&opts, Arc::new(NoOpObserver::new())).unwrap();
        assert_eq!(report.sorted_results(), vec![0, 1, 2, 3]);
    }

    struct StallOnStart {
        target: usize,
        stall: Duration,
    }

    impl WorkerObserver for StallOnStart {
        fn on_started(&self, index: usize) {
            if index == self.target {
                thread::sleep(self.stall);
            }
        }

        fn on_pushed(&self, _index: usize) {}
    }

    #[test]
    fn stalled_worker_hits_timeout() {
        let observer = Arc::new(StallOnStart {
            target: 1,
            stall: Duration::from_secs(2),
        });
        let opts = RunOptions::with_workers(3).drain_timeout(Duration::from_millis(50));

        let start = Instant::now();
        let err = run_with_observer(&opts, observer).unwrap_err();
        assert!(start.elapsed() < Duration::from_secs(1));
        match err {
            FanOutError::Timeout {
                timeout,
                received,
                expected,
            } => {
                assert_eq!(timeout, Duration::from_millis(50));
                assert_eq!(expected, 3);
                assert!(received < 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn await_completion_counts_exits() {
        let (tx, rx) = unbounded();
        tx.send(0).unwrap();
        tx.send(1).unwrap();
        assert!(await_completion(&rx, 2, Duration::from_millis(20)).is_ok());

        tx.send(2).unwrap();
        let err = await_completion(&rx, 2, Duration::from_millis(20)).unwrap_err();
        assert!(matches!(
            err,
            FanOutError::Timeout {
                received: 1,
                expected: 2,
                ..
            }
        ));
    }

    #[test]
    fn unrepresentable_deadline_waits_on_join() {
        let opts = RunOptions::with_workers(2).drain_timeout(Duration::MAX);
        let report = run_with_observer(&opts, Arc::new(NoOpObserver::new())).unwrap();
        assert_eq!(report.sorted_results(), vec![0, 1]);
    }

    #[derive(Default)]
    struct Counting {
        started: AtomicUsize,
        pushed: AtomicUsize,
    }

    impl WorkerObserver for Counting {
        fn on_started(&self, _index: usize) {
            self.started.fetch_add(1, Ordering::Relaxed);
        }

        fn on_pushed(&self, _index: usize) {
            self.pushed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Builder whose threads can never get a stack from index `from` on.
    fn failing_from(from: usize) -> impl Fn(usize) -> thread::Builder {
        move |index| {
            let builder = worker_builder(index);
            if index >= from {
                builder.stack_size(usize::MAX >> 1)
            } else {
                builder
            }
        }
    }

    #[test]
    fn huge_worker_count_surfaces_spawn_error() {
        let observer = Arc::new(Counting::default());
        let opts = RunOptions::with_workers(usize::MAX);
        let err = run_with_builder(&opts, observer.clone(), failing_from(2)).unwrap_err();

        assert!(matches!(err, FanOutError::Spawn { index: 2, .. }));
        assert_eq!(err.exit_code(), 3);
        // The two launched workers were joined before the error returned.
        assert_eq!(observer.started.load(Ordering::Relaxed), 2);
        assert_eq!(observer.pushed.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn spawn_failure_on_first_worker() {
        let observer = Arc::new(Counting::default());
        let err = run_with_builder(&RunOptions::with_workers(3), observer.clone(), failing_from(0))
            .unwrap_err();
        assert!(matches!(err, FanOutError::Spawn { index: 0, .. }));
        assert_eq!(observer.started.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn spawn_failure_still_joins_panicking_workers() {
        let observer = Arc::new(PanicBeforePush {
            target: 0,
            started: AtomicUsize::new(0),
        });
        let err = run_with_builder(&RunOptions::with_workers(4), observer.clone(), failing_from(1))
            .unwrap_err();
        // The spawn error takes precedence over the joined worker's panic.
        assert!(matches!(err, FanOutError::Spawn { index: 1, .. }));
        assert_eq!(observer.started.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn default_builder_names_threads() {
        assert_eq!(
            worker_builder(3)
                .spawn(|| thread::current().name().map(str::to_string))
                .unwrap()
                .join()
                .unwrap()
                .as_deref(),
            Some("fanout-worker-3")
        );
    }

    struct PanicBeforePush {
        target: usize,
        started: AtomicUsize,
    }

    impl WorkerObserver for PanicBeforePush {
        fn on_started(&self, index: usize) {
            self.started.fetch_add(1, Ordering::Relaxed);
            assert!(index != self.target, "worker {index} refused to start");
        }

        fn on_pushed(&self, _index: usize) {}
    }

    #[test]
    fn panicking_worker_is_reported_after_join() {
        let observer = Arc::new(PanicBeforePush {
            target: 2,
            started: AtomicUsize::new(0),
        });
        let err = run_with_observer(&RunOptions::with_workers(4), observer.clone()).unwrap_err();
        match err {
            FanOutError::WorkerPanicked { index, message } => {
                assert_eq!(index, 2);
                assert!(message.contains("refused to start"));
            }
            other => panic!("unexpected error: {other}"),
        }
        // Every worker ran to completion before the error surfaced.
        assert_eq!(observer.started.load(Ordering::Relaxed), 4);
    }

    #[test]
    fn panic_message_variants() {
        let boxed: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(boxed.as_ref()), "static");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");
        let boxed: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(boxed.as_ref()), "non-string panic payload");
    }

    #[test]
    fn verify_detects_missing_value() {
        let report = RunReport::new(3, vec![0, 2], Duration::ZERO);
        let err = verify_report(&report).unwrap_err();
        assert!(matches!(err, FanOutError::Mismatch(ref msg) if msg.contains("missing [1]")));
    }

    #[test]
    fn verify_detects_duplicate() {
        let report = RunReport::new(3, vec![0, 1, 1], Duration::ZERO);
        let err = verify_report(&report).unwrap_err();
        assert!(matches!(err, FanOutError::Mismatch(ref msg) if msg.contains("duplicated [1]")));
    }

    #[test]
    fn verify_detects_out_of_range() {
        let report = RunReport::new(2, vec![0, 5], Duration::ZERO);
        let err = verify_report(&report).unwrap_err();
        assert!(matches!(err, FanOutError::Mismatch(ref msg) if msg.contains("unexpected [5]")));
    }

    #[test]
    fn verify_huge_claim_without_allocating() {
        let report = RunReport::new(usize::MAX, vec![0], Duration::ZERO);
        let err = verify_report(&report).unwrap_err();
        assert!(matches!(err, FanOutError::Mismatch(ref msg) if msg.contains("missing [1, 2,")));
    }

    #[test]
    fn verify_accepts_any_order() {
        let report = RunReport::new(4, vec![3, 1, 0, 2], Duration::ZERO);
        assert!(verify_report(&report).is_ok());
    }
}
