//! Worker implementation
//!
//! A worker is one concurrent execution unit of a target's pool. It drains
//! the target's sealed queue until it is closed, executing each request on
//! the shared engine and emitting exactly one [`OutcomeRecord`] per request.
//!
//! # Lifecycle
//!
//! 1. **Admission**: acquire a permit of the global worker ceiling, if any
//! 2. **Execution**: dequeue, execute, report, emit, until the queue closes
//! 3. **Completion**: send one [`WorkerDone`] signal and end
//!
//! Transport failures are data, not errors: they land in the record and the
//! worker moves on to the next request.

use crate::engine::HttpEngine;
use crate::output::console::ConsoleSink;
use crate::queue::SealedQueue;
use crate::request::BuiltRequest;
use crate::stats::OutcomeRecord;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, warn};

/// Completion signal, sent once per worker after its queue is exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerDone {
    pub worker_id: usize,
    /// Requests this worker executed
    pub executed: usize,
}

/// One worker of a target pool
pub struct Worker {
    /// Worker ID within its pool
    id: usize,

    /// Target's pre-built request set
    queue: Arc<SealedQueue<BuiltRequest>>,

    /// Shared per-target engine
    engine: Arc<dyn HttpEngine>,

    /// Shared console output
    sink: Arc<ConsoleSink>,

    outcome_tx: mpsc::UnboundedSender<OutcomeRecord>,
    done_tx: mpsc::UnboundedSender<WorkerDone>,

    /// Global ceiling on concurrently running workers
    limiter: Option<Arc<Semaphore>>,
}

impl Worker {
    pub fn new(
        id: usize,
        queue: Arc<SealedQueue<BuiltRequest>>,
        engine: Arc<dyn HttpEngine>,
        sink: Arc<ConsoleSink>,
        outcome_tx: mpsc::UnboundedSender<OutcomeRecord>,
        done_tx: mpsc::UnboundedSender<WorkerDone>,
    ) -> Self {
        Self {
            id,
            queue,
            engine,
            sink,
            outcome_tx,
            done_tx,
            limiter: None,
        }
    }

    /// Hold a permit of `limiter` while running
    pub fn with_limiter(mut self, limiter: Option<Arc<Semaphore>>) -> Self {
        self.limiter = limiter;
        self
    }

    /// Drain the queue, then signal completion
    pub async fn run(self) {
        // A closed semaphore never happens here; run unthrottled if it does
        let _permit = match self.limiter {
            Some(ref limiter) => limiter.clone().acquire_owned().await.ok(),
            None => None,
        };

        let mut executed = 0;
        while let Some(request) = self.queue.pop().await {
            let record = self.execute(&request).await;
            executed += 1;

            if self.outcome_tx.send(record).is_err() {
                warn!("Worker {}: outcome receiver dropped, stopping", self.id);
                break;
            }
        }

        debug!("Worker {} finished after {} request(s)", self.id, executed);
        let _ = self.done_tx.send(WorkerDone {
            worker_id: self.id,
            executed,
        });
    }

    async fn execute(&self, request: &BuiltRequest) -> OutcomeRecord {
        let start_time = Utc::now();
        let started = Instant::now();

        let exchange = self.engine.execute(request).await;
        let duration = started.elapsed();

        let record = OutcomeRecord::new(
            exchange.proto.clone(),
            request.url.as_str(),
            request.method.as_str(),
            start_time,
            duration,
            exchange.status,
            exchange.bytes,
            exchange.error.clone(),
        );

        self.sink.report(request, &record, &exchange);
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetSpec;
    use crate::engine::mock::MockEngine;
    use crate::queue::build_target_queue;
    use crate::request::pattern::LiteralUrlGenerator;

    fn quiet_sink() -> Arc<ConsoleSink> {
        Arc::new(ConsoleSink::with_writer(Box::new(std::io::sink()), true, false))
    }

    fn queue(count: usize) -> Arc<SealedQueue<BuiltRequest>> {
        let mut target = TargetSpec::new("http://localhost/w");
        target.count = count;
        Arc::new(build_target_queue(&target, &mut LiteralUrlGenerator).unwrap())
    }

    #[tokio::test]
    async fn test_worker_drains_queue() {
        let engine = MockEngine::new();
        engine.set_bytes(10);
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();

        let worker = Worker::new(
            3,
            queue(4),
            Arc::new(engine.clone()),
            quiet_sink(),
            outcome_tx,
            done_tx,
        );
        worker.run().await;

        let mut records = Vec::new();
        while let Ok(record) = outcome_rx.try_recv() {
            records.push(record);
        }
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.status_code == 200 && r.data_transferred == 10));
        assert!(records.iter().all(|r| r.end_time >= r.start_time));
        assert_eq!(records[0].method, "GET");
        assert_eq!(records[0].url, "http://localhost/w");

        assert_eq!(
            done_rx.try_recv().unwrap(),
            WorkerDone {
                worker_id: 3,
                executed: 4
            }
        );
        assert!(done_rx.try_recv().is_err());
        assert_eq!(engine.call_count(), 4);
    }

    #[tokio::test]
    async fn test_worker_captures_failures() {
        let engine = MockEngine::new();
        engine.set_should_fail(true);
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
        let (done_tx, _done_rx) = mpsc::unbounded_channel();

        Worker::new(0, queue(2), Arc::new(engine), quiet_sink(), outcome_tx, done_tx)
            .run()
            .await;

        let first = outcome_rx.try_recv().unwrap();
        let second = outcome_rx.try_recv().unwrap();
        assert!(first.is_error() && second.is_error());
        assert_eq!(first.status_code, 0);
    }

    #[tokio::test]
    async fn test_worker_signals_done_on_empty_queue() {
        let empty: Arc<SealedQueue<BuiltRequest>> = Arc::new(SealedQueue::new(1));
        empty.seal();
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();

        Worker::new(0, empty, Arc::new(MockEngine::new()), quiet_sink(), outcome_tx, done_tx)
            .run()
            .await;

        assert!(outcome_rx.try_recv().is_err());
        assert_eq!(done_rx.try_recv().unwrap().executed, 0);
    }
}
