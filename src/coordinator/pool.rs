//! Per-target worker pool
//!
//! Spawns `concurrency` workers over one target's sealed queue and collects
//! their outcomes. Workers report on two channels: one record per request on
//! the outcome channel, and one completion signal each on the done channel.
//! A single `select!` loop drains both until every worker has signalled.

use crate::engine::HttpEngine;
use crate::output::console::ConsoleSink;
use crate::queue::SealedQueue;
use crate::request::BuiltRequest;
use crate::stats::{OutcomeCollection, OutcomeRecord};
use crate::worker::Worker;
use crate::Result;
use anyhow::{bail, Context};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::debug;

/// Everything one target's pool needs to run
pub struct TargetPool {
    /// Target position in the run (0-based)
    pub index: usize,
    /// Expected number of outcomes
    pub count: usize,
    /// Number of workers to spawn
    pub concurrency: usize,
    pub queue: Arc<SealedQueue<BuiltRequest>>,
    pub engine: Arc<dyn HttpEngine>,
    pub sink: Arc<ConsoleSink>,
    pub limiter: Option<Arc<Semaphore>>,
}

impl TargetPool {
    /// Run every worker to completion and return the collected outcomes
    ///
    /// Fails if a worker panics or if the number of outcomes differs from
    /// `count`.
    pub async fn run(self) -> Result<OutcomeCollection> {
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();

        let mut handles = Vec::with_capacity(self.concurrency);
        for id in 0..self.concurrency {
            let worker = Worker::new(
                id,
                self.queue.clone(),
                self.engine.clone(),
                self.sink.clone(),
                outcome_tx.clone(),
                done_tx.clone(),
            )
            .with_limiter(self.limiter.clone());
            handles.push(tokio::spawn(worker.run()));
        }
        // Channels close once the last worker drops its senders
        drop(outcome_tx);
        drop(done_tx);

        debug!(
            "Target {}: spawned {} worker(s) for {} request(s)",
            self.index + 1,
            self.concurrency,
            self.count
        );

        let mut records = OutcomeCollection::with_capacity(self.count);
        let mut workers_done = 0;
        while workers_done < self.concurrency {
            tokio::select! {
                biased;
                Some(record) = outcome_rx.recv() => self.store(&mut records, record)?,
                signal = done_rx.recv() => match signal {
                    Some(_) => workers_done += 1,
                    // Every worker is gone; a missing signal means one died
                    None => break,
                },
            }
        }

        while let Some(record) = outcome_rx.recv().await {
            self.store(&mut records, record)?;
        }

        for handle in handles {
            handle
                .await
                .with_context(|| format!("Worker of target {} panicked", self.index + 1))?;
        }

        if workers_done < self.concurrency {
            bail!(
                "Target {}: only {} of {} worker(s) signalled completion",
                self.index + 1,
                workers_done,
                self.concurrency
            );
        }

        if records.len() != self.count {
            bail!(
                "Target {}: collected {} outcome(s), expected {}",
                self.index + 1,
                records.len(),
                self.count
            );
        }

        debug!("Target {}: collected {} outcome(s)", self.index + 1, records.len());
        Ok(records)
    }

    fn store(&self, records: &mut OutcomeCollection, record: OutcomeRecord) -> Result<()> {
        if records.push(record).is_err() {
            bail!(
                "Target {}: received more than {} outcome(s)",
                self.index + 1,
                self.count
            );
        }
        Ok(())
    }
}
