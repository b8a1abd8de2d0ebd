//! Coordinator module
//!
//! Orchestrates a whole run: validates the configuration, builds every
//! target's request set, runs one worker pool per target in parallel, and
//! aggregates the outcomes into per-target and global summaries.
//!
//! All request sets are built before any pool starts, so a build failure on
//! any target aborts the run before a single request is sent.

pub mod pool;

use crate::config::validator::validate_config;
use crate::config::{RunConfig, TargetSpec};
use crate::engine::http::ReqwestEngineFactory;
use crate::engine::EngineFactory;
use crate::output::console::ConsoleSink;
use crate::queue::build_target_queue;
use crate::request::pattern::{RegexUrlGenerator, UrlGenerator};
use crate::stats::aggregator::{summarize, Summary};
use crate::stats::OutcomeRecord;
use crate::Result;
use anyhow::Context;
use pool::TargetPool;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info};

/// Outcomes and summary of one target
#[derive(Debug, Clone)]
pub struct TargetReport {
    /// Target position in the run (0-based)
    pub index: usize,
    pub spec: TargetSpec,
    /// Outcomes in arrival order
    pub records: Vec<OutcomeRecord>,
    pub summary: Summary,
}

/// Outcomes and summaries of a whole run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Per-target reports, in configured order
    pub targets: Vec<TargetReport>,
    /// Every record, target by target in configured order
    pub global_records: Vec<OutcomeRecord>,
    pub global_summary: Summary,
}

impl RunReport {
    /// Summarize each target and the concatenation of all of them
    pub fn from_targets(targets: Vec<(TargetSpec, Vec<OutcomeRecord>)>) -> Result<Self> {
        let mut reports = Vec::with_capacity(targets.len());
        let mut global_records = Vec::with_capacity(targets.iter().map(|(_, r)| r.len()).sum());

        for (index, (spec, records)) in targets.into_iter().enumerate() {
            let summary = summarize(&records)?;
            global_records.extend(records.iter().cloned());
            reports.push(TargetReport {
                index,
                spec,
                records,
                summary,
            });
        }

        let global_summary = summarize(&global_records)?;
        Ok(Self {
            targets: reports,
            global_records,
            global_summary,
        })
    }
}

/// Top-level run orchestration
pub struct StressRunner {
    config: Arc<RunConfig>,
    engines: Arc<dyn EngineFactory>,
    urls: Box<dyn UrlGenerator>,
    sink: Arc<ConsoleSink>,
}

impl StressRunner {
    /// Runner with the reqwest engine, entropy-seeded URL patterns and stdout
    pub fn new(config: RunConfig) -> Self {
        let sink = Arc::new(ConsoleSink::for_config(&config));
        Self {
            config: Arc::new(config),
            engines: Arc::new(ReqwestEngineFactory),
            urls: Box::new(RegexUrlGenerator::new()),
            sink,
        }
    }

    pub fn with_engine_factory(mut self, engines: Arc<dyn EngineFactory>) -> Self {
        self.engines = engines;
        self
    }

    pub fn with_url_generator(mut self, urls: Box<dyn UrlGenerator>) -> Self {
        self.urls = urls;
        self
    }

    pub fn with_sink(mut self, sink: Arc<ConsoleSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Execute the run
    pub async fn run(mut self) -> Result<RunReport> {
        validate_config(&self.config).context("Configuration validation failed")?;

        let mut queues = Vec::with_capacity(self.config.targets.len());
        for (index, target) in self.config.targets.iter().enumerate() {
            let queue = build_target_queue(target, self.urls.as_mut()).with_context(|| {
                format!("Failed to build requests for target {} ({})", index + 1, target.url)
            })?;
            queues.push(Arc::new(queue));
        }
        debug!("Built {} request set(s)", queues.len());

        let mut engines = Vec::with_capacity(self.config.targets.len());
        for target in &self.config.targets {
            engines.push(self.engines.engine_for(target, &self.config)?);
        }

        self.sink.announce(&self.config);

        let limiter = self
            .config
            .max_workers
            .map(|max| Arc::new(Semaphore::new(max)));

        let mut handles = Vec::with_capacity(queues.len());
        for (index, (queue, engine)) in queues.into_iter().zip(engines).enumerate() {
            let target = &self.config.targets[index];
            let pool = TargetPool {
                index,
                count: target.count,
                concurrency: target.concurrency,
                queue,
                engine,
                sink: self.sink.clone(),
                limiter: limiter.clone(),
            };
            handles.push(tokio::spawn(pool.run()));
        }

        let mut collected = Vec::with_capacity(handles.len());
        for (index, handle) in handles.into_iter().enumerate() {
            let records = handle
                .await
                .with_context(|| format!("Pool of target {} panicked", index + 1))??;
            collected.push((self.config.targets[index].clone(), records.into_vec()));
        }

        let report = RunReport::from_targets(collected)?;
        info!(
            "Run finished: {} request(s), {} error(s)",
            report.global_summary.total, report.global_summary.error_count
        );
        Ok(report)
    }
}
