use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::AppError;
use crate::es::mapping::IndexSchema;
use crate::es::provision::ensure_index;
use crate::prompt::RecreateDecision;
use crate::sink::{BulkSummary, IndexSink};
use crate::source::PositionSource;

/// Number of cycles run since startup. Clones share the same count.
#[derive(Debug, Clone, Default)]
pub struct CycleCounter(Arc<AtomicU64>);

impl CycleCounter {
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    fn increment(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// What happened in a single cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Source produced nothing; no write was attempted.
    Empty,
    Written(BulkSummary),
    FetchFailed,
    WriteFailed,
}

/// Timer-driven fetch, transform and bulk-write.
///
/// The next cycle is scheduled only once the current one has finished, so
/// cycles never overlap and a slow cycle delays every later one.
pub struct IngestLoop<S> {
    source: S,
    sink: Arc<dyn IndexSink>,
    index_name: String,
    interval: Duration,
    counter: CycleCounter,
}

impl<S: PositionSource> IngestLoop<S> {
    pub fn new(
        source: S,
        sink: Arc<dyn IndexSink>,
        index_name: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            sink,
            index_name: index_name.into(),
            interval,
            counter: CycleCounter::default(),
        }
    }

    pub fn counter(&self) -> CycleCounter {
        self.counter.clone()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs until the process is terminated.
    pub async fn run(self) {
        tracing::info!(
            "Polling every {}ms into index '{}'",
            self.interval.as_millis(),
            self.index_name
        );
        loop {
            self.run_cycle().await;
            tokio::time::sleep(self.interval).await;
        }
    }

    /// One cycle. Errors are logged here and never escape.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let tick = self.counter.get();
        tracing::info!("[{tick}] cycle started at {}", Utc::now().to_rfc3339());

        let outcome = match self.source.fetch().await {
            Ok(records) if records.is_empty() => {
                tracing::debug!("[{tick}] no records");
                CycleOutcome::Empty
            }
            Ok(records) => self.write(tick, records).await,
            Err(e) => {
                tracing::error!("[{tick}] {e}");
                CycleOutcome::FetchFailed
            }
        };

        self.counter.increment();
        outcome
    }

    async fn write(&self, tick: u64, records: Vec<S::Record>) -> CycleOutcome {
        let mut documents: Vec<Value> = Vec::with_capacity(records.len());
        for record in records {
            match serde_json::to_value(self.source.transform(record)) {
                Ok(doc) => documents.push(doc),
                Err(e) => tracing::error!("[{tick}] failed to serialize document: {e}"),
            }
        }

        if documents.is_empty() {
            return CycleOutcome::Empty;
        }

        let count = documents.len();
        match self.sink.bulk_write(&self.index_name, documents).await {
            Ok(summary) => {
                if summary.failed > 0 {
                    tracing::warn!(
                        "[{tick}] bulk write had {} errors out of {count}",
                        summary.failed
                    );
                } else {
                    tracing::info!("[{tick}] indexed {count} documents");
                }
                CycleOutcome::Written(summary)
            }
            Err(e) => {
                let e = match e {
                    AppError::SinkWrite(_) => e,
                    other => AppError::SinkWrite(other.to_string()),
                };
                tracing::error!("[{tick}] {e}");
                CycleOutcome::WriteFailed
            }
        }
    }
}

/// Provisioning followed by the ingest loop, in that order.
pub struct Pipeline<S> {
    ingest: IngestLoop<S>,
    schema: IndexSchema,
}

impl<S: PositionSource> Pipeline<S> {
    pub fn new(ingest: IngestLoop<S>, schema: IndexSchema) -> Self {
        Self { ingest, schema }
    }

    pub fn counter(&self) -> CycleCounter {
        self.ingest.counter()
    }

    /// Returns only if provisioning fails; the loop itself never ends.
    pub async fn start(self, decision: &dyn RecreateDecision) -> Result<(), AppError> {
        let outcome = ensure_index(
            self.ingest.sink.as_ref(),
            &self.ingest.index_name,
            &self.schema,
            decision,
        )
        .await?;
        tracing::info!("Index '{}' ready ({outcome:?})", self.ingest.index_name);

        self.ingest.run().await;
        Ok(())
    }
}
