use crate::config::toml_config::{RunSettings, TomlConfig};
use crate::core::checkpoint::Checkpointer;
use crate::core::resolver::Resolver;
use crate::core::synthesizer::Synthesizer;
use crate::core::{Record, RecordTable, Storage};
use crate::domain::model::{ProcessingStatus, NOT_FOUND_MESSAGE, NO_SCORE_MESSAGE};
use crate::domain::ports::{PlacesLookup, TextGenerator};
use crate::utils::error::{EnrichError, Result};
use crate::utils::monitor::RunMonitor;
use chrono::{DateTime, Utc};

/// Totals for one run over the processed prefix of the table.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub total_records: usize,
    pub processed: usize,
    pub success: usize,
    pub partial_no_maps_data: usize,
    pub partial_no_description: usize,
    pub failed: usize,
    pub checkpoints_written: usize,
    pub checkpoint_failures: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Drives Resolver → Synthesizer → Checkpointer over a table, one record at a time.
pub struct EnrichEngine<S: Storage, P: PlacesLookup, G: TextGenerator> {
    resolver: Resolver<P>,
    synthesizer: Synthesizer<G>,
    checkpointer: Checkpointer<S>,
    settings: RunSettings,
    monitor: RunMonitor,
}

impl<S: Storage, P: PlacesLookup, G: TextGenerator> EnrichEngine<S, P, G> {
    pub fn new(
        storage: S,
        places: P,
        generator: G,
        config: &TomlConfig,
        output_path: impl Into<String>,
    ) -> Self {
        Self {
            resolver: Resolver::new(places),
            synthesizer: Synthesizer::new(generator, config.generator.clone()),
            checkpointer: Checkpointer::new(storage, output_path),
            settings: config.run.clone(),
            monitor: RunMonitor::default(),
        }
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = RunMonitor::new(enabled);
        self
    }

    /// Enriches the first `limit` records (all when `None`) in place.
    ///
    /// Never fails once started: per-record problems land in the record's
    /// status and error message, and checkpoint failures are logged and counted.
    pub async fn run(&self, table: &mut RecordTable, limit: Option<usize>) -> RunSummary {
        let started_at = Utc::now();
        let total = limit.map_or(table.len(), |l| l.min(table.len()));
        let every = self.settings.checkpoint_every.max(1);
        let pacing = self.settings.pacing();

        let mut checkpoints_written = 0;
        let mut checkpoint_failures = 0;

        tracing::info!("🚀 Processing {} of {} businesses", total, table.len());

        for index in 0..total {
            {
                let record = &mut table.records[index];
                tracing::info!("🏢 Processing {}/{}: {}", index + 1, total, record.name);

                record.status = ProcessingStatus::Pending;
                if let Err(e) = self.process_record(record).await {
                    tracing::error!("❌ Error processing {}: {}", record.name, e);
                    record.mark_failed(e.to_string());
                }
            }

            if index % every == 0 || index + 1 == total {
                if self.checkpoint(table).await {
                    checkpoints_written += 1;
                } else {
                    checkpoint_failures += 1;
                }
                self.monitor.log_stats(&format!("Checkpoint {}/{}", index + 1, total));
            }

            if !pacing.is_zero() {
                tokio::time::sleep(pacing).await;
            }
        }

        if self.checkpoint(table).await {
            checkpoints_written += 1;
        } else {
            checkpoint_failures += 1;
        }
        self.monitor.log_final_stats();

        let processed = &table.records[..total];
        let count = |status: ProcessingStatus| processed.iter().filter(|r| r.status == status).count();
        let summary = RunSummary {
            total_records: table.len(),
            processed: total,
            success: count(ProcessingStatus::Success),
            partial_no_maps_data: count(ProcessingStatus::PartialNoMapsData),
            partial_no_description: count(ProcessingStatus::PartialNoDescription),
            failed: count(ProcessingStatus::Failed),
            checkpoints_written,
            checkpoint_failures,
            started_at,
            finished_at: Utc::now(),
        };

        tracing::info!(
            "🏁 Processing complete. Successfully processed {} out of {} businesses.",
            summary.success,
            summary.processed
        );
        summary
    }

    async fn process_record(&self, record: &mut Record) -> Result<()> {
        if record.name.trim().is_empty() {
            return Err(EnrichError::ValidationError {
                message: "Business name is empty".to_string(),
            });
        }

        let place = self
            .resolver
            .resolve(&record.name, &record.address, &record.phone)
            .await;

        let Some(place) = place else {
            record.mark_partial(
                ProcessingStatus::PartialNoMapsData,
                None,
                None,
                NOT_FOUND_MESSAGE,
            );
            return Ok(());
        };

        let (maps_url, review_score) = match (place.maps_url, place.review_score) {
            (Some(url), Some(score)) => (url, score),
            (None, score) => {
                record.mark_partial(
                    ProcessingStatus::PartialNoMapsData,
                    None,
                    score,
                    NOT_FOUND_MESSAGE,
                );
                return Ok(());
            }
            (Some(url), None) => {
                record.mark_partial(
                    ProcessingStatus::PartialNoMapsData,
                    Some(url),
                    None,
                    NO_SCORE_MESSAGE,
                );
                return Ok(());
            }
        };

        let synthesis = self
            .synthesizer
            .synthesize(&record.name, &record.address, review_score)
            .await;

        if synthesis.is_generated() {
            record.mark_success(maps_url, review_score, synthesis.text);
        } else {
            record.mark_partial(
                ProcessingStatus::PartialNoDescription,
                Some(maps_url),
                Some(review_score),
                synthesis.text,
            );
        }
        Ok(())
    }

    async fn checkpoint(&self, table: &RecordTable) -> bool {
        match self.checkpointer.persist(table).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("⚠️ Error saving results: {}", e);
                false
            }
        }
    }
}
