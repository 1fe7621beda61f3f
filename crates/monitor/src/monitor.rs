use std::sync::Arc;

use chrono::Utc;
use common::models::DividendRecord;
use market_data::DividendFetcher;
use rust_decimal::Decimal;
use storage::{StateStore, StorageError};
use thiserror::Error;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::alert::render_alert;
use crate::classifier::{ChangeClassifier, ChangeVerdict};
use crate::services::AlertDispatcher;

#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// Fraction at or above which a change is significant.
    pub threshold: Decimal,
}

/// Only a failed final save fails the run; per-symbol problems are logged.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Failed to persist dividend state: {0}")]
    Persist(#[from] StorageError),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub processed: usize,
    pub alerts: usize,
    pub dispatch_failures: usize,
    pub unchanged: usize,
    pub skipped_zero: usize,
    pub fetch_failures: usize,
}

impl RunReport {
    pub fn summary_line(&self) -> String {
        if self.alerts == 0 {
            format!(
                "No new dividend announcements ({} checked, {} fetch failures)",
                self.processed, self.fetch_failures
            )
        } else {
            format!(
                "{} new dividend announcement(s) ({} checked, {} delivery failures, {} fetch failures)",
                self.alerts, self.processed, self.dispatch_failures, self.fetch_failures
            )
        }
    }
}

enum SymbolOutcome {
    FetchFailed,
    NoDividend,
    Observed {
        record: DividendRecord,
        verdict: ChangeVerdict,
        delivered: bool,
    },
}

pub struct DividendMonitor {
    classifier: ChangeClassifier,
    fetcher: Arc<dyn DividendFetcher>,
    store: Arc<dyn StateStore>,
    dispatcher: Arc<dyn AlertDispatcher>,
}

impl DividendMonitor {
    pub fn new(
        settings: MonitorSettings,
        fetcher: Arc<dyn DividendFetcher>,
        store: Arc<dyn StateStore>,
        dispatcher: Arc<dyn AlertDispatcher>,
    ) -> Self {
        Self {
            classifier: ChangeClassifier::new(settings.threshold),
            fetcher,
            store,
            dispatcher,
        }
    }

    /// Checks every symbol in order, then saves the merged state once.
    pub async fn run(&self, symbols: &[String]) -> Result<RunReport, MonitorError> {
        let run_id = Uuid::new_v4();
        self.run_inner(symbols)
            .instrument(info_span!("dividend_run", %run_id))
            .await
    }

    async fn run_inner(&self, symbols: &[String]) -> Result<RunReport, MonitorError> {
        let previous = self.store.load().await;
        // Symbols that fail or drop off the list keep their last known record.
        let mut updated = previous.clone();
        let mut report = RunReport::default();

        info!(
            "Checking {} symbols against {} stored records",
            symbols.len(),
            previous.len()
        );

        for symbol in symbols {
            match self.process_symbol(symbol, previous.get(symbol)).await {
                SymbolOutcome::FetchFailed => report.fetch_failures += 1,
                SymbolOutcome::NoDividend => report.skipped_zero += 1,
                SymbolOutcome::Observed {
                    record,
                    verdict,
                    delivered,
                } => {
                    report.processed += 1;
                    if verdict.is_alert_worthy() {
                        report.alerts += 1;
                        if !delivered {
                            report.dispatch_failures += 1;
                        }
                    } else {
                        report.unchanged += 1;
                    }
                    updated.insert(symbol.clone(), record);
                }
            }
        }

        if let Err(e) = self.store.save(&updated).await {
            error!("Failed to save dividend state: {}", e);
            return Err(e.into());
        }

        info!("{}", report.summary_line());
        Ok(report)
    }

    async fn process_symbol(
        &self,
        symbol: &str,
        previous: Option<&DividendRecord>,
    ) -> SymbolOutcome {
        let observation = match self.fetcher.fetch(symbol).await {
            Ok(observation) => observation,
            Err(e) => {
                error!("Error fetching dividend for {}: {}", symbol, e);
                return SymbolOutcome::FetchFailed;
            }
        };

        if !observation.has_dividend() {
            debug!("{}: no dividend reported, skipping", symbol);
            return SymbolOutcome::NoDividend;
        }

        let verdict = self.classifier.classify(previous, &observation);
        let mut delivered = false;

        if verdict.is_alert_worthy() {
            info!("{}: {}", symbol, verdict.describe());
            let alert = render_alert(symbol, &observation, previous, &verdict);
            match self
                .dispatcher
                .send(symbol, &alert.subject, &alert.body)
                .await
            {
                Ok(()) => delivered = true,
                Err(e) => warn!("Failed to send alert for {}: {}", symbol, e),
            }
        } else {
            debug!("{}: no new dividend since {}", symbol, observation.effective_date());
        }

        SymbolOutcome::Observed {
            record: observation.into_record(Utc::now()),
            verdict,
            delivered,
        }
    }
}
