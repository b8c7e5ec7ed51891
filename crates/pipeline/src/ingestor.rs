//! Result ingestion: fetch news for a pending scan and store each article
//! as a scan result.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use veille_core::keywords::build_query;
use veille_core::scan_status::ScanStatus;
use veille_core::types::{DbId, Timestamp};
use veille_db::models::scan::Scan;
use veille_db::models::scan_result::{CreateScanResult, ResultDetail};
use veille_db::repositories::{ScanRepo, ScanResultRepo};
use veille_events::{event_types, EventBus, PlatformEvent};

use crate::error::PipelineError;
use crate::news::{NewsQuery, NewsSource};

/// What a fetch did with its scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The scan no longer exists.
    Missing,
    /// Nothing searchable in the keywords, or the scan is not pending.
    Skipped,
    Completed { results: usize },
    Failed { reason: String },
}

pub struct ResultIngestor {
    pool: PgPool,
    source: Arc<dyn NewsSource>,
    bus: Arc<EventBus>,
}

impl ResultIngestor {
    pub fn new(pool: PgPool, source: Arc<dyn NewsSource>, bus: Arc<EventBus>) -> Self {
        Self { pool, source, bus }
    }

    /// Fetch articles for a scan, store them and settle the scan's status.
    ///
    /// A news-service failure marks the scan failed and is not an `Err`;
    /// only database errors are.
    pub async fn fetch(&self, scan_id: DbId) -> Result<FetchOutcome, PipelineError> {
        let Some(scan) = ScanRepo::find_by_id(&self.pool, scan_id).await? else {
            tracing::warn!(scan_id, "Scan vanished before fetch");
            return Ok(FetchOutcome::Missing);
        };

        if scan.status() != Some(ScanStatus::Pending) {
            tracing::info!(scan_id, status = %scan.status, "Scan is not pending, skipping fetch");
            return Ok(FetchOutcome::Skipped);
        }

        let Some(terms) = scan.keywords.as_deref().and_then(build_query) else {
            tracing::info!(scan_id, "No keywords provided, skipping news fetch");
            return Ok(FetchOutcome::Skipped);
        };

        let previous = match scan.schedule_id {
            Some(schedule_id) => ScanRepo::previous_run(&self.pool, schedule_id, scan.id).await?,
            None => None,
        };
        let now = Utc::now();
        let query = news_query(terms, previous.as_ref(), now);

        tracing::info!(scan_id, q = %query.q, windowed = query.from.is_some(), "Fetching news");

        let articles = match self.source.search(&query).await {
            Ok(articles) => articles,
            Err(e) => {
                let reason = e.to_string();
                tracing::error!(scan_id, error = %e, "News fetch failed");
                self.mark_failed(scan.id, &reason).await?;
                return Ok(FetchOutcome::Failed { reason });
            }
        };

        let mut stored = 0;
        for raw in articles {
            let article = raw.normalize(now);
            let result = ScanResultRepo::create(
                &self.pool,
                &CreateScanResult {
                    scan_id: scan.id,
                    date_posted: article.published_at,
                    source: article.url,
                    details: article.description,
                    detail: ResultDetail::Article {
                        title: article.title,
                        author: article.author,
                    },
                },
            )
            .await?;
            self.bus
                .publish(PlatformEvent::result_created(result.id, scan.id));
            stored += 1;
        }

        if ScanRepo::mark_completed(&self.pool, scan.id).await? {
            self.bus.publish(
                PlatformEvent::new(event_types::SCAN_COMPLETED)
                    .with_source("scan", scan.id)
                    .with_payload(serde_json::json!({ "results": stored })),
            );
        }
        tracing::info!(scan_id, results = stored, "Scan completed");

        Ok(FetchOutcome::Completed { results: stored })
    }

    /// Consumer entry point: fetch and log the outcome.
    ///
    /// A fetch aborted by a database error still settles the scan as
    /// failed when the database lets it; results stored before the error
    /// are kept.
    pub async fn handle(&self, scan_id: DbId) {
        let Err(e) = self.fetch(scan_id).await else {
            return;
        };
        tracing::error!(scan_id, error = %e, "Scan ingestion aborted");

        if let Err(mark_err) = self.mark_failed(scan_id, &e.to_string()).await {
            tracing::error!(scan_id, error = %mark_err, "Could not mark aborted scan as failed");
        }
    }

    /// Move a pending scan to failed and publish `scan.failed`. Returns
    /// whether the scan was still pending.
    async fn mark_failed(&self, scan_id: DbId, reason: &str) -> Result<bool, sqlx::Error> {
        let marked = ScanRepo::mark_failed(&self.pool, scan_id, reason).await?;
        if marked {
            self.bus.publish(
                PlatformEvent::new(event_types::SCAN_FAILED)
                    .with_source("scan", scan_id)
                    .with_payload(serde_json::json!({ "reason": reason })),
            );
        }
        Ok(marked)
    }
}

/// The news query for a scan. Scans of a schedule with an earlier run are
/// narrowed to articles since that run started.
pub fn news_query(terms: String, previous: Option<&Scan>, now: Timestamp) -> NewsQuery {
    match previous {
        Some(prev) => NewsQuery {
            q: terms,
            from: Some(prev.scan_start_date),
            to: Some(now),
        },
        None => NewsQuery {
            q: terms,
            from: None,
            to: None,
        },
    }
}
