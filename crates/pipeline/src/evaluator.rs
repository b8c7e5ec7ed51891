//! Alert evaluation: classify a stored scan result and raise at most one
//! alert for it.

use std::sync::Arc;

use sqlx::PgPool;
use veille_core::classification::{classification_input, Classification};
use veille_core::types::DbId;
use veille_db::models::alert::{Alert, NewAlert};
use veille_db::models::scan_result::ScanResult;
use veille_db::repositories::{AlertRepo, ScanResultRepo};
use veille_events::{EventBus, PlatformEvent};

use crate::classifier::SeverityClassifier;
use crate::error::PipelineError;

pub struct AlertEvaluator {
    pool: PgPool,
    classifier: SeverityClassifier,
    bus: Arc<EventBus>,
}

impl AlertEvaluator {
    pub fn new(pool: PgPool, classifier: SeverityClassifier, bus: Arc<EventBus>) -> Self {
        Self {
            pool,
            classifier,
            bus,
        }
    }

    /// Classify a result and persist an alert when the verdict warrants one.
    ///
    /// Returns the alert only when this call created it; `alert.created` is
    /// published in exactly that case.
    pub async fn evaluate(&self, result_id: DbId) -> Result<Option<Alert>, PipelineError> {
        let Some(result) = ScanResultRepo::find_by_id(&self.pool, result_id).await? else {
            tracing::warn!(result_id, "Scan result vanished before evaluation");
            return Ok(None);
        };

        let input = classification_input(&result.details, result.title());
        let verdict = self.classifier.classify(&input).await;

        if verdict.fallback {
            tracing::warn!(result_id, "Classifier fell back to severity none");
        }

        let Some(new_alert) = alert_for(&result, &verdict) else {
            tracing::debug!(result_id, "No alert raised");
            return Ok(None);
        };

        let created = AlertRepo::create_if_absent(&self.pool, &new_alert).await?;
        match &created {
            Some(alert) => {
                tracing::info!(
                    result_id,
                    alert_id = alert.id,
                    severity = %alert.severity,
                    "Alert raised",
                );
                self.bus
                    .publish(PlatformEvent::alert_created(alert.id, &alert.severity));
            }
            None => tracing::debug!(result_id, "Result already carries an alert"),
        }
        Ok(created)
    }

    pub async fn handle(&self, result_id: DbId) {
        if let Err(e) = self.evaluate(result_id).await {
            tracing::error!(result_id, error = %e, "Alert evaluation failed");
        }
    }
}

/// The alert a verdict raises on a result, if any.
///
/// The message is the result's title, or its details when it has none.
pub fn alert_for(result: &ScanResult, verdict: &Classification) -> Option<NewAlert> {
    if !verdict.severity.raises_alert() {
        return None;
    }

    let message = result
        .title()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(result.details.as_str())
        .to_string();

    Some(NewAlert {
        scan_result_id: result.id,
        severity: verdict.severity,
        message,
        recommendations: verdict.recommendations.to_alert_text(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use veille_core::classification::Recommendations;
    use veille_core::severity::Severity;
    use veille_db::models::scan_result::ResultDetail;

    fn result(detail: Option<ResultDetail>) -> ScanResult {
        ScanResult {
            id: 17,
            scan_id: 3,
            date_posted: Utc::now(),
            source: "https://news.example/a".into(),
            details: "Credentials for sale".into(),
            created_at: Utc::now(),
            detail,
        }
    }

    fn verdict(severity: Severity, recommendations: Recommendations) -> Classification {
        Classification {
            severity,
            recommendations,
            fallback: false,
        }
    }

    #[test]
    fn none_raises_nothing() {
        let v = verdict(Severity::None, Recommendations::default());
        assert!(alert_for(&result(None), &v).is_none());
        assert!(alert_for(&result(None), &Classification::fallback()).is_none());
    }

    #[test]
    fn high_verdict_joins_recommendations() {
        let detail = ResultDetail::Article {
            title: "Bank breach".into(),
            author: "Unknown".into(),
        };
        let v = verdict(
            Severity::High,
            Recommendations::List(vec!["Rotate credentials".into(), "Patch CVE".into()]),
        );
        let alert = alert_for(&result(Some(detail)), &v).unwrap();
        assert_eq!(alert.scan_result_id, 17);
        assert_eq!(alert.severity, Severity::High);
        assert_eq!(alert.message, "Bank breach");
        assert_eq!(alert.recommendations, "Rotate credentials, Patch CVE");
    }

    #[test]
    fn text_recommendations_are_kept_verbatim() {
        let v = verdict(Severity::Low, Recommendations::Text("Monitor, then act".into()));
        let alert = alert_for(&result(None), &v).unwrap();
        assert_eq!(alert.recommendations, "Monitor, then act");
    }

    #[test]
    fn untitled_result_uses_details_as_message() {
        let detail = ResultDetail::SocialPost {
            author: "@x".into(),
            comment_count: 0,
            share_count: 0,
            like_count: 0,
        };
        let v = verdict(Severity::Medium, Recommendations::default());
        let alert = alert_for(&result(Some(detail)), &v).unwrap();
        assert_eq!(alert.message, "Credentials for sale");
    }
}
