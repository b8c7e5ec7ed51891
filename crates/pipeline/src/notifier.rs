//! Email notification of newly raised high-severity alerts.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use veille_core::notification::{compose_alert_email, AlertSummary, ComposedEmail};
use veille_core::severity::Severity;
use veille_core::types::DbId;
use veille_db::repositories::AlertRepo;
use veille_events::{EmailDelivery, EmailError, MailAttachment};

use crate::error::PipelineError;

/// Outbound mail, shared by the notifier and the report compiler.
#[async_trait]
pub trait AlertMailer: Send + Sync {
    async fn send(
        &self,
        recipients: &[String],
        email: &ComposedEmail,
        attachment: Option<&MailAttachment>,
    ) -> Result<(), EmailError>;
}

#[async_trait]
impl AlertMailer for EmailDelivery {
    async fn send(
        &self,
        recipients: &[String],
        email: &ComposedEmail,
        attachment: Option<&MailAttachment>,
    ) -> Result<(), EmailError> {
        EmailDelivery::send(self, recipients, email, attachment).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    /// Severity below high.
    BelowThreshold,
    /// No mailer or no recipients configured.
    Disabled,
    /// The alert no longer exists.
    Missing,
    Failed { reason: String },
}

pub struct Notifier {
    pool: PgPool,
    mailer: Option<Arc<dyn AlertMailer>>,
    recipients: Vec<String>,
}

impl Notifier {
    pub fn new(pool: PgPool, mailer: Option<Arc<dyn AlertMailer>>, recipients: Vec<String>) -> Self {
        Self {
            pool,
            mailer,
            recipients,
        }
    }

    /// Email an alert if it is high severity. Delivery failures are logged
    /// and reported in the outcome; the alert itself is never touched.
    pub async fn notify(&self, alert_id: DbId) -> Result<NotifyOutcome, PipelineError> {
        let Some(alert) = AlertRepo::find_with_source(&self.pool, alert_id).await? else {
            return Ok(NotifyOutcome::Missing);
        };

        let Some(severity) = Severity::parse(&alert.severity).filter(|s| s.is_notifiable()) else {
            return Ok(NotifyOutcome::BelowThreshold);
        };

        let Some(mailer) = self.mailer.as_ref().filter(|_| !self.recipients.is_empty()) else {
            tracing::info!(alert_id, "Email not configured, skipping alert notification");
            return Ok(NotifyOutcome::Disabled);
        };

        let email = compose_alert_email(&AlertSummary {
            alert_id: alert.id,
            scan_result_id: alert.scan_result_id,
            severity,
            message: alert.message,
            source: alert.source,
            details: alert.details,
            recommendations: alert.recommendations,
        });

        match mailer.send(&self.recipients, &email, None).await {
            Ok(()) => {
                tracing::info!(alert_id, recipients = self.recipients.len(), "Alert email sent");
                Ok(NotifyOutcome::Sent)
            }
            Err(e) => {
                tracing::error!(alert_id, error = %e, "Alert email failed");
                Ok(NotifyOutcome::Failed {
                    reason: e.to_string(),
                })
            }
        }
    }

    pub async fn handle(&self, alert_id: DbId) {
        if let Err(e) = self.notify(alert_id).await {
            tracing::error!(alert_id, error = %e, "Alert notification aborted");
        }
    }
}
