//! Report compilation: gather a date range's scans and alerts, render a
//! PDF, store it and mail it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use genpdf::elements::{Break, FrameCellDecorator, LinearLayout, Paragraph, TableLayout};
use genpdf::style::Style;
use genpdf::{Alignment, Document, Element, SimplePageDecorator};
use sqlx::PgPool;
use veille_core::naming::report_file_name;
use veille_core::notification::{compose_report_email, ReportSummary};
use veille_core::report::{parse_recipients, range_bounds, validate_range};
use veille_core::types::{DbId, Timestamp};
use veille_core::validation::validate_name;
use veille_db::models::alert::AlertWithSource;
use veille_db::models::report::{CreateReport, Report};
use veille_db::models::scan::Scan;
use veille_db::repositories::{AlertRepo, ReportRepo, ScanRepo};
use veille_events::{event_types, EventBus, MailAttachment, PlatformEvent};

use crate::config::ReportConfig;
use crate::error::PipelineError;
use crate::notifier::AlertMailer;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to load font family {family} from {dir}: {source}")]
    Font {
        family: String,
        dir: String,
        source: genpdf::error::Error,
    },

    #[error("PDF rendering failed: {0}")]
    Pdf(#[from] genpdf::error::Error),

    /// The blocking render task panicked or was cancelled.
    #[error("Render task failed: {0}")]
    Task(String),
}

/// Everything printed in a report.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub report_id: DbId,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub generated_at: Timestamp,
    pub scans: Vec<Scan>,
    pub alerts: Vec<AlertWithSource>,
}

/// Renders a report document to PDF bytes. Rendering is synchronous; the
/// compiler runs it on the blocking pool.
pub trait ReportRenderer: Send + Sync {
    fn render(&self, document: &ReportDocument) -> Result<Vec<u8>, RenderError>;
}

// ---------------------------------------------------------------------------
// PdfRenderer
// ---------------------------------------------------------------------------

pub struct PdfRenderer {
    font_dir: PathBuf,
    font_family: String,
}

impl PdfRenderer {
    pub fn new(font_dir: impl Into<PathBuf>, font_family: impl Into<String>) -> Self {
        Self {
            font_dir: font_dir.into(),
            font_family: font_family.into(),
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(config.font_dir.clone(), config.font_family.clone())
    }

    fn title_section(doc: &mut Document, document: &ReportDocument) {
        doc.push(
            Paragraph::new(document.name.as_str())
                .aligned(Alignment::Center)
                .styled(Style::new().bold().with_font_size(20)),
        );
        doc.push(Break::new(1));
        doc.push(
            Paragraph::new(format!("Period: {} to {}", document.start, document.end))
                .aligned(Alignment::Center),
        );
        doc.push(
            Paragraph::new(format!(
                "Generated: {}",
                document.generated_at.format("%Y-%m-%d %H:%M UTC")
            ))
            .aligned(Alignment::Center),
        );
        doc.push(Break::new(1));
        doc.push(Paragraph::new(format!(
            "Scans: {} | Alerts: {}",
            document.scans.len(),
            document.alerts.len()
        )));
        doc.push(Break::new(2));
    }

    fn scans_section(doc: &mut Document, scans: &[Scan]) -> Result<(), RenderError> {
        doc.push(Paragraph::new("SCANS").styled(Style::new().bold().with_font_size(14)));
        doc.push(Break::new(1));
        if scans.is_empty() {
            doc.push(Paragraph::new("No scans in this period."));
            doc.push(Break::new(1));
            return Ok(());
        }

        let mut table = TableLayout::new(vec![1, 4, 3, 2, 3]);
        table.set_cell_decorator(FrameCellDecorator::new(true, true, false));
        let header = Style::new().bold();
        table
            .row()
            .element(Paragraph::new("#").styled(header))
            .element(Paragraph::new("Name").styled(header))
            .element(Paragraph::new("Started").styled(header))
            .element(Paragraph::new("Status").styled(header))
            .element(Paragraph::new("Keywords").styled(header))
            .push()?;
        for scan in scans {
            table
                .row()
                .element(Paragraph::new(scan.id.to_string()))
                .element(Paragraph::new(scan.name.clone().unwrap_or_default()))
                .element(Paragraph::new(
                    scan.scan_start_date.format("%Y-%m-%d %H:%M").to_string(),
                ))
                .element(Paragraph::new(scan.status.clone()))
                .element(Paragraph::new(scan.keywords.clone().unwrap_or_default()))
                .push()?;
        }
        doc.push(table);
        doc.push(Break::new(2));
        Ok(())
    }

    fn alerts_section(doc: &mut Document, alerts: &[AlertWithSource]) {
        doc.push(Paragraph::new("ALERTS").styled(Style::new().bold().with_font_size(14)));
        doc.push(Break::new(1));
        if alerts.is_empty() {
            doc.push(Paragraph::new("No alerts in this period."));
            return;
        }

        for alert in alerts {
            doc.push(
                Paragraph::new(format!(
                    "[{}] {}",
                    alert.severity.to_uppercase(),
                    alert.message
                ))
                .styled(Style::new().bold()),
            );
            doc.push(Paragraph::new(format!(
                "Raised {} on result #{}",
                alert.alert_date.format("%Y-%m-%d %H:%M"),
                alert.scan_result_id
            )));
            doc.push(Paragraph::new(format!("Source: {}", alert.source)));
            if !alert.recommendations.is_empty() {
                doc.push(Paragraph::new(format!(
                    "Recommendations: {}",
                    alert.recommendations
                )));
            }
            doc.push(Break::new(1));
        }
    }
}

impl ReportRenderer for PdfRenderer {
    fn render(&self, document: &ReportDocument) -> Result<Vec<u8>, RenderError> {
        let fonts = genpdf::fonts::from_files(&self.font_dir, &self.font_family, None).map_err(
            |source| RenderError::Font {
                family: self.font_family.clone(),
                dir: self.font_dir.display().to_string(),
                source,
            },
        )?;

        let mut doc = Document::new(fonts);
        doc.set_title(document.name.clone());

        let running_title = document.name.clone();
        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(10);
        decorator.set_header(move |page| {
            let mut layout = LinearLayout::vertical();
            if page > 1 {
                layout.push(
                    Paragraph::new(format!("{running_title} - page {page}"))
                        .aligned(Alignment::Right),
                );
                layout.push(Break::new(1));
            }
            layout.styled(Style::new().with_font_size(9))
        });
        doc.set_page_decorator(decorator);

        Self::title_section(&mut doc, document);
        Self::scans_section(&mut doc, &document.scans)?;
        Self::alerts_section(&mut doc, &document.alerts);

        let mut bytes = Vec::new();
        doc.render(&mut bytes)?;
        Ok(bytes)
    }
}

// ---------------------------------------------------------------------------
// ReportCompiler
// ---------------------------------------------------------------------------

pub struct ReportCompiler {
    pool: PgPool,
    renderer: Arc<dyn ReportRenderer>,
    mailer: Option<Arc<dyn AlertMailer>>,
    reports_dir: PathBuf,
    bus: Arc<EventBus>,
}

impl ReportCompiler {
    pub fn new(
        pool: PgPool,
        renderer: Arc<dyn ReportRenderer>,
        mailer: Option<Arc<dyn AlertMailer>>,
        reports_dir: impl Into<PathBuf>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            pool,
            renderer,
            mailer,
            reports_dir: reports_dir.into(),
            bus,
        }
    }

    /// Compile, render and send a report for an inclusive date range.
    ///
    /// An inverted range is a validation error and creates nothing. Render
    /// and mail failures are logged; the report row is kept without a file.
    pub async fn compile(&self, input: &CreateReport) -> Result<Report, PipelineError> {
        validate_name("name", &input.name)?;
        validate_range(input.report_start_date, input.report_end_date)?;

        let recipients = parse_recipients(&input.recipients);
        let (from, to) = range_bounds(input.report_start_date, input.report_end_date);
        let scans = ScanRepo::list_started_between(&self.pool, from, to).await?;
        let alerts = AlertRepo::list_raised_between(&self.pool, from, to).await?;

        let scan_ids: Vec<DbId> = scans.iter().map(|s| s.id).collect();
        let alert_ids: Vec<DbId> = alerts.iter().map(|a| a.id).collect();
        let mut report = ReportRepo::create(
            &self.pool,
            input.name.trim(),
            input.report_start_date,
            input.report_end_date,
            &scan_ids,
            &alert_ids,
            &recipients,
        )
        .await?;

        tracing::info!(
            report_id = report.id,
            scans = scans.len(),
            alerts = alerts.len(),
            "Report created",
        );

        let document = ReportDocument {
            report_id: report.id,
            name: report.name.clone(),
            start: report.report_start_date,
            end: report.report_end_date,
            generated_at: Utc::now(),
            scans,
            alerts,
        };
        let summary = ReportSummary {
            report_id: report.id,
            name: report.name.clone(),
            start: report.report_start_date,
            end: report.report_end_date,
            scan_count: document.scans.len(),
            alert_count: document.alerts.len(),
            has_attachment: false,
        };

        let pdf = match self.render_and_store(document).await {
            Ok((path, bytes)) => {
                if let Some(updated) =
                    ReportRepo::set_file_path(&self.pool, report.id, &path.to_string_lossy())
                        .await?
                {
                    report = updated;
                }
                Some(bytes)
            }
            Err(e) => {
                tracing::error!(report_id = report.id, error = %e, "Report rendering failed");
                None
            }
        };

        self.bus.publish(
            PlatformEvent::new(event_types::REPORT_CREATED)
                .with_source("report", report.id)
                .with_payload(serde_json::json!({ "file_path": report.file_path })),
        );

        self.send(&report, &recipients, summary, pdf).await;
        Ok(report)
    }

    /// Delete a report row and its file. A file already gone is fine.
    pub async fn delete(&self, report_id: DbId) -> Result<Option<Report>, PipelineError> {
        let Some(report) = ReportRepo::delete(&self.pool, report_id).await? else {
            return Ok(None);
        };

        if let Some(path) = &report.file_path {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(report_id, path = %path, error = %e, "Could not remove report file");
                }
            }
        }

        tracing::info!(report_id, "Report deleted");
        Ok(Some(report))
    }

    async fn render_and_store(
        &self,
        document: ReportDocument,
    ) -> Result<(PathBuf, Vec<u8>), PipelineError> {
        let renderer = Arc::clone(&self.renderer);
        let report_id = document.report_id;
        let bytes = tokio::task::spawn_blocking(move || renderer.render(&document))
            .await
            .map_err(|e| RenderError::Task(e.to_string()))??;

        let path = report_path(&self.reports_dir, report_id);
        tokio::fs::create_dir_all(&self.reports_dir).await?;
        tokio::fs::write(&path, &bytes).await?;
        tracing::debug!(report_id, path = %path.display(), bytes = bytes.len(), "Report written");
        Ok((path, bytes))
    }

    async fn send(
        &self,
        report: &Report,
        recipients: &[String],
        mut summary: ReportSummary,
        pdf: Option<Vec<u8>>,
    ) {
        let Some(mailer) = self.mailer.as_ref() else {
            tracing::info!(report_id = report.id, "Email not configured, report not sent");
            return;
        };
        if recipients.is_empty() {
            tracing::info!(report_id = report.id, "Report has no recipients");
            return;
        }

        let attachment = pdf.map(|bytes| MailAttachment::pdf(report_file_name(report.id), bytes));
        summary.has_attachment = attachment.is_some();
        let email = compose_report_email(&summary);

        if let Err(e) = mailer.send(recipients, &email, attachment.as_ref()).await {
            tracing::error!(report_id = report.id, error = %e, "Report email failed");
        }
    }
}

pub fn report_path(reports_dir: &Path, report_id: DbId) -> PathBuf {
    reports_dir.join(report_file_name(report_id))
}
