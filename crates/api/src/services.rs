//! Wiring of the pipeline services from environment configuration.
//!
//! [`PipelineServices::start`] builds the external clients, spawns the event
//! consumers, starts the job scheduler and restores persisted schedules.
//! [`PipelineServices::shutdown`] undoes it in reverse.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use veille_db::DbPool;
use veille_events::{EmailConfig, EmailDelivery, EventBus};
use veille_pipeline::classifier::SeverityClassifier;
use veille_pipeline::config::{
    ClassifierConfig, GeminiConfig, NewsConfig, NotifierConfig, ReportConfig,
};
use veille_pipeline::consumers::{spawn_pipeline, PipelineStages};
use veille_pipeline::evaluator::AlertEvaluator;
use veille_pipeline::generation::GeminiClient;
use veille_pipeline::ingestor::ResultIngestor;
use veille_pipeline::news::NewsApiClient;
use veille_pipeline::notifier::{AlertMailer, Notifier};
use veille_pipeline::report::{PdfRenderer, ReportCompiler};
use veille_pipeline::runner::{restore_schedules, ScheduleRunner};
use veille_pipeline::scheduler::JobScheduler;
use veille_pipeline::PipelineError;

/// Long-lived pipeline services owned by the binary.
pub struct PipelineServices {
    pub scheduler: Arc<JobScheduler>,
    pub reports: Arc<ReportCompiler>,
    consumers: Vec<JoinHandle<()>>,
    cancel: CancellationToken,
}

impl PipelineServices {
    pub async fn start(pool: &DbPool, bus: &Arc<EventBus>) -> Result<Self, PipelineError> {
        let news = Arc::new(NewsApiClient::new(NewsConfig::from_env())?);
        let gemini = Arc::new(GeminiClient::new(GeminiConfig::from_env())?);

        let mailer: Option<Arc<dyn AlertMailer>> = match EmailConfig::from_env() {
            Some(config) => {
                tracing::info!(host = %config.smtp_host, "Email delivery enabled");
                Some(Arc::new(EmailDelivery::new(config)))
            }
            None => {
                tracing::warn!("SMTP_HOST not set, alert and report emails are disabled");
                None
            }
        };

        let stages = PipelineStages {
            ingestor: Arc::new(ResultIngestor::new(pool.clone(), news, Arc::clone(bus))),
            evaluator: Arc::new(AlertEvaluator::new(
                pool.clone(),
                SeverityClassifier::new(gemini, ClassifierConfig::from_env()),
                Arc::clone(bus),
            )),
            notifier: Arc::new(Notifier::new(
                pool.clone(),
                mailer.clone(),
                NotifierConfig::from_env().recipients,
            )),
        };
        let cancel = CancellationToken::new();
        let consumers = spawn_pipeline(bus, stages, cancel.clone());
        tracing::info!(count = consumers.len(), "Pipeline consumers started");

        let scheduler = Arc::new(JobScheduler::new(Arc::new(ScheduleRunner::new(
            pool.clone(),
            Arc::clone(bus),
        ))));
        restore_schedules(&scheduler, pool).await?;

        let report_config = ReportConfig::from_env();
        let reports = Arc::new(ReportCompiler::new(
            pool.clone(),
            Arc::new(PdfRenderer::from_config(&report_config)),
            mailer,
            report_config.reports_dir,
            Arc::clone(bus),
        ));

        Ok(Self {
            scheduler,
            reports,
            consumers,
            cancel,
        })
    }

    /// Stop the timers, then give the consumers `timeout` to finish the
    /// event they are handling.
    pub async fn shutdown(self, timeout: Duration) {
        self.scheduler.shutdown();
        tracing::info!("Job scheduler stopped");

        self.cancel.cancel();
        for handle in self.consumers {
            if tokio::time::timeout(timeout, handle).await.is_err() {
                tracing::warn!("Pipeline consumer did not stop in time");
            }
        }
        tracing::info!("Pipeline consumers stopped");
    }
}
