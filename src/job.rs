use crate::config::RunConfig;
use crate::notify::Notifier;
use crate::scrapers::{check_for_bookability, CalendarSource};
use anyhow::Result;
use tracing::{error, info};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Notified,
    NotFree,
    Failed,
}

/// One check-and-notify pass
pub struct Job<S, N> {
    config: RunConfig,
    source: S,
    notifier: N,
}

impl<S, N> Job<S, N>
where
    S: CalendarSource,
    N: Notifier,
{
    pub fn new(config: RunConfig, source: S, notifier: N) -> Self {
        Self {
            config,
            source,
            notifier,
        }
    }

    /// Run the job. Failures are logged, never returned.
    pub async fn run(&self) -> JobOutcome {
        info!("--- Job Started ---");

        let outcome = match self.check_and_notify().await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = ?err, "Critical Failure in Main Loop: {:#}", err);
                JobOutcome::Failed
            }
        };

        info!("--- Job Finished ---\n");
        outcome
    }

    async fn check_and_notify(&self) -> Result<JobOutcome> {
        if check_for_bookability(&self.source, &self.config).await? {
            info!("Apartment found free! Triggering email.");
            self.notifier.notify().await?;
            Ok(JobOutcome::Notified)
        } else {
            info!("Apartment not free. Exiting.");
            Ok(JobOutcome::NotFree)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::test_support::CapturedLog;
    use crate::logging::JobLogger;
    use crate::notify::SmtpNotifier;
    use crate::scrapers::calendar::fixtures::two_month_fragment;
    use crate::scrapers::TargetMonth;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tracing::instrument::WithSubscriber;

    /// Serves canned widget HTML and records what was asked for
    struct CannedCalendar {
        html: String,
        requested: Mutex<Vec<TargetMonth>>,
    }

    impl CannedCalendar {
        fn new(html: impl Into<String>) -> Self {
            Self {
                html: html.into(),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CalendarSource for CannedCalendar {
        async fn fetch_calendar_html(&self, target: &TargetMonth) -> Result<String> {
            self.requested.lock().unwrap().push(*target);
            Ok(self.html.clone())
        }

        fn source_name(&self) -> &'static str {
            "Canned"
        }
    }

    /// Stands in for SMTP, remembering the subject and body of each send
    struct RecordingNotifier {
        subject: String,
        content: String,
        sent: Arc<Mutex<Vec<(String, String)>>>,
        fail: bool,
    }

    impl RecordingNotifier {
        fn for_config(config: &RunConfig) -> Self {
            Self {
                subject: config.subject.clone(),
                content: config.content.clone(),
                sent: Arc::new(Mutex::new(Vec::new())),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self) -> Result<()> {
            if self.fail {
                anyhow::bail!("smtp login rejected");
            }
            self.sent
                .lock()
                .unwrap()
                .push((self.subject.clone(), self.content.clone()));
            info!("Email sent successfully to [\"a@x.com\"]");
            Ok(())
        }
    }

    fn march_config() -> RunConfig {
        let vars: HashMap<&str, &str> = [
            ("TARGET_MONTH", "3"),
            ("TARGET_YEAR", "2025"),
            ("SUBJECT", "Apartment free"),
            ("CONTENT", "Book it now"),
            ("RECIPIENT", "a@x.com"),
            ("SENDER", "bot@x.com"),
        ]
        .into_iter()
        .collect();
        RunConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
    }

    async fn run_captured<S, N>(job: &Job<S, N>) -> (JobOutcome, String)
    where
        S: CalendarSource,
        N: Notifier,
    {
        let log = CapturedLog::default();
        let logger = {
            let log = log.clone();
            JobLogger::with_sinks(move || log.clone(), std::io::sink)
        };
        let outcome = job.run().with_subscriber(logger.dispatch().clone()).await;
        (outcome, log.contents())
    }

    #[tokio::test]
    async fn free_day_triggers_notification() {
        let config = march_config();
        let notifier = RecordingNotifier::for_config(&config);
        let sent = notifier.sent.clone();
        let calendar = CannedCalendar::new(two_month_fragment(&["normal", "available", "normal"]));
        let job = Job::new(config, calendar, notifier);

        let (outcome, log) = run_captured(&job).await;

        assert_eq!(outcome, JobOutcome::Notified);
        assert_eq!(
            *sent.lock().unwrap(),
            vec![("Apartment free".to_string(), "Book it now".to_string())]
        );
        assert_eq!(
            *job.source.requested.lock().unwrap(),
            vec![TargetMonth::parse("3", "2025").unwrap()]
        );
        assert!(log.contains("--- Job Started ---"));
        assert!(log.contains("Apartment found free! Triggering email."));
        assert!(log.contains("Email sent successfully"));
        assert!(log.contains("--- Job Finished ---\n\n"));
    }

    #[tokio::test]
    async fn fully_booked_month_sends_nothing() {
        let config = march_config();
        // Unroutable SMTP settings: any connection attempt would fail the run
        let notifier = SmtpNotifier::from_config(&config);
        let calendar = CannedCalendar::new(two_month_fragment(&["normal", "normal", "normal"]));
        let job = Job::new(config, calendar, notifier);

        let (outcome, log) = run_captured(&job).await;

        assert_eq!(outcome, JobOutcome::NotFree);
        assert!(log.contains("Apartment not free. Exiting."));
        assert!(!log.contains("Attempting to send notification email"));
        assert!(log.contains("--- Job Finished ---"));
    }

    #[tokio::test]
    async fn missing_month_section_is_logged_and_run_finishes() {
        let config = march_config();
        let notifier = RecordingNotifier::for_config(&config);
        let sent = notifier.sent.clone();
        let calendar = CannedCalendar::new(
            r#"<div class="calendar"><h2>April 2025</h2><table><tbody>
               <tr><td class="available">1</td></tr></tbody></table></div>"#,
        );
        let job = Job::new(config, calendar, notifier);

        let (outcome, log) = run_captured(&job).await;

        assert_eq!(outcome, JobOutcome::Failed);
        assert!(sent.lock().unwrap().is_empty());
        assert!(log.contains(" - ERROR - "));
        assert!(log.contains("Critical Failure in Main Loop: March calendar section not found!"));
        assert!(log.contains("--- Job Finished ---"));
    }

    #[tokio::test]
    async fn notification_failure_is_logged_not_raised() {
        let config = march_config();
        let mut notifier = RecordingNotifier::for_config(&config);
        notifier.fail = true;
        let calendar = CannedCalendar::new(two_month_fragment(&["available"]));
        let job = Job::new(config, calendar, notifier);

        let (outcome, log) = run_captured(&job).await;

        assert_eq!(outcome, JobOutcome::Failed);
        assert!(log.contains("Critical Failure in Main Loop: smtp login rejected"));
        assert!(log.contains("--- Job Finished ---"));
    }

    #[tokio::test]
    async fn invalid_target_month_fails_the_run() {
        let mut config = march_config();
        config.target_month = "thirteen".to_string();
        let notifier = RecordingNotifier::for_config(&config);
        let calendar = CannedCalendar::new(two_month_fragment(&["available"]));
        let job = Job::new(config, calendar, notifier);

        let (outcome, log) = run_captured(&job).await;

        assert_eq!(outcome, JobOutcome::Failed);
        assert!(job.source.requested.lock().unwrap().is_empty());
        assert!(log.contains("invalid TARGET_MONTH"));
    }
}
