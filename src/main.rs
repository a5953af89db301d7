mod config;
mod job;
mod logging;
mod notify;
mod scrapers;

use config::RunConfig;
use job::Job;
use logging::JobLogger;
use notify::SmtpNotifier;
use scrapers::SmoobuCalendar;
use tracing::instrument::WithSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // No logger yet, so configuration problems go straight to stderr
    let config = match RunConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let logger = JobLogger::init(&config.log_filepath)?;

    let calendar = SmoobuCalendar::from_config(&config);
    let notifier = SmtpNotifier::from_config(&config);
    let job = Job::new(config, calendar, notifier);

    // Outcome is only in the log; the scheduler sees success either way
    job.run().with_subscriber(logger.dispatch().clone()).await;

    Ok(())
}
