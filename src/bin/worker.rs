use clap::{Arg, Command};
use roadmap_backend::{
    config::Config,
    db::create_pool,
    error::{AppError, AppResult},
    init_tracing,
    jobs::{Job, JobRunner},
    llm::{OpenAiClient, RetryPolicy, TextGenerator},
    notifications::{Notifier, TelegramNotifier},
    services::CoachingService,
    store::{EntityStore, PgStore},
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> AppResult<()> {
    let matches = Command::new("Roadmap Worker")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Runs scheduled roadmap jobs")
        .arg(
            Arg::new("once")
                .long("once")
                .value_name("JOB")
                .help("Run a single job now and exit (overdue-sweep, daily-reminders, weekly-coaching, task-generation)"),
        )
        .get_matches();

    let config = Config::from_env()?;
    init_tracing(&config.logging());

    let pool = create_pool(&config.database())?;
    let store: Arc<dyn EntityStore> = Arc::new(PgStore::new(pool));
    let generator = OpenAiClient::from_config(&config.llm())?
        .map(|client| Arc::new(client) as Arc<dyn TextGenerator>);
    let coaching = Arc::new(CoachingService::new(generator, config.llm()));
    let notifier = TelegramNotifier::from_config(&config.notifications())?
        .map(|n| Arc::new(n) as Arc<dyn Notifier>);
    let runner = Arc::new(JobRunner::new(
        store,
        coaching,
        notifier,
        RetryPolicy::for_notifications(&config.notifications()),
    ));

    if let Some(name) = matches.get_one::<String>("once") {
        let job: Job = name.parse().map_err(AppError::Config)?;
        let report = runner.run(job).await;
        if report.is_total_failure() {
            return Err(AppError::internal(format!("{} failed for every user", job)));
        }
        return Ok(());
    }

    tracing::info!("Worker started");
    runner.run_forever(config.schedule()).await;
    Ok(())
}
