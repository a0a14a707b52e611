use std::sync::Arc;

use chrono::Utc;

use super::{BatchReport, Job, next_run};
use crate::config::ScheduleConfig;
use crate::db::models::User;
use crate::llm::RetryPolicy;
use crate::notifications::{Delivery, Notifier, deliver};
use crate::services::{CoachingService, RequestContext, TaskGenerationOptions};
use crate::store::EntityStore;

pub struct JobRunner {
    store: Arc<dyn EntityStore>,
    coaching: Arc<CoachingService>,
    notifier: Option<Arc<dyn Notifier>>,
    retry: RetryPolicy,
}

impl JobRunner {
    pub fn new(
        store: Arc<dyn EntityStore>,
        coaching: Arc<CoachingService>,
        notifier: Option<Arc<dyn Notifier>>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            coaching,
            notifier,
            retry,
        }
    }

    pub async fn run(&self, job: Job) -> BatchReport {
        tracing::info!(job = %job, "Starting job");
        let users = match self.store.list_active_users() {
            Ok(users) => users,
            Err(e) => {
                tracing::error!(job = %job, error = %e, "Could not list users, skipping run");
                return BatchReport::new(job);
            }
        };

        let mut report = BatchReport::new(job);
        for user in &users {
            match job {
                Job::OverdueSweep => self.sweep_overdue(user, &mut report),
                Job::DailyReminders => self.send_reminder(user, &mut report).await,
                Job::WeeklyCoaching => self.send_weekly_digest(user, &mut report).await,
                Job::TaskGeneration => self.generate_tasks(user, &mut report).await,
            }
        }
        report.log();
        report
    }

    /// Runs every job on its schedule until ctrl-c.
    pub async fn run_forever(self: Arc<Self>, schedule: ScheduleConfig) {
        let plan = [
            (Job::OverdueSweep, schedule.overdue_sweep_hour, None),
            (Job::DailyReminders, schedule.daily_reminder_hour, None),
            (
                Job::WeeklyCoaching,
                schedule.daily_reminder_hour,
                Some(schedule.weekly_coaching_weekday),
            ),
            (Job::TaskGeneration, schedule.task_generation_hour, None),
        ];

        let handles: Vec<_> = plan
            .into_iter()
            .map(|(job, hour, weekday)| {
                let runner = self.clone();
                tokio::spawn(async move {
                    loop {
                        let now = Utc::now();
                        let at = next_run(now, hour, weekday);
                        tracing::info!(job = %job, next_run = %at, "Job scheduled");
                        let wait = (at - now).to_std().unwrap_or_default();
                        tokio::time::sleep(wait).await;
                        runner.run(job).await;
                    }
                })
            })
            .collect();

        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
        tracing::info!("Shutting down worker");
        for handle in handles {
            handle.abort();
        }
    }

    fn sweep_overdue(&self, user: &User, report: &mut BatchReport) {
        match self.store.mark_overdue_milestones(user.id, Utc::now()) {
            Ok(count) => {
                if count > 0 {
                    tracing::info!(user_id = %user.id, count, "Milestones marked overdue");
                }
                report.success(user.id);
            }
            Err(e) => report.failure(user.id, e),
        }
    }

    async fn send_reminder(&self, user: &User, report: &mut BatchReport) {
        if user.notification_handle().is_none() {
            report.skip(user.id);
            return;
        }
        let today = Utc::now().date_naive();
        let tasks = match self.store.list_roadmap_tasks_scheduled_on(user.id, today) {
            Ok(tasks) => tasks,
            Err(e) => return report.failure(user.id, e),
        };
        if tasks.is_empty() {
            report.skip(user.id);
            return;
        }

        let mut text = format!("Good morning, {}! Today's roadmap tasks:\n", user.name);
        for task in &tasks {
            text.push_str(&format!("• {} ({} min)\n", task.title, task.estimated_duration));
        }
        self.record_delivery(user, &text, report).await;
    }

    async fn send_weekly_digest(&self, user: &User, report: &mut BatchReport) {
        if user.notification_handle().is_none() {
            report.skip(user.id);
            return;
        }
        let ctx = RequestContext::for_user(user.id);
        let coaching = match self
            .coaching
            .generate_weekly_coaching(self.store.as_ref(), &ctx)
            .await
        {
            Ok(coaching) => coaching,
            Err(e) => return report.failure(user.id, e),
        };

        let mut text = format!("Your weekly roadmap review, {}\n", user.name);
        for (title, lines) in [
            ("Highlights", &coaching.highlights),
            ("Insights", &coaching.insights),
            ("Recommendations", &coaching.recommendations),
        ] {
            text.push_str(&format!("\n{}:\n", title));
            for line in lines {
                text.push_str(&format!("• {}\n", line));
            }
        }
        text.push_str(&format!("\n{}", coaching.motivation));
        self.record_delivery(user, &text, report).await;
    }

    /// Fills open milestones that have no tasks yet. Milestones that already
    /// have tasks are left alone, so re-running is harmless.
    async fn generate_tasks(&self, user: &User, report: &mut BatchReport) {
        let ctx = RequestContext::for_user(user.id);
        let milestones = match self.store.list_milestones(user.id) {
            Ok(milestones) => milestones,
            Err(e) => return report.failure(user.id, e),
        };

        let mut created = 0usize;
        for milestone in milestones.iter().filter(|m| m.status.is_open()) {
            let existing = match self.store.list_roadmap_tasks_by_milestone(milestone.id) {
                Ok(existing) => existing,
                Err(e) => return report.failure(user.id, e),
            };
            if !existing.is_empty() {
                continue;
            }
            match self
                .coaching
                .generate_tasks_for_milestone(
                    self.store.as_ref(),
                    &ctx,
                    milestone.id,
                    TaskGenerationOptions::default(),
                )
                .await
            {
                Ok(tasks) => created += tasks.len(),
                Err(e) => return report.failure(user.id, e),
            }
        }
        tracing::debug!(user_id = %user.id, created, "Task generation finished for user");
        report.success(user.id);
    }

    async fn record_delivery(&self, user: &User, text: &str, report: &mut BatchReport) {
        match deliver(
            self.store.as_ref(),
            self.notifier.as_deref(),
            &self.retry,
            user.id,
            text,
        )
        .await
        {
            Delivery::Sent => report.success(user.id),
            Delivery::Skipped => report.skip(user.id),
            Delivery::Failed => report.failure(user.id, "notification delivery failed"),
        }
    }
}
