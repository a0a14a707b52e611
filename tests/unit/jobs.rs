use std::sync::Arc;

use chrono::{Duration, Utc};
use roadmap_backend::db::enums::{GoalCategory, MilestoneStatus, TaskSource};
use roadmap_backend::jobs::{Job, JobRunner};
use roadmap_backend::notifications::Notifier;
use roadmap_backend::store::{EntityStore, MemoryStore};

use super::fixtures::{Fixture, RecordingNotifier, add_user, fast_retry, rule_based_coaching};

fn runner(store: &Arc<MemoryStore>, notifier: Option<Arc<RecordingNotifier>>) -> JobRunner {
    let store: Arc<dyn EntityStore> = store.clone();
    let notifier = notifier.map(|n| n as Arc<dyn Notifier>);
    JobRunner::new(store, Arc::new(rule_based_coaching()), notifier, fast_retry())
}

#[tokio::test]
async fn overdue_sweep_survives_a_failing_user() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Career);
    let late = fx.milestone(goal.id, MilestoneStatus::InProgress, Utc::now() - Duration::days(1));
    let upcoming = fx.milestone(goal.id, MilestoneStatus::NotStarted, Utc::now() + Duration::days(1));
    let (stranger, _) = fx.stranger();
    let broken = add_user(&fx.store, "Bob");
    fx.store.fail_user(broken.id).unwrap();

    let report = runner(&fx.store, None).run(Job::OverdueSweep).await;

    assert_eq!(report.job, Job::OverdueSweep);
    assert_eq!(report.succeeded.len(), 2);
    assert!(report.succeeded.contains(&fx.user.id));
    assert!(report.succeeded.contains(&stranger.id));
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, broken.id);
    assert!(!report.is_total_failure());

    let store = &fx.store;
    assert_eq!(store.milestone(late.id).unwrap().unwrap().status, MilestoneStatus::Overdue);
    assert_eq!(store.milestone(upcoming.id).unwrap().unwrap().status, MilestoneStatus::NotStarted);
}

#[tokio::test]
async fn every_user_failing_is_a_total_failure() {
    let fx = Fixture::new();
    fx.store.fail_user(fx.user.id).unwrap();
    let report = runner(&fx.store, None).run(Job::OverdueSweep).await;
    assert!(report.is_total_failure());
}

#[tokio::test]
async fn daily_reminders_go_to_users_with_tasks_today() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Health);
    let m = fx.milestone(goal.id, MilestoneStatus::InProgress, Utc::now() + Duration::days(4));
    fx.task(m.id, None);
    fx.task(m.id, Some(Utc::now()));
    let (stranger, _) = fx.stranger();

    let notifier = Arc::new(RecordingNotifier::default());
    let report = runner(&fx.store, Some(notifier.clone()))
        .run(Job::DailyReminders)
        .await;

    assert_eq!(report.succeeded, vec![fx.user.id]);
    assert_eq!(report.skipped, vec![stranger.id]);
    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "chat-ada");
    assert!(sent[0].1.contains("• Work session (60 min)"));
    assert_eq!(sent[0].1.matches("Work session").count(), 1);
}

#[tokio::test]
async fn failed_delivery_is_reported() {
    let fx = Fixture::new();
    let notifier = Arc::new(RecordingNotifier {
        fail: true,
        ..Default::default()
    });
    let report = runner(&fx.store, Some(notifier.clone()))
        .run(Job::WeeklyCoaching)
        .await;
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, fx.user.id);
    assert_eq!(*notifier.attempts.lock().unwrap(), 3);
}

#[tokio::test]
async fn weekly_digest_uses_rule_based_coaching() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Finance);
    fx.milestone(goal.id, MilestoneStatus::NotStarted, Utc::now() - Duration::days(2));

    let notifier = Arc::new(RecordingNotifier::default());
    let report = runner(&fx.store, Some(notifier.clone()))
        .run(Job::WeeklyCoaching)
        .await;

    assert_eq!(report.succeeded, vec![fx.user.id]);
    let sent = notifier.sent.lock().unwrap();
    let text = &sent[0].1;
    assert!(text.starts_with("Your weekly roadmap review, Ada"));
    assert!(text.contains("Highlights:"));
    assert!(text.contains("Recommendations:"));
    assert!(text.contains("1 milestones are past their due date."));
}

#[tokio::test]
async fn without_notifier_messages_are_skipped() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Health);
    let m = fx.milestone(goal.id, MilestoneStatus::InProgress, Utc::now() + Duration::days(4));
    fx.task(m.id, None);

    let report = runner(&fx.store, None).run(Job::DailyReminders).await;
    assert_eq!(report.skipped, vec![fx.user.id]);
    assert_eq!(report.attempted(), 0);
}

#[tokio::test]
async fn task_generation_is_idempotent() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Education);
    let empty = fx.milestone(goal.id, MilestoneStatus::NotStarted, Utc::now() + Duration::days(10));
    let started = fx.milestone(goal.id, MilestoneStatus::InProgress, Utc::now() + Duration::days(10));
    fx.task(started.id, None);
    fx.milestone(goal.id, MilestoneStatus::Completed, Utc::now());
    let runner = runner(&fx.store, None);

    let first = runner.run(Job::TaskGeneration).await;
    assert_eq!(first.succeeded, vec![fx.user.id]);

    let generated = fx.store.list_roadmap_tasks_by_milestone(empty.id).unwrap();
    assert_eq!(generated.len(), 4);
    assert!(generated.iter().all(|t| t.source == TaskSource::SystemSuggested));
    assert_eq!(fx.store.list_roadmap_tasks_by_milestone(started.id).unwrap().len(), 1);

    let second = runner.run(Job::TaskGeneration).await;
    assert_eq!(second.succeeded, vec![fx.user.id]);
    assert_eq!(fx.store.list_roadmap_tasks(fx.user.id).unwrap().len(), 5);
}
