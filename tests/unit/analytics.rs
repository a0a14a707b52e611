use chrono::{Duration, Utc};
use roadmap_backend::analytics::{Confidence, Severity};
use roadmap_backend::db::enums::{GoalCategory, MilestoneStatus};
use roadmap_backend::error::AppError;
use roadmap_backend::notifications::RecordingSink;
use roadmap_backend::services::{AnalyticsService, ProgressService};

use super::fixtures::Fixture;

#[test]
fn velocity_window_is_validated() {
    let fx = Fixture::new();
    for days in [0, 366] {
        let err = AnalyticsService::calculate_velocity(fx.store.as_ref(), &fx.ctx(), days).unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }), "window {days}");
    }
    assert!(AnalyticsService::calculate_velocity(fx.store.as_ref(), &fx.ctx(), 365).is_ok());
}

#[test]
fn velocity_buckets_recent_completions() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Career);
    let m = fx.milestone(goal.id, MilestoneStatus::InProgress, Utc::now() + Duration::days(20));
    let hour_ago = Utc::now() - Duration::hours(1);
    for _ in 0..4 {
        fx.task(m.id, Some(hour_ago));
    }
    fx.task(m.id, None);
    fx.task(m.id, Some(Utc::now() - Duration::days(45)));

    let report = AnalyticsService::calculate_velocity(fx.store.as_ref(), &fx.ctx(), 30).unwrap();
    assert_eq!(report.weeks.len(), 5);
    assert_eq!(report.totals.tasks_completed, 4);
    assert_eq!(report.totals.hours_completed, 4.0);
    assert_eq!(report.averages.hours_per_week, 0.8);
    assert_eq!(report.weeks.last().unwrap().tasks_completed, 4);
}

#[test]
fn prediction_without_velocity_is_low_confidence() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Health);
    let future = Utc::now() + Duration::days(40);
    fx.milestone(goal.id, MilestoneStatus::NotStarted, future);
    fx.milestone(goal.id, MilestoneStatus::Skipped, future);
    fx.milestone(goal.id, MilestoneStatus::Overdue, Utc::now() - Duration::days(2));

    let prediction = AnalyticsService::predict_completion(fx.store.as_ref(), &fx.ctx(), fx.roadmap.id).unwrap();
    assert_eq!(prediction.remaining_hours, 8.0);
    assert_eq!(prediction.confidence, Confidence::Low);
    assert_eq!(prediction.predicted_completion_date, None);
    assert_eq!(prediction.on_track, None);
    assert_eq!(prediction.sample_size, 0);
}

#[test]
fn prediction_projects_from_recent_hours() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Education);
    let m = fx.milestone(goal.id, MilestoneStatus::InProgress, Utc::now() + Duration::days(40));
    for _ in 0..4 {
        fx.task(m.id, Some(Utc::now() - Duration::hours(2)));
    }

    let prediction = AnalyticsService::predict_completion(fx.store.as_ref(), &fx.ctx(), fx.roadmap.id).unwrap();
    assert_eq!(prediction.remaining_hours, 4.0);
    assert_eq!(prediction.hours_per_week, 0.8);
    assert_eq!(prediction.weeks_needed, Some(5.0));
    assert_eq!(prediction.sample_size, 4);
    assert_eq!(prediction.confidence, Confidence::Low);
    // the roadmap runs for years, so five weeks is comfortably on track
    assert_eq!(prediction.on_track, Some(true));
    assert!(prediction.predicted_completion_date.unwrap() > Utc::now() + Duration::days(34));
}

#[test]
fn bottlenecks_flag_struggling_goals() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Finance);
    let past = Utc::now() - Duration::days(3);
    for _ in 0..4 {
        fx.milestone(goal.id, MilestoneStatus::NotStarted, past);
    }
    let healthy = fx.goal(GoalCategory::Career);
    fx.milestone(healthy.id, MilestoneStatus::Completed, Utc::now() + Duration::days(3));

    let report = AnalyticsService::detect_bottlenecks(fx.store.as_ref(), &fx.ctx()).unwrap();
    assert_eq!(report.overdue_milestones.len(), 4);
    assert!(report.overdue_milestones.iter().all(|m| m.days_overdue == 3));
    assert_eq!(report.struggling_goals.len(), 1);
    assert_eq!(report.struggling_goals[0].goal_id, goal.id);
    assert_eq!(report.struggling_goals[0].completion_rate, 0.0);
    assert_eq!(report.severity, Severity::Medium);
    assert!(!report.is_clear());
}

#[test]
fn empty_account_has_clear_report() {
    let fx = Fixture::new();
    let report = AnalyticsService::detect_bottlenecks(fx.store.as_ref(), &fx.ctx()).unwrap();
    assert!(report.is_clear());
    assert_eq!(report.severity, Severity::Low);

    let streak = AnalyticsService::get_streak(fx.store.as_ref(), &fx.ctx()).unwrap();
    assert_eq!(streak.current_streak, 0);
    assert_eq!(streak.last_completed_date, None);
}

#[test]
fn streak_counts_consecutive_days() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Personal);
    let m = fx.milestone(goal.id, MilestoneStatus::InProgress, Utc::now() + Duration::days(5));
    let now = Utc::now();
    for days_ago in [0, 0, 1, 2, 5, 6] {
        fx.task(m.id, Some(now - Duration::days(days_ago)));
    }

    let streak = AnalyticsService::get_streak(fx.store.as_ref(), &fx.ctx()).unwrap();
    assert_eq!(streak.current_streak, 3);
    assert_eq!(streak.longest_streak, 3);
    assert_eq!(streak.total_active_days, 5);
}

#[test]
fn coaching_metrics_summarise_goals() {
    let fx = Fixture::new();
    let done = fx.goal(GoalCategory::Career);
    fx.milestone(done.id, MilestoneStatus::Completed, Utc::now());
    ProgressService::recompute_goal_progress(
        fx.store.as_ref(),
        &RecordingSink::new(),
        &fx.ctx(),
        done.id,
    )
    .unwrap();
    fx.goal(GoalCategory::Health);

    let metrics = AnalyticsService::coaching_metrics(fx.store.as_ref(), &fx.ctx()).unwrap();
    assert_eq!(metrics.completed_goals, 1);
    assert_eq!(metrics.active_goals, 1);
    assert_eq!(metrics.average_goal_progress, 50.0);
    assert_eq!(metrics.velocity.window_days, 30);
}
