use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{Duration, Utc};
use roadmap_backend::analytics::Severity;
use roadmap_backend::db::enums::{GoalCategory, GoalStatus, MilestoneStatus};
use roadmap_backend::error::AppError;
use roadmap_backend::notifications::{ProgressEvent, RecordingSink};
use roadmap_backend::services::{AnalyticsService, ProgressService, RequestContext};

use super::fixtures::Fixture;

#[test]
fn two_of_three_then_overdue_bottleneck() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Career);
    let future = Utc::now() + Duration::days(30);
    fx.milestone(goal.id, MilestoneStatus::Completed, future);
    fx.milestone(goal.id, MilestoneStatus::Completed, future);
    let late = fx.milestone(goal.id, MilestoneStatus::NotStarted, Utc::now() - Duration::days(1));

    let sink = RecordingSink::new();
    let updated =
        ProgressService::recompute_goal_progress(fx.store.as_ref(), &sink, &fx.ctx(), goal.id).unwrap();
    assert_eq!(updated.completion_percentage, 66.67);
    assert_eq!(updated.status, GoalStatus::InProgress);

    let report = AnalyticsService::detect_bottlenecks(fx.store.as_ref(), &fx.ctx()).unwrap();
    assert_eq!(report.overdue_milestones.len(), 1);
    assert_eq!(report.overdue_milestones[0].milestone_id, late.id);
    assert_eq!(report.overdue_milestones[0].days_overdue, 1);
    assert_eq!(report.severity, Severity::Low);
    assert!(sink.events().is_empty());
}

#[test]
fn completion_emits_exactly_one_event() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Health);
    let future = Utc::now() + Duration::days(10);
    fx.milestone(goal.id, MilestoneStatus::Completed, future);
    let open = fx.milestone(goal.id, MilestoneStatus::InProgress, future);

    let sink = RecordingSink::new();
    let change = ProgressService::update_milestone_status(
        fx.store.as_ref(),
        &sink,
        &fx.ctx(),
        open.id,
        MilestoneStatus::Completed,
    )
    .unwrap();
    assert_eq!(change.goal.status, GoalStatus::Completed);
    assert!(change.goal.completed_at.is_some());
    assert!(change.milestone.completed_at.is_some());
    assert_eq!(change.roadmap.progress_percentage, 100.0);

    ProgressService::recompute_goal_progress(fx.store.as_ref(), &sink, &fx.ctx(), goal.id).unwrap();

    let events = sink.events();
    assert_eq!(events.len(), 1);
    match &events[0] {
        ProgressEvent::GoalCompleted {
            goal_id, user_id, ..
        } => {
            assert_eq!(*goal_id, goal.id);
            assert_eq!(*user_id, fx.user.id);
        }
    }
}

#[test]
fn reopening_a_milestone_clears_completion() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Finance);
    let m = fx.milestone(goal.id, MilestoneStatus::NotStarted, Utc::now() + Duration::days(5));
    let sink = RecordingSink::new();

    ProgressService::update_milestone_status(fx.store.as_ref(), &sink, &fx.ctx(), m.id, MilestoneStatus::Completed)
        .unwrap();
    let change = ProgressService::update_milestone_status(
        fx.store.as_ref(),
        &sink,
        &fx.ctx(),
        m.id,
        MilestoneStatus::InProgress,
    )
    .unwrap();

    assert_eq!(change.goal.status, GoalStatus::NotStarted);
    assert_eq!(change.goal.completed_at, None);
    assert_eq!(change.milestone.completed_at, None);
    assert_eq!(change.roadmap.progress_percentage, 0.0);
}

#[test]
fn roadmap_progress_is_mean_of_goals() {
    let fx = Fixture::new();
    let sink = RecordingSink::new();
    let future = Utc::now() + Duration::days(5);

    let done = fx.goal(GoalCategory::Career);
    fx.milestone(done.id, MilestoneStatus::Completed, future);
    let half = fx.goal(GoalCategory::Health);
    fx.milestone(half.id, MilestoneStatus::Completed, future);
    fx.milestone(half.id, MilestoneStatus::NotStarted, future);
    fx.goal(GoalCategory::Other);

    for goal_id in [done.id, half.id] {
        ProgressService::recompute_goal_progress(fx.store.as_ref(), &sink, &fx.ctx(), goal_id).unwrap();
    }
    let roadmap =
        ProgressService::recompute_roadmap_progress(fx.store.as_ref(), &fx.ctx(), fx.roadmap.id).unwrap();
    assert_eq!(roadmap.progress_percentage, 50.0);
}

#[test]
fn last_task_completes_the_milestone() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Education);
    let m = fx.milestone(goal.id, MilestoneStatus::InProgress, Utc::now() + Duration::days(3));
    let first = fx.task(m.id, None);
    let second = fx.task(m.id, None);
    let sink = RecordingSink::new();

    let outcome =
        ProgressService::complete_roadmap_task(fx.store.as_ref(), &sink, &fx.ctx(), first.id).unwrap();
    assert!(outcome.task.is_completed());
    assert!(outcome.progress.is_none());

    let outcome =
        ProgressService::complete_roadmap_task(fx.store.as_ref(), &sink, &fx.ctx(), second.id).unwrap();
    let progress = outcome.progress.expect("milestone should complete");
    assert_eq!(progress.milestone.status, MilestoneStatus::Completed);
    assert_eq!(progress.goal.completion_percentage, 100.0);
    assert_eq!(sink.events().len(), 1);

    // completing again is a no-op
    let again =
        ProgressService::complete_roadmap_task(fx.store.as_ref(), &sink, &fx.ctx(), second.id).unwrap();
    assert!(again.progress.is_none());
    assert_eq!(sink.events().len(), 1);
}

#[test]
fn promote_links_once() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Personal);
    let m = fx.milestone(goal.id, MilestoneStatus::InProgress, Utc::now() + Duration::days(3));
    let task = fx.task(m.id, None);

    let (linked, planner) =
        ProgressService::promote_roadmap_task(fx.store.as_ref(), &fx.ctx(), task.id).unwrap();
    assert_eq!(linked.task_id, Some(planner.id));
    assert_eq!(planner.title, task.title);
    assert_eq!(planner.due_date, Some(task.scheduled_date));
    assert_eq!(planner.user_id, fx.user.id);

    let err = ProgressService::promote_roadmap_task(fx.store.as_ref(), &fx.ctx(), task.id).unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));
}

#[test]
fn foreign_ids_are_not_found() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Career);
    let m = fx.milestone(goal.id, MilestoneStatus::InProgress, Utc::now());
    let task = fx.task(m.id, None);
    let (stranger, _) = fx.stranger();
    let ctx = RequestContext::for_user(stranger.id);
    let sink = RecordingSink::new();
    let store = fx.store.as_ref();

    let not_found = |err: AppError| matches!(err, AppError::NotFound { .. });
    assert!(not_found(ProgressService::recompute_goal_progress(store, &sink, &ctx, goal.id).unwrap_err()));
    assert!(not_found(ProgressService::recompute_roadmap_progress(store, &ctx, fx.roadmap.id).unwrap_err()));
    assert!(not_found(
        ProgressService::update_milestone_status(store, &sink, &ctx, m.id, MilestoneStatus::Skipped).unwrap_err()
    ));
    assert!(not_found(ProgressService::complete_roadmap_task(store, &sink, &ctx, task.id).unwrap_err()));
    assert!(not_found(ProgressService::promote_roadmap_task(store, &ctx, task.id).unwrap_err()));
    assert!(not_found(AnalyticsService::predict_completion(store, &ctx, fx.roadmap.id).unwrap_err()));

    // the owner's data is untouched
    assert_eq!(fx.store.milestone(m.id).unwrap().unwrap().status, MilestoneStatus::InProgress);
}

#[test]
fn concurrent_recomputes_converge() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Creativity);
    let future = Utc::now() + Duration::days(5);
    for status in [
        MilestoneStatus::Completed,
        MilestoneStatus::InProgress,
        MilestoneStatus::Completed,
        MilestoneStatus::NotStarted,
    ] {
        fx.milestone(goal.id, status, future);
    }
    let sink = Arc::new(RecordingSink::new());

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let store = fx.store.clone();
            let sink = sink.clone();
            let ctx = fx.ctx();
            let roadmap_id = fx.roadmap.id;
            thread::spawn(move || {
                for _ in 0..25 {
                    ProgressService::recompute_goal_progress(store.as_ref(), sink.as_ref(), &ctx, goal.id)
                        .unwrap();
                    ProgressService::recompute_roadmap_progress(store.as_ref(), &ctx, roadmap_id).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let goal = fx.store.goal(goal.id).unwrap().unwrap();
    assert_eq!(goal.completion_percentage, 50.0);
    assert_eq!(goal.status, GoalStatus::InProgress);
    let roadmap = fx.store.roadmap(fx.roadmap.id).unwrap().unwrap();
    assert_eq!(roadmap.progress_percentage, 50.0);
}

#[test]
fn racing_recomputes_announce_completion_once() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Health);
    let future = Utc::now() + Duration::days(3);
    fx.milestone(goal.id, MilestoneStatus::Completed, future);
    fx.milestone(goal.id, MilestoneStatus::Completed, future);
    let sink = Arc::new(RecordingSink::new());
    let start = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = fx.store.clone();
            let sink = sink.clone();
            let start = start.clone();
            let ctx = fx.ctx();
            thread::spawn(move || {
                start.wait();
                ProgressService::recompute_goal_progress(store.as_ref(), sink.as_ref(), &ctx, goal.id)
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        let saved = handle.join().unwrap();
        assert_eq!(saved.status, GoalStatus::Completed);
    }

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], ProgressEvent::GoalCompleted { goal_id, .. } if goal_id == goal.id));
}
