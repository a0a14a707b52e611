use chrono::{Duration, Utc};
use roadmap_backend::db::enums::{GoalCategory, MilestoneStatus};
use roadmap_backend::error::AppError;
use roadmap_backend::store::{DateRange, EntityStore};

use super::fixtures::Fixture;

#[test]
fn date_range_rejects_reversed_bounds() {
    let now = Utc::now();
    let err = DateRange::new(now, now - Duration::seconds(1)).unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));

    let range = DateRange::new(now - Duration::days(1), now).unwrap();
    assert!(range.contains(now));
    assert!(range.contains(now - Duration::days(1)));
    assert!(!range.contains(now + Duration::seconds(1)));
}

#[test]
fn lookups_are_scoped_to_the_owner() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Career);
    let m = fx.milestone(goal.id, MilestoneStatus::InProgress, Utc::now());
    let task = fx.task(m.id, None);
    let (stranger, stranger_roadmap) = fx.stranger();
    let store = fx.store.as_ref();

    assert!(store.find_roadmap(fx.user.id, fx.roadmap.id).unwrap().is_some());
    assert!(store.find_roadmap(stranger.id, fx.roadmap.id).unwrap().is_none());
    assert!(store.find_roadmap(fx.user.id, stranger_roadmap.id).unwrap().is_none());
    assert!(store.find_goal(stranger.id, goal.id).unwrap().is_none());
    assert!(store.find_milestone(stranger.id, m.id).unwrap().is_none());
    assert!(store.find_roadmap_task(stranger.id, task.id).unwrap().is_none());

    assert!(store.list_goals(stranger.id).unwrap().is_empty());
    assert!(store.list_milestones(stranger.id).unwrap().is_empty());
    assert!(store.list_roadmap_tasks(stranger.id).unwrap().is_empty());
    assert_eq!(store.list_roadmaps(stranger.id).unwrap().len(), 1);
    assert_eq!(store.list_milestones(fx.user.id).unwrap().len(), 1);
}

#[test]
fn completed_queries_respect_the_window() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Health);
    let m = fx.milestone(goal.id, MilestoneStatus::InProgress, Utc::now());
    let now = Utc::now();
    fx.task(m.id, Some(now - Duration::days(2)));
    fx.task(m.id, Some(now - Duration::days(40)));
    fx.task(m.id, None);

    let store = fx.store.as_ref();
    let recent = store
        .list_completed_roadmap_tasks(fx.user.id, Some(DateRange::trailing_days(now, 30)))
        .unwrap();
    assert_eq!(recent.len(), 1);
    let all = store.list_completed_roadmap_tasks(fx.user.id, None).unwrap();
    assert_eq!(all.len(), 2);
    assert!(all[0].completed_at < all[1].completed_at);
}

#[test]
fn overdue_marking_touches_only_open_past_milestones() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Finance);
    let past = Utc::now() - Duration::days(1);
    let open = fx.milestone(goal.id, MilestoneStatus::NotStarted, past);
    let skipped = fx.milestone(goal.id, MilestoneStatus::Skipped, past);
    let done = fx.milestone(goal.id, MilestoneStatus::Completed, past);

    let store = fx.store.as_ref();
    assert_eq!(store.mark_overdue_milestones(fx.user.id, Utc::now()).unwrap(), 1);
    assert_eq!(store.mark_overdue_milestones(fx.user.id, Utc::now()).unwrap(), 0);
    assert_eq!(fx.store.milestone(open.id).unwrap().unwrap().status, MilestoneStatus::Overdue);
    assert_eq!(fx.store.milestone(skipped.id).unwrap().unwrap().status, MilestoneStatus::Skipped);
    assert_eq!(fx.store.milestone(done.id).unwrap().unwrap().status, MilestoneStatus::Completed);
}

#[test]
fn failing_user_only_breaks_their_queries() {
    let fx = Fixture::new();
    let (stranger, _) = fx.stranger();
    fx.store.fail_user(stranger.id).unwrap();

    let store = fx.store.as_ref();
    assert!(store.list_goals(stranger.id).is_err());
    assert!(store.list_goals(fx.user.id).is_ok());
    assert_eq!(store.list_active_users().unwrap().len(), 2);
}
