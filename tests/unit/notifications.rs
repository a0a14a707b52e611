use std::sync::Arc;

use chrono::{Duration, Utc};
use roadmap_backend::db::enums::{GoalCategory, MilestoneStatus};
use roadmap_backend::notifications::{ChannelSink, Delivery, Notifier, deliver, run_dispatcher};
use roadmap_backend::services::ProgressService;
use roadmap_backend::store::EntityStore;

use super::fixtures::{Fixture, RecordingNotifier, fast_retry};

#[tokio::test]
async fn goal_completion_reaches_the_owner_chat() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Relationships);
    let m = fx.milestone(goal.id, MilestoneStatus::InProgress, Utc::now() + Duration::days(2));

    let (sink, rx) = ChannelSink::new();
    let notifier = Arc::new(RecordingNotifier::default());
    let store: Arc<dyn EntityStore> = fx.store.clone();
    let dispatcher = tokio::spawn(run_dispatcher(
        rx,
        store,
        Some(notifier.clone() as Arc<dyn Notifier>),
        fast_retry(),
    ));

    ProgressService::update_milestone_status(
        fx.store.as_ref(),
        &sink,
        &fx.ctx(),
        m.id,
        MilestoneStatus::Completed,
    )
    .unwrap();
    drop(sink);
    dispatcher.await.unwrap();

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "chat-ada");
    assert!(sent[0].1.contains(&goal.title));
}

#[tokio::test]
async fn opted_out_users_are_skipped() {
    let fx = Fixture::new();
    let mut user = fx.user.clone();
    user.notifications_enabled = false;
    fx.store.insert_user(user).unwrap();
    let notifier = RecordingNotifier::default();

    let retry = fast_retry();

    let outcome = deliver(
        fx.store.as_ref(),
        Some(&notifier as &dyn Notifier),
        &retry,
        fx.user.id,
        "hello",
    )
    .await;
    assert_eq!(outcome, Delivery::Skipped);
    assert!(notifier.sent.lock().unwrap().is_empty());

    let unknown = deliver(
        fx.store.as_ref(),
        Some(&notifier as &dyn Notifier),
        &retry,
        uuid::Uuid::new_v4(),
        "hello",
    )
    .await;
    assert_eq!(unknown, Delivery::Skipped);
    assert_eq!(*notifier.attempts.lock().unwrap(), 0);
}

#[tokio::test]
async fn transient_send_failure_is_retried() {
    let fx = Fixture::new();
    let notifier = RecordingNotifier::flaky(1);

    let outcome = deliver(
        fx.store.as_ref(),
        Some(&notifier as &dyn Notifier),
        &fast_retry(),
        fx.user.id,
        "Keep going",
    )
    .await;

    assert_eq!(outcome, Delivery::Sent);
    assert_eq!(*notifier.attempts.lock().unwrap(), 2);
    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.as_slice(), &[("chat-ada".to_string(), "Keep going".to_string())]);
}

#[tokio::test]
async fn persistent_send_failure_gives_up() {
    let fx = Fixture::new();
    let notifier = RecordingNotifier::flaky(10);

    let outcome = deliver(
        fx.store.as_ref(),
        Some(&notifier as &dyn Notifier),
        &fast_retry(),
        fx.user.id,
        "Keep going",
    )
    .await;

    assert_eq!(outcome, Delivery::Failed);
    assert_eq!(*notifier.attempts.lock().unwrap(), 3);
    assert!(notifier.sent.lock().unwrap().is_empty());
}
