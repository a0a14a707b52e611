use std::sync::Arc;

use chrono::{Duration, Utc};
use roadmap_backend::coaching::ContentSource;
use roadmap_backend::db::enums::{GoalCategory, MilestoneStatus, TaskSource};
use roadmap_backend::error::AppError;
use roadmap_backend::services::TaskGenerationOptions;

use super::fixtures::{CannedGenerator, FailingGenerator, Fixture, coaching_with, rule_based_coaching};

#[tokio::test]
async fn failing_generator_falls_back_to_rules() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Health);
    fx.milestone(goal.id, MilestoneStatus::NotStarted, Utc::now() - Duration::days(2));

    let generator = Arc::new(FailingGenerator::default());
    let coaching = coaching_with(generator.clone());
    let report = coaching
        .generate_weekly_coaching(fx.store.as_ref(), &fx.ctx())
        .await
        .unwrap();

    assert_eq!(report.source, ContentSource::RuleBased);
    assert!(!report.highlights.is_empty());
    assert!(!report.insights.is_empty());
    assert!(!report.recommendations.is_empty());
    assert!(!report.motivation.is_empty());
    assert_eq!(*generator.calls.lock().unwrap(), 3);
    assert_eq!(report.metrics.bottlenecks.overdue_milestones.len(), 1);
}

#[test]
fn no_generator_means_rule_based() {
    let fx = Fixture::new();
    let coaching = rule_based_coaching();
    assert!(!coaching.has_generator());

    let report = tokio_test::block_on(coaching.generate_weekly_coaching(fx.store.as_ref(), &fx.ctx()))
        .unwrap();
    assert_eq!(report.source, ContentSource::RuleBased);
    assert_eq!(
        report.recommendations.first().map(String::as_str),
        Some("Finish one small task today to start a new streak.")
    );
}

#[tokio::test]
async fn usable_reply_is_used_and_gaps_are_filled() {
    let fx = Fixture::new();
    let reply = "Here is your review.\n\n\
                 **Insights:**\n\
                 - You work best early in the week.\n\n\
                 ## Recommendations\n\
                 1. Move the hardest task to Monday.\n\
                 2) Keep Friday for review.\n";
    let coaching = coaching_with(Arc::new(CannedGenerator(reply.into())));

    let report = coaching
        .generate_weekly_coaching(fx.store.as_ref(), &fx.ctx())
        .await
        .unwrap();
    assert_eq!(report.source, ContentSource::Ai);
    assert_eq!(report.insights, vec!["You work best early in the week."]);
    assert_eq!(
        report.recommendations,
        vec!["Move the hardest task to Monday.", "Keep Friday for review."]
    );
    // missing sections come from the rules
    assert!(!report.highlights.is_empty());
    assert!(!report.motivation.is_empty());
}

#[tokio::test]
async fn reply_without_sections_is_discarded() {
    let fx = Fixture::new();
    let coaching = coaching_with(Arc::new(CannedGenerator("Keep going, you got this!".into())));
    let report = coaching
        .generate_weekly_coaching(fx.store.as_ref(), &fx.ctx())
        .await
        .unwrap();
    assert_eq!(report.source, ContentSource::RuleBased);
}

#[tokio::test]
async fn goal_recommendations_follow_category() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Finance);
    let recs = rule_based_coaching()
        .generate_goal_recommendations(fx.store.as_ref(), &fx.ctx(), goal.id)
        .await
        .unwrap();
    assert_eq!(recs.source, ContentSource::RuleBased);
    assert_eq!(recs.goal_id, goal.id);
    assert_eq!(recs.recommendations.len(), 3);
    assert_eq!(
        recs.recommendations[2],
        "Break this goal into three to five milestones with due dates."
    );

    let (stranger, _) = fx.stranger();
    let ctx = roadmap_backend::services::RequestContext::for_user(stranger.id);
    let err = rule_based_coaching()
        .generate_goal_recommendations(fx.store.as_ref(), &ctx, goal.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound { .. }));
}

#[tokio::test]
async fn malformed_milestone_json_uses_phase_plan() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Education);
    let coaching = coaching_with(Arc::new(CannedGenerator(
        "Sure! [{\"title\": \"Learn\", \"estimated_effort_hours\": \"lots\"".into(),
    )));

    let suggestions = coaching
        .suggest_milestones(fx.store.as_ref(), &fx.ctx(), goal.id)
        .await
        .unwrap();
    assert_eq!(suggestions.len(), 4);
    assert_eq!(suggestions[0].title, format!("{}: Choose the curriculum", goal.title));
    assert!(suggestions.windows(2).all(|w| w[0].due_date < w[1].due_date));
}

#[tokio::test]
async fn generated_milestones_are_parsed() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Career);
    let reply = "```json\n[\
        {\"title\": \"Update CV\", \"description\": \"One page\", \"estimated_effort_hours\": 3, \"due_date\": \"2030-01-15\"},\
        {\"title\": \"  \", \"estimated_effort_hours\": 2, \"due_date\": \"2030-02-01\"}\
    ]\n```";
    let coaching = coaching_with(Arc::new(CannedGenerator(reply.into())));

    let suggestions = coaching
        .suggest_milestones(fx.store.as_ref(), &fx.ctx(), goal.id)
        .await
        .unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].title, "Update CV");
    assert_eq!(suggestions[0].estimated_effort_hours, 3.0);
    assert_eq!(suggestions[0].due_date.date_naive().to_string(), "2030-01-15");
}

#[tokio::test]
async fn rule_sessions_cover_milestone_effort() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Creativity);
    let m = fx.milestone(goal.id, MilestoneStatus::InProgress, Utc::now() + Duration::days(10));
    fx.task(m.id, None);

    let options = TaskGenerationOptions {
        use_ai: false,
        max_task_minutes: 90,
    };
    let tasks = rule_based_coaching()
        .generate_tasks_for_milestone(fx.store.as_ref(), &fx.ctx(), m.id, options)
        .await
        .unwrap();

    let minutes: Vec<i32> = tasks.iter().map(|t| t.estimated_duration).collect();
    assert_eq!(minutes, vec![90, 90]);
    assert!(tasks.iter().all(|t| t.source == TaskSource::SystemSuggested));
    assert!(tasks.iter().all(|t| t.milestone_id == m.id && t.roadmap_id == fx.roadmap.id));
    let today = Utc::now().date_naive();
    assert_eq!(tasks[0].scheduled_date, today);
    assert_eq!(tasks[1].scheduled_date, today + Duration::days(1));

    // the milestone is now fully scheduled
    let again = rule_based_coaching()
        .generate_tasks_for_milestone(fx.store.as_ref(), &fx.ctx(), m.id, options)
        .await
        .unwrap();
    assert!(again.is_empty());
}

#[tokio::test]
async fn ai_sessions_are_capped() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Personal);
    let m = fx.milestone(goal.id, MilestoneStatus::NotStarted, Utc::now() + Duration::days(3));
    let reply = r#"[{"title": "Outline", "estimated_minutes": 30}, {"title": "Deep work", "estimated_minutes": 500}]"#;
    let coaching = coaching_with(Arc::new(CannedGenerator(reply.into())));

    let tasks = coaching
        .generate_tasks_for_milestone(fx.store.as_ref(), &fx.ctx(), m.id, TaskGenerationOptions::default())
        .await
        .unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].title, "Outline");
    assert_eq!(tasks[1].estimated_duration, 60);
    assert!(tasks.iter().all(|t| t.source == TaskSource::AiGenerated));
}

#[tokio::test]
async fn task_generation_rejects_bad_input() {
    let fx = Fixture::new();
    let goal = fx.goal(GoalCategory::Other);
    let done = fx.milestone(goal.id, MilestoneStatus::Completed, Utc::now());
    let open = fx.milestone(goal.id, MilestoneStatus::NotStarted, Utc::now() + Duration::days(3));
    let coaching = rule_based_coaching();

    let err = coaching
        .generate_tasks_for_milestone(fx.store.as_ref(), &fx.ctx(), done.id, TaskGenerationOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));

    for max_task_minutes in [14, 241] {
        let options = TaskGenerationOptions {
            use_ai: false,
            max_task_minutes,
        };
        let err = coaching
            .generate_tasks_for_milestone(fx.store.as_ref(), &fx.ctx(), open.id, options)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }), "{max_task_minutes} minutes");
    }
}
