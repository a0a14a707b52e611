use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    coaching::{
        self, CoachingReport, ContentSource, GoalRecommendations, MilestoneSuggestion, TaskDraft,
        prompts, rules,
    },
    config::LlmConfig,
    db::enums::{MilestoneStatus, TaskSource},
    db::models::{NewRoadmapTask, RoadmapTask},
    error::{AppError, AppResult},
    llm::{GenerationRequest, RetryPolicy, TextGenerator, json_array_slice, parse_sections},
    services::{analytics_service::AnalyticsService, context::RequestContext},
    store::EntityStore,
};

pub const DEFAULT_MAX_TASK_MINUTES: i32 = 60;
pub const MIN_TASK_MINUTES: i32 = 15;
pub const MAX_TASK_MINUTES: i32 = 240;

#[derive(Debug, Clone, Copy)]
pub struct TaskGenerationOptions {
    pub use_ai: bool,
    pub max_task_minutes: i32,
}

impl Default for TaskGenerationOptions {
    fn default() -> Self {
        Self {
            use_ai: true,
            max_task_minutes: DEFAULT_MAX_TASK_MINUTES,
        }
    }
}

#[derive(Deserialize)]
struct GeneratedMilestone {
    title: String,
    #[serde(default)]
    description: Option<String>,
    estimated_effort_hours: f64,
    due_date: NaiveDate,
}

#[derive(Deserialize)]
struct GeneratedTask {
    title: String,
    #[serde(default)]
    description: Option<String>,
    estimated_minutes: i32,
}

/// Coaching and task generation with a rule-based fallback.
///
/// Text generation is attempted only when a generator is configured. Any
/// failure after retries, or a reply that cannot be used, falls back to the
/// templates in [`coaching::rules`] and is never surfaced to the caller.
pub struct CoachingService {
    generator: Option<Arc<dyn TextGenerator>>,
    retry: RetryPolicy,
    llm: LlmConfig,
}

impl CoachingService {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, llm: LlmConfig) -> Self {
        Self {
            generator,
            retry: RetryPolicy::from_config(&llm),
            llm,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    async fn ask(&self, operation: &str, system: &str, prompt: String) -> Option<String> {
        let generator = self.generator.as_ref()?;
        let request = GenerationRequest::new(&self.llm, system, prompt);
        let request = &request;
        match self.retry.run(operation, move || generator.generate(request)).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(operation, error = %e, "Text generation failed, using rule-based fallback");
                None
            }
        }
    }

    pub async fn generate_weekly_coaching(
        &self,
        store: &dyn EntityStore,
        ctx: &RequestContext,
    ) -> AppResult<CoachingReport> {
        let metrics = AnalyticsService::coaching_metrics(store, ctx)?;
        let fallback = rules::weekly_coaching(&metrics);

        let parsed = self
            .ask("weekly_coaching", prompts::COACH_SYSTEM, prompts::weekly_coaching(&metrics))
            .await
            .map(|reply| parse_sections(&reply))
            .filter(|parsed| parsed.is_usable());

        let (text, source) = match parsed {
            Some(parsed) => (
                rules::CoachingText {
                    highlights: non_empty_or(parsed.highlights, fallback.highlights),
                    insights: non_empty_or(parsed.insights, fallback.insights),
                    recommendations: non_empty_or(parsed.recommendations, fallback.recommendations),
                    motivation: parsed.motivation.unwrap_or(fallback.motivation),
                },
                ContentSource::Ai,
            ),
            None => (fallback, ContentSource::RuleBased),
        };
        tracing::info!(user_id = %ctx.user_id, source = ?source, "Weekly coaching generated");

        Ok(CoachingReport {
            highlights: text.highlights,
            insights: text.insights,
            recommendations: text.recommendations,
            motivation: text.motivation,
            metrics,
            source,
            generated_at: Utc::now(),
        })
    }

    pub async fn generate_goal_recommendations(
        &self,
        store: &dyn EntityStore,
        ctx: &RequestContext,
        goal_id: Uuid,
    ) -> AppResult<GoalRecommendations> {
        let goal = store
            .find_goal(ctx.user_id, goal_id)?
            .ok_or_else(|| AppError::not_found("Goal"))?;
        let milestones = store.list_milestones_by_goal(goal.id)?;

        let generated = self
            .ask(
                "goal_recommendations",
                prompts::COACH_SYSTEM,
                prompts::goal_recommendations(&goal, &milestones),
            )
            .await
            .map(|reply| parse_sections(&reply).recommendations)
            .filter(|recs| !recs.is_empty());

        let (recommendations, source) = match generated {
            Some(recs) => (recs, ContentSource::Ai),
            None => (
                rules::goal_recommendations(&goal, &milestones, Utc::now()),
                ContentSource::RuleBased,
            ),
        };

        Ok(GoalRecommendations {
            goal_id: goal.id,
            goal_title: goal.title,
            completion_percentage: goal.completion_percentage,
            recommendations,
            source,
        })
    }

    pub async fn suggest_milestones(
        &self,
        store: &dyn EntityStore,
        ctx: &RequestContext,
        goal_id: Uuid,
    ) -> AppResult<Vec<MilestoneSuggestion>> {
        let goal = store
            .find_goal(ctx.user_id, goal_id)?
            .ok_or_else(|| AppError::not_found("Goal"))?;
        let roadmap = store
            .find_roadmap(ctx.user_id, goal.roadmap_id)?
            .ok_or_else(|| AppError::not_found("Roadmap"))?;
        let now = Utc::now();
        let target_end = rules::target_year_end(&goal, &roadmap);

        let generated = self
            .ask(
                "milestone_suggestions",
                prompts::PLANNER_SYSTEM,
                prompts::milestone_suggestions(&goal, now.date_naive(), target_end),
            )
            .await
            .and_then(|reply| parse_json_array::<GeneratedMilestone>(&reply))
            .map(|rows| {
                rows.into_iter()
                    .filter(|m| !m.title.trim().is_empty() && m.estimated_effort_hours > 0.0)
                    .map(|m| MilestoneSuggestion {
                        title: m.title.trim().to_string(),
                        description: m.description.unwrap_or_default(),
                        estimated_effort_hours: m.estimated_effort_hours,
                        due_date: m.due_date.and_time(NaiveTime::MIN).and_utc(),
                    })
                    .collect::<Vec<_>>()
            })
            .filter(|rows| !rows.is_empty());

        Ok(match generated {
            Some(suggestions) => suggestions,
            None => rules::milestone_plan(&goal, &roadmap, now),
        })
    }

    /// Creates and stores work sessions for the milestone's unscheduled effort.
    pub async fn generate_tasks_for_milestone(
        &self,
        store: &dyn EntityStore,
        ctx: &RequestContext,
        milestone_id: Uuid,
        options: TaskGenerationOptions,
    ) -> AppResult<Vec<RoadmapTask>> {
        if !(MIN_TASK_MINUTES..=MAX_TASK_MINUTES).contains(&options.max_task_minutes) {
            return Err(AppError::validation(format!(
                "max_task_minutes must be between {} and {}",
                MIN_TASK_MINUTES, MAX_TASK_MINUTES
            )));
        }
        let milestone = store
            .find_milestone(ctx.user_id, milestone_id)?
            .ok_or_else(|| AppError::not_found("Milestone"))?;
        if matches!(milestone.status, MilestoneStatus::Completed | MilestoneStatus::Skipped) {
            return Err(AppError::validation(format!(
                "Cannot generate tasks for a {} milestone",
                milestone.status
            )));
        }
        let goal = store
            .find_goal(ctx.user_id, milestone.goal_id)?
            .ok_or_else(|| AppError::not_found("Goal"))?;

        let scheduled_minutes: i64 = store
            .list_roadmap_tasks_by_milestone(milestone.id)?
            .iter()
            .map(|t| t.estimated_duration as i64)
            .sum();
        let remaining =
            (milestone.estimated_effort_hours.max(0.0) * 60.0).round() as i64 - scheduled_minutes;
        if remaining <= 0 {
            tracing::info!(milestone_id = %milestone.id, "Milestone effort already scheduled");
            return Ok(Vec::new());
        }

        let generated = if options.use_ai {
            self.ask(
                "task_breakdown",
                prompts::PLANNER_SYSTEM,
                prompts::task_breakdown(&milestone, remaining, options.max_task_minutes),
            )
            .await
            .and_then(|reply| parse_json_array::<GeneratedTask>(&reply))
            .map(|rows| {
                rows.into_iter()
                    .filter(|t| !t.title.trim().is_empty() && t.estimated_minutes > 0)
                    .map(|t| TaskDraft {
                        title: t.title.trim().to_string(),
                        description: t.description,
                        estimated_minutes: t.estimated_minutes.min(options.max_task_minutes),
                    })
                    .collect::<Vec<_>>()
            })
            .filter(|drafts| !drafts.is_empty())
        } else {
            None
        };

        let (drafts, source) = match generated {
            Some(drafts) => (drafts, TaskSource::AiGenerated),
            None => (
                rules::task_sessions(&milestone, scheduled_minutes, options.max_task_minutes),
                TaskSource::SystemSuggested,
            ),
        };

        let today = Utc::now().date_naive();
        let days = coaching::schedule_drafts(drafts.len(), today, milestone.due_date.date_naive());
        let new_tasks: Vec<NewRoadmapTask> = drafts
            .into_iter()
            .zip(days)
            .map(|(draft, scheduled_date)| NewRoadmapTask {
                milestone_id: milestone.id,
                roadmap_id: goal.roadmap_id,
                title: draft.title,
                description: draft.description,
                scheduled_date,
                estimated_duration: draft.estimated_minutes,
                priority: goal.priority,
                source,
            })
            .collect();

        let created = store.insert_roadmap_tasks(&new_tasks)?;
        tracing::info!(
            milestone_id = %milestone.id,
            count = created.len(),
            source = %source,
            "Roadmap tasks generated"
        );
        Ok(created)
    }
}

fn non_empty_or(primary: Vec<String>, fallback: Vec<String>) -> Vec<String> {
    if primary.is_empty() { fallback } else { primary }
}

fn parse_json_array<T: serde::de::DeserializeOwned>(reply: &str) -> Option<Vec<T>> {
    let slice = json_array_slice(reply)?;
    match serde_json::from_str(slice) {
        Ok(rows) => Some(rows),
        Err(e) => {
            tracing::warn!(error = %e, "Generated JSON could not be parsed, using rule-based fallback");
            None
        }
    }
}
