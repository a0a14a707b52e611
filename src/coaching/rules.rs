//! Deterministic coaching used when text generation is unavailable.

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, Utc};

use super::{CoachingMetrics, MilestoneSuggestion, TaskDraft};
use crate::analytics::{Severity, Trend};
use crate::db::enums::{GoalCategory, MilestoneStatus};
use crate::db::models::{Goal, Milestone, Roadmap};

const STREAK_HIGHLIGHT_DAYS: u32 = 3;
const FALLBACK_PHASE_SPACING_DAYS: i64 = 30;

/// Sections of a coaching report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoachingText {
    pub highlights: Vec<String>,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub motivation: String,
}

struct Phase {
    title: &'static str,
    description: &'static str,
    hours: f64,
}

const fn phase(title: &'static str, description: &'static str, hours: f64) -> Phase {
    Phase {
        title,
        description,
        hours,
    }
}

fn phases(category: GoalCategory) -> [Phase; 4] {
    match category {
        GoalCategory::Career => [
            phase("Define the target role", "Write down the role, skills gap and people to talk to.", 6.0),
            phase("Build the missing skills", "Close the biggest skills gap with a course or project.", 30.0),
            phase("Show the work", "Publish a portfolio piece or lead a visible project.", 20.0),
            phase("Make the move", "Apply, interview or negotiate for the new role.", 12.0),
        ],
        GoalCategory::Health => [
            phase("Baseline check", "Record current fitness, sleep and nutrition numbers.", 3.0),
            phase("Build the routine", "Train three times a week for a month.", 24.0),
            phase("Increase the load", "Raise intensity or volume by about ten percent.", 24.0),
            phase("Measure and adjust", "Repeat the baseline and adjust the plan.", 4.0),
        ],
        GoalCategory::Finance => [
            phase("Map the money", "List income, expenses, debts and savings.", 4.0),
            phase("Set the budget", "Assign every expense a monthly limit.", 6.0),
            phase("Automate savings", "Set up automatic transfers toward the goal.", 3.0),
            phase("Review and grow", "Review progress monthly and raise contributions.", 8.0),
        ],
        GoalCategory::Education => [
            phase("Choose the curriculum", "Pick the course, book list or syllabus.", 4.0),
            phase("Learn the fundamentals", "Work through the core material.", 40.0),
            phase("Practice deliberately", "Do exercises and projects on the weak spots.", 30.0),
            phase("Prove it", "Take the exam, certificate or final project.", 10.0),
        ],
        GoalCategory::Personal => [
            phase("Clarify the why", "Write down what success looks like and why it matters.", 2.0),
            phase("Start small", "Practice the habit daily at a minimal level.", 10.0),
            phase("Build consistency", "Grow the habit and track it every day.", 20.0),
            phase("Reflect", "Review what changed and decide what comes next.", 3.0),
        ],
        GoalCategory::Relationships => [
            phase("Reach out", "List the people involved and contact each one.", 3.0),
            phase("Make regular time", "Schedule recurring time together.", 15.0),
            phase("Go deeper", "Plan a shared activity or honest conversation.", 10.0),
            phase("Keep it going", "Agree on how to stay in touch.", 4.0),
        ],
        GoalCategory::Creativity => [
            phase("Gather ideas", "Collect references and sketch rough concepts.", 6.0),
            phase("Make a first draft", "Produce a complete rough version.", 25.0),
            phase("Refine", "Revise with feedback from others.", 20.0),
            phase("Share it", "Publish, perform or exhibit the finished work.", 6.0),
        ],
        GoalCategory::Other => [
            phase("Plan", "Break the goal into concrete outcomes.", 4.0),
            phase("First results", "Deliver the first tangible outcome.", 15.0),
            phase("Main push", "Work through the bulk of the goal.", 25.0),
            phase("Wrap up", "Finish, review and celebrate.", 6.0),
        ],
    }
}

fn category_tips(category: GoalCategory) -> [&'static str; 2] {
    match category {
        GoalCategory::Career => [
            "Schedule one networking conversation every two weeks.",
            "Keep a running list of wins to use in reviews and interviews.",
        ],
        GoalCategory::Health => [
            "Put workouts in your calendar like meetings.",
            "Track sleep, since it drives most other health numbers.",
        ],
        GoalCategory::Finance => [
            "Automate the saving step so it happens before spending.",
            "Review spending weekly, not monthly, while building the habit.",
        ],
        GoalCategory::Education => [
            "Study in short daily sessions instead of long weekend ones.",
            "Teach what you learned to someone else to lock it in.",
        ],
        GoalCategory::Personal => [
            "Attach the new habit to something you already do every day.",
            "Write a one-line journal entry about progress each evening.",
        ],
        GoalCategory::Relationships => [
            "Set a recurring reminder to reach out.",
            "Plan shared time ahead rather than waiting for a free moment.",
        ],
        GoalCategory::Creativity => [
            "Protect a fixed creative slot and treat it as non-negotiable.",
            "Finish rough versions before polishing anything.",
        ],
        GoalCategory::Other => [
            "Define the very next physical action and schedule it.",
            "Review this goal weekly and drop what no longer matters.",
        ],
    }
}

/// Weekly coaching from metric thresholds. Every section is non-empty.
pub fn weekly_coaching(metrics: &CoachingMetrics) -> CoachingText {
    let velocity = &metrics.velocity;
    let bottlenecks = &metrics.bottlenecks;
    let streak = &metrics.streak;

    let mut highlights = Vec::new();
    if velocity.totals.tasks_completed > 0 {
        highlights.push(format!(
            "You completed {} roadmap tasks ({:.1} hours) in the last {} days.",
            velocity.totals.tasks_completed, velocity.totals.hours_completed, velocity.window_days
        ));
    }
    if velocity.totals.milestones_completed > 0 {
        highlights.push(format!(
            "{} milestones reached in the same period.",
            velocity.totals.milestones_completed
        ));
    }
    if streak.current_streak >= STREAK_HIGHLIGHT_DAYS {
        highlights.push(format!("You are on a {}-day streak.", streak.current_streak));
    }
    if metrics.completed_goals > 0 {
        highlights.push(format!("{} goals fully completed so far.", metrics.completed_goals));
    }
    if highlights.is_empty() {
        highlights.push(format!(
            "You have {} active goals with an average progress of {:.0}%.",
            metrics.active_goals, metrics.average_goal_progress
        ));
    }

    let mut insights = vec![match velocity.trend {
        Trend::Increasing => "Your pace is picking up compared with earlier weeks.".to_string(),
        Trend::Decreasing => "Your pace has slowed compared with earlier weeks.".to_string(),
        Trend::Stable => format!(
            "Your pace is steady at about {:.1} tasks per week.",
            velocity.averages.tasks_per_week
        ),
    }];
    if !bottlenecks.overdue_milestones.is_empty() {
        insights.push(format!(
            "{} milestones are past their due date.",
            bottlenecks.overdue_milestones.len()
        ));
    }
    if let Some(goal) = bottlenecks.struggling_goals.first() {
        insights.push(format!(
            "'{}' is the goal most behind at {:.0}% complete.",
            goal.title, goal.completion_rate
        ));
    }
    if let Some(category) = bottlenecks.underperforming_categories.first() {
        insights.push(format!(
            "{} tasks get finished only {:.0}% of the time.",
            category.category.label(),
            category.completion_rate
        ));
    }
    if streak.longest_streak > streak.current_streak && streak.longest_streak > 1 {
        insights.push(format!(
            "Your best streak so far is {} days.",
            streak.longest_streak
        ));
    }

    let mut recommendations = Vec::new();
    if let Some(overdue) = bottlenecks.overdue_milestones.first() {
        recommendations.push(format!(
            "Re-plan '{}', which is {} days overdue: split it up or move the date.",
            overdue.title, overdue.days_overdue
        ));
    }
    if let Some(goal) = bottlenecks.struggling_goals.first() {
        recommendations.push(format!(
            "Give '{}' one focused session this week.",
            goal.title
        ));
    }
    if let Some(category) = bottlenecks.underperforming_categories.first() {
        recommendations.push(format!(
            "Try shorter {} sessions so they fit into busy days.",
            category.category.label().to_lowercase()
        ));
    }
    if streak.current_streak == 0 {
        recommendations.push("Finish one small task today to start a new streak.".to_string());
    }
    if velocity.trend == Trend::Decreasing {
        recommendations.push("Block a fixed time slot each day for roadmap work.".to_string());
    }
    if recommendations.is_empty() {
        recommendations.push("Pick the next milestone and schedule its first session.".to_string());
    }

    let motivation = match (bottlenecks.severity, velocity.trend) {
        (Severity::High, _) => {
            "A few things slipped, and that is normal. Pick one and move it forward today."
        }
        (_, Trend::Increasing) => "Momentum is on your side. Keep showing up.",
        (_, Trend::Decreasing) => "Slow weeks happen. Small steps still count.",
        _ => "Consistency beats intensity. One task at a time gets you there.",
    }
    .to_string();

    CoachingText {
        highlights,
        insights,
        recommendations,
        motivation,
    }
}

/// Category tips followed by tips driven by completion rate and overdue
/// milestones.
pub fn goal_recommendations(goal: &Goal, milestones: &[Milestone], now: DateTime<Utc>) -> Vec<String> {
    let mut tips: Vec<String> = category_tips(goal.category)
        .iter()
        .map(|tip| tip.to_string())
        .collect();

    let pct = goal.completion_percentage;
    tips.push(if milestones.is_empty() {
        "Break this goal into three to five milestones with due dates.".to_string()
    } else if pct <= 0.0 {
        "Start with the smallest milestone to get the first win.".to_string()
    } else if pct < 50.0 {
        format!("At {:.0}%, aim to close one milestone before adding new work.", pct)
    } else if pct < 100.0 {
        format!("At {:.0}%, the finish line is in sight. Protect time for the last milestones.", pct)
    } else {
        "This goal is done. Celebrate, then decide what builds on it.".to_string()
    });

    let mut overdue: Vec<&Milestone> = milestones
        .iter()
        .filter(|m| m.due_date < now)
        .filter(|m| m.status.is_open() || m.status == MilestoneStatus::Overdue)
        .collect();
    overdue.sort_by_key(|m| m.due_date);
    if let Some(first) = overdue.first() {
        tips.push(format!(
            "{} milestones are overdue. Start by re-planning '{}'.",
            overdue.len(),
            first.title
        ));
    }
    tips
}

/// Last day of the goal's target year on the roadmap, capped at the roadmap end.
pub fn target_year_end(goal: &Goal, roadmap: &Roadmap) -> NaiveDate {
    let months = (goal.target_year.max(1) as u32) * 12;
    roadmap
        .start_date
        .checked_add_months(Months::new(months))
        .map(|d| d - Duration::days(1))
        .unwrap_or(roadmap.end_date)
        .min(roadmap.end_date)
}

/// Four category phases with due dates spread evenly up to the target-year
/// end. When that date has already passed, phases are spaced a month apart.
pub fn milestone_plan(goal: &Goal, roadmap: &Roadmap, now: DateTime<Utc>) -> Vec<MilestoneSuggestion> {
    let end = target_year_end(goal, roadmap)
        .and_time(NaiveTime::MIN)
        .and_utc();
    let phases = phases(goal.category);
    let count = phases.len() as i32;
    let step = if end > now {
        (end - now) / count
    } else {
        Duration::days(FALLBACK_PHASE_SPACING_DAYS)
    };

    phases
        .iter()
        .enumerate()
        .map(|(i, p)| MilestoneSuggestion {
            title: format!("{}: {}", goal.title, p.title),
            description: p.description.to_string(),
            estimated_effort_hours: p.hours,
            due_date: now + step * (i as i32 + 1),
        })
        .collect()
}

/// Splits the milestone's unscheduled effort into sessions of at most
/// `max_task_minutes`.
pub fn task_sessions(milestone: &Milestone, scheduled_minutes: i64, max_task_minutes: i32) -> Vec<TaskDraft> {
    let effort_minutes = (milestone.estimated_effort_hours.max(0.0) * 60.0).round() as i64;
    let remaining = effort_minutes - scheduled_minutes;
    let max = max_task_minutes.max(1) as i64;
    if remaining <= 0 {
        return Vec::new();
    }

    let count = (remaining + max - 1) / max;
    (0..count)
        .map(|i| {
            let minutes = if i == count - 1 {
                remaining - max * (count - 1)
            } else {
                max
            };
            TaskDraft {
                title: format!("{} (session {}/{})", milestone.title, i + 1, count),
                description: Some(format!(
                    "Focused work on '{}'. {} minutes.",
                    milestone.title, minutes
                )),
                estimated_minutes: minutes as i32,
            }
        })
        .collect()
}
