use chrono::NaiveDate;

use super::CoachingMetrics;
use crate::db::models::{Goal, Milestone};

pub const COACH_SYSTEM: &str = "You are a supportive, practical productivity coach. \
Be specific and brief. Refer to the user's actual numbers and goal titles.";

pub const PLANNER_SYSTEM: &str = "You are a planning assistant that breaks goals into \
concrete work. Reply with JSON only, no commentary.";

pub fn weekly_coaching(metrics: &CoachingMetrics) -> String {
    let v = &metrics.velocity;
    let b = &metrics.bottlenecks;
    let mut prompt = String::new();
    prompt.push_str("Write my weekly coaching summary from these numbers.\n");
    prompt.push_str(&format!(
        "- Last {} days: {} tasks, {} milestones, {:.1} hours completed\n",
        v.window_days, v.totals.tasks_completed, v.totals.milestones_completed, v.totals.hours_completed
    ));
    prompt.push_str(&format!(
        "- Averages: {:.2} tasks/week, {:.2} hours/week, trend {:?}\n",
        v.averages.tasks_per_week, v.averages.hours_per_week, v.trend
    ));
    prompt.push_str(&format!(
        "- Streak: current {} days, longest {} days\n",
        metrics.streak.current_streak, metrics.streak.longest_streak
    ));
    prompt.push_str(&format!(
        "- Goals: {} active, {} completed, average progress {:.0}%\n",
        metrics.active_goals, metrics.completed_goals, metrics.average_goal_progress
    ));
    for m in b.overdue_milestones.iter().take(5) {
        prompt.push_str(&format!("- Overdue: '{}' by {} days\n", m.title, m.days_overdue));
    }
    for g in b.struggling_goals.iter().take(3) {
        prompt.push_str(&format!("- Behind: '{}' at {:.0}%\n", g.title, g.completion_rate));
    }
    for c in b.underperforming_categories.iter().take(3) {
        prompt.push_str(&format!(
            "- Weak category: {} ({:.0}% of tasks done)\n",
            c.category.label(),
            c.completion_rate
        ));
    }
    prompt.push_str(
        "\nUse exactly these section headers, each on its own line: \
         Highlights, Insights, Recommendations, Motivation. \
         Under the first three write 2-4 bullet points. \
         Under Motivation write one or two sentences.",
    );
    prompt
}

pub fn goal_recommendations(goal: &Goal, milestones: &[Milestone]) -> String {
    let mut prompt = format!(
        "Give me recommendations for my {} goal '{}' ({:.0}% complete).\n",
        goal.category.label().to_lowercase(),
        goal.title,
        goal.completion_percentage
    );
    if let Some(description) = &goal.description {
        prompt.push_str(&format!("Goal description: {}\n", description));
    }
    for m in milestones {
        prompt.push_str(&format!(
            "- Milestone '{}' due {} status {}\n",
            m.title,
            m.due_date.date_naive(),
            m.status
        ));
    }
    prompt.push_str("\nUse a single header line 'Recommendations' followed by 3-5 bullet points.");
    prompt
}

pub fn milestone_suggestions(goal: &Goal, today: NaiveDate, target_end: NaiveDate) -> String {
    format!(
        "Suggest 3-6 milestones for the {} goal '{}'{}.\n\
         They must fall between {} and {}.\n\
         Reply with a JSON array of objects with fields \
         \"title\" (string), \"description\" (string), \
         \"estimated_effort_hours\" (number) and \"due_date\" (YYYY-MM-DD).",
        goal.category.label().to_lowercase(),
        goal.title,
        goal.description
            .as_deref()
            .map(|d| format!(" ({})", d))
            .unwrap_or_default(),
        today,
        target_end
    )
}

pub fn task_breakdown(milestone: &Milestone, remaining_minutes: i64, max_task_minutes: i32) -> String {
    format!(
        "Break the milestone '{}'{} into work sessions totalling about {} minutes.\n\
         No session may exceed {} minutes.\n\
         Reply with a JSON array of objects with fields \
         \"title\" (string), \"description\" (string) and \"estimated_minutes\" (integer).",
        milestone.title,
        milestone
            .description
            .as_deref()
            .map(|d| format!(" ({})", d))
            .unwrap_or_default(),
        remaining_minutes,
        max_task_minutes
    )
}
