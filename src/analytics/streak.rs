use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakInfo {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_completed_date: Option<NaiveDate>,
    pub total_active_days: u32,
}

/// Consecutive-day streaks over the dates that had at least one completion.
///
/// The current streak only counts if `today` itself is active; a missing today
/// resets it to zero rather than carrying yesterday's run.
pub fn calculate_streak(dates: &[NaiveDate], today: NaiveDate) -> StreakInfo {
    let days: BTreeSet<NaiveDate> = dates.iter().copied().collect();
    if days.is_empty() {
        return StreakInfo::default();
    }

    let mut current = 0u32;
    let mut cursor = today;
    while days.contains(&cursor) {
        current += 1;
        cursor -= Duration::days(1);
    }

    let mut longest = 0u32;
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;
    for &day in &days {
        run = match previous {
            Some(prev) if day - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }

    StreakInfo {
        current_streak: current,
        longest_streak: longest.max(current),
        last_completed_date: days.iter().next_back().copied(),
        total_active_days: days.len() as u32,
    }
}
