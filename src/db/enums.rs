use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql};
use diesel::pg::Pg;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::{AsExpression, FromSqlRow};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Declares a closed enum persisted as lowercase snake_case text.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
        )]
        #[diesel(sql_type = Text)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(
                        "Unrecognized {} variant: {}",
                        stringify!($name),
                        other
                    )),
                }
            }
        }

        impl FromSql<Text, Pg> for $name {
            fn from_sql(bytes: <Pg as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
                let s = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
                s.parse::<$name>().map_err(|e| e.into())
            }
        }

        impl ToSql<Text, Pg> for $name {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                out.write_all(self.as_str().as_bytes())?;
                Ok(IsNull::No)
            }
        }
    };
}

text_enum!(RoadmapStatus {
    Draft => "draft",
    Active => "active",
    Paused => "paused",
    Completed => "completed",
    Archived => "archived",
});

text_enum!(GoalCategory {
    Career => "career",
    Health => "health",
    Finance => "finance",
    Education => "education",
    Personal => "personal",
    Relationships => "relationships",
    Creativity => "creativity",
    Other => "other",
});

text_enum!(
    /// Shared by goals and roadmap tasks.
    Priority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
);

text_enum!(GoalStatus {
    NotStarted => "not_started",
    InProgress => "in_progress",
    Completed => "completed",
    Blocked => "blocked",
    Abandoned => "abandoned",
});

text_enum!(MilestoneStatus {
    NotStarted => "not_started",
    InProgress => "in_progress",
    Completed => "completed",
    Overdue => "overdue",
    Skipped => "skipped",
});

text_enum!(RoadmapTaskStatus {
    Pending => "pending",
    InProgress => "in_progress",
    Completed => "completed",
});

text_enum!(TaskSource {
    SystemSuggested => "system_suggested",
    AiGenerated => "ai_generated",
    Manual => "manual",
});

impl GoalStatus {
    /// Status implied by a milestone completion percentage.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 100.0 {
            GoalStatus::Completed
        } else if percentage > 0.0 {
            GoalStatus::InProgress
        } else {
            GoalStatus::NotStarted
        }
    }
}

impl MilestoneStatus {
    /// Still being worked on and eligible for the overdue sweep.
    pub fn is_open(&self) -> bool {
        match self {
            MilestoneStatus::NotStarted | MilestoneStatus::InProgress => true,
            MilestoneStatus::Completed | MilestoneStatus::Overdue | MilestoneStatus::Skipped => {
                false
            }
        }
    }

    /// Counts toward remaining effort.
    pub fn is_remaining(&self) -> bool {
        match self {
            MilestoneStatus::NotStarted | MilestoneStatus::InProgress | MilestoneStatus::Overdue => {
                true
            }
            MilestoneStatus::Completed | MilestoneStatus::Skipped => false,
        }
    }
}

impl GoalCategory {
    pub fn label(&self) -> &'static str {
        match self {
            GoalCategory::Career => "Career",
            GoalCategory::Health => "Health",
            GoalCategory::Finance => "Finance",
            GoalCategory::Education => "Education",
            GoalCategory::Personal => "Personal growth",
            GoalCategory::Relationships => "Relationships",
            GoalCategory::Creativity => "Creativity",
            GoalCategory::Other => "Other",
        }
    }
}
