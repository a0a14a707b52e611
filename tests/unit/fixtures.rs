use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Months, Utc};
use roadmap_backend::config::LlmConfig;
use roadmap_backend::db::enums::{
    GoalCategory, GoalStatus, MilestoneStatus, Priority, RoadmapStatus, RoadmapTaskStatus,
    TaskSource,
};
use roadmap_backend::db::models::{Goal, Milestone, Roadmap, RoadmapTask, User};
use roadmap_backend::error::{AppError, AppResult};
use roadmap_backend::llm::{GenerationRequest, RetryPolicy, TextGenerator};
use roadmap_backend::notifications::Notifier;
use roadmap_backend::services::{CoachingService, RequestContext};
use roadmap_backend::store::MemoryStore;
use std::sync::Mutex;
use uuid::Uuid;

/// One user with one active roadmap in a fresh in-memory store.
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub user: User,
    pub roadmap: Roadmap,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let user = add_user(&store, "Ada");
        let roadmap = add_roadmap(&store, user.id);
        Self {
            store,
            user,
            roadmap,
        }
    }

    pub fn ctx(&self) -> RequestContext {
        RequestContext::for_user(self.user.id)
    }

    pub fn goal(&self, category: GoalCategory) -> Goal {
        add_goal(&self.store, self.roadmap.id, category)
    }

    pub fn milestone(&self, goal_id: Uuid, status: MilestoneStatus, due: DateTime<Utc>) -> Milestone {
        let now = Utc::now();
        let milestone = Milestone {
            id: Uuid::new_v4(),
            goal_id,
            title: format!("Milestone due {}", due.date_naive()),
            description: None,
            due_date: due,
            estimated_effort_hours: 4.0,
            status,
            sort_order: 0,
            completed_at: (status == MilestoneStatus::Completed).then_some(now),
            created_at: now,
            updated_at: now,
        };
        self.store.insert_milestone(milestone.clone()).unwrap();
        milestone
    }

    pub fn task(&self, milestone_id: Uuid, completed_at: Option<DateTime<Utc>>) -> RoadmapTask {
        let now = Utc::now();
        let task = RoadmapTask {
            id: Uuid::new_v4(),
            milestone_id,
            roadmap_id: self.roadmap.id,
            title: "Work session".into(),
            description: None,
            scheduled_date: now.date_naive(),
            estimated_duration: 60,
            priority: Priority::Medium,
            status: if completed_at.is_some() {
                RoadmapTaskStatus::Completed
            } else {
                RoadmapTaskStatus::Pending
            },
            source: TaskSource::Manual,
            task_id: None,
            completed_at,
            created_at: now,
        };
        self.store.insert_roadmap_task(task.clone()).unwrap();
        task
    }

    /// Another user with their own roadmap in the same store.
    pub fn stranger(&self) -> (User, Roadmap) {
        let user = add_user(&self.store, "Mallory");
        let roadmap = add_roadmap(&self.store, user.id);
        (user, roadmap)
    }
}

pub fn add_user(store: &MemoryStore, name: &str) -> User {
    let user = User {
        id: Uuid::new_v4(),
        email: format!("{}@example.com", name.to_lowercase()),
        name: name.to_string(),
        telegram_chat_id: Some(format!("chat-{}", name.to_lowercase())),
        notifications_enabled: true,
        is_active: true,
        created_at: Utc::now(),
    };
    store.insert_user(user.clone()).unwrap();
    user
}

pub fn add_roadmap(store: &MemoryStore, user_id: Uuid) -> Roadmap {
    let now = Utc::now();
    let start = now.date_naive() - Duration::days(60);
    let roadmap = Roadmap {
        id: Uuid::new_v4(),
        user_id,
        title: "Five year plan".into(),
        description: None,
        start_date: start,
        end_date: start.checked_add_months(Months::new(60)).unwrap(),
        status: RoadmapStatus::Active,
        progress_percentage: 0.0,
        created_at: now,
        updated_at: now,
    };
    store.insert_roadmap(roadmap.clone()).unwrap();
    roadmap
}

pub fn add_goal(store: &MemoryStore, roadmap_id: Uuid, category: GoalCategory) -> Goal {
    let now = Utc::now();
    let goal = Goal {
        id: Uuid::new_v4(),
        roadmap_id,
        category,
        title: format!("{} goal", category.label()),
        description: None,
        target_year: 1,
        priority: Priority::High,
        completion_percentage: 0.0,
        status: GoalStatus::NotStarted,
        completed_at: None,
        created_at: now,
        updated_at: now,
    };
    store.insert_goal(goal.clone()).unwrap();
    goal
}

pub fn llm_config() -> LlmConfig {
    LlmConfig {
        api_url: "http://127.0.0.1:9".into(),
        api_key: None,
        model: "test-model".into(),
        temperature: 0.2,
        max_output_tokens: 256,
        timeout_seconds: 1,
        total_timeout_seconds: 2,
        max_attempts: 3,
        initial_backoff_ms: 1,
    }
}

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_delay_ms: 1,
        delay_multiplier: 2.0,
        max_delay_ms: 5,
        attempt_timeout: std::time::Duration::from_millis(200),
        total_timeout: std::time::Duration::from_secs(2),
    }
}

/// Coaching with no generator configured.
pub fn rule_based_coaching() -> CoachingService {
    CoachingService::new(None, llm_config())
}

pub fn coaching_with(generator: Arc<dyn TextGenerator>) -> CoachingService {
    CoachingService::new(Some(generator), llm_config()).with_retry(fast_retry())
}

/// Generator that fails every call and counts them.
#[derive(Default)]
pub struct FailingGenerator {
    pub calls: Mutex<u32>,
}

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> AppResult<String> {
        *self.calls.lock().unwrap() += 1;
        Err(AppError::external("text-generation", "connection refused"))
    }
}

/// Generator that always answers with the same text.
pub struct CannedGenerator(pub String);

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> AppResult<String> {
        Ok(self.0.clone())
    }
}

/// Notifier that keeps every message it is asked to send. `fail` rejects
/// every call; `transient_failures` rejects only that many leading calls.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: bool,
    pub transient_failures: Mutex<u32>,
    pub attempts: Mutex<u32>,
}

impl RecordingNotifier {
    pub fn flaky(failures: u32) -> Self {
        Self {
            transient_failures: Mutex::new(failures),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_message(&self, chat_handle: &str, text: &str) -> AppResult<()> {
        *self.attempts.lock().unwrap() += 1;
        if self.fail {
            return Err(AppError::external("telegram", "chat not found"));
        }
        {
            let mut remaining = self.transient_failures.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(AppError::external("telegram", "502 Bad Gateway"));
            }
        }
        self.sent
            .lock()
            .unwrap()
            .push((chat_handle.to_string(), text.to_string()));
        Ok(())
    }
}
