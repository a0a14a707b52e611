use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Queryable, Selectable, Serialize, Deserialize, Clone, Debug)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub telegram_chat_id: Option<String>,
    pub notifications_enabled: bool,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    /// Chat handle to notify, if the user opted in.
    pub fn notification_handle(&self) -> Option<&str> {
        if !self.notifications_enabled {
            return None;
        }
        self.telegram_chat_id.as_deref().filter(|h| !h.trim().is_empty())
    }
}
