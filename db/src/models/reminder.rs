use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct ReminderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub due_at: NaiveDateTime,
    pub done: bool,
    pub created_by_shared_user_id: Option<Uuid>,
    pub created_at: NaiveDateTime,
}

impl ReminderRow {
    pub fn actor(&self) -> access::ActorRef {
        access::ActorRef {
            created_by_shared_user_id: self.created_by_shared_user_id,
            user_id: Some(self.user_id),
            shared_user_id: None,
        }
    }
}
