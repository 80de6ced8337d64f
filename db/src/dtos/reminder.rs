use chrono::NaiveDateTime;
use uuid::Uuid;

pub struct ReminderCreateRequest {
    pub user_id: Uuid,
    pub title: String,
    pub due_at: NaiveDateTime,
    pub created_by_shared_user_id: Option<Uuid>,
}
