use chrono::NaiveDateTime;
use db::{dtos::reminder::ReminderCreateRequest, models::reminder::ReminderRow};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ReminderCreateBody {
    pub title: String,
    pub due_at: NaiveDateTime,
    pub created_by_shared_user_id: Option<Uuid>,
}

impl ReminderCreateBody {
    pub fn into_request(self, user_id: Uuid) -> Result<ReminderCreateRequest, &'static str> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title is required");
        }
        Ok(ReminderCreateRequest {
            user_id,
            title: title.to_string(),
            due_at: self.due_at,
            created_by_shared_user_id: self.created_by_shared_user_id,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ReminderQuery {
    #[serde(default)]
    pub include_done: bool,
}

#[derive(Debug, Serialize)]
pub struct ReminderResponse {
    #[serde(flatten)]
    pub reminder: ReminderRow,
    pub created_by: Option<String>,
}
