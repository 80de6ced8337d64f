use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct SharedUserRow {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub name: String,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

impl From<&SharedUserRow> for access::SharedUser {
    fn from(row: &SharedUserRow) -> Self {
        access::SharedUser {
            id: row.id,
            owner_user_id: row.owner_user_id,
            name: row.name.clone(),
            active: row.active,
        }
    }
}
