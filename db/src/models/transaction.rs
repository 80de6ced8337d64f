use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct TransactionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub amount_minor: i64,
    pub currency: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub occurred_on: NaiveDate,
    pub installment_number: Option<i32>,
    pub installment_total: Option<i32>,
    pub due_date: Option<NaiveDate>,
    pub paid: bool,
    pub created_by_shared_user_id: Option<Uuid>,
    pub shared_user_id: Option<Uuid>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TransactionRow {
    pub fn actor(&self) -> access::ActorRef {
        access::ActorRef {
            created_by_shared_user_id: self.created_by_shared_user_id,
            user_id: Some(self.user_id),
            shared_user_id: self.shared_user_id,
        }
    }
}
