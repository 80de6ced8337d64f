use chrono::NaiveDate;
use uuid::Uuid;

pub struct TransactionCreateRequest {
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
}

/// Fields left as `None` keep their stored value.
#[derive(Default)]
pub struct TransactionUpdateRequest {
    pub amount_minor: Option<i64>,
    pub currency: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub occurred_on: Option<NaiveDate>,
    pub installment_number: Option<i32>,
    pub installment_total: Option<i32>,
    pub due_date: Option<NaiveDate>,
    pub paid: Option<bool>,
}

#[derive(Default)]
pub struct TransactionFilter {
    pub kind: Option<String>,
    /// Inclusive.
    pub from: Option<NaiveDate>,
    /// Inclusive.
    pub to: Option<NaiveDate>,
    pub limit: Option<i64>,
}
