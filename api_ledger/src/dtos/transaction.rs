use chrono::NaiveDate;
use db::{
    dtos::transaction::{TransactionCreateRequest, TransactionFilter, TransactionUpdateRequest},
    models::transaction::TransactionRow,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_CURRENCY: &str = "USD";
pub const MAX_LIST_LIMIT: i64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Expense,
    Income,
    DebtInstallment,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Income => "income",
            TransactionKind::DebtInstallment => "debt_installment",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TransactionCreateBody {
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub currency: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub occurred_on: NaiveDate,
    pub installment_number: Option<i32>,
    pub installment_total: Option<i32>,
    pub due_date: Option<NaiveDate>,
    pub paid: Option<bool>,
    /// Delegate recording the entry on the owner's behalf.
    pub created_by_shared_user_id: Option<Uuid>,
}

impl TransactionCreateBody {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_amount(self.amount_minor)?;
        if let Some(currency) = &self.currency {
            validate_currency(currency)?;
        }
        match self.kind {
            TransactionKind::DebtInstallment => {
                match (self.installment_number, self.installment_total) {
                    (Some(number), Some(total)) => validate_installment(number, total),
                    _ => Err("Debt installments need installment_number and installment_total"),
                }
            }
            _ if self.installment_number.is_some()
                || self.installment_total.is_some()
                || self.due_date.is_some() =>
            {
                Err("Installment fields are only valid for debt installments")
            }
            _ => Ok(()),
        }
    }

    pub fn into_request(self, user_id: Uuid) -> TransactionCreateRequest {
        TransactionCreateRequest {
            user_id,
            kind: self.kind.as_str().to_string(),
            amount_minor: self.amount_minor,
            currency: normalize_currency(self.currency),
            category: trimmed(self.category),
            description: trimmed(self.description),
            occurred_on: self.occurred_on,
            installment_number: self.installment_number,
            installment_total: self.installment_total,
            due_date: self.due_date,
            paid: self.paid.unwrap_or(false),
            created_by_shared_user_id: self.created_by_shared_user_id,
        }
    }
}

/// Partial update. The kind and the recorded actor are fixed at creation.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionUpdateBody {
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

impl TransactionUpdateBody {
    /// Checks the body on its own and against the stored entry.
    pub fn validate(&self, current: &TransactionRow) -> Result<(), &'static str> {
        if let Some(amount) = self.amount_minor {
            validate_amount(amount)?;
        }
        if let Some(currency) = &self.currency {
            validate_currency(currency)?;
        }

        let touches_installment = self.installment_number.is_some()
            || self.installment_total.is_some()
            || self.due_date.is_some();
        if current.kind != TransactionKind::DebtInstallment.as_str() {
            if touches_installment {
                return Err("Installment fields are only valid for debt installments");
            }
            return Ok(());
        }

        match (
            self.installment_number.or(current.installment_number),
            self.installment_total.or(current.installment_total),
        ) {
            (Some(number), Some(total)) => validate_installment(number, total),
            _ => Err("Debt installments need installment_number and installment_total"),
        }
    }

    pub fn into_request(self) -> TransactionUpdateRequest {
        TransactionUpdateRequest {
            amount_minor: self.amount_minor,
            currency: self.currency.map(|c| c.trim().to_uppercase()),
            category: trimmed(self.category),
            description: trimmed(self.description),
            occurred_on: self.occurred_on,
            installment_number: self.installment_number,
            installment_total: self.installment_total,
            due_date: self.due_date,
            paid: self.paid,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    pub kind: Option<TransactionKind>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<i64>,
}

impl TransactionQuery {
    pub fn into_filter(self) -> Result<TransactionFilter, &'static str> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err("'from' must not be after 'to'");
            }
        }
        Ok(TransactionFilter {
            kind: self.kind.map(|k| k.as_str().to_string()),
            from: self.from,
            to: self.to,
            limit: Some(self.limit.unwrap_or(MAX_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    #[serde(flatten)]
    pub transaction: TransactionRow,
    /// Display label of whoever recorded the entry.
    pub created_by: Option<String>,
}

fn validate_amount(amount_minor: i64) -> Result<(), &'static str> {
    if amount_minor <= 0 {
        return Err("Amount must be positive");
    }
    Ok(())
}

fn validate_currency(currency: &str) -> Result<(), &'static str> {
    let currency = currency.trim();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err("Currency must be a three-letter ISO code");
    }
    Ok(())
}

fn validate_installment(number: i32, total: i32) -> Result<(), &'static str> {
    if number < 1 || total < 1 || number > total {
        return Err("Installment number must be between 1 and the installment total");
    }
    Ok(())
}

fn normalize_currency(currency: Option<String>) -> String {
    currency
        .map(|c| c.trim().to_uppercase())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn body(kind: TransactionKind) -> TransactionCreateBody {
        TransactionCreateBody {
            kind,
            amount_minor: 1250,
            currency: None,
            category: Some(" groceries ".to_string()),
            description: Some("   ".to_string()),
            occurred_on: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            installment_number: None,
            installment_total: None,
            due_date: None,
            paid: None,
            created_by_shared_user_id: None,
        }
    }

    fn stored(kind: TransactionKind) -> TransactionRow {
        let now = Utc::now().naive_utc();
        TransactionRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            kind: kind.as_str().to_string(),
            amount_minor: 1000,
            currency: "USD".to_string(),
            category: None,
            description: None,
            occurred_on: now.date(),
            installment_number: Some(2),
            installment_total: Some(10),
            due_date: None,
            paid: false,
            created_by_shared_user_id: None,
            shared_user_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn kinds_use_snake_case_labels() {
        let kind: TransactionKind = serde_json::from_str("\"debt_installment\"").unwrap();
        assert_eq!(kind, TransactionKind::DebtInstallment);
        assert_eq!(kind.as_str(), "debt_installment");
        assert!(serde_json::from_str::<TransactionKind>("\"transfer\"").is_err());
    }

    #[test]
    fn amounts_must_be_positive() {
        let mut b = body(TransactionKind::Expense);
        assert!(b.validate().is_ok());
        b.amount_minor = 0;
        assert!(b.validate().is_err());
        b.amount_minor = -5;
        assert!(b.validate().is_err());
    }

    #[test]
    fn rejects_malformed_currency() {
        let mut b = body(TransactionKind::Income);
        b.currency = Some("eur".to_string());
        assert!(b.validate().is_ok());
        b.currency = Some("EURO".to_string());
        assert!(b.validate().is_err());
        b.currency = Some("E1R".to_string());
        assert!(b.validate().is_err());
    }

    #[test]
    fn debt_installments_need_consistent_counters() {
        let mut b = body(TransactionKind::DebtInstallment);
        assert!(b.validate().is_err());

        b.installment_number = Some(3);
        b.installment_total = Some(12);
        assert!(b.validate().is_ok());

        b.installment_number = Some(13);
        assert!(b.validate().is_err());

        b.installment_number = Some(0);
        assert!(b.validate().is_err());
    }

    #[test]
    fn plain_entries_reject_installment_fields() {
        let mut b = body(TransactionKind::Expense);
        b.installment_total = Some(3);
        assert!(b.validate().is_err());
    }

    #[test]
    fn create_request_normalizes_fields() {
        let user_id = Uuid::new_v4();
        let mut b = body(TransactionKind::Expense);
        b.currency = Some(" brl".to_string());
        let req = b.into_request(user_id);

        assert_eq!(req.user_id, user_id);
        assert_eq!(req.kind, "expense");
        assert_eq!(req.currency, "BRL");
        assert_eq!(req.category.as_deref(), Some("groceries"));
        assert_eq!(req.description, None);
        assert!(!req.paid);

        let req = body(TransactionKind::Income).into_request(user_id);
        assert_eq!(req.currency, DEFAULT_CURRENCY);
    }

    #[test]
    fn updates_are_checked_against_the_stored_entry() {
        let installment = stored(TransactionKind::DebtInstallment);
        let update = TransactionUpdateBody {
            installment_number: Some(11),
            ..Default::default()
        };
        assert!(update.validate(&installment).is_err());

        let update = TransactionUpdateBody {
            installment_number: Some(10),
            paid: Some(true),
            ..Default::default()
        };
        assert!(update.validate(&installment).is_ok());

        let expense = stored(TransactionKind::Expense);
        assert!(update.validate(&expense).is_err());
        let update = TransactionUpdateBody {
            amount_minor: Some(0),
            ..Default::default()
        };
        assert!(update.validate(&expense).is_err());
    }

    #[test]
    fn query_limits_are_clamped_and_ranges_checked() {
        let filter = TransactionQuery::default().into_filter().unwrap();
        assert_eq!(filter.limit, Some(MAX_LIST_LIMIT));

        let filter = TransactionQuery {
            kind: Some(TransactionKind::Income),
            limit: Some(10_000),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.kind.as_deref(), Some("income"));
        assert_eq!(filter.limit, Some(MAX_LIST_LIMIT));

        let inverted = TransactionQuery {
            from: NaiveDate::from_ymd_opt(2026, 3, 2),
            to: NaiveDate::from_ymd_opt(2026, 3, 1),
            ..Default::default()
        };
        assert!(inverted.into_filter().is_err());
    }
}
