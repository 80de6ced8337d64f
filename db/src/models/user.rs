use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub verified: bool,
    pub payment_customer_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn as_owner(&self) -> access::Owner {
        let name = self.full_name();
        access::Owner {
            id: self.id,
            name: (!name.is_empty()).then_some(name),
            email: Some(self.email.clone()),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct AuthCredentials {
    pub user_id: Uuid,
    pub password_hash: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmailConfirmation {
    pub token: Uuid,
    pub user_id: Uuid,
    pub created_at: NaiveDateTime,
    pub confirmed_at: Option<NaiveDateTime>,
}
