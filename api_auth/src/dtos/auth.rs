use access::AccessState;
use db::models::user::User;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterRequest {
    /// Returns the first problem found with the payload.
    pub fn validate(&self) -> Result<(), &'static str> {
        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => return Err("Invalid email address"),
        }
        if self.password.chars().count() < 8 {
            return Err("Password must be at least 8 characters long");
        }
        if self.first_name.trim().is_empty() {
            return Err("First name is required");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub user: User,
    pub trial_started: bool,
    pub access: AccessState,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            first_name: "Ana".to_string(),
            last_name: "Silva".to_string(),
        }
    }

    #[test]
    fn accepts_well_formed_registration() {
        assert!(request("ana@example.com", "correct horse").validate().is_ok());
    }

    #[test]
    fn rejects_bad_email_and_short_password() {
        assert_eq!(
            request("ana.example.com", "correct horse").validate(),
            Err("Invalid email address")
        );
        assert_eq!(
            request("@example.com", "correct horse").validate(),
            Err("Invalid email address")
        );
        assert_eq!(
            request("ana@example.com", "short").validate(),
            Err("Password must be at least 8 characters long")
        );
    }
}
