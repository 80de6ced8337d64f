use stripe::{Client, CreateCustomer, Customer};

use crate::error::{AppError, Res};

pub fn create_client(secret_key: &str) -> Client {
    Client::new(secret_key)
}

/// Creates the payment-provider customer for a user. The user id travels in
/// the customer metadata so webhook events can be traced back.
pub async fn create_customer(
    client: &Client,
    email: &str,
    name: &str,
    user_id: &str,
) -> Res<Customer> {
    let metadata = std::collections::HashMap::from([("user_id".to_string(), user_id.to_string())]);
    let params = CreateCustomer {
        email: Some(email),
        name: Some(name),
        metadata: Some(metadata),
        ..Default::default()
    };

    Customer::create(client, params)
        .await
        .map_err(AppError::from)
}
