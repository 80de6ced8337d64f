use std::sync::Arc;

use actix_web::{Responder, delete, get, post, put, web};
use common::{error::Res, http::Success, jwt::JwtClaims};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dtos::transaction::{TransactionCreateBody, TransactionQuery, TransactionUpdateBody},
    services,
};

/// Lists the caller's transactions, newest first.
///
/// # Input
/// - query `kind`: `expense`, `income` or `debt_installment`
/// - query `from`, `to`: inclusive `YYYY-MM-DD` bounds on `occurred_on`
/// - query `limit`: at most 500
///
/// # Output
/// - Success: array of transactions, each with a `created_by` label
/// - Error: 400 for an inverted date range, 403 without premium access
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/dashboard/ledger/transactions?kind=expense&from=2026-03-01', {
///   headers: { 'Authorization': `Bearer ${localStorage.getItem('authToken')}` }
/// });
/// const transactions = await response.json();
/// ```
#[get("")]
pub async fn get_transactions(
    claims: web::ReqData<JwtClaims>,
    query: web::Query<TransactionQuery>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &pool;
    let transactions =
        services::transaction::list(pg_pool, claims.user_id, query.into_inner()).await?;
    Success::ok(transactions)
}

/// Records an expense, income or debt installment.
///
/// # Input
/// - `kind`, `amount_minor` (positive, in minor units), `occurred_on`
/// - optional `currency` (defaults to USD), `category`, `description`
/// - debt installments: `installment_number`, `installment_total`, optional `due_date`, `paid`
/// - optional `created_by_shared_user_id`: an active shared user of the caller
///
/// # Output
/// - Success: 201 with the transaction and its `created_by` label
/// - Error: 400 for invalid fields or an unknown/deactivated shared user
#[post("")]
pub async fn post_transaction(
    claims: web::ReqData<JwtClaims>,
    body: web::Json<TransactionCreateBody>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &pool;
    let transaction =
        services::transaction::create(pg_pool, claims.user_id, body.into_inner()).await?;
    Success::created(transaction)
}

#[get("/{id}")]
pub async fn get_transaction(
    claims: web::ReqData<JwtClaims>,
    path: web::Path<Uuid>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &pool;
    let transaction =
        services::transaction::get(pg_pool, claims.user_id, path.into_inner()).await?;
    Success::ok(transaction)
}

/// Updates the given fields of a transaction; omitted fields are kept.
#[put("/{id}")]
pub async fn put_transaction(
    claims: web::ReqData<JwtClaims>,
    path: web::Path<Uuid>,
    body: web::Json<TransactionUpdateBody>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &pool;
    let transaction = services::transaction::update(
        pg_pool,
        claims.user_id,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Success::ok(transaction)
}

#[delete("/{id}")]
pub async fn delete_transaction(
    claims: web::ReqData<JwtClaims>,
    path: web::Path<Uuid>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &pool;
    services::transaction::delete(pg_pool, claims.user_id, path.into_inner()).await?;
    Success::no_content()
}
