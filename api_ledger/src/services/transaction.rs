use common::error::{AppError, Res};
use db::models::transaction::TransactionRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dtos::transaction::{
        TransactionCreateBody, TransactionQuery, TransactionResponse, TransactionUpdateBody,
    },
    services::family::{Family, ensure_active_delegate, load_family},
};

fn respond(family: &Family, transaction: TransactionRow) -> TransactionResponse {
    TransactionResponse {
        created_by: family.label(&transaction.actor()),
        transaction,
    }
}

pub async fn list(
    pool: &PgPool,
    user_id: Uuid,
    query: TransactionQuery,
) -> Res<Vec<TransactionResponse>> {
    let filter = query
        .into_filter()
        .map_err(|msg| AppError::BadRequest(msg.to_string()))?;
    let rows = db::transaction::get_filtered(pool, user_id, filter).await?;
    let family = load_family(pool, user_id).await?;
    Ok(rows.into_iter().map(|row| respond(&family, row)).collect())
}

pub async fn get(pool: &PgPool, user_id: Uuid, id: Uuid) -> Res<TransactionResponse> {
    let row = db::transaction::get_owned(pool, user_id, id).await?;
    let family = load_family(pool, user_id).await?;
    Ok(respond(&family, row))
}

pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    body: TransactionCreateBody,
) -> Res<TransactionResponse> {
    body.validate()
        .map_err(|msg| AppError::BadRequest(msg.to_string()))?;
    ensure_active_delegate(pool, user_id, body.created_by_shared_user_id).await?;

    let row = db::transaction::insert(pool, body.into_request(user_id)).await?;
    log::info!(
        "User {} recorded {} {} ({})",
        user_id,
        row.kind,
        row.id,
        row.created_by_shared_user_id
            .map_or("owner".to_string(), |id| format!("shared user {}", id))
    );

    let family = load_family(pool, user_id).await?;
    Ok(respond(&family, row))
}

pub async fn update(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    body: TransactionUpdateBody,
) -> Res<TransactionResponse> {
    let current = db::transaction::get_owned(pool, user_id, id).await?;
    body.validate(&current)
        .map_err(|msg| AppError::BadRequest(msg.to_string()))?;

    let row = db::transaction::update(pool, user_id, id, body.into_request()).await?;
    let family = load_family(pool, user_id).await?;
    Ok(respond(&family, row))
}

pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Res<()> {
    if !db::transaction::delete(pool, user_id, id).await? {
        return Err(AppError::NotFound(format!("Transaction {}", id)));
    }
    log::info!("User {} deleted transaction {}", user_id, id);
    Ok(())
}
