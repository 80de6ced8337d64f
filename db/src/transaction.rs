use common::error::{AppError, Res};
use sqlx::{Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    dtos::transaction::{TransactionCreateRequest, TransactionFilter, TransactionUpdateRequest},
    models::transaction::TransactionRow,
};

pub async fn get_filtered<'e, E>(
    executor: E,
    user_id: Uuid,
    filter: TransactionFilter,
) -> Res<Vec<TransactionRow>>
where
    E: Executor<'e, Database = Postgres>,
{
    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT * FROM transactions WHERE user_id = ");
    qb.push_bind(user_id);

    if let Some(kind) = filter.kind {
        qb.push(" AND kind = ").push_bind(kind);
    }

    if let Some(from) = filter.from {
        qb.push(" AND occurred_on >= ").push_bind(from);
    }

    if let Some(to) = filter.to {
        qb.push(" AND occurred_on <= ").push_bind(to);
    }

    qb.push(" ORDER BY occurred_on DESC, created_at DESC");

    if let Some(limit) = filter.limit {
        qb.push(" LIMIT ").push_bind(limit);
    }

    qb.build_query_as::<TransactionRow>()
        .fetch_all(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_owned<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    id: Uuid,
) -> Res<TransactionRow> {
    sqlx::query_as::<_, TransactionRow>(
        "SELECT * FROM transactions WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn insert<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: TransactionCreateRequest,
) -> Res<TransactionRow> {
    sqlx::query_as::<_, TransactionRow>(
        r#"
        INSERT INTO transactions (
            user_id, kind, amount_minor, currency, category, description, occurred_on,
            installment_number, installment_total, due_date, paid, created_by_shared_user_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(data.user_id)
    .bind(data.kind)
    .bind(data.amount_minor)
    .bind(data.currency)
    .bind(data.category)
    .bind(data.description)
    .bind(data.occurred_on)
    .bind(data.installment_number)
    .bind(data.installment_total)
    .bind(data.due_date)
    .bind(data.paid)
    .bind(data.created_by_shared_user_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn update<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    id: Uuid,
    data: TransactionUpdateRequest,
) -> Res<TransactionRow> {
    sqlx::query_as::<_, TransactionRow>(
        r#"
        UPDATE transactions SET
            amount_minor = COALESCE($3, amount_minor),
            currency = COALESCE($4, currency),
            category = COALESCE($5, category),
            description = COALESCE($6, description),
            occurred_on = COALESCE($7, occurred_on),
            installment_number = COALESCE($8, installment_number),
            installment_total = COALESCE($9, installment_total),
            due_date = COALESCE($10, due_date),
            paid = COALESCE($11, paid),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(data.amount_minor)
    .bind(data.currency)
    .bind(data.category)
    .bind(data.description)
    .bind(data.occurred_on)
    .bind(data.installment_number)
    .bind(data.installment_total)
    .bind(data.due_date)
    .bind(data.paid)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

/// Returns `false` when nothing matched.
pub async fn delete<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    id: Uuid,
) -> Res<bool> {
    let result = sqlx::query("DELETE FROM transactions WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
