use access::SubscriptionRecord;
use common::error::{AppError, Res};
use sqlx::{Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::models::subscription::SubscriptionRow;

pub async fn get_by_user_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Option<SubscriptionRecord>> {
    sqlx::query_as::<_, SubscriptionRow>("SELECT * FROM subscriptions WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
        .map(|row| row.map(SubscriptionRecord::from))
        .map_err(AppError::from)
}

/// Loads the record and holds its row lock until the surrounding transaction
/// ends, so concurrent billing updates apply one after the other. A missing
/// row is created first; it has no trial.
pub async fn get_by_user_id_for_update(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Res<SubscriptionRecord> {
    sqlx::query("INSERT INTO subscriptions (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query_as::<_, SubscriptionRow>(
        "SELECT * FROM subscriptions WHERE user_id = $1 FOR UPDATE",
    )
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await
    .map(SubscriptionRecord::from)
    .map_err(AppError::from)
}

/// Inserts the record holding the user's trial window. A user that already
/// has a record keeps it untouched, so a trial is never issued twice.
/// Returns `true` when a new record was written.
pub async fn insert_trial<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    record: &SubscriptionRecord,
) -> Res<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO subscriptions (user_id, trial_start, trial_end, subscribed, subscription_tier)
        VALUES ($1, $2, $3, FALSE, $4)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(record.user_id)
    .bind(record.trial_start)
    .bind(record.trial_end)
    .bind(record.subscription_tier.map(|t| t.as_str()))
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Persists the billing side of a record. Trial columns are not part of the
/// statement. Creates the row for users that never had a trial.
pub async fn save_billing_state<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    record: &SubscriptionRecord,
) -> Res<()> {
    sqlx::query(
        r#"
        INSERT INTO subscriptions (
            user_id, subscription_start, subscription_end, subscribed,
            subscription_tier, cancelled_at, payment_subscription_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (user_id) DO UPDATE SET
            subscription_start = EXCLUDED.subscription_start,
            subscription_end = EXCLUDED.subscription_end,
            subscribed = EXCLUDED.subscribed,
            subscription_tier = EXCLUDED.subscription_tier,
            cancelled_at = EXCLUDED.cancelled_at,
            payment_subscription_id = EXCLUDED.payment_subscription_id,
            updated_at = NOW()
        "#,
    )
    .bind(record.user_id)
    .bind(record.subscription_start)
    .bind(record.subscription_end)
    .bind(record.subscribed)
    .bind(record.subscription_tier.map(|t| t.as_str()))
    .bind(record.cancelled_at)
    .bind(&record.payment_subscription_id)
    .execute(executor)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::user::UserCreateRequest;
    use access::BillingEvent;
    use chrono::{Duration, Utc};
    use sqlx::PgPool;

    async fn user(pool: &PgPool) -> Uuid {
        crate::user::insert_user(
            pool,
            UserCreateRequest {
                email: format!("{}@example.com", Uuid::new_v4()),
                first_name: "Ana".to_string(),
                last_name: "Silva".to_string(),
            },
        )
        .await
        .unwrap()
        .id
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn billing_lock_makes_writers_wait(pool: PgPool) {
        let user_id = user(&pool).await;

        let mut first = pool.begin().await.unwrap();
        let mut record = get_by_user_id_for_update(&mut first, user_id).await.unwrap();

        let mut second = pool.begin().await.unwrap();
        sqlx::query("SET LOCAL lock_timeout = '100ms'")
            .execute(&mut *second)
            .await
            .unwrap();
        assert!(get_by_user_id_for_update(&mut second, user_id).await.is_err());
        second.rollback().await.unwrap();

        let end = Utc::now() + Duration::days(30);
        record.apply(&BillingEvent::PaymentSucceeded {
            subscription_id: Some("sub_123".to_string()),
            period_start: Some(Utc::now()),
            period_end: Some(end),
        });
        save_billing_state(&mut *first, &record).await.unwrap();
        first.commit().await.unwrap();

        // a later writer starts from the committed period
        let mut third = pool.begin().await.unwrap();
        let mut record = get_by_user_id_for_update(&mut third, user_id).await.unwrap();
        record.apply(&BillingEvent::PaymentSucceeded {
            subscription_id: Some("sub_123".to_string()),
            period_start: None,
            period_end: None,
        });
        save_billing_state(&mut *third, &record).await.unwrap();
        third.commit().await.unwrap();

        let stored = get_by_user_id(&pool, user_id).await.unwrap().unwrap();
        assert!(stored.subscribed);
        assert_eq!(
            stored.subscription_end.map(|e| e.timestamp()),
            Some(end.timestamp())
        );
        assert!(!stored.has_trial());
    }
}
