use eyre::Result;
use slotwise_core::models::expert::Expert;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::models::{DbBlackout, DbExpert, DbWeeklyHours};

/// Loads an expert together with their weekly hours and blackout ranges.
/// Read-only: the booking engine never mutates expert data.
pub async fn get_expert(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<Expert>> {
    tracing::debug!("Getting expert by id: {}", id);

    let expert = sqlx::query_as::<_, DbExpert>(
        r#"
        SELECT id, name, active, accepted_durations, price, created_at
        FROM experts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(expert) = expert else {
        tracing::debug!("Expert not found: {}", id);
        return Ok(None);
    };

    let hours = sqlx::query_as::<_, DbWeeklyHours>(
        r#"
        SELECT id, expert_id, weekday, open_time, close_time
        FROM weekly_hours
        WHERE expert_id = $1
        ORDER BY weekday, open_time
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let blackouts = sqlx::query_as::<_, DbBlackout>(
        r#"
        SELECT id, expert_id, start_time, end_time, reason
        FROM blackouts
        WHERE expert_id = $1
        ORDER BY start_time
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let weekly_hours = hours
        .into_iter()
        .map(|h| h.into_weekly_hours())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(Expert {
        id: expert.id,
        name: expert.name,
        active: expert.active,
        accepted_durations: expert.accepted_durations,
        price: expert.price,
        weekly_hours,
        blackouts: blackouts.into_iter().map(Into::into).collect(),
    }))
}
