use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create experts table (owned by the expert-profile subsystem; this
    // engine only reads it, but bootstraps the shape for development)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS experts (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL,
            active BOOLEAN NOT NULL DEFAULT TRUE,
            accepted_durations INT4[] NOT NULL,
            price BIGINT NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT positive_price CHECK (price > 0)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create weekly_hours table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS weekly_hours (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            expert_id UUID NOT NULL REFERENCES experts(id),
            weekday SMALLINT NOT NULL,
            open_time TIME NOT NULL,
            close_time TIME NOT NULL,
            CONSTRAINT valid_weekday CHECK (weekday BETWEEN 0 AND 6),
            CONSTRAINT open_before_close CHECK (open_time < close_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create blackouts table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS blackouts (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            expert_id UUID NOT NULL REFERENCES experts(id),
            start_time TIMESTAMP WITH TIME ZONE NOT NULL,
            end_time TIMESTAMP WITH TIME ZONE NOT NULL,
            reason TEXT NULL,
            CONSTRAINT valid_blackout_range CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create bookings table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            customer_id UUID NOT NULL,
            expert_id UUID NOT NULL REFERENCES experts(id),
            start_time TIMESTAMP WITH TIME ZONE NULL,
            end_time TIMESTAMP WITH TIME ZONE NULL,
            duration_minutes INTEGER NOT NULL,
            timezone VARCHAR(64) NOT NULL,
            price BIGINT NOT NULL,
            status VARCHAR(32) NOT NULL,
            payment_txn_id VARCHAR(255) NULL,
            paid_at TIMESTAMP WITH TIME ZONE NULL,
            meeting_link TEXT NULL,
            meeting_link_created_at TIMESTAMP WITH TIME ZONE NULL,
            cancelled_by VARCHAR(16) NULL,
            cancelled_at TIMESTAMP WITH TIME ZONE NULL,
            refund_amount BIGINT NULL,
            expires_at TIMESTAMP WITH TIME ZONE NULL,
            intake JSONB NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_status CHECK (status IN
                ('payment_pending', 'paid', 'confirmed', 'completed', 'cancelled', 'refunded')),
            CONSTRAINT slot_both_or_neither CHECK ((start_time IS NULL) = (end_time IS NULL)),
            CONSTRAINT slot_ordered CHECK (start_time IS NULL OR end_time > start_time),
            CONSTRAINT refund_within_price CHECK (refund_amount IS NULL OR refund_amount <= price)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // The last line of defense against double-booking: if two claim
    // transactions race past the in-transaction overlap check, the second
    // commit fails here instead of silently succeeding. Scoped to
    // non-terminal rows so a cancelled booking frees its slot.
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS uniq_booking_slot
        ON bookings (expert_id, start_time, end_time)
        WHERE start_time IS NOT NULL
          AND status IN ('payment_pending', 'paid', 'confirmed');
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_bookings_expert_id ON bookings(expert_id);
        CREATE INDEX IF NOT EXISTS idx_bookings_customer_id ON bookings(customer_id);
        CREATE INDEX IF NOT EXISTS idx_bookings_status ON bookings(status);
        CREATE INDEX IF NOT EXISTS idx_bookings_expires_at ON bookings(expires_at) WHERE expires_at IS NOT NULL;
        CREATE INDEX IF NOT EXISTS idx_weekly_hours_expert_id ON weekly_hours(expert_id);
        CREATE INDEX IF NOT EXISTS idx_blackouts_expert_id ON blackouts(expert_id);
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
