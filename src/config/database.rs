//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions via `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. The uniqueness rules the entities cannot
//! express (composite and partial unique indexes) are created here as explicit DDL:
//! one calendar entry per freelancer+date, one conversation per key, and the hard
//! booking invariant of at most one slot-occupying order per freelancer+date.

use crate::entities::{Availability, Conversation, Order, Review};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// One slot-occupying order per freelancer+date. This partial unique index is
/// the race-proof half of the double-booking check: even if two concurrent
/// bookings pass the transactional existence check, the second insert fails here.
const IDX_ORDERS_ACTIVE_SLOT: &str = "CREATE UNIQUE INDEX IF NOT EXISTS ux_orders_active_slot \
     ON orders (freelancer_id, booking_date) \
     WHERE status NOT IN ('cancelled', 'rejected')";

/// One calendar entry per freelancer+date, required by the upsert in
/// `core::availability::set_dates`.
const IDX_AVAILABILITY_USER_DATE: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS ux_availability_user_date \
     ON freelancer_availability (user_id, date)";

/// One general conversation per sorted participant pair.
const IDX_CONVERSATIONS_PAIR: &str = "CREATE UNIQUE INDEX IF NOT EXISTS ux_conversations_pair \
     ON chat_conversations (user_a, user_b) \
     WHERE kind = 'general'";

/// One order conversation per order.
const IDX_CONVERSATIONS_ORDER: &str = "CREATE UNIQUE INDEX IF NOT EXISTS ux_conversations_order \
     ON chat_conversations (order_id) \
     WHERE kind = 'order'";

/// Gets the database URL from environment variable or returns the default `SQLite` path.
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/och_marketplace.sqlite".to_string())
}

/// Establishes a connection to the database at `database_url`.
///
/// # Errors
/// Returns an error if the connection cannot be established.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables and indexes.
///
/// Table DDL comes from `SeaORM`'s schema generation; the unique indexes are
/// issued as raw statements afterwards because `DeriveEntityModel` can only
/// mark single-column uniqueness.
///
/// # Errors
/// Returns an error if any DDL statement fails.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let order_table = schema.create_table_from_entity(Order);
    let availability_table = schema.create_table_from_entity(Availability);
    let review_table = schema.create_table_from_entity(Review);
    let conversation_table = schema.create_table_from_entity(Conversation);

    db.execute(builder.build(&order_table)).await?;
    db.execute(builder.build(&availability_table)).await?;
    db.execute(builder.build(&review_table)).await?;
    db.execute(builder.build(&conversation_table)).await?;

    db.execute_unprepared(IDX_ORDERS_ACTIVE_SLOT).await?;
    db.execute_unprepared(IDX_AVAILABILITY_USER_DATE).await?;
    db.execute_unprepared(IDX_CONVERSATIONS_PAIR).await?;
    db.execute_unprepared(IDX_CONVERSATIONS_ORDER).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{
        availability::Model as AvailabilityModel, conversation::Model as ConversationModel,
        order::Model as OrderModel, review::Model as ReviewModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<OrderModel> = Order::find().limit(1).all(&db).await?;
        let _: Vec<AvailabilityModel> = Availability::find().limit(1).all(&db).await?;
        let _: Vec<ReviewModel> = Review::find().limit(1).all(&db).await?;
        let _: Vec<ConversationModel> = Conversation::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        // Index creation uses IF NOT EXISTS, so a second index pass must succeed.
        db.execute_unprepared(IDX_ORDERS_ACTIVE_SLOT).await?;
        db.execute_unprepared(IDX_AVAILABILITY_USER_DATE).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_active_slot_index_blocks_duplicate_inserts() -> Result<()> {
        use crate::entities::{OrderStatus, order};
        use sea_orm::{ActiveModelTrait, Set};

        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        let date = chrono::NaiveDate::from_ymd_opt(2030, 6, 1).unwrap();
        let row = |number: &str| order::ActiveModel {
            order_number: Set(number.to_string()),
            customer_id: Set(1),
            freelancer_id: Set(42),
            service_id: Set(7),
            booking_date: Set(date),
            agreed_price: Set(100.0),
            status: Set(OrderStatus::PendingPayment),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        row("OCH-20300601-AAAAAA").insert(&db).await?;
        // Same freelancer+date while the first order occupies the slot: the
        // partial index must reject it even without the core-level check.
        let duplicate = row("OCH-20300601-BBBBBB").insert(&db).await;
        assert!(duplicate.is_err());

        Ok(())
    }
}
