//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test
//! databases, creating orders in arbitrary workflow states, and an
//! in-memory stand-in for the external slip storage.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        availability::{self, DateMark},
        booking::{self, NewOrder},
        files::SlipStore,
        principal::Principal,
        workflow,
    },
    entities::{AvailabilityKind, OrderStatus, order},
    errors::Result,
};
use chrono::{Duration, NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use std::sync::Mutex;

/// Creates an in-memory `SQLite` database with all tables and indexes
/// initialized. This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A date `days` days from today. Tests work in relative dates so the
/// "no past bookings" rule never bites them.
#[must_use]
pub fn future_date(days: i64) -> NaiveDate {
    Utc::now().date_naive() + Duration::days(days)
}

/// Marks a date `available` on a freelancer's calendar.
pub async fn mark_available(db: &DatabaseConnection, user_id: i64, date: NaiveDate) -> Result<()> {
    availability::set_dates(
        db,
        user_id,
        &[DateMark {
            date,
            kind: AvailabilityKind::Available,
        }],
    )
    .await
}

/// Creates a test order with sensible defaults: customer 1 books
/// freelancer 2 a week out at 100.00. The availability mark is written
/// first, as the booking flow requires.
pub async fn create_test_order(db: &DatabaseConnection) -> Result<order::Model> {
    create_custom_order(db, 1, 2, future_date(7)).await
}

/// Creates a test order with explicit parties and date.
pub async fn create_custom_order(
    db: &DatabaseConnection,
    customer_id: i64,
    freelancer_id: i64,
    date: NaiveDate,
) -> Result<order::Model> {
    mark_available(db, freelancer_id, date).await?;
    booking::create_order(
        db,
        &Principal::customer(customer_id),
        NewOrder {
            customer_id,
            freelancer_id,
            service_id: 7,
            booking_date: date,
            agreed_price: 100.0,
            customer_notes: None,
        },
    )
    .await
}

/// Drives an order from `pending_payment` to `target` through the real
/// transitions, acting as the order's own customer and freelancer.
pub async fn advance_to_status(
    db: &DatabaseConnection,
    store: &MemorySlipStore,
    order: &order::Model,
    target: OrderStatus,
) -> Result<order::Model> {
    let customer = Principal::customer(order.customer_id);
    let freelancer = Principal::freelancer(order.freelancer_id);

    if target == OrderStatus::PendingPayment {
        return Ok(order.clone());
    }
    if target == OrderStatus::Cancelled {
        return workflow::admin_update_status(
            db,
            &Principal::admin(999),
            order.id,
            OrderStatus::Cancelled,
            None,
        )
        .await;
    }

    let current =
        workflow::upload_payment_slip(db, store, &customer, order.id, "slip.jpg", b"test-slip")
            .await?;
    if target == OrderStatus::PendingApproval {
        return Ok(current);
    }
    if target == OrderStatus::Rejected {
        return workflow::reject(db, &freelancer, order.id, None).await;
    }

    let current = workflow::accept(db, &freelancer, order.id).await?;
    if target == OrderStatus::Active {
        return Ok(current);
    }

    let current = workflow::deliver(db, &freelancer, order.id).await?;
    if target == OrderStatus::Delivered {
        return Ok(current);
    }

    let (completed, _review) = workflow::complete(db, &customer, order.id, 5, None).await?;
    Ok(completed)
}

/// In-memory slip store double. Records every store and delete so tests
/// can assert on replacement and cleanup behavior.
#[derive(Debug, Default)]
pub struct MemorySlipStore {
    stored: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
}

impl MemorySlipStore {
    /// Number of files ever stored.
    #[must_use]
    pub fn stored_count(&self) -> usize {
        self.stored.lock().unwrap().len()
    }

    /// Number of files ever deleted.
    #[must_use]
    pub fn deleted_count(&self) -> usize {
        self.deleted.lock().unwrap().len()
    }

    /// Whether `path` was deleted at some point.
    #[must_use]
    pub fn was_deleted(&self, path: &str) -> bool {
        self.deleted.lock().unwrap().iter().any(|p| p == path)
    }
}

impl SlipStore for MemorySlipStore {
    fn store(&self, file_name: &str, _bytes: &[u8], folder: &str) -> Result<String> {
        let mut stored = self.stored.lock().unwrap();
        let path = format!("{folder}/{}-{file_name}", stored.len());
        stored.push(path.clone());
        Ok(path)
    }

    fn delete(&self, path: &str) -> Result<()> {
        self.deleted.lock().unwrap().push(path.to_string());
        Ok(())
    }
}
