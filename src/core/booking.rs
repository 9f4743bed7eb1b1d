//! Order creation and the double-booking conflict check.
//!
//! The one hard invariant in the system lives here: for a given
//! freelancer and booking date, at most one order whose status still
//! occupies the slot may exist. The check and the insert share a single
//! transaction, and the partial unique index created in
//! `config::database` backstops the pair against a concurrent writer, so
//! a race can only ever surface as a `StateConflict`, never as a double
//! booking.

use crate::{
    core::{
        order_number,
        principal::{Principal, Role},
    },
    entities::{Availability, AvailabilityKind, Order, OrderStatus, availability, order},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, PaginatorTrait, QueryFilter, Set, SqlErr, TransactionTrait,
    prelude::*,
};
use tracing::info;

/// Retries for the improbable order-number suffix collision.
const ORDER_NUMBER_ATTEMPTS: u32 = 3;

/// Parameters for creating a new order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Customer the booking is for
    pub customer_id: i64,
    /// Freelancer being booked
    pub freelancer_id: i64,
    /// Service being booked
    pub service_id: i64,
    /// Requested calendar date
    pub booking_date: NaiveDate,
    /// Price both parties agreed on
    pub agreed_price: f64,
    /// Optional notes from the customer
    pub customer_notes: Option<String>,
}

/// Returns `true` iff no slot-occupying order exists for the
/// freelancer+date pair. Callable inside a transaction.
///
/// # Errors
/// Returns a database error.
pub async fn is_date_free<C>(conn: &C, freelancer_id: i64, date: NaiveDate) -> Result<bool>
where
    C: ConnectionTrait,
{
    let occupied = Order::find()
        .filter(order::Column::FreelancerId.eq(freelancer_id))
        .filter(order::Column::BookingDate.eq(date))
        .filter(order::Column::Status.is_not_in([OrderStatus::Cancelled, OrderStatus::Rejected]))
        .count(conn)
        .await?;
    Ok(occupied == 0)
}

/// Creates an order in `pending_payment`.
///
/// Customers book for themselves and only on dates the freelancer has
/// marked `available`; admins may book directly on any date and on behalf
/// of any customer. The availability check, the conflict check and the
/// insert run in one transaction.
///
/// # Errors
/// - `Forbidden` if the actor is neither the booking customer nor an admin
/// - `Validation` for past dates, bad prices, or an unopened date
/// - `StateConflict` if the date is already booked for the freelancer
pub async fn create_order(
    db: &DatabaseConnection,
    principal: &Principal,
    new_order: NewOrder,
) -> Result<order::Model> {
    if !principal.is_admin()
        && !(principal.has_role(Role::Customer) && principal.user_id == new_order.customer_id)
    {
        return Err(Error::Forbidden);
    }

    validate_price(new_order.agreed_price)?;

    let today = Utc::now().date_naive();
    if new_order.booking_date < today {
        return Err(Error::validation(format!(
            "booking date {} is in the past",
            new_order.booking_date
        )));
    }

    let txn = db.begin().await?;

    // "Book" mode requires the freelancer to have opened the date; admins
    // creating orders directly skip this advisory check.
    if !principal.is_admin() {
        let opened = Availability::find()
            .filter(availability::Column::UserId.eq(new_order.freelancer_id))
            .filter(availability::Column::Date.eq(new_order.booking_date))
            .filter(availability::Column::Kind.eq(AvailabilityKind::Available))
            .one(&txn)
            .await?;
        if opened.is_none() {
            return Err(Error::validation(
                "the freelancer has not opened this date for booking",
            ));
        }
    }

    if !is_date_free(&txn, new_order.freelancer_id, new_order.booking_date).await? {
        return Err(Error::state_conflict(
            "the freelancer is already booked on this date",
        ));
    }

    let created = insert_with_fresh_number(&txn, &new_order, today).await?;

    txn.commit().await?;

    info!(
        order_number = %created.order_number,
        freelancer_id = created.freelancer_id,
        booking_date = %created.booking_date,
        "order created"
    );
    Ok(created)
}

/// Inserts the order row, regenerating the order number on a suffix
/// collision. A unique violation on anything other than `order_number`
/// can only come from the active-slot index, i.e. a booking race lost to
/// a concurrent writer.
async fn insert_with_fresh_number<C>(
    conn: &C,
    new_order: &NewOrder,
    today: NaiveDate,
) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    for _ in 0..ORDER_NUMBER_ATTEMPTS {
        let row = order::ActiveModel {
            order_number: Set(order_number::generate(today)),
            customer_id: Set(new_order.customer_id),
            freelancer_id: Set(new_order.freelancer_id),
            service_id: Set(new_order.service_id),
            booking_date: Set(new_order.booking_date),
            agreed_price: Set(new_order.agreed_price),
            customer_notes: Set(new_order.customer_notes.clone()),
            status: Set(OrderStatus::PendingPayment),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        match row.insert(conn).await {
            Ok(model) => return Ok(model),
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(detail))
                    if detail.contains("order_number") =>
                {
                    continue;
                }
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    return Err(Error::state_conflict(
                        "the freelancer is already booked on this date",
                    ));
                }
                _ => return Err(err.into()),
            },
        }
    }

    Err(Error::Config {
        message: "could not allocate a unique order number".to_string(),
    })
}

/// Validates the agreed price: finite, non-negative, at most two fraction
/// digits.
fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::validation(format!("invalid price: {price}")));
    }

    let cents = price * 100.0;
    if (cents - cents.round()).abs() > 1e-6 {
        return Err(Error::validation(
            "price must have at most two fraction digits",
        ));
    }
    Ok(())
}
