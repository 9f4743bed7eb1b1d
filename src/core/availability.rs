//! Availability calendar business logic.
//!
//! Freelancers mark individual dates `available` or `blocked`; unmarked
//! dates are simply absent. Writes are last-write-wins upserts and are
//! deliberately not validated against existing orders: the calendar is a
//! hint for the booking flow, not a constraint. The "booked" projection
//! comes from the orders table and is merged with the availability list
//! on the client side.

use crate::{
    entities::{Availability, AvailabilityKind, Order, OrderStatus, availability, order},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, QueryFilter, QueryOrder, Set, TransactionTrait, prelude::*};

/// A single calendar edit: one date and the mark to apply to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateMark {
    /// The calendar date being marked
    pub date: NaiveDate,
    /// The mark to apply
    pub kind: AvailabilityKind,
}

/// Upserts calendar entries for a freelancer, keyed by (user, date).
///
/// Existing marks for the same date are overwritten (last-write-wins).
/// All entries are applied in one transaction; dates in the past are
/// rejected before anything is written.
///
/// # Errors
/// Returns a validation error for past dates, or a database error.
pub async fn set_dates(
    db: &DatabaseConnection,
    user_id: i64,
    entries: &[DateMark],
) -> Result<()> {
    let today = Utc::now().date_naive();
    for entry in entries {
        if entry.date < today {
            return Err(Error::validation(format!(
                "cannot mark availability for past date {}",
                entry.date
            )));
        }
    }

    let txn = db.begin().await?;

    for entry in entries {
        let row = availability::ActiveModel {
            user_id: Set(user_id),
            date: Set(entry.date),
            kind: Set(entry.kind),
            ..Default::default()
        };

        Availability::insert(row)
            .on_conflict(
                OnConflict::columns([availability::Column::UserId, availability::Column::Date])
                    .update_column(availability::Column::Kind)
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;
    }

    txn.commit().await?;
    Ok(())
}

/// Removes the calendar entry for one date. A no-op if the date was never
/// marked.
///
/// # Errors
/// Returns a database error.
pub async fn remove_date(db: &DatabaseConnection, user_id: i64, date: NaiveDate) -> Result<()> {
    Availability::delete_many()
        .filter(availability::Column::UserId.eq(user_id))
        .filter(availability::Column::Date.eq(date))
        .exec(db)
        .await?;
    Ok(())
}

/// Lists the dates a freelancer has marked `available`, from `from`
/// onwards, ascending.
///
/// # Errors
/// Returns a database error.
pub async fn list_available(
    db: &DatabaseConnection,
    user_id: i64,
    from: NaiveDate,
) -> Result<Vec<availability::Model>> {
    Availability::find()
        .filter(availability::Column::UserId.eq(user_id))
        .filter(availability::Column::Kind.eq(AvailabilityKind::Available))
        .filter(availability::Column::Date.gte(from))
        .order_by_asc(availability::Column::Date)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists the dates a freelancer is actually booked on, from `from`
/// onwards, ascending. Derived from slot-occupying orders, not from the
/// calendar.
///
/// # Errors
/// Returns a database error.
pub async fn list_booked(
    db: &DatabaseConnection,
    user_id: i64,
    from: NaiveDate,
) -> Result<Vec<NaiveDate>> {
    let orders = Order::find()
        .filter(order::Column::FreelancerId.eq(user_id))
        .filter(order::Column::BookingDate.gte(from))
        .filter(order::Column::Status.is_not_in([OrderStatus::Cancelled, OrderStatus::Rejected]))
        .order_by_asc(order::Column::BookingDate)
        .all(db)
        .await?;

    let mut dates: Vec<NaiveDate> = orders.into_iter().map(|o| o.booking_date).collect();
    dates.dedup();
    Ok(dates)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{create_test_order, future_date, setup_test_db};

    #[tokio::test]
    async fn test_set_dates_upserts_last_write_wins() -> Result<()> {
        let db = setup_test_db().await?;
        let date = future_date(5);

        set_dates(
            &db,
            2,
            &[DateMark {
                date,
                kind: AvailabilityKind::Available,
            }],
        )
        .await?;

        // Re-marking the same date flips the kind instead of adding a row.
        set_dates(
            &db,
            2,
            &[DateMark {
                date,
                kind: AvailabilityKind::Blocked,
            }],
        )
        .await?;

        let rows = Availability::find()
            .filter(availability::Column::UserId.eq(2))
            .all(&db)
            .await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, AvailabilityKind::Blocked);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_dates_rejects_past_dates() -> Result<()> {
        let db = setup_test_db().await?;
        let yesterday = Utc::now().date_naive() - chrono::Duration::days(1);

        let result = set_dates(
            &db,
            2,
            &[DateMark {
                date: yesterday,
                kind: AvailabilityKind::Available,
            }],
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        // Nothing may have been written.
        assert!(Availability::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_date_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let date = future_date(3);

        set_dates(
            &db,
            2,
            &[DateMark {
                date,
                kind: AvailabilityKind::Available,
            }],
        )
        .await?;

        remove_date(&db, 2, date).await?;
        assert!(Availability::find().all(&db).await?.is_empty());

        // Removing an absent date is a no-op.
        remove_date(&db, 2, date).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_list_available_filters_kind_and_range() -> Result<()> {
        let db = setup_test_db().await?;

        set_dates(
            &db,
            2,
            &[
                DateMark {
                    date: future_date(1),
                    kind: AvailabilityKind::Available,
                },
                DateMark {
                    date: future_date(2),
                    kind: AvailabilityKind::Blocked,
                },
                DateMark {
                    date: future_date(3),
                    kind: AvailabilityKind::Available,
                },
            ],
        )
        .await?;

        let listed = list_available(&db, 2, future_date(2)).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].date, future_date(3));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_booked_derives_from_orders() -> Result<()> {
        let db = setup_test_db().await?;

        let order = create_test_order(&db).await?;
        let booked = list_booked(&db, order.freelancer_id, future_date(0)).await?;
        assert_eq!(booked, vec![order.booking_date]);

        // The calendar list is independent of the booked projection: the
        // booking flow consumed no availability rows.
        let other_user_booked = list_booked(&db, order.freelancer_id + 1, future_date(0)).await?;
        assert!(other_user_booked.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_blocking_a_booked_date_is_allowed() -> Result<()> {
        let db = setup_test_db().await?;

        let order = create_test_order(&db).await?;
        // The calendar never validates against orders: marking a booked
        // date blocked is last-write-wins, by design.
        set_dates(
            &db,
            order.freelancer_id,
            &[DateMark {
                date: order.booking_date,
                kind: AvailabilityKind::Blocked,
            }],
        )
        .await?;
        Ok(())
    }
}
