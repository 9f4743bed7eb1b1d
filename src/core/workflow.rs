//! Order workflow engine.
//!
//! The authoritative state machine for an order:
//!
//! ```text
//! pending_payment ──upload_payment_slip──► pending_approval ──accept──► active
//!                                                │                       │
//!                                              reject                 deliver
//!                                                ▼                       ▼
//!                                            rejected (term.)        delivered ──complete──► completed (term.)
//!
//! admin_update_status: any ──► any (escape hatch, bypasses the table)
//! ```
//!
//! Every transition is an atomic compare-and-swap: `UPDATE orders SET ...
//! WHERE id = ? AND status = <expected>`. Zero affected rows means the
//! precondition no longer holds and the caller gets a `StateConflict`
//! with no data change. Ownership is checked against the loaded row
//! first; the status precondition is only ever trusted at the CAS, so a
//! lost race can never mis-transition a row. Side effects (conversation
//! creation, review insertion) run inside the same transaction.

use crate::{
    core::{
        chat,
        files::{SLIP_FOLDER, SlipStore},
        principal::Principal,
    },
    entities::{Conversation, Order, OrderStatus, Review, conversation, order, review},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, QueryFilter, Set, SqlErr, TransactionTrait,
    prelude::*,
};
use tracing::{info, warn};

/// Loads an order or reports it missing.
async fn load_order<C>(conn: &C, order_id: i64) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    Order::find_by_id(order_id)
        .one(conn)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })
}

/// The CAS at the heart of every transition: apply `patch` only while the
/// order still sits in `expected`. Returns the updated row.
async fn transition(
    txn: &DatabaseTransaction,
    order_id: i64,
    expected: OrderStatus,
    patch: order::ActiveModel,
    conflict_message: &str,
) -> Result<order::Model> {
    let result = Order::update_many()
        .set(patch)
        .filter(order::Column::Id.eq(order_id))
        .filter(order::Column::Status.eq(expected))
        .exec(txn)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::state_conflict(conflict_message));
    }

    load_order(txn, order_id).await
}

/// Customer uploads the payment slip, moving the order from
/// `pending_payment` to `pending_approval`.
///
/// A prior slip (from a re-upload that lost its race, or an admin reset)
/// is deleted from storage after the new one is committed.
///
/// # Errors
/// - `Validation` for an empty upload
/// - `Forbidden` if the actor is not the order's customer
/// - `StateConflict` unless the order is in `pending_payment`
pub async fn upload_payment_slip(
    db: &DatabaseConnection,
    store: &dyn SlipStore,
    principal: &Principal,
    order_id: i64,
    file_name: &str,
    bytes: &[u8],
) -> Result<order::Model> {
    if bytes.is_empty() {
        return Err(Error::validation("payment slip file is required"));
    }

    let existing = load_order(db, order_id).await?;
    if principal.user_id != existing.customer_id {
        return Err(Error::Forbidden);
    }

    let slip_path = store.store(file_name, bytes, SLIP_FOLDER)?;

    let txn = db.begin().await?;
    let patch = order::ActiveModel {
        payment_slip: Set(Some(slip_path.clone())),
        status: Set(OrderStatus::PendingApproval),
        payment_slip_uploaded_at: Set(Some(Utc::now())),
        ..Default::default()
    };
    let updated = match transition(
        &txn,
        order_id,
        OrderStatus::PendingPayment,
        patch,
        "payment can only be uploaded while the order is pending payment",
    )
    .await
    {
        Ok(updated) => updated,
        Err(e) => {
            // The transition did not happen; don't leave the fresh file behind.
            let _ = store.delete(&slip_path);
            return Err(e);
        }
    };
    txn.commit().await?;

    if let Some(old_path) = existing.payment_slip {
        if let Err(e) = store.delete(&old_path) {
            warn!(path = %old_path, error = %e, "failed to delete replaced payment slip");
        }
    }

    info!(order_number = %updated.order_number, "payment slip uploaded");
    Ok(updated)
}

/// Freelancer accepts the order, moving it from `pending_approval` to
/// `active` and ensuring the order conversation exists.
///
/// Conversation creation is get-or-create, so replays cannot produce a
/// duplicate.
///
/// # Errors
/// - `Forbidden` if the actor is not the order's freelancer
/// - `StateConflict` unless the order is in `pending_approval`
pub async fn accept(
    db: &DatabaseConnection,
    principal: &Principal,
    order_id: i64,
) -> Result<order::Model> {
    let existing = load_order(db, order_id).await?;
    if principal.user_id != existing.freelancer_id {
        return Err(Error::Forbidden);
    }

    let txn = db.begin().await?;
    let patch = order::ActiveModel {
        status: Set(OrderStatus::Active),
        freelancer_responded_at: Set(Some(Utc::now())),
        ..Default::default()
    };
    let updated = transition(
        &txn,
        order_id,
        OrderStatus::PendingApproval,
        patch,
        "order can only be accepted while pending approval",
    )
    .await?;

    chat::get_or_create_for_order(&txn, &updated).await?;
    txn.commit().await?;

    info!(order_number = %updated.order_number, "order accepted");
    Ok(updated)
}

/// Freelancer rejects the order, a terminal transition out of
/// `pending_approval`.
///
/// # Errors
/// - `Forbidden` if the actor is not the order's freelancer
/// - `StateConflict` unless the order is in `pending_approval`
pub async fn reject(
    db: &DatabaseConnection,
    principal: &Principal,
    order_id: i64,
    reason: Option<String>,
) -> Result<order::Model> {
    let existing = load_order(db, order_id).await?;
    if principal.user_id != existing.freelancer_id {
        return Err(Error::Forbidden);
    }

    let txn = db.begin().await?;
    let patch = order::ActiveModel {
        status: Set(OrderStatus::Rejected),
        freelancer_responded_at: Set(Some(Utc::now())),
        cancellation_reason: Set(reason),
        ..Default::default()
    };
    let updated = transition(
        &txn,
        order_id,
        OrderStatus::PendingApproval,
        patch,
        "order can only be rejected while pending approval",
    )
    .await?;
    txn.commit().await?;

    info!(order_number = %updated.order_number, "order rejected");
    Ok(updated)
}

/// Freelancer marks the work delivered, moving the order from `active`
/// to `delivered`.
///
/// # Errors
/// - `Forbidden` if the actor is not the order's freelancer
/// - `StateConflict` unless the order is in `active`
pub async fn deliver(
    db: &DatabaseConnection,
    principal: &Principal,
    order_id: i64,
) -> Result<order::Model> {
    let existing = load_order(db, order_id).await?;
    if principal.user_id != existing.freelancer_id {
        return Err(Error::Forbidden);
    }

    let txn = db.begin().await?;
    let patch = order::ActiveModel {
        status: Set(OrderStatus::Delivered),
        delivered_at: Set(Some(Utc::now())),
        ..Default::default()
    };
    let updated = transition(
        &txn,
        order_id,
        OrderStatus::Active,
        patch,
        "only active orders can be delivered",
    )
    .await?;
    txn.commit().await?;

    info!(order_number = %updated.order_number, "order delivered");
    Ok(updated)
}

/// Customer completes a delivered order, writing the one-and-only review.
///
/// # Errors
/// - `Validation` if `rating` is outside 1..=5
/// - `Forbidden` if the actor is not the order's customer
/// - `StateConflict` unless the order is in `delivered`, or if a review
///   already exists for it
pub async fn complete(
    db: &DatabaseConnection,
    principal: &Principal,
    order_id: i64,
    rating: i32,
    comment: Option<String>,
) -> Result<(order::Model, review::Model)> {
    if !(1..=5).contains(&rating) {
        return Err(Error::validation(format!(
            "rating must be between 1 and 5, got {rating}"
        )));
    }

    let existing = load_order(db, order_id).await?;
    if principal.user_id != existing.customer_id {
        return Err(Error::Forbidden);
    }

    let txn = db.begin().await?;
    let patch = order::ActiveModel {
        status: Set(OrderStatus::Completed),
        completed_at: Set(Some(Utc::now())),
        ..Default::default()
    };
    let updated = transition(
        &txn,
        order_id,
        OrderStatus::Delivered,
        patch,
        "only delivered orders can be completed",
    )
    .await?;

    let review_row = review::ActiveModel {
        order_id: Set(updated.id),
        reviewer_id: Set(updated.customer_id),
        freelancer_id: Set(updated.freelancer_id),
        rating: Set(rating),
        comment: Set(comment),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let created_review = match review_row.insert(&txn).await {
        Ok(model) => model,
        Err(err) => match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                return Err(Error::state_conflict("order is already reviewed"));
            }
            _ => return Err(err.into()),
        },
    };
    txn.commit().await?;

    info!(order_number = %updated.order_number, rating, "order completed");
    Ok((updated, created_review))
}

/// Administrative override: force-set any status, stamping the timestamp
/// that belongs to the target. Bypasses the transition table entirely.
///
/// # Errors
/// - `Forbidden` unless the actor is an admin
/// - `OrderNotFound` if the order does not exist
pub async fn admin_update_status(
    db: &DatabaseConnection,
    principal: &Principal,
    order_id: i64,
    target: OrderStatus,
    reason: Option<String>,
) -> Result<order::Model> {
    if !principal.is_admin() {
        return Err(Error::Forbidden);
    }

    let now = Utc::now();
    let mut patch = order::ActiveModel {
        status: Set(target),
        ..Default::default()
    };
    match target {
        OrderStatus::PendingPayment => {}
        OrderStatus::PendingApproval => {
            patch.payment_slip_uploaded_at = Set(Some(now));
        }
        OrderStatus::Active => {
            patch.freelancer_responded_at = Set(Some(now));
        }
        OrderStatus::Delivered => {
            patch.delivered_at = Set(Some(now));
        }
        OrderStatus::Completed => {
            patch.completed_at = Set(Some(now));
        }
        OrderStatus::Cancelled => {
            patch.cancelled_at = Set(Some(now));
            patch.cancellation_reason = Set(Some(
                reason.unwrap_or_else(|| "Cancelled by administrator".to_string()),
            ));
        }
        OrderStatus::Rejected => {
            patch.freelancer_responded_at = Set(Some(now));
            if let Some(reason) = reason {
                patch.cancellation_reason = Set(Some(reason));
            }
        }
    }

    let result = Order::update_many()
        .set(patch)
        .filter(order::Column::Id.eq(order_id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::OrderNotFound { id: order_id });
    }

    let updated = load_order(db, order_id).await?;
    info!(
        order_number = %updated.order_number,
        status = ?updated.status,
        "admin forced order status"
    );
    Ok(updated)
}

/// Administrative delete: removes the order, its review and conversation
/// rows, and its stored payment slip. Irreversible by design.
///
/// # Errors
/// - `Forbidden` unless the actor is an admin
/// - `OrderNotFound` if the order does not exist
pub async fn admin_destroy(
    db: &DatabaseConnection,
    store: &dyn SlipStore,
    principal: &Principal,
    order_id: i64,
) -> Result<()> {
    if !principal.is_admin() {
        return Err(Error::Forbidden);
    }

    let existing = load_order(db, order_id).await?;

    let txn = db.begin().await?;
    Review::delete_many()
        .filter(review::Column::OrderId.eq(order_id))
        .exec(&txn)
        .await?;
    Conversation::delete_many()
        .filter(conversation::Column::OrderId.eq(order_id))
        .exec(&txn)
        .await?;
    Order::delete_by_id(order_id).exec(&txn).await?;
    txn.commit().await?;

    if let Some(path) = existing.payment_slip {
        store.delete(&path)?;
    }

    info!(order_number = %existing.order_number, "order destroyed by admin");
    Ok(())
}
