//! Review read projections.
//!
//! Reviews are written exactly once by the `complete` transition in
//! `core::workflow`; this module only reads them back for order pages and
//! freelancer profiles.

use crate::{
    entities::{Review, review},
    errors::Result,
};
use sea_orm::{ColumnTrait, QueryFilter, QueryOrder, prelude::*};

/// Fetches the review attached to an order, if the order has completed.
///
/// # Errors
/// Returns a database error.
pub async fn get_for_order(db: &DatabaseConnection, order_id: i64) -> Result<Option<review::Model>> {
    Review::find()
        .filter(review::Column::OrderId.eq(order_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists a freelancer's reviews, newest first.
///
/// # Errors
/// Returns a database error.
pub async fn list_for_freelancer(
    db: &DatabaseConnection,
    freelancer_id: i64,
) -> Result<Vec<review::Model>> {
    Review::find()
        .filter(review::Column::FreelancerId.eq(freelancer_id))
        .order_by_desc(review::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Average star rating across a freelancer's reviews, or `None` when the
/// freelancer has no reviews yet.
///
/// # Errors
/// Returns a database error.
#[allow(clippy::cast_precision_loss)]
pub async fn average_rating_for_freelancer(
    db: &DatabaseConnection,
    freelancer_id: i64,
) -> Result<Option<f64>> {
    let reviews = list_for_freelancer(db, freelancer_id).await?;
    if reviews.is_empty() {
        return Ok(None);
    }

    let total: i32 = reviews.iter().map(|r| r.rating).sum();
    Ok(Some(f64::from(total) / reviews.len() as f64))
}
