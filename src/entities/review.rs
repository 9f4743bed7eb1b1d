//! Review entity, written exactly once when an order completes.
//!
//! Owned by the order (1:1, `order_id` is unique) and immutable after
//! creation. `rating` is an integer from 1 to 5, validated by the workflow
//! before insertion.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    /// Unique identifier for the review
    #[sea_orm(primary_key)]
    pub id: i64,
    /// The completed order this review belongs to
    #[sea_orm(unique)]
    pub order_id: i64,
    /// Customer who wrote the review
    pub reviewer_id: i64,
    /// Freelancer being reviewed, denormalised for per-freelancer listings
    pub freelancer_id: i64,
    /// Star rating, 1 to 5 inclusive
    pub rating: i32,
    /// Optional free-form comment
    pub comment: Option<String>,
    /// When the review was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Review and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each review belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
