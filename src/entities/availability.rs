//! Freelancer availability entity, one row per explicitly marked date.
//!
//! Dates a freelancer has not marked at all are "unspecified" and simply
//! have no row. The calendar is advisory: it is never validated against
//! existing orders, and no foreign key ties it to the orders table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Calendar mark, stored as a lowercase string in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum AvailabilityKind {
    /// The freelancer accepts bookings on this date.
    #[sea_orm(string_value = "available")]
    Available,
    /// The freelancer explicitly blocked this date out.
    #[sea_orm(string_value = "blocked")]
    Blocked,
}

/// Availability database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "freelancer_availability")]
pub struct Model {
    /// Unique identifier for the calendar entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Freelancer this entry belongs to (external identity id)
    pub user_id: i64,
    /// The marked calendar date; unique per user via a composite index
    pub date: Date,
    /// Whether the date is open for booking or blocked
    pub kind: AvailabilityKind,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
