//! Order entity, the central booking record.
//!
//! An order books one freelancer for one calendar date at an agreed price.
//! Its `status` walks the workflow state machine; each transition stamps the
//! matching `*_at` column. At most one order whose status still occupies the
//! slot may exist per (`freelancer_id`, `booking_date`); a partial unique
//! index created in `config::database` enforces this at the storage level.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Workflow status, stored as a lowercase string in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum OrderStatus {
    /// Created, waiting for the customer to upload a payment slip.
    #[sea_orm(string_value = "pending_payment")]
    PendingPayment,
    /// Slip uploaded, waiting for the freelancer to accept or reject.
    #[sea_orm(string_value = "pending_approval")]
    PendingApproval,
    /// Accepted; work in progress.
    #[sea_orm(string_value = "active")]
    Active,
    /// Freelancer marked the work delivered.
    #[sea_orm(string_value = "delivered")]
    Delivered,
    /// Customer confirmed and reviewed. Terminal.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Cancelled by administrative override. Terminal.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// Declined by the freelancer. Terminal.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl OrderStatus {
    /// Returns `true` if no further transitions are possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Rejected)
    }

    /// Returns `true` if an order in this status still occupies its
    /// freelancer+date slot for double-booking purposes.
    #[must_use]
    pub fn occupies_slot(self) -> bool {
        !matches!(self, Self::Cancelled | Self::Rejected)
    }
}

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable reference, `OCH-YYYYMMDD-XXXXXX`
    #[sea_orm(unique)]
    pub order_number: String,
    /// Customer who placed the booking (external identity id)
    pub customer_id: i64,
    /// Freelancer being booked (external identity id)
    pub freelancer_id: i64,
    /// Service being booked (catalog lives outside this crate)
    pub service_id: i64,
    /// Calendar date the freelancer is booked for
    pub booking_date: Date,
    /// Agreed price, validated to two fraction digits at creation
    pub agreed_price: f64,
    /// Free-form notes from the customer
    pub customer_notes: Option<String>,
    /// Storage path of the uploaded payment slip, if any
    pub payment_slip: Option<String>,
    /// Current workflow status
    pub status: OrderStatus,
    /// When the payment slip was uploaded
    pub payment_slip_uploaded_at: Option<DateTimeUtc>,
    /// When the freelancer accepted or rejected
    pub freelancer_responded_at: Option<DateTimeUtc>,
    /// When the freelancer marked the work delivered
    pub delivered_at: Option<DateTimeUtc>,
    /// When the customer completed the order
    pub completed_at: Option<DateTimeUtc>,
    /// When the order was cancelled
    pub cancelled_at: Option<DateTimeUtc>,
    /// Reason recorded on rejection or cancellation
    pub cancellation_reason: Option<String>,
    /// When the order was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each completed order has exactly one review
    #[sea_orm(has_one = "super::review::Entity")]
    Review,
    /// An accepted order has one order-typed conversation
    #[sea_orm(has_one = "super::conversation::Entity")]
    Conversation,
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl Related<super::conversation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Conversation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
