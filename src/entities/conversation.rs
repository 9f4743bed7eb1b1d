//! Chat conversation entity.
//!
//! Two kinds share one table: `general` conversations are keyed by the
//! sorted participant pair, `order` conversations by the order id. The
//! invariant `user_a < user_b` holds for every row so that pair lookups
//! never need to try both orders. Partial unique indexes created in
//! `config::database` enforce one conversation per key.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Conversation kind, stored as a lowercase string in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum ConversationKind {
    /// Ad hoc conversation between any two users.
    #[sea_orm(string_value = "general")]
    General,
    /// Created automatically when an order is accepted.
    #[sea_orm(string_value = "order")]
    Order,
}

/// Conversation database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chat_conversations")]
pub struct Model {
    /// Unique identifier for the conversation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Whether this is an ad hoc or an order-bound conversation
    pub kind: ConversationKind,
    /// Lower participant id (always `user_a < user_b`)
    pub user_a: i64,
    /// Higher participant id
    pub user_b: i64,
    /// Backing order for `order`-kind conversations, `None` for `general`
    pub order_id: Option<i64>,
    /// When the conversation was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Conversation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Order-kind conversations belong to one order
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
