//! Chat conversation business logic.
//!
//! Conversations come in two kinds: ad hoc `general` conversations keyed
//! by the participant pair, and `order` conversations created as a side
//! effect of a freelancer accepting an order. Both creations are
//! get-or-create and idempotent. The participant pair is an explicit
//! two-slot value, stored sorted so lookups never try both orders.

use crate::{
    entities::{Conversation, ConversationKind, conversation, order},
    errors::{Error, Result},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, QueryFilter, Set, TransactionTrait, prelude::*};

/// The two participants of a conversation, held in sorted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Participants {
    lower: i64,
    higher: i64,
}

impl Participants {
    /// Builds the sorted pair from two distinct user ids.
    ///
    /// # Errors
    /// Returns a validation error if both ids are the same user.
    pub fn new(a: i64, b: i64) -> Result<Self> {
        if a == b {
            return Err(Error::validation(
                "a conversation requires two distinct users",
            ));
        }
        Ok(Self {
            lower: a.min(b),
            higher: a.max(b),
        })
    }

    /// Lower participant id.
    #[must_use]
    pub fn lower(self) -> i64 {
        self.lower
    }

    /// Higher participant id.
    #[must_use]
    pub fn higher(self) -> i64 {
        self.higher
    }

    /// Returns the other participant, or `None` if `user_id` is not a member.
    #[must_use]
    pub fn other_of(self, user_id: i64) -> Option<i64> {
        if user_id == self.lower {
            Some(self.higher)
        } else if user_id == self.higher {
            Some(self.lower)
        } else {
            None
        }
    }
}

impl From<&conversation::Model> for Participants {
    fn from(model: &conversation::Model) -> Self {
        // Rows are stored with user_a < user_b already.
        Self {
            lower: model.user_a,
            higher: model.user_b,
        }
    }
}

/// Finds or creates the ad hoc conversation between two users.
///
/// Keyed by the sorted pair, so the argument order does not matter and
/// repeated calls return the same row.
///
/// # Errors
/// Fails on identical user ids or database errors.
pub async fn get_or_create_general(
    db: &DatabaseConnection,
    user_x: i64,
    user_y: i64,
) -> Result<conversation::Model> {
    let pair = Participants::new(user_x, user_y)?;

    let txn = db.begin().await?;

    if let Some(existing) = Conversation::find()
        .filter(conversation::Column::Kind.eq(ConversationKind::General))
        .filter(conversation::Column::UserA.eq(pair.lower()))
        .filter(conversation::Column::UserB.eq(pair.higher()))
        .one(&txn)
        .await?
    {
        txn.commit().await?;
        return Ok(existing);
    }

    let created = conversation::ActiveModel {
        kind: Set(ConversationKind::General),
        user_a: Set(pair.lower()),
        user_b: Set(pair.higher()),
        order_id: Set(None),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    Ok(created)
}

/// Finds or creates the order-typed conversation for `order`.
///
/// Generic over the connection so the accept transition can run it inside
/// its own transaction.
///
/// # Errors
/// Fails on database errors.
pub async fn get_or_create_for_order<C>(conn: &C, order: &order::Model) -> Result<conversation::Model>
where
    C: ConnectionTrait,
{
    if let Some(existing) = find_for_order(conn, order.id).await? {
        return Ok(existing);
    }

    let pair = Participants::new(order.customer_id, order.freelancer_id)?;

    conversation::ActiveModel {
        kind: Set(ConversationKind::Order),
        user_a: Set(pair.lower()),
        user_b: Set(pair.higher()),
        order_id: Set(Some(order.id)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(Into::into)
}

/// Looks up the order-typed conversation for an order, if one exists.
///
/// # Errors
/// Fails on database errors.
pub async fn find_for_order<C>(conn: &C, order_id: i64) -> Result<Option<conversation::Model>>
where
    C: ConnectionTrait,
{
    Conversation::find()
        .filter(conversation::Column::Kind.eq(ConversationKind::Order))
        .filter(conversation::Column::OrderId.eq(order_id))
        .one(conn)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;

    #[test]
    fn test_participants_sort_and_other_of() {
        let pair = Participants::new(9, 4).unwrap();
        assert_eq!(pair.lower(), 4);
        assert_eq!(pair.higher(), 9);
        assert_eq!(pair.other_of(4), Some(9));
        assert_eq!(pair.other_of(9), Some(4));
        assert_eq!(pair.other_of(5), None);
    }

    #[test]
    fn test_participants_rejects_self_conversation() {
        assert!(matches!(
            Participants::new(3, 3),
            Err(Error::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_general_conversation_is_keyed_by_sorted_pair() -> Result<()> {
        let db = setup_test_db().await?;

        let first = get_or_create_general(&db, 10, 20).await?;
        // Reversed argument order must land on the same row.
        let second = get_or_create_general(&db, 20, 10).await?;

        assert_eq!(first.id, second.id);
        assert_eq!(first.user_a, 10);
        assert_eq!(first.user_b, 20);
        assert_eq!(first.order_id, None);

        // The stored row converts straight back into the pair view.
        let pair = Participants::from(&first);
        assert_eq!(pair.other_of(10), Some(20));

        let total = Conversation::find().all(&db).await?.len();
        assert_eq!(total, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_distinct_pairs_get_distinct_conversations() -> Result<()> {
        let db = setup_test_db().await?;

        let ab = get_or_create_general(&db, 1, 2).await?;
        let ac = get_or_create_general(&db, 1, 3).await?;
        assert_ne!(ab.id, ac.id);
        Ok(())
    }
}
