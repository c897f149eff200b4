//! Vote entity for tracking voter choices on polls.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vote")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Poll this vote belongs to.
    #[sea_orm(indexed)]
    pub poll_id: String,

    /// Voting user (null for anonymous voters).
    #[sea_orm(indexed, nullable)]
    pub user_id: Option<String>,

    /// Deduplication key: the user id, or `ip:<addr>` for anonymous voters.
    /// The unique index on (poll_id, voter_key) is the one-vote-per-voter
    /// invariant.
    pub voter_key: String,

    /// Chosen option index (0-based).
    pub choice: i32,

    pub voter_ip: String,

    #[sea_orm(nullable)]
    pub user_agent: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::poll::Entity",
        from = "Column::PollId",
        to = "super::poll::Column::Id",
        on_delete = "Cascade"
    )]
    Poll,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::poll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poll.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Build the deduplication key for a voter.
#[must_use]
pub fn voter_key(user_id: Option<&str>, ip: &str) -> String {
    user_id.map_or_else(|| format!("ip:{ip}"), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voter_key_prefers_user_id() {
        assert_eq!(voter_key(Some("u1"), "10.0.0.1"), "u1");
    }

    #[test]
    fn test_voter_key_falls_back_to_ip() {
        assert_eq!(voter_key(None, "10.0.0.1"), "ip:10.0.0.1");
    }
}
