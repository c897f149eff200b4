//! Pending notification entity: the retryable outbound email queue.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A contest winner was drawn.
    #[sea_orm(string_value = "winner_announced")]
    WinnerAnnounced,
    /// A contest passed its end time and was closed.
    #[sea_orm(string_value = "contest_closed")]
    ContestClosed,
    /// A new weekly poll was promoted.
    #[sea_orm(string_value = "weekly_rotated")]
    WeeklyRotated,
    /// A user-submitted poll awaits review.
    #[sea_orm(string_value = "poll_submitted")]
    PollSubmitted,
    /// A poll-manager invitation was issued.
    #[sea_orm(string_value = "manager_invitation")]
    ManagerInvitation,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pending_notification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub kind: NotificationKind,

    /// Related poll, when the notification concerns one.
    #[sea_orm(nullable)]
    pub poll_id: Option<String>,

    /// Recipient user; null means the configured admin recipient.
    #[sea_orm(nullable)]
    pub recipient_id: Option<String>,

    /// Direct recipient address (invitations go to addresses without an
    /// account).
    #[sea_orm(nullable)]
    pub email: Option<String>,

    /// Earliest delivery time; pushed back one hour per failed attempt.
    #[sea_orm(indexed)]
    pub scheduled_at: DateTimeWithTimeZone,

    /// Failed delivery attempts so far; dropped at 3.
    pub retry_count: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
