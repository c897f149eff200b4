//! Share event entity: an append-only log of social-share actions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Supported share platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum SharePlatform {
    #[sea_orm(string_value = "facebook")]
    Facebook,
    #[sea_orm(string_value = "twitter")]
    Twitter,
    #[sea_orm(string_value = "whatsapp")]
    Whatsapp,
    #[sea_orm(string_value = "linkedin")]
    Linkedin,
    #[sea_orm(string_value = "telegram")]
    Telegram,
    #[sea_orm(string_value = "email")]
    Email,
}

impl SharePlatform {
    /// Stable tag used in settings allow-lists and API payloads.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
            Self::Whatsapp => "whatsapp",
            Self::Linkedin => "linkedin",
            Self::Telegram => "telegram",
            Self::Email => "email",
        }
    }

    /// Parse a platform tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "facebook" => Some(Self::Facebook),
            "twitter" => Some(Self::Twitter),
            "whatsapp" => Some(Self::Whatsapp),
            "linkedin" => Some(Self::Linkedin),
            "telegram" => Some(Self::Telegram),
            "email" => Some(Self::Email),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "share")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub poll_id: String,

    /// Sharing user (null for anonymous visitors).
    #[sea_orm(nullable)]
    pub user_id: Option<String>,

    pub platform: SharePlatform,

    pub voter_ip: String,

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
}

impl Related<super::poll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poll.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_tag_round_trip() {
        for platform in [
            SharePlatform::Facebook,
            SharePlatform::Twitter,
            SharePlatform::Whatsapp,
            SharePlatform::Linkedin,
            SharePlatform::Telegram,
            SharePlatform::Email,
        ] {
            assert_eq!(SharePlatform::from_tag(platform.tag()), Some(platform));
        }
    }

    #[test]
    fn test_unknown_platform_tag() {
        assert_eq!(SharePlatform::from_tag("myspace"), None);
    }
}
