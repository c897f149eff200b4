//! Database entities.

pub mod app_settings;
pub mod contest_winner;
pub mod job_log;
pub mod manager_invitation;
pub mod pending_notification;
pub mod poll;
pub mod popup_dismissal;
pub mod share;
pub mod user;
pub mod vote;

pub use app_settings::Entity as AppSettings;
pub use contest_winner::Entity as ContestWinner;
pub use job_log::Entity as JobLog;
pub use manager_invitation::Entity as ManagerInvitation;
pub use pending_notification::Entity as PendingNotification;
pub use poll::Entity as Poll;
pub use popup_dismissal::Entity as PopupDismissal;
pub use share::Entity as Share;
pub use user::Entity as User;
pub use vote::Entity as Vote;
