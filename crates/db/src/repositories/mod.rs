//! Repository layer: typed database operations per entity.

mod contest_winner;
mod invitation;
mod job_log;
mod notification_queue;
mod poll;
mod popup_dismissal;
mod share;
mod user;
mod vote;

pub use contest_winner::ContestWinnerRepository;
pub use invitation::InvitationRepository;
pub use job_log::JobLogRepository;
pub use notification_queue::NotificationQueueRepository;
pub use poll::{PollKind, PollListFilter, PollRepository};
pub use popup_dismissal::PopupDismissalRepository;
pub use share::ShareRepository;
pub use user::UserRepository;
pub use vote::VoteRepository;
