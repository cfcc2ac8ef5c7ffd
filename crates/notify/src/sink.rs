use tracing::{error, info, warn};

use crate::notice::{FollowUp, NoticeKind, NoticeQueue};

/// Destination for user-facing notices.
///
/// Returns an ID the caller can later use to acknowledge the notice.
pub trait NotificationSink: Send {
    fn notify(
        &mut self,
        kind: NoticeKind,
        title: &str,
        message: &str,
        follow_up: FollowUp,
    ) -> u64;
}

impl NotificationSink for NoticeQueue {
    fn notify(
        &mut self,
        kind: NoticeKind,
        title: &str,
        message: &str,
        follow_up: FollowUp,
    ) -> u64 {
        self.push(kind, title, message, follow_up)
    }
}

/// Writes notices to the log. Useful for headless front ends.
#[derive(Debug, Default)]
pub struct TracingSink {
    next_id: u64,
}

impl NotificationSink for TracingSink {
    fn notify(
        &mut self,
        kind: NoticeKind,
        title: &str,
        message: &str,
        follow_up: FollowUp,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        match kind {
            NoticeKind::Error => error!(id, title, ?follow_up, "{message}"),
            NoticeKind::Warning => warn!(id, title, ?follow_up, "{message}"),
            NoticeKind::Success | NoticeKind::Info => info!(id, title, ?follow_up, "{message}"),
        }
        id
    }
}
