//! User-facing notifications raised by the upload coordinator.
//!
//! The coordinator only talks to [`NotificationSink`]; presentation is up
//! to the implementation. [`NoticeQueue`] keeps notices in memory for a UI
//! to render and acknowledge, [`TracingSink`] writes them to the log.

mod notice;
mod sink;

pub use notice::{FollowUp, Notice, NoticeKind, NoticeQueue};
pub use sink::{NotificationSink, TracingSink};
