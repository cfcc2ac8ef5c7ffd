/// Default display duration in milliseconds.
const DEFAULT_DURATION_MS: u64 = 4000;

/// Error display duration in milliseconds (longer for visibility).
const ERROR_DURATION_MS: u64 = 6000;

/// Visual category of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Warning,
    Error,
    Info,
}

impl NoticeKind {
    pub fn duration_ms(self) -> u64 {
        match self {
            NoticeKind::Error => ERROR_DURATION_MS,
            _ => DEFAULT_DURATION_MS,
        }
    }
}

/// What should happen once the user acknowledges a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FollowUp {
    /// Nothing; the session stays as it is.
    #[default]
    Nothing,
    /// Discard the current session and clear the selection.
    Dismiss,
}

/// A notification shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
    pub follow_up: FollowUp,
    pub duration_ms: u64,
}

/// In-memory notice queue with monotonic ID assignment.
///
/// Auto-dismissal timers are a UI concern. This struct just holds the
/// queue and hands back the follow-up when a notice is acknowledged.
#[derive(Debug, Clone, Default)]
pub struct NoticeQueue {
    notices: Vec<Notice>,
    next_id: u64,
}

impl NoticeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a notice. Returns the assigned ID.
    pub fn push(
        &mut self,
        kind: NoticeKind,
        title: impl Into<String>,
        message: impl Into<String>,
        follow_up: FollowUp,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.notices.push(Notice {
            id,
            kind,
            title: title.into(),
            message: message.into(),
            follow_up,
            duration_ms: kind.duration_ms(),
        });
        id
    }

    /// Acknowledge a notice: removes it and returns its follow-up.
    pub fn acknowledge(&mut self, id: u64) -> Option<FollowUp> {
        let pos = self.notices.iter().position(|n| n.id == id)?;
        Some(self.notices.remove(pos).follow_up)
    }

    /// Remove a notice by ID. Returns `true` if found.
    pub fn remove(&mut self, id: u64) -> bool {
        self.acknowledge(id).is_some()
    }

    pub fn get(&self, id: u64) -> Option<&Notice> {
        self.notices.iter().find(|n| n.id == id)
    }

    /// Most recently pushed notice still in the queue.
    pub fn last(&self) -> Option<&Notice> {
        self.notices.last()
    }

    /// Notices in insertion order (oldest first).
    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn clear(&mut self) {
        self.notices.clear();
    }
}
