use serde::Serialize;

/// Whole-file progress of a transfer.
///
/// `loaded` counts from the start of the file, not from the start of the
/// current request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransferProgress {
    pub loaded: u64,
    pub total: u64,
    pub percentage: f64,
}

impl TransferProgress {
    pub fn new(loaded: u64, total: u64) -> Self {
        let loaded = loaded.min(total);
        let percentage = if total == 0 {
            100.0
        } else {
            loaded as f64 * 100.0 / total as f64
        };
        Self {
            loaded,
            total,
            percentage,
        }
    }

    /// Progress after `sent` bytes of a request that began at `start`.
    pub fn from_request(start: u64, sent: u64, total: u64) -> Self {
        Self::new(start.saturating_add(sent), total)
    }
}
