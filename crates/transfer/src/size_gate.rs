use crate::TransferError;

/// Default upload limit: 5 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5_242_880;

/// Reason reported for files over the limit.
pub const SIZE_LIMIT_MESSAGE: &str = "Maximum file size should be 5MB";

/// Outcome of a [`SizeGate::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeCheck {
    pub valid: bool,
    /// Empty when `valid` is true.
    pub reason: String,
}

/// Rejects candidate files before any network activity.
///
/// The limit is inclusive: a file of exactly `max_bytes` passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeGate {
    max_bytes: u64,
}

impl Default for SizeGate {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE)
    }
}

impl SizeGate {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn check(&self, size: u64) -> SizeCheck {
        let valid = size <= self.max_bytes;
        SizeCheck {
            valid,
            reason: if valid {
                String::new()
            } else {
                SIZE_LIMIT_MESSAGE.to_string()
            },
        }
    }

    /// Like [`check`](Self::check), as a `Result`.
    pub fn validate(&self, size: u64) -> Result<(), TransferError> {
        let check = self.check(size);
        if check.valid {
            return Ok(());
        }
        Err(TransferError::Validation {
            size,
            max: self.max_bytes,
            reason: check.reason,
        })
    }
}
