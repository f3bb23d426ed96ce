//! Wall-clock time in the unit the backend stamps records with.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Milliseconds since the UNIX epoch, as carried in `timestamp` fields.
pub type EpochMs = i64;

pub fn now_ms() -> EpochMs {
    epoch_ms(SystemTime::now())
}

/// Clocks set before 1970 read as 0; the far future saturates.
fn epoch_ms(at: SystemTime) -> EpochMs {
    let since = at.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
    EpochMs::try_from(since.as_millis()).unwrap_or(EpochMs::MAX)
}
