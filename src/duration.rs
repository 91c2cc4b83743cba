//! Duration text parsing and display formatting
//!
//! Accepted inputs:
//! - `H:MM` with minutes in `0..=59`
//! - bare digits below 100, read as minutes (`90` is an hour and a half)
//! - bare digits from 100 up, where the last two digits are minutes and the
//!   leading digits are hours (`130` is 1h30m)

use crate::error::QueueError;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3600;

/// Parse user-entered duration text into a second count
pub fn parse(text: &str) -> Result<u64, QueueError> {
    let trimmed = text.trim();
    let invalid = || QueueError::InvalidFormat(text.to_string());

    let (hours, minutes) = match trimmed.split_once(':') {
        Some((h, m)) => {
            if m.contains(':') {
                return Err(invalid());
            }
            (digits(h).ok_or_else(invalid)?, digits(m).ok_or_else(invalid)?)
        }
        None => {
            let value = digits(trimmed).ok_or_else(invalid)?;
            if value < 100 {
                (0, value)
            } else {
                (value / 100, value % 100)
            }
        }
    };

    // Bare values below 100 are whole minute counts and may exceed 59
    if minutes > 59 && (trimmed.contains(':') || hours > 0) {
        return Err(invalid());
    }

    let total = hours
        .checked_mul(SECONDS_PER_HOUR)
        .and_then(|h| h.checked_add(minutes * SECONDS_PER_MINUTE))
        .ok_or_else(invalid)?;

    if total == 0 {
        return Err(QueueError::InvalidDuration);
    }
    Ok(total)
}

/// Digits-only component; signs, spaces and empty strings are rejected
fn digits(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Format a second count as `HH:MM:SS`
pub fn format_hms(seconds: u64) -> String {
    let hours = seconds / SECONDS_PER_HOUR;
    let minutes = (seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let secs = seconds % SECONDS_PER_MINUTE;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}
