//! Feature extraction from a log event + its sensitivity result

use thiserror::Error;

use super::vector::EventFeatures;
use crate::logic::events::LogEvent;
use crate::logic::sensitivity::SensitivityResult;

/// Hour used when the timestamp cannot be read
pub const DEFAULT_HOUR: u32 = 12;

/// Char offsets of the hour in an ISO-8601 timestamp ("YYYY-MM-DDTHH...")
const HOUR_START: usize = 11;
const HOUR_END: usize = 13;

/// Why an hour could not be read from a timestamp
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("timestamp missing")]
    Missing,
    #[error("timestamp too short ({0} chars)")]
    TooShort(usize),
    #[error("hour field '{0}' is not numeric")]
    NotNumeric(String),
    #[error("hour {0} out of range")]
    OutOfRange(u32),
}

/// Read the hour at the fixed offset of an ISO-8601 timestamp
pub fn parse_hour(timestamp: Option<&str>) -> Result<u32, TimestampError> {
    let ts = match timestamp.map(str::trim) {
        Some(ts) if !ts.is_empty() => ts,
        _ => return Err(TimestampError::Missing),
    };

    let chars: Vec<char> = ts.chars().collect();
    if chars.len() < HOUR_END {
        return Err(TimestampError::TooShort(chars.len()));
    }

    let field: String = chars[HOUR_START..HOUR_END].iter().collect();
    if !field.chars().all(|c| c.is_ascii_digit()) {
        return Err(TimestampError::NotNumeric(field));
    }
    let hour: u32 = field
        .parse()
        .map_err(|_| TimestampError::NotNumeric(field.clone()))?;

    if hour > 23 {
        return Err(TimestampError::OutOfRange(hour));
    }
    Ok(hour)
}

/// Build model features. Never fails: an unreadable hour becomes DEFAULT_HOUR.
pub fn featurize(event: &LogEvent, sensitivity: &SensitivityResult) -> EventFeatures {
    let hour = match parse_hour(event.timestamp.as_deref()) {
        Ok(hour) => hour,
        Err(e) => {
            log::debug!("Hour fallback to {} ({})", DEFAULT_HOUR, e);
            DEFAULT_HOUR
        }
    };

    let message_length = event.message.chars().count() + 1 + event.action.chars().count();

    EventFeatures {
        hour,
        message_length,
        has_sensitive_data: u8::from(sensitivity.has_sensitive_data),
        sensitivity: sensitivity.sensitivity,
    }
}
