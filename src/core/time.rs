//! Clock and id helpers.

use std::time::{SystemTime, UNIX_EPOCH};
use ulid::Ulid;

/// Wall-clock unix-epoch milliseconds. Zero if the clock is before 1970.
pub fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Returns unix-epoch seconds with `Z` suffix (e.g. `1771220592Z`).
pub fn now_epoch_z() -> String {
    format!("{}Z", now_epoch_ms() / 1000)
}

/// Render epoch milliseconds as `<secs>.<millis>Z`.
pub fn format_epoch_ms(ms: u64) -> String {
    format!("{}.{:03}Z", ms / 1000, ms % 1000)
}

pub fn new_event_id() -> String {
    Ulid::new().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_epoch_z_format() {
        let result = now_epoch_z();
        assert!(result.ends_with('Z'));
        let numeric_part = result.trim_end_matches('Z');
        assert!(numeric_part.parse::<u64>().is_ok());
    }

    #[test]
    fn test_format_epoch_ms_pads_millis() {
        assert_eq!(format_epoch_ms(1_700_000_000_007), "1700000000.007Z");
        assert_eq!(format_epoch_ms(0), "0.000Z");
    }

    #[test]
    fn test_new_event_id_is_valid_ulid() {
        let id = new_event_id();
        assert!(ulid::Ulid::from_string(&id).is_ok());
        assert_ne!(id, new_event_id());
    }
}
