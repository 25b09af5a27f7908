//! Session countdown for the overseer console.
//!
//! `monk auth expires` prints the token expiry as a timestamp in one of a few
//! layouts. These helpers parse it and turn it into a short countdown.
//! Everything takes `now` explicitly so the output is deterministic in tests.

use chrono::{DateTime, NaiveDateTime};

/// Layouts tried after the `date(1)`-style format.
const FALLBACK_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%SZ"];

/// Parses the output of `auth expires`.
///
/// Accepts `Thu Jan 18 20:30:22 EST 2018` (the zone abbreviation is ignored
/// and the time is taken as local), `2018-01-18 20:30:22`,
/// `2018-01-18T20:30:22Z`, and RFC 3339.
pub fn parse_expires(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(parsed) = parse_date_style(text) {
        return Some(parsed);
    }

    for format in FALLBACK_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed);
        }
    }

    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.naive_local())
}

fn parse_date_style(text: &str) -> Option<NaiveDateTime> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    // weekday month day time [zone] year
    let without_zone = match tokens.as_slice() {
        [wd, mon, day, time, _zone, year] => format!("{wd} {mon} {day} {time} {year}"),
        [wd, mon, day, time, year] => format!("{wd} {mon} {day} {time} {year}"),
        _ => return None,
    };
    NaiveDateTime::parse_from_str(&without_zone, "%a %b %d %H:%M:%S %Y").ok()
}

/// Formats the time left until `expires_at`.
pub fn format_time_remaining(expires_at: NaiveDateTime, now: NaiveDateTime) -> String {
    let remaining = expires_at.signed_duration_since(now).num_seconds();

    if remaining <= 0 {
        let ago = remaining.unsigned_abs();
        return if ago < 3600 {
            format!("EXPIRED {}m ago", ago / 60)
        } else if ago < 86_400 {
            format!("EXPIRED {}h ago", ago / 3600)
        } else {
            format!("EXPIRED {}d ago", ago / 86_400)
        };
    }

    let hours = remaining / 3600;
    let minutes = (remaining % 3600) / 60;
    let seconds = remaining % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m remaining")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s remaining")
    } else {
        format!("{seconds}s remaining")
    }
}

/// Header text for the session countdown; falls back to the raw output.
pub fn session_display(expires_text: &str, now: NaiveDateTime) -> String {
    match parse_expires(expires_text) {
        Some(expires_at) => format!("Session: {}", format_time_remaining(expires_at, now)),
        None => format!("Session: {}", expires_text.trim()),
    }
}

/// Whether an `auth expired` exit status means the session can still be used.
///
/// The command reports through its exit status only. Exit 0 is read as
/// "token still valid"; anything else, including a bridge failure, as expired.
pub fn session_still_valid(expired_check: &crate::monk::CommandResult) -> bool {
    expired_check.succeeded
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 1, 18)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_parse_date_style_with_zone() {
        assert_eq!(
            parse_expires("Thu Jan 18 20:30:22 EST 2018\n"),
            Some(at(20, 30, 22))
        );
    }

    #[test]
    fn test_parse_padded_day() {
        let expected = NaiveDate::from_ymd_opt(2018, 2, 8)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert_eq!(parse_expires("Thu Feb  8 09:00:00 UTC 2018"), Some(expected));
    }

    #[test]
    fn test_parse_iso_layouts() {
        assert_eq!(parse_expires("2018-01-18 20:30:22"), Some(at(20, 30, 22)));
        assert_eq!(parse_expires("2018-01-18T20:30:22Z"), Some(at(20, 30, 22)));
        assert_eq!(
            parse_expires("2018-01-18T20:30:22+00:00"),
            Some(at(20, 30, 22))
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_expires(""), None);
        assert_eq!(parse_expires("no active session"), None);
    }

    #[test]
    fn test_remaining_formats() {
        let now = at(12, 0, 0);
        assert_eq!(format_time_remaining(at(14, 5, 0), now), "2h 5m remaining");
        assert_eq!(format_time_remaining(at(12, 7, 30), now), "7m 30s remaining");
        assert_eq!(format_time_remaining(at(12, 0, 42), now), "42s remaining");
    }

    #[test]
    fn test_expired_formats() {
        let expires = at(12, 0, 0);
        assert_eq!(format_time_remaining(expires, expires), "EXPIRED 0m ago");
        assert_eq!(format_time_remaining(expires, at(12, 25, 0)), "EXPIRED 25m ago");
        assert_eq!(format_time_remaining(expires, at(15, 0, 1)), "EXPIRED 3h ago");

        let days_later = NaiveDate::from_ymd_opt(2018, 1, 21)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(format_time_remaining(expires, days_later), "EXPIRED 3d ago");
    }

    #[test]
    fn test_session_display() {
        let now = at(20, 0, 0);
        assert_eq!(
            session_display("Thu Jan 18 20:30:22 EST 2018", now),
            "Session: 30m 22s remaining"
        );
        assert_eq!(
            session_display(" token missing \n", now),
            "Session: token missing"
        );
    }

    #[test]
    fn test_session_still_valid_follows_exit_status() {
        use crate::monk::{CommandFailure, CommandResult};

        assert!(session_still_valid(&CommandResult::from_process(0, "", "")));
        assert!(!session_still_valid(&CommandResult::from_process(1, "", "")));
        assert!(!session_still_valid(&CommandResult::infrastructure(
            CommandFailure::Timeout,
            "Command timed out after 5 seconds"
        )));
    }
}
