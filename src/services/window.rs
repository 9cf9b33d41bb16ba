//! Event time-window policy
//!
//! Decides whether a check-in or check-out is permitted at a given instant.
//! Events may carry explicit windows; when they do not, the check-in window
//! falls back to [start_time, end_time] and the check-out window to
//! [end_time, unbounded). All instants are naive local time and compared as
//! wall-clock values in a single assumed zone.

use chrono::NaiveDateTime;

use crate::models::event::Event;

/// Outcome of testing an instant against a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowDecision {
    Allowed,
    NotYetOpen(NaiveDateTime),
    Ended,
}

/// Whether check-in is permitted at `now`
pub fn check_in_allowed(event: &Event, now: NaiveDateTime) -> WindowDecision {
    let start = event.check_in_start.unwrap_or(event.start_time);
    let end = event.check_in_end.unwrap_or(event.end_time);
    decide(now, start, Some(end))
}

/// Whether check-out is permitted at `now`
pub fn check_out_allowed(event: &Event, now: NaiveDateTime) -> WindowDecision {
    let start = event.check_out_start.unwrap_or(event.end_time);
    decide(now, start, event.check_out_end)
}

fn decide(now: NaiveDateTime, start: NaiveDateTime, end: Option<NaiveDateTime>) -> WindowDecision {
    if now < start {
        return WindowDecision::NotYetOpen(start);
    }
    if let Some(end) = end {
        if now > end {
            return WindowDecision::Ended;
        }
    }
    WindowDecision::Allowed
}
