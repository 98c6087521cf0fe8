use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// Display format used across the storefront, `dd/MM/yyyy`.
pub fn format_date(at: DateTime<Utc>) -> String {
    at.format("%d/%m/%Y").to_string()
}

/// `HH:mm dd/MM/yyyy`, the format event schedules are shown in.
pub fn format_date_time(at: DateTime<Utc>) -> String {
    at.format("%H:%M %d/%m/%Y").to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Ended,
}

/// Where `now` falls relative to an event's schedule. An event whose end is missing
/// is treated as a single instant at `start`.
pub fn event_status(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> EventStatus {
    let end = end.unwrap_or(start);
    if now < start {
        EventStatus::Upcoming
    } else if now <= end {
        EventStatus::Ongoing
    } else {
        EventStatus::Ended
    }
}

/// Calendar days from `now` to `target`. Negative when the target is in the past.
pub fn days_until(target: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (target.date_naive() - now.date_naive()).num_days()
}

/// Short Vietnamese description of how long ago `past` was.
pub fn relative_time(past: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(past);
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        "vừa xong".to_string()
    } else if minutes < 60 {
        format!("{minutes} phút trước")
    } else if elapsed.num_hours() < 24 {
        format!("{} giờ trước", elapsed.num_hours())
    } else if elapsed.num_days() < 7 {
        format!("{} ngày trước", elapsed.num_days())
    } else {
        format_date(past)
    }
}
