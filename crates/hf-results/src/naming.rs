//! Run directory naming: `<name>__<YYYY-MM-DD__HH_MM_SS>`.

use chrono::{DateTime, NaiveDateTime, Utc};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d__%H_%M_%S";

const TIMESTAMP_LEN: usize = 20;
const SEPARATOR: &str = "__";

pub fn run_full_name(name: &str, created_at: &DateTime<Utc>) -> String {
    format!(
        "{}{}{}",
        name,
        SEPARATOR,
        created_at.format(TIMESTAMP_FORMAT)
    )
}

/// Split a full run name into its base name and creation time.
/// Returns `None` when the name carries no timestamp suffix.
pub fn parse_run_name(full_name: &str) -> Option<(&str, NaiveDateTime)> {
    let ts_start = full_name.len().checked_sub(TIMESTAMP_LEN)?;
    if !full_name.is_char_boundary(ts_start) {
        return None;
    }
    let (head, ts) = full_name.split_at(ts_start);
    let base = head.strip_suffix(SEPARATOR)?;
    if base.is_empty() {
        return None;
    }
    let created = NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).ok()?;
    Some((base, created))
}
