use rand::Rng;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, UtcOffset};

const SHORT_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month padding:none]/[day padding:none]/[year]");

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Client-side id: base-36 milliseconds followed by a random base-36 tail.
///
/// Unique enough for a single user's garden, not a cryptographic identifier.
pub fn generate_id() -> String {
    let millis = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).max(0) as u64;
    let random: u64 = rand::thread_rng().r#gen();

    let mut id = to_base36(millis);
    id.push_str(&to_base36(random));
    id
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Short calendar date (`M/D/YYYY`) in the local timezone when it is known.
pub fn format_date(date: OffsetDateTime) -> String {
    let mut datetime = date;
    if let Ok(offset) = UtcOffset::current_local_offset() {
        datetime = datetime.to_offset(offset);
    }
    datetime
        .format(SHORT_DATE_FORMAT)
        .unwrap_or_else(|_| datetime.date().to_string())
}

/// Whole days between `date` and now, rounded up and never negative.
pub fn days_since(date: OffsetDateTime) -> i64 {
    days_between(date, OffsetDateTime::now_utc())
}

/// `ceil(|b - a|)` in days. Any partial day counts as a full one.
pub fn days_between(a: OffsetDateTime, b: OffsetDateTime) -> i64 {
    let diff = (b - a).abs();
    let day_ms = Duration::DAY.whole_milliseconds();
    let diff_ms = diff.whole_milliseconds();
    ((diff_ms + day_ms - 1) / day_ms) as i64
}
