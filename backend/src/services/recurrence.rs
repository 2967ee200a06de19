use chrono::{
    DateTime, Datelike, Days, LocalResult, Months, NaiveDateTime, TimeDelta, TimeZone, Utc,
    Weekday,
};

use crate::error::AppError;
use crate::models::Repeat;

/// Step used to walk out of a DST gap; gaps are whole multiples of 15 minutes.
const GAP_STEP_MINUTES: i64 = 15;
const MAX_GAP_STEPS: usize = 4 * 24;

/// Next reminder instant after `current` under `repeat`.
///
/// Calendar arithmetic happens in `tz`, so "the same time tomorrow" means the same
/// wall-clock time. `current` is the previous due instant, never the acknowledgement
/// time, which keeps a recurring reminder locked to its original schedule.
pub fn next_occurrence<Tz: TimeZone>(
    current: DateTime<Utc>,
    repeat: Repeat,
    tz: &Tz,
) -> Result<DateTime<Utc>, AppError> {
    let local = current.with_timezone(tz).naive_local();

    let next_local = match repeat {
        Repeat::None => {
            return Err(AppError::Validation(
                "repeat rule `none` has no next occurrence".to_string(),
            ));
        }
        Repeat::Daily => local.checked_add_days(Days::new(1)),
        Repeat::Weekly => local.checked_add_days(Days::new(7)),
        // chrono clamps to the last day of a shorter month.
        Repeat::Monthly => local.checked_add_months(Months::new(1)),
        Repeat::Weekdays => next_weekday(local),
    }
    .ok_or_else(|| AppError::Validation(format!("{repeat} reminder after {current} is out of range")))?;

    let next = resolve_local(tz, next_local)?;
    if next <= current {
        return Err(AppError::Validation(format!(
            "{repeat} reminder after {current} did not advance"
        )));
    }
    Ok(next)
}

fn next_weekday(from: NaiveDateTime) -> Option<NaiveDateTime> {
    let mut next = from;
    loop {
        next = next.checked_add_days(Days::new(1))?;
        if !matches!(next.weekday(), Weekday::Sat | Weekday::Sun) {
            return Some(next);
        }
    }
}

/// Maps a wall-clock time back to an instant. Ambiguous times take the earlier
/// instant; times inside a DST gap move forward to the first valid time.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Result<DateTime<Utc>, AppError> {
    let mut candidate = naive;
    for _ in 0..=MAX_GAP_STEPS {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(t) => return Ok(t.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, _) => return Ok(earliest.with_timezone(&Utc)),
            LocalResult::None => {
                candidate = candidate
                    .checked_add_signed(TimeDelta::minutes(GAP_STEP_MINUTES))
                    .ok_or_else(|| {
                        AppError::Validation(format!("local time {naive} is out of range"))
                    })?;
            }
        }
    }
    Err(AppError::Validation(format!(
        "local time {naive} does not exist in this timezone"
    )))
}
