use chrono::{DateTime, LocalResult, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use pillminder_models::{reminder::ReminderFireTime, validation::ValidationError};

/// Upper bound for probing past a skipped local time. Some zones skipped a
/// whole calendar day.
const MAX_GAP_MINUTES: i64 = 24 * 60;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Wall clock driven by tokio's clock, so paused-time tests move it forward
/// together with `tokio::time::sleep`.
#[cfg(any(test, feature = "test-util"))]
pub struct MockClock {
    anchor: DateTime<Utc>,
    started: tokio::time::Instant,
}

#[cfg(any(test, feature = "test-util"))]
impl MockClock {
    pub fn new(anchor: DateTime<Utc>) -> Self {
        Self {
            anchor,
            started: tokio::time::Instant::now(),
        }
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = TimeDelta::from_std(self.started.elapsed())
            .expect("Elapsed test time always fits.");
        self.anchor + elapsed
    }
}

pub fn validate(timezone_id: &str) -> bool {
    resolve_timezone(timezone_id).is_ok()
}

pub fn resolve_timezone(timezone_id: &str) -> Result<Tz, ValidationError> {
    timezone_id
        .trim()
        .parse::<Tz>()
        .map_err(|_| ValidationError::UnknownTimezone(timezone_id.to_string()))
}

/// Returns the earliest instant strictly after `after` at which the wall clock
/// in `timezone` shows `fire_at`.
///
/// A local time skipped by a DST transition resolves to the first valid local
/// minute after the gap. A local time that happens twice resolves to its first
/// occurrence only.
pub fn next_fire_instant(
    fire_at: ReminderFireTime,
    timezone: Tz,
    after: DateTime<Utc>,
) -> DateTime<Utc> {
    // Start a day early: the local date of `after` may already be past the
    // date on which the next occurrence falls in UTC terms.
    let local_date = after.with_timezone(&timezone).date_naive();
    let mut date = local_date.pred_opt().unwrap_or(local_date);

    loop {
        let candidate = resolve_local(date.and_time(fire_at.into_time()), timezone);
        if let Some(instant) = candidate {
            if instant > after {
                return instant;
            }
        }

        date = date.succ_opt().expect("Not realistic to overflow");
    }
}

fn resolve_local(local: NaiveDateTime, timezone: Tz) -> Option<DateTime<Utc>> {
    match timezone.from_local_datetime(&local) {
        LocalResult::Single(instant) => Some(instant.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => (1..=MAX_GAP_MINUTES).find_map(|minutes| {
            timezone
                .from_local_datetime(&(local + TimeDelta::minutes(minutes)))
                .earliest()
                .map(|instant| instant.with_timezone(&Utc))
        }),
    }
}
